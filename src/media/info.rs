use std::path::Path;

use serde_json::Value;
use tokio::process::Command;

use crate::errors::{BotError, BotResult};

/// Stream metadata passed along with uploads
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaInfo {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub duration: Option<f64>,
}

impl MediaInfo {
    /// Extract media info using ffprobe JSON output
    pub async fn from_file(ffprobe: &str, path: &Path) -> BotResult<Self> {
        let output = Command::new(ffprobe)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .output()
            .await
            .map_err(|e| BotError::external_command_error(ffprobe, e.to_string()))?;

        if !output.status.success() {
            let error_msg = String::from_utf8_lossy(&output.stderr);
            return Err(BotError::external_command_error(ffprobe, error_msg));
        }

        let json_str = String::from_utf8(output.stdout)?;
        let json: Value = serde_json::from_str(&json_str)?;

        Self::parse_json(&json)
    }

    /// Audio files have no video stream, so dimensions are optional
    pub fn parse_json(json: &Value) -> BotResult<Self> {
        let streams = json["streams"].as_array().ok_or_else(|| {
            BotError::ParseError("No streams found in ffprobe output".to_string())
        })?;

        let video_stream = streams.iter().find(|s| s["codec_type"] == "video");

        let width = video_stream
            .and_then(|s| s["width"].as_u64())
            .map(|w| w as u32);
        let height = video_stream
            .and_then(|s| s["height"].as_u64())
            .map(|h| h as u32);

        // ffprobe reports duration as a string
        let duration = match json["format"]["duration"].as_str() {
            Some(d) => Some(d.parse::<f64>().map_err(|e| {
                BotError::ParseError(format!("Failed to parse duration '{}': {}", d, e))
            })?),
            None => None,
        };

        Ok(MediaInfo {
            width,
            height,
            duration,
        })
    }

    pub fn duration_secs(&self) -> Option<u32> {
        self.duration
            .filter(|d| d.is_finite() && *d >= 0.0)
            .map(|d| d.round() as u32)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn reads_video_dimensions_and_duration() {
        let info = MediaInfo::parse_json(&json!({
            "streams": [
                {"codec_type": "audio", "sample_rate": "44100"},
                {"codec_type": "video", "width": 1280, "height": 720}
            ],
            "format": {"duration": "61.480000"}
        }))
        .unwrap();

        assert_eq!(info.width, Some(1280));
        assert_eq!(info.height, Some(720));
        assert_eq!(info.duration_secs(), Some(61));
    }

    #[test]
    fn audio_only_has_no_dimensions() {
        let info = MediaInfo::parse_json(&json!({
            "streams": [{"codec_type": "audio"}],
            "format": {"duration": "200.6"}
        }))
        .unwrap();

        assert_eq!(info.width, None);
        assert_eq!(info.height, None);
        assert_eq!(info.duration_secs(), Some(201));
    }

    #[test]
    fn missing_streams_is_an_error() {
        assert!(MediaInfo::parse_json(&json!({"format": {}})).is_err());
    }

    #[test]
    fn bad_duration_is_an_error() {
        let result = MediaInfo::parse_json(&json!({
            "streams": [],
            "format": {"duration": "N/A"}
        }));
        assert!(matches!(result, Err(BotError::ParseError(_))));
    }
}

use std::path::PathBuf;

use url::Url;

use crate::errors::{BotError, BotResult};

const DEFAULT_DOWNLOAD_DIR: &str = "downloads";
const DEFAULT_YTDLP_PATH: &str = "yt-dlp";
const DEFAULT_FFPROBE_PATH: &str = "ffprobe";
const DEFAULT_AUDIO_QUALITY_KBPS: u32 = 192;
/// Bot API upload limit on the public server
const DEFAULT_MAX_UPLOAD_MB: u64 = 50;
const DEFAULT_CAPTION_TAG: &str = "Downloaded via #SnapMedia";

/// Runtime settings. The bot token is read separately by `Bot::from_env`.
#[derive(Debug, Clone)]
pub struct Config {
    pub web_app_url: Url,
    pub download_dir: PathBuf,
    pub ytdlp_path: String,
    pub ffprobe_path: String,
    pub audio_quality_kbps: u32,
    pub max_upload_bytes: u64,
    pub caption_tag: String,
}

impl Config {
    pub fn from_env() -> BotResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> BotResult<Self> {
        // Blank values behave like unset ones
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let raw_url = get("WEB_APP_URL")
            .ok_or_else(|| BotError::config("WEB_APP_URL is not set"))?;
        let web_app_url = Url::parse(&raw_url)
            .map_err(|e| BotError::config(format!("WEB_APP_URL is invalid: {}", e)))?;
        // Telegram only opens mini-apps over https
        if web_app_url.scheme() != "https" {
            return Err(BotError::config(format!(
                "WEB_APP_URL must use https, got {}",
                web_app_url.scheme()
            )));
        }

        let audio_quality_kbps = match get("AUDIO_QUALITY") {
            Some(v) => parse_positive::<u32>("AUDIO_QUALITY", &v)?,
            None => DEFAULT_AUDIO_QUALITY_KBPS,
        };

        let max_upload_mb = match get("MAX_UPLOAD_MB") {
            Some(v) => parse_positive::<u64>("MAX_UPLOAD_MB", &v)?,
            None => DEFAULT_MAX_UPLOAD_MB,
        };
        let max_upload_bytes = max_upload_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| {
                BotError::config(format!("MAX_UPLOAD_MB is too large: {}", max_upload_mb))
            })?;

        Ok(Self {
            web_app_url,
            download_dir: PathBuf::from(
                get("DOWNLOAD_DIR").unwrap_or_else(|| DEFAULT_DOWNLOAD_DIR.to_string()),
            ),
            ytdlp_path: get("YTDLP_PATH").unwrap_or_else(|| DEFAULT_YTDLP_PATH.to_string()),
            ffprobe_path: get("FFPROBE_PATH").unwrap_or_else(|| DEFAULT_FFPROBE_PATH.to_string()),
            audio_quality_kbps,
            max_upload_bytes,
            caption_tag: get("CAPTION_TAG").unwrap_or_else(|| DEFAULT_CAPTION_TAG.to_string()),
        })
    }
}

fn parse_positive<T>(key: &str, value: &str) -> BotResult<T>
where
    T: std::str::FromStr + PartialEq + Default,
{
    match value.parse::<T>() {
        Ok(v) if v != T::default() => Ok(v),
        _ => Err(BotError::config(format!(
            "{} must be a positive integer, got '{}'",
            key, value
        ))),
    }
}

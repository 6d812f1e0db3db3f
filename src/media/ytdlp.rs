use std::path::{Path, PathBuf};

use tokio::{fs, process};

use crate::{
    config::Config,
    errors::{BotError, BotResult},
    request::WebAppRequest,
    utils::MediaFormat,
};

const VIDEO_FORMAT: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best";
const AUDIO_FORMAT: &str = "bestaudio/best";

/// File produced by yt-dlp, after merging or audio extraction
#[derive(Debug, Clone)]
pub struct DownloadedFile {
    pub path: PathBuf,
}

/// `<dir>/%(title)s_<job_id>.%(ext)s`
pub fn output_template(download_dir: &Path, job_id: &str) -> String {
    download_dir
        .join(format!("%(title)s_{job_id}.%(ext)s"))
        .to_string_lossy()
        .into_owned()
}

/// Command line passed to yt-dlp for one request
pub fn download_args(request: &WebAppRequest, config: &Config, job_id: &str) -> Vec<String> {
    let mut args: Vec<String> = vec!["--no-playlist".into()];

    match request.format {
        MediaFormat::Video => {
            args.extend([
                "-f".into(),
                VIDEO_FORMAT.into(),
                "--merge-output-format".into(),
                MediaFormat::Video.extension().into(),
            ]);
        }
        MediaFormat::Audio => {
            args.extend([
                "-f".into(),
                AUDIO_FORMAT.into(),
                // FFmpeg post-processor turns the stream into mp3
                "-x".into(),
                "--audio-format".into(),
                MediaFormat::Audio.extension().into(),
                "--audio-quality".into(),
                format!("{}K", config.audio_quality_kbps),
            ]);
        }
    }

    args.extend([
        "-o".into(),
        output_template(&config.download_dir, job_id),
        // Report the final path, after post-processing renamed the file
        "--no-simulate".into(),
        "--print".into(),
        "after_move:filepath".into(),
        "--".into(),
        request.url.to_string(),
    ]);

    args
}

/// yt-dlp may print warnings before the path, so the last line wins
pub fn parse_printed_path(stdout: &str) -> Option<PathBuf> {
    stdout
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .map(PathBuf::from)
}

/// Remove `.part` and intermediate files left behind by a failed job
pub async fn remove_job_files(download_dir: &Path, job_id: &str) -> std::io::Result<usize> {
    let marker = format!("_{job_id}.");
    let mut entries = fs::read_dir(download_dir).await?;
    let mut removed = 0;

    while let Some(entry) = entries.next_entry().await? {
        if entry.file_name().to_string_lossy().contains(&marker) {
            fs::remove_file(entry.path()).await?;
            removed += 1;
        }
    }

    Ok(removed)
}

pub async fn download(
    request: &WebAppRequest,
    config: &Config,
    job_id: &str,
) -> BotResult<DownloadedFile> {
    fs::create_dir_all(&config.download_dir).await?;

    let args = download_args(request, config, job_id);

    log::info!(
        "Starting download: {} (format: {}, platform: {:?}, job: {})",
        request.url, request.format, request.platform, job_id
    );

    let output = process::Command::new(&config.ytdlp_path)
        .args(&args)
        .output()
        .await
        .map_err(|e| BotError::external_command_error(&config.ytdlp_path, e.to_string()))?;

    log::info!("yt-dlp exit code: {:?}", output.status.code());

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        log::error!("yt-dlp failed: {}", stderr);
        match remove_job_files(&config.download_dir, job_id).await {
            Ok(0) => {}
            Ok(n) => log::debug!("Removed {} partial files of job {}", n, job_id),
            Err(e) => log::warn!("Failed to clean up job {}: {}", job_id, e),
        }
        return Err(BotError::download_error(stderr));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let path = parse_printed_path(&stdout)
        .ok_or_else(|| BotError::download_error("yt-dlp did not report an output file"))?;

    if !fs::try_exists(&path).await? {
        return Err(BotError::file_not_found(path.to_string_lossy()));
    }

    log::info!("Download successful: {}", path.display());
    Ok(DownloadedFile { path })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config() -> Config {
        let vars: HashMap<&str, &str> = [
            ("WEB_APP_URL", "https://snap.example.app"),
            ("DOWNLOAD_DIR", "downloads"),
        ]
        .into_iter()
        .collect();
        Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap()
    }

    fn request(format: &str) -> WebAppRequest {
        WebAppRequest::parse(&format!(
            r#"{{"url":"https://www.youtube.com/watch?v=abc","format":"{}","title":"Clip"}}"#,
            format
        ))
        .unwrap()
    }

    #[test]
    fn video_args_select_mp4_streams() {
        let args = download_args(&request("mp4"), &config(), "job12345");

        assert_eq!(args[0], "--no-playlist");
        assert!(args.windows(2).any(|w| w[0] == "-f" && w[1] == VIDEO_FORMAT));
        assert!(args.windows(2).any(|w| w == ["--merge-output-format", "mp4"]));
        assert!(!args.contains(&"-x".to_string()));
    }

    #[test]
    fn audio_args_extract_mp3() {
        let args = download_args(&request("mp3"), &config(), "job12345");

        assert!(args.windows(2).any(|w| w[0] == "-f" && w[1] == AUDIO_FORMAT));
        assert!(args.contains(&"-x".to_string()));
        assert!(args.windows(2).any(|w| w == ["--audio-format", "mp3"]));
        assert!(args.windows(2).any(|w| w == ["--audio-quality", "192K"]));
    }

    #[test]
    fn url_comes_last_after_separator() {
        let args = download_args(&request("mp4"), &config(), "job12345");
        let n = args.len();

        assert_eq!(args[n - 2], "--");
        assert_eq!(args[n - 1], "https://www.youtube.com/watch?v=abc");
        assert!(args.windows(2).any(|w| w == ["--print", "after_move:filepath"]));
    }

    #[test]
    fn template_contains_title_and_job_id() {
        let template = output_template(Path::new("downloads"), "ab12cd34");
        assert_eq!(
            PathBuf::from(template),
            Path::new("downloads").join("%(title)s_ab12cd34.%(ext)s")
        );
    }

    #[test]
    fn printed_path_is_last_non_empty_line() {
        let stdout = "WARNING: something\n/tmp/downloads/Clip_ab12cd34.mp3\n\n";
        assert_eq!(
            parse_printed_path(stdout),
            Some(PathBuf::from("/tmp/downloads/Clip_ab12cd34.mp3"))
        );
        assert_eq!(parse_printed_path("  \n"), None);
    }

    #[tokio::test]
    async fn job_files_are_removed_by_marker() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Clip_ab12cd34.mp4.part"), b"x").unwrap();
        std::fs::write(dir.path().join("Clip_ab12cd34.f137.mp4"), b"x").unwrap();
        std::fs::write(dir.path().join("Other_ffff0000.mp4"), b"x").unwrap();

        let removed = remove_job_files(dir.path(), "ab12cd34").await.unwrap();

        assert_eq!(removed, 2);
        assert!(dir.path().join("Other_ffff0000.mp4").exists());
    }

    /// Stand-in for yt-dlp that ignores its arguments and runs `body`
    #[cfg(unix)]
    fn fake_ytdlp(dir: &Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-yt-dlp");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    fn config_with(dir: &Path, body: &str) -> Config {
        let mut config = config();
        config.download_dir = dir.join("downloads");
        config.ytdlp_path = fake_ytdlp(dir, body);
        config
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failed_run_reports_stderr_and_removes_partial_files() {
        let dir = tempfile::tempdir().unwrap();
        let downloads = dir.path().join("downloads");
        let body = format!(
            "touch '{}/Clip_job12345.mp4.part'\necho boom >&2\nexit 1",
            downloads.display()
        );
        let config = config_with(dir.path(), &body);

        let err = download(&request("mp4"), &config, "job12345").await.unwrap_err();

        assert!(matches!(err, BotError::DownloadError(ref msg) if msg == "boom"));
        assert!(!downloads.join("Clip_job12345.mp4.part").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn silent_run_is_a_download_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with(dir.path(), "exit 0");

        let err = download(&request("mp3"), &config, "job12345").await.unwrap_err();
        assert!(matches!(err, BotError::DownloadError(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn printed_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with(dir.path(), "echo /nope/x.mp3");

        let err = download(&request("mp3"), &config, "job12345").await.unwrap_err();
        assert!(matches!(err, BotError::FileNotFound(ref p) if p == "/nope/x.mp3"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn successful_run_returns_printed_path() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("downloads").join("Clip_job12345.mp3");
        let body = format!(
            "touch '{0}'\necho 'WARNING: slow'\necho '{0}'",
            target.display()
        );
        let config = config_with(dir.path(), &body);

        let file = download(&request("mp3"), &config, "job12345").await.unwrap();
        assert_eq!(file.path, target);
    }

    #[tokio::test]
    async fn missing_binary_is_an_external_command_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config();
        config.download_dir = dir.path().to_path_buf();
        config.ytdlp_path = "definitely-not-yt-dlp-binary".to_string();

        let err = download(&request("mp4"), &config, "job12345").await.unwrap_err();
        assert!(matches!(err, BotError::ExternalCommandError { .. }));
    }
}

use std::sync::Arc;

use teloxide::{
    ApiError, RequestError,
    prelude::*,
    types::{InputFile, MessageId, WebAppData},
};
use tokio::fs;

use crate::{
    config::Config,
    errors::{BotError, HandlerResult},
    media::{MediaInfo, download},
    request::{Platform, WebAppRequest},
    temp_file::TempFile,
    utils::{MediaFormat, build_caption, short_job_id, truncate_utf16},
};

/// Telegram allows 4096 UTF-16 units, stderr of yt-dlp can be much longer
const MAX_ERROR_LEN: usize = 3500;
const MAX_STATUS_TITLE_LEN: usize = 200;

pub async fn web_app_data_received(
    bot: Bot,
    msg: Message,
    data: WebAppData,
    config: Arc<Config>,
) -> HandlerResult {
    let request = match WebAppRequest::parse(&data.data) {
        Ok(request) => request,
        Err(e) => {
            log::warn!("Rejected mini-app payload from chat {}: {}", msg.chat.id, e);
            bot.send_message(msg.chat.id, format!("❌ {}", e)).await?;
            return Ok(());
        }
    };

    log::info!(
        "Chat {} requested {} as {}",
        msg.chat.id,
        request.url,
        request.format
    );

    let status_msg = bot
        .send_message(msg.chat.id, status_text(&request))
        .await?;

    match deliver(&bot, msg.chat.id, status_msg.id, &request, &config).await {
        Ok(()) => {
            if let Err(e) = bot.delete_message(msg.chat.id, status_msg.id).await {
                log::warn!("Failed to delete status message: {}", e);
            }
        }
        Err(e) => {
            log::error!("Request for {} failed: {}", request.url, e);
            bot.edit_message_text(msg.chat.id, status_msg.id, failure_text(&e))
                .await?;
        }
    }

    Ok(())
}

/// Download, upload and clean up. The file is removed when `file` drops,
/// whichever way this returns.
async fn deliver(
    bot: &Bot,
    chat_id: ChatId,
    status_id: MessageId,
    request: &WebAppRequest,
    config: &Config,
) -> HandlerResult {
    let job_id = short_job_id();
    let downloaded = download(request, config, &job_id).await?;
    let file = TempFile::new(downloaded.path);

    bot.edit_message_text(chat_id, status_id, "✅ Download complete. Sending file...")
        .await?;
    bot.send_chat_action(chat_id, request.format.chat_action())
        .await?;

    let size = fs::metadata(file.path()).await?.len();
    if size > config.max_upload_bytes {
        return Err(BotError::file_too_large(format!(
            "{} MB, the limit is {} MB",
            size / (1024 * 1024),
            config.max_upload_bytes / (1024 * 1024)
        )));
    }

    let info = match MediaInfo::from_file(&config.ffprobe_path, file.path()).await {
        Ok(info) => info,
        Err(e) => {
            log::warn!("Could not probe {}: {}", file.path().display(), e);
            MediaInfo::default()
        }
    };

    let caption = build_caption(request.format, &request.title, &config.caption_tag);
    let input = InputFile::file(file.path());

    let result = match request.format {
        MediaFormat::Video => {
            let mut send = bot
                .send_video(chat_id, input)
                .caption(caption)
                .supports_streaming(true);
            if let Some(width) = info.width {
                send = send.width(width);
            }
            if let Some(height) = info.height {
                send = send.height(height);
            }
            if let Some(duration) = info.duration_secs() {
                send = send.duration(duration);
            }
            send.await.map(|_| ())
        }
        MediaFormat::Audio => {
            let mut send = bot
                .send_audio(chat_id, input)
                .caption(caption)
                .title(request.title.clone());
            if let Some(duration) = info.duration_secs() {
                send = send.duration(duration);
            }
            send.await.map(|_| ())
        }
    };

    match result {
        Ok(()) => {
            log::info!("Sent {} to chat {}", file.path().display(), chat_id);
            Ok(())
        }
        Err(RequestError::Api(ApiError::RequestEntityTooLarge)) => Err(BotError::file_too_large(
            "Telegram rejected the upload",
        )),
        Err(e) => Err(e.into()),
    }
}

fn status_text(request: &WebAppRequest) -> String {
    let title = truncate_utf16(&request.title, MAX_STATUS_TITLE_LEN);
    match request.platform {
        Platform::Other => format!("⏳ Downloading: {}...", title),
        platform => format!("⏳ Downloading from {}: {}...", platform, title),
    }
}

fn failure_text(error: &BotError) -> String {
    format!(
        "❌ An error occurred: {}",
        truncate_utf16(&error.to_string(), MAX_ERROR_LEN)
    )
}

use std::path::Path;

use strum::{Display, EnumString};
use teloxide::types::ChatAction;
use tokio::{fs, io};

/// Telegram caps media captions at this many UTF-16 code units
pub const MAX_CAPTION_LEN: usize = 1024;

#[derive(Display, EnumString, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(ascii_case_insensitive)]
pub enum MediaFormat {
    #[strum(to_string = "mp4", serialize = "video")]
    Video,
    #[strum(to_string = "mp3", serialize = "audio")]
    Audio,
}

impl MediaFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            MediaFormat::Video => "mp4",
            MediaFormat::Audio => "mp3",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            MediaFormat::Video => "🎬",
            MediaFormat::Audio => "🎵",
        }
    }

    pub fn chat_action(&self) -> ChatAction {
        match self {
            MediaFormat::Video => ChatAction::UploadVideo,
            MediaFormat::Audio => ChatAction::UploadVoice,
        }
    }
}

/// Caption for the uploaded file. The title is shortened if the whole
/// caption would not fit into Telegram's limit.
pub fn build_caption(format: MediaFormat, title: &str, tag: &str) -> String {
    let prefix = format!("{} ", format.emoji());
    let suffix = format!("\n\n{}", tag);
    let caption = format!("{}{}{}", prefix, title, suffix);
    if utf16_len(&caption) <= MAX_CAPTION_LEN {
        return caption;
    }

    let overhead = utf16_len(&prefix) + utf16_len(&suffix);
    let room = MAX_CAPTION_LEN.saturating_sub(overhead);
    let caption = format!("{}{}{}", prefix, truncate_utf16(title, room), suffix);

    // A tag longer than the limit on its own
    truncate_utf16(&caption, MAX_CAPTION_LEN)
}

/// Length the way Telegram counts it
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Cut `text` to at most `max` UTF-16 code units, ending with an ellipsis
/// when cut. Never splits a char.
pub fn truncate_utf16(text: &str, max: usize) -> String {
    if utf16_len(text) <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }

    // '…' is a single code unit
    let budget = max - 1;
    let mut used = 0;
    let mut result = String::new();
    for c in text.chars() {
        if used + c.len_utf16() > budget {
            break;
        }
        used += c.len_utf16();
        result.push(c);
    }
    result.push('…');
    result
}

/// Short random id used to keep download filenames apart
pub fn short_job_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Remove every regular file inside `dir`. A missing dir is fine.
pub async fn clear_dir(dir: impl AsRef<Path>) -> io::Result<usize> {
    let dir = dir.as_ref();
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            fs::remove_file(entry.path()).await?;
            removed += 1;
        }
    }

    Ok(removed)
}

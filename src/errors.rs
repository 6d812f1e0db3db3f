use std::fmt;

/// Centralised error type for the bot
#[derive(Debug)]
pub enum BotError {
    /// yt-dlp failed to fetch the media
    DownloadError(String),
    /// Filesystem errors
    FileSystemError(std::io::Error),
    /// Telegram API errors
    TelegramError(teloxide::RequestError),
    /// Payload or tool output could not be parsed
    ParseError(String),
    /// File not found
    FileNotFound(String),
    /// Unsupported format
    UnsupportedFormat(String),
    /// File too large to upload
    FileTooLarge(String),
    /// Invalid parameters
    InvalidParameters(String),
    /// External command failed to run
    ExternalCommandError { command: String, stderr: String },
    /// Bad configuration
    Config(String),
}

impl fmt::Display for BotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotError::DownloadError(msg) => write!(f, "Download failed: {}", msg),
            BotError::FileSystemError(e) => write!(f, "Filesystem error: {}", e),
            BotError::TelegramError(e) => write!(f, "Telegram API error: {}", e),
            BotError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            BotError::FileNotFound(path) => write!(f, "File not found: {}", path),
            BotError::UnsupportedFormat(format) => write!(f, "Unsupported format: {}", format),
            BotError::FileTooLarge(msg) => write!(f, "File is too large: {}", msg),
            BotError::InvalidParameters(msg) => write!(f, "Invalid parameters: {}", msg),
            BotError::ExternalCommandError { command, stderr } => {
                write!(f, "Command {} failed: {}", command, stderr)
            }
            BotError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for BotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BotError::FileSystemError(e) => Some(e),
            BotError::TelegramError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BotError {
    fn from(err: std::io::Error) -> Self {
        BotError::FileSystemError(err)
    }
}

impl From<teloxide::RequestError> for BotError {
    fn from(err: teloxide::RequestError) -> Self {
        BotError::TelegramError(err)
    }
}

impl From<serde_json::Error> for BotError {
    fn from(err: serde_json::Error) -> Self {
        BotError::ParseError(format!("JSON parsing error: {}", err))
    }
}

impl From<std::string::FromUtf8Error> for BotError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        BotError::ParseError(format!("UTF-8 parsing error: {}", err))
    }
}

impl From<url::ParseError> for BotError {
    fn from(err: url::ParseError) -> Self {
        BotError::InvalidParameters(format!("bad URL: {}", err))
    }
}

// Shorthand constructors
impl BotError {
    pub fn download_error(msg: impl Into<String>) -> Self {
        Self::DownloadError(msg.into())
    }

    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound(path.into())
    }

    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat(format.into())
    }

    pub fn file_too_large(msg: impl Into<String>) -> Self {
        Self::FileTooLarge(msg.into())
    }

    pub fn invalid_parameters(msg: impl Into<String>) -> Self {
        Self::InvalidParameters(msg.into())
    }

    pub fn external_command_error(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::ExternalCommandError {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Result of bot operations
pub type BotResult<T> = Result<T, BotError>;

/// Result for handlers
pub type HandlerResult = BotResult<()>;

use std::{fmt, str::FromStr};

use serde::Deserialize;
use url::Url;

use crate::{
    errors::{BotError, BotResult},
    utils::MediaFormat,
};

const DEFAULT_TITLE: &str = "video";
const DOWNLOAD_ACTION: &str = "download";

/// Raw JSON sent by the mini-app through `Telegram.WebApp.sendData`
#[derive(Debug, Deserialize)]
struct RawRequest {
    action: Option<String>,
    url: Option<String>,
    format: Option<String>,
    title: Option<String>,
}

/// Validated download request
#[derive(Debug, Clone, PartialEq)]
pub struct WebAppRequest {
    pub url: Url,
    pub format: MediaFormat,
    pub title: String,
    pub platform: Platform,
}

impl WebAppRequest {
    pub fn parse(data: &str) -> BotResult<Self> {
        let raw: RawRequest = serde_json::from_str(data)?;

        if let Some(action) = raw.action.as_deref() {
            if action != DOWNLOAD_ACTION {
                return Err(BotError::invalid_parameters(format!(
                    "unknown action '{}'",
                    action
                )));
            }
        }

        let url = raw
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| BotError::invalid_parameters("link is missing"))?;
        let url = Url::parse(url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(BotError::invalid_parameters(format!(
                "only http(s) links are supported, got {}",
                url.scheme()
            )));
        }

        let format = raw
            .format
            .as_deref()
            .map(str::trim)
            .ok_or_else(|| BotError::invalid_parameters("format is missing"))?;
        let format =
            MediaFormat::from_str(format).map_err(|_| BotError::unsupported_format(format))?;

        let title = raw
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        let platform = Platform::detect(&url);

        Ok(Self {
            url,
            format,
            title,
            platform,
        })
    }
}

/// Where the link points to. Only used for status text and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    YouTube,
    Instagram,
    Other,
}

impl Platform {
    pub fn detect(url: &Url) -> Self {
        let Some(host) = url.host_str() else {
            return Platform::Other;
        };
        let host = host.to_lowercase();
        let host = host.strip_prefix("www.").unwrap_or(&host);

        let on_domain = |domain: &str| host == domain || host.ends_with(&format!(".{}", domain));

        if on_domain("youtube.com") || on_domain("youtu.be") {
            Platform::YouTube
        } else if on_domain("instagram.com") {
            Platform::Instagram
        } else {
            Platform::Other
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::YouTube => write!(f, "YouTube"),
            Platform::Instagram => write!(f, "Instagram"),
            Platform::Other => write!(f, "the web"),
        }
    }
}

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{ButtonRequest, KeyboardButton, KeyboardMarkup, WebAppInfo},
};
use url::Url;

use crate::{config::Config, errors::HandlerResult};

pub const WEB_APP_BUTTON_TEXT: &str = "📥 Download video";

/// Reply keyboard with a single button that opens the mini-app
pub fn web_app_keyboard(web_app_url: &Url) -> KeyboardMarkup {
    let button = KeyboardButton::new(WEB_APP_BUTTON_TEXT).request(ButtonRequest::WebApp(
        WebAppInfo {
            url: web_app_url.clone(),
        },
    ));

    KeyboardMarkup::new(vec![vec![button]]).resize_keyboard()
}

pub async fn start(bot: Bot, msg: Message, config: Arc<Config>) -> HandlerResult {
    bot.send_message(
        msg.chat.id,
        "Hi! Press the button below, paste a YouTube or Instagram link \
         and pick MP4 or MP3. I'll send the file right here.",
    )
    .reply_markup(web_app_keyboard(&config.web_app_url))
    .await?;
    Ok(())
}

use std::sync::Arc;

use teloxide::prelude::*;

use crate::{commands::web_app_keyboard, config::Config, errors::HandlerResult};

/// Links typed straight into the chat are not downloaded, point to the mini-app
pub async fn text_received(bot: Bot, msg: Message, config: Arc<Config>) -> HandlerResult {
    bot.send_message(
        msg.chat.id,
        "Please use the button below: paste your link in the mini-app and pick a format.",
    )
    .reply_markup(web_app_keyboard(&config.web_app_url))
    .await?;
    Ok(())
}

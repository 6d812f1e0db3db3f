use teloxide::{prelude::*, utils::command::BotCommands};

use crate::{errors::HandlerResult, schema::Command};

pub async fn help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(
        msg.chat.id,
        format!(
            "{}\n\nOpen the mini-app with the button from /start, paste a link \
             and choose MP4 for video or MP3 for audio.",
            Command::descriptions()
        ),
    )
    .await?;
    Ok(())
}

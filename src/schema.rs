use teloxide::{dispatching::UpdateHandler, prelude::*, utils::command::BotCommands};

use crate::{
    commands::*,
    errors::BotError,
    handlers::{text_received, web_app_data_received},
};

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    /// Show the download button
    Start,
    /// How to use the bot
    Help,
}

pub fn schema() -> UpdateHandler<BotError> {
    use dptree::case;

    Update::filter_message()
        .branch(
            // Filter for commands
            teloxide::filter_command::<Command, _>()
                .branch(case![Command::Start].endpoint(start))
                .branch(case![Command::Help].endpoint(help)),
        )
        // Data sent back by the mini-app
        .branch(Message::filter_web_app_data().endpoint(web_app_data_received))
        .branch(Message::filter_text().endpoint(text_received))
}

mod commands;
mod config;
mod errors;
mod handlers;
mod media;
mod request;
mod schema;
mod temp_file;
mod utils;

use std::{process::ExitCode, sync::Arc};

use teloxide::{prelude::*, utils::command::BotCommands};

use crate::{
    config::Config,
    schema::{Command, schema},
    utils::clear_dir,
};

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    pretty_env_logger::init();
    log::info!("Starting SnapMedia bot...");

    let config = match Config::from_env() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = tokio::fs::create_dir_all(&config.download_dir).await {
        log::error!(
            "Cannot create download dir {}: {}",
            config.download_dir.display(),
            e
        );
        return ExitCode::FAILURE;
    }

    let bot = Bot::from_env();

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        log::warn!("Failed to register bot commands: {}", e);
    }

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![config.clone()])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    match clear_dir(&config.download_dir).await {
        Ok(0) => {}
        Ok(n) => log::info!("Removed {} leftover files", n),
        Err(e) => log::warn!("Failed to clear {}: {}", config.download_dir.display(), e),
    }

    ExitCode::SUCCESS
}

use std::error::Error;
use std::future::Future;

use dotenvy::dotenv;
use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{error, info};

mod config;
mod db;
mod handlers;
mod llm;
mod state;
mod studio;
mod utils;

use config::CONFIG;
use db::Database;
use handlers::commands::HISTORY_CALLBACK_PREFIX;
use handlers::generate::DRAFT_CALLBACK_PREFIX;
use handlers::{commands, generate};
use state::AppState;
use utils::logging::init_logging;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
enum Command {
    Start,
    Help,
    Influencer(String),
    Website(String),
    History,
    Status,
}

type HandlerResult = Result<(), Box<dyn Error + Send + Sync>>;

#[tokio::main]
async fn main() -> HandlerResult {
    dotenv().ok();
    let _guards = init_logging();

    let bot = Bot::new(CONFIG.bot_token.clone());
    info!("Starting PromptStudioBot");

    let db = Database::init(&CONFIG.database_url, CONFIG.history_max_entries).await?;
    let state = AppState::new(db);

    handlers::access::load_whitelist();

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .branch(
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(handle_command),
                )
                .endpoint(ignore_message),
        )
        .branch(Update::filter_callback_query().endpoint(handle_callback_query));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

fn spawn_logged<F>(label: &'static str, task: F)
where
    F: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(err) = task.await {
            error!("{label} failed: {err:#}");
        }
    });
}

fn optional_arg(arg: String) -> Option<String> {
    (!arg.trim().is_empty()).then_some(arg)
}

async fn handle_command(
    bot: Bot,
    state: AppState,
    message: Message,
    command: Command,
) -> HandlerResult {
    match command {
        Command::Start => commands::start_handler(bot, message).await?,
        Command::Help => commands::help_handler(bot, message).await?,
        Command::Influencer(arg) => spawn_logged(
            "influencer handler",
            generate::influencer_handler(bot, state, message, optional_arg(arg)),
        ),
        Command::Website(arg) => spawn_logged(
            "website handler",
            generate::website_handler(bot, state, message, optional_arg(arg)),
        ),
        Command::History => spawn_logged(
            "history handler",
            commands::history_handler(bot, state, message),
        ),
        Command::Status => spawn_logged(
            "status handler",
            commands::status_handler(bot, state, message),
        ),
    }
    Ok(())
}

async fn handle_callback_query(bot: Bot, state: AppState, query: CallbackQuery) -> HandlerResult {
    let Some(data) = query.data.as_deref() else {
        return Ok(());
    };

    if data.starts_with(DRAFT_CALLBACK_PREFIX) {
        spawn_logged("draft callback", generate::draft_callback(bot, state, query));
    } else if data.starts_with(HISTORY_CALLBACK_PREFIX) {
        spawn_logged(
            "history callback",
            commands::history_callback(bot, state, query),
        );
    }

    Ok(())
}

async fn ignore_message(_message: Message) -> HandlerResult {
    Ok(())
}

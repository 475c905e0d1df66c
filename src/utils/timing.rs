use std::future::Future;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use teloxide::types::Message;
use tracing::info;

#[derive(Debug)]
pub struct CommandTimer {
    command: String,
    chat_id: i64,
    user_id: Option<i64>,
    message_id: i64,
    received_at: DateTime<Utc>,
    clock: Instant,
    logged: bool,
}

pub fn start_command_timer(command: &str, message: &Message) -> CommandTimer {
    let timer = CommandTimer {
        command: command.to_string(),
        chat_id: message.chat.id.0,
        user_id: message
            .from
            .as_ref()
            .and_then(|user| i64::try_from(user.id.0).ok()),
        message_id: i64::from(message.id.0),
        received_at: Utc::now(),
        clock: Instant::now(),
        logged: false,
    };
    info!(
        target: "bot.timing",
        command = %timer.command,
        chat_id = timer.chat_id,
        user_id = ?timer.user_id,
        message_id = timer.message_id,
        "command_received"
    );
    timer
}

pub fn complete_command_timer(timer: &mut CommandTimer, status: &str, detail: Option<String>) {
    if timer.logged {
        return;
    }
    timer.logged = true;
    info!(
        target: "bot.timing",
        command = %timer.command,
        chat_id = timer.chat_id,
        user_id = ?timer.user_id,
        message_id = timer.message_id,
        received_at = %timer.received_at.to_rfc3339(),
        duration_s = timer.clock.elapsed().as_secs_f64(),
        status,
        detail = detail.as_deref().unwrap_or(""),
        "command_completed"
    );
}

pub async fn log_llm_timing<T, F, Fut>(
    model: &str,
    operation: &str,
    metadata: Option<JsonValue>,
    call: F,
) -> anyhow::Result<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let metadata_text = metadata.map(|value| value.to_string());
    let metadata_text = metadata_text.as_deref().unwrap_or("{}");
    info!(
        target: "bot.timing",
        provider = "gemini",
        model,
        operation,
        metadata = metadata_text,
        "llm_request"
    );

    let clock = Instant::now();
    let response = call().await;

    info!(
        target: "bot.timing",
        provider = "gemini",
        model,
        operation,
        duration_s = clock.elapsed().as_secs_f64(),
        status = if response.is_ok() { "success" } else { "error" },
        metadata = metadata_text,
        "llm_response"
    );

    response
}

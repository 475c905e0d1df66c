use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use teloxide::prelude::*;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ParseMode, ReplyParameters,
};

use crate::config::CONFIG;
use crate::db::{Database, HistoryEntry};
use crate::handlers::access::{check_access_control, whitelist_active};
use crate::handlers::responses::{escape_html, send_result, truncate_chars};
use crate::state::AppState;

pub const HISTORY_CALLBACK_PREFIX: &str = "hist_";
pub const HISTORY_VIEW_CALLBACK_PREFIX: &str = "hist_view:";
pub const HISTORY_DELETE_CALLBACK_PREFIX: &str = "hist_del:";
pub const HISTORY_CLEAR_CALLBACK: &str = "hist_clear";
pub const HISTORY_CLEAR_CONFIRM_CALLBACK: &str = "hist_clear_yes";
pub const HISTORY_CANCEL_CALLBACK: &str = "hist_cancel";

const HISTORY_EMPTY_TEXT: &str =
    "No prompts saved in this chat yet. Use /influencer or /website to create one.";
const HISTORY_TITLE_PREVIEW: usize = 60;

fn bool_label(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn redact_sensitive_text(text: &str) -> String {
    let mut redacted = text.to_string();
    let secrets = [CONFIG.bot_token.as_str(), CONFIG.gemini_api_key.as_str()];

    for secret in secrets {
        let secret = secret.trim();
        if !secret.is_empty() {
            redacted = redacted.replace(secret, "[REDACTED]");
        }
    }

    redacted
}

fn history_entry_line(position: usize, entry: &HistoryEntry) -> String {
    let (preview, was_truncated) =
        truncate_chars(entry.result.title().trim(), HISTORY_TITLE_PREVIEW);
    let mut preview = escape_html(&preview);
    if was_truncated {
        preview.push_str("...");
    }
    if preview.is_empty() {
        preview.push_str("(untitled)");
    }
    format!(
        "{}. <b>{}</b> {}\n<i>{}</i>",
        position,
        escape_html(entry.result.mode().label()),
        entry.created_at.format("%Y-%m-%d %H:%M UTC"),
        preview
    )
}

fn history_keyboard(entries: &[HistoryEntry]) -> InlineKeyboardMarkup {
    let mut keyboard: Vec<Vec<InlineKeyboardButton>> = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        keyboard.push(vec![
            InlineKeyboardButton::callback(
                format!("View {}", index + 1),
                format!("{}{}", HISTORY_VIEW_CALLBACK_PREFIX, entry.entry_id),
            ),
            InlineKeyboardButton::callback(
                format!("Delete {}", index + 1),
                format!("{}{}", HISTORY_DELETE_CALLBACK_PREFIX, entry.entry_id),
            ),
        ]);
    }
    keyboard.push(vec![InlineKeyboardButton::callback(
        "Clear All",
        HISTORY_CLEAR_CALLBACK.to_string(),
    )]);
    InlineKeyboardMarkup::new(keyboard)
}

fn clear_confirm_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(
            "Yes, delete all",
            HISTORY_CLEAR_CONFIRM_CALLBACK.to_string(),
        ),
        InlineKeyboardButton::callback("Cancel", HISTORY_CANCEL_CALLBACK.to_string()),
    ]])
}

async fn render_history_panel(
    db: &Database,
    chat_id: i64,
) -> Result<(String, Option<InlineKeyboardMarkup>)> {
    let entries = db.list_entries(chat_id, CONFIG.history_page_size).await?;
    if entries.is_empty() {
        return Ok((HISTORY_EMPTY_TEXT.to_string(), None));
    }

    let total = db.count_entries(chat_id).await?;
    let mut text = String::from("<b>Prompt History</b>\n\n");
    for (index, entry) in entries.iter().enumerate() {
        text.push_str(&history_entry_line(index + 1, entry));
        text.push_str("\n\n");
    }
    if total > entries.len() as i64 {
        text.push_str(&format!(
            "Showing the {} most recent of {} saved prompts.",
            entries.len(),
            total
        ));
    }

    Ok((text, Some(history_keyboard(&entries))))
}

async fn refresh_history_panel(
    bot: &Bot,
    db: &Database,
    chat_id: ChatId,
    message_id: MessageId,
) -> Result<()> {
    let (text, keyboard) = render_history_panel(db, chat_id.0).await?;
    let mut request = bot
        .edit_message_text(chat_id, message_id, text)
        .parse_mode(ParseMode::Html);
    if let Some(keyboard) = keyboard {
        request = request.reply_markup(keyboard);
    }
    request.await?;
    Ok(())
}

pub async fn history_handler(bot: Bot, state: AppState, message: Message) -> Result<()> {
    if !check_access_control(&bot, &message).await {
        return Ok(());
    }

    let (text, keyboard) = render_history_panel(&state.db, message.chat.id.0).await?;
    let mut request = bot
        .send_message(message.chat.id, text)
        .reply_parameters(ReplyParameters::new(message.id))
        .parse_mode(ParseMode::Html);
    if let Some(keyboard) = keyboard {
        request = request.reply_markup(keyboard);
    }
    request.await?;
    Ok(())
}

pub async fn history_callback(bot: Bot, state: AppState, query: CallbackQuery) -> Result<()> {
    bot.answer_callback_query(query.id.clone()).await?;

    let Some(data) = query.data.clone() else {
        return Ok(());
    };
    let Some(message) = query.message.clone() else {
        return Ok(());
    };
    let chat_id = message.chat().id;
    let message_id = message.id();

    if let Some(entry_id) = data.strip_prefix(HISTORY_VIEW_CALLBACK_PREFIX) {
        match state.db.get_entry(chat_id.0, entry_id).await? {
            Some(entry) => send_result(&bot, chat_id, message_id, &entry.result).await?,
            None => refresh_history_panel(&bot, &state.db, chat_id, message_id).await?,
        }
        return Ok(());
    }

    if let Some(entry_id) = data.strip_prefix(HISTORY_DELETE_CALLBACK_PREFIX) {
        state.db.delete_entry(chat_id.0, entry_id).await?;
        refresh_history_panel(&bot, &state.db, chat_id, message_id).await?;
        return Ok(());
    }

    match data.as_str() {
        HISTORY_CLEAR_CALLBACK => {
            bot.edit_message_text(
                chat_id,
                message_id,
                "Delete all saved prompts in this chat?",
            )
            .reply_markup(clear_confirm_keyboard())
            .await?;
        }
        HISTORY_CLEAR_CONFIRM_CALLBACK => {
            let cleared = state.db.clear_entries(chat_id.0).await?;
            bot.edit_message_text(
                chat_id,
                message_id,
                format!("Cleared {cleared} saved prompt(s)."),
            )
            .await?;
        }
        HISTORY_CANCEL_CALLBACK => {
            refresh_history_panel(&bot, &state.db, chat_id, message_id).await?;
        }
        _ => {}
    }

    Ok(())
}

async fn build_status_report(state: &AppState, chat_id: i64) -> String {
    let db_result = state.db.health_check().await;
    let db_status = if db_result.is_ok() { "ok" } else { "error" };
    let db_detail = db_result.err().map(|err| err.to_string());
    let chat_entries = state.db.count_entries(chat_id).await.unwrap_or(0);
    let open_drafts = state.drafts.lock().len();

    let whitelist_path = Path::new(&CONFIG.whitelist_file_path);
    let logs_ready = Path::new("logs").exists();

    let mut report = String::new();
    report.push_str("Status snapshot\n");
    report.push_str(&format!("time_utc: {}\n", Utc::now().to_rfc3339()));
    report.push_str(&format!("db: {db_status}\n"));
    if let Some(detail) = db_detail {
        report.push_str(&format!("db_error: {}\n", detail));
    }
    report.push_str(&format!(
        "gemini_configured: {}\n",
        bool_label(!CONFIG.gemini_api_key.trim().is_empty())
    ));
    report.push_str(&format!("gemini_model: {}\n", CONFIG.gemini_model));
    report.push_str(&format!("history_cap: {}\n", CONFIG.history_max_entries));
    report.push_str(&format!("history_entries_this_chat: {}\n", chat_entries));
    report.push_str(&format!("open_drafts: {}\n", open_drafts));
    report.push_str(&format!(
        "whitelist_active: {}\n",
        bool_label(whitelist_active())
    ));
    report.push_str(&format!("whitelist_file: {}\n", CONFIG.whitelist_file_path));
    report.push_str(&format!(
        "whitelist_present: {}\n",
        bool_label(whitelist_path.exists())
    ));
    report.push_str(&format!("logs_dir_present: {}\n", bool_label(logs_ready)));
    redact_sensitive_text(&report)
}

pub async fn status_handler(bot: Bot, state: AppState, message: Message) -> Result<()> {
    if !check_access_control(&bot, &message).await {
        return Ok(());
    }

    let report = build_status_report(&state, message.chat.id.0).await;
    bot.send_message(message.chat.id, report)
        .reply_parameters(ReplyParameters::new(message.id))
        .await?;
    Ok(())
}

#[allow(deprecated)]
pub async fn help_handler(bot: Bot, message: Message) -> Result<()> {
    if !check_access_control(&bot, &message).await {
        return Ok(());
    }

    let help_text = "
*PromptStudioBot Commands*

/influencer - Draft a photorealistic influencer photo prompt
Usage: `/influencer [subject description]`, then pick detail, camera, and lighting

/website - Draft a website build prompt for AI coding agents (v0, Lovable, Bolt)
Usage: `/website [website description]`, then pick site type and design style

/history - Browse prompts generated in this chat, with view and delete buttons
Usage: `/history`

/status - Show bot health snapshot
Usage: `/status`

/help - Show this help message
";

    bot.send_message(message.chat.id, help_text)
        .reply_parameters(ReplyParameters::new(message.id))
        .parse_mode(ParseMode::Markdown)
        .await?;
    Ok(())
}

pub async fn start_handler(bot: Bot, message: Message) -> Result<()> {
    bot.send_message(
        message.chat.id,
        "Hello! I am PromptStudioBot. Use /help to see commands.",
    )
    .reply_parameters(ReplyParameters::new(message.id))
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use teloxide::types::InlineKeyboardButtonKind;
    use uuid::Uuid;

    use crate::studio::builder::GenerationRequest;
    use crate::studio::result::{GeneratedPrompt, WebsitePrompt};

    fn entry(entry_id: &str, project_name: &str) -> HistoryEntry {
        HistoryEntry {
            entry_id: entry_id.to_string(),
            chat_id: 1,
            created_at: DateTime::parse_from_rfc3339("2026-08-21T10:30:00Z")
                .unwrap()
                .with_timezone(&Utc),
            request: GenerationRequest::website("coffee shop"),
            result: GeneratedPrompt::Website(WebsitePrompt {
                project_name: project_name.to_string(),
                detailed_prompt: "Build it".to_string(),
                ui_style: "Minimal & Clean".to_string(),
                tech_stack: vec![],
                color_palette: vec![],
                sections: vec![],
                target_audience: "everyone".to_string(),
            }),
        }
    }

    #[test]
    fn entry_lines_escape_titles_and_show_position() {
        let line = history_entry_line(3, &entry("a", "<Brew & Co>"));
        assert!(line.starts_with("3. "));
        assert!(line.contains("Website Build"));
        assert!(line.contains("&lt;Brew &amp; Co&gt;"));
        assert!(!line.contains("<Brew"));
    }

    #[test]
    fn untitled_entries_get_a_placeholder() {
        let line = history_entry_line(1, &entry("a", "   "));
        assert!(line.contains("(untitled)"));
    }

    #[test]
    fn keyboard_pairs_view_and_delete_per_entry() {
        let entries = vec![entry("first", "One"), entry("second", "Two")];
        let markup = history_keyboard(&entries);

        assert_eq!(markup.inline_keyboard.len(), 3);
        assert_eq!(markup.inline_keyboard[0][0].text, "View 1");
        assert_eq!(markup.inline_keyboard[1][1].text, "Delete 2");
        match &markup.inline_keyboard[1][1].kind {
            InlineKeyboardButtonKind::CallbackData(data) => {
                assert_eq!(data, "hist_del:second");
            }
            other => panic!("unexpected button kind: {other:?}"),
        }
        assert_eq!(markup.inline_keyboard[2][0].text, "Clear All");
    }

    #[test]
    fn uuid_callback_data_fits_telegram_limit() {
        let id = Uuid::new_v4().to_string();
        let data = format!("{}{}", HISTORY_VIEW_CALLBACK_PREFIX, id);
        assert!(data.len() <= 64);
        let data = format!("{}{}", HISTORY_DELETE_CALLBACK_PREFIX, id);
        assert!(data.len() <= 64);
    }
}

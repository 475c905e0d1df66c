use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use chrono::Utc;
use teloxide::prelude::*;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ParseMode, ReplyParameters,
};
use tracing::{error, warn};
use uuid::Uuid;

use crate::config::CONFIG;
use crate::db::models::HistoryEntry;
use crate::handlers::access::{check_access_control, is_rate_limited};
use crate::handlers::responses::{
    edit_text_with_retry, escape_html, present_result, truncate_chars,
};
use crate::llm::gemini::{enhance_description, generate_structured};
use crate::state::{draft_key, AppState, PromptDraft};
use crate::studio::builder::{build_prompt_plan, GenerationRequest};
use crate::studio::options::{
    CameraStyle, DesignStyle, DetailLevel, LightingStyle, Mode, SiteType,
};
use crate::studio::result::normalize;
use crate::utils::timing::{complete_command_timer, start_command_timer, CommandTimer};

pub const DRAFT_CALLBACK_PREFIX: &str = "draft_";
pub const DETAIL_CALLBACK_PREFIX: &str = "draft_detail:";
pub const CAMERA_CALLBACK_PREFIX: &str = "draft_camera:";
pub const LIGHTING_CALLBACK_PREFIX: &str = "draft_lighting:";
pub const SITE_CALLBACK_PREFIX: &str = "draft_site:";
pub const STYLE_CALLBACK_PREFIX: &str = "draft_style:";
pub const GENERATE_CALLBACK: &str = "draft_generate";
pub const ENHANCE_CALLBACK: &str = "draft_enhance";

const DRAFT_EXPIRED_TEXT: &str = "This draft has expired. Send the command again to start over.";
const GENERATION_FAILED_TEXT: &str = "Something went wrong while generating. Please try again.";

fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

fn mark(label: &str, selected: bool) -> String {
    if selected {
        format!("• {label}")
    } else {
        label.to_string()
    }
}

fn panel_text(request: &GenerationRequest) -> String {
    let (preview, truncated) = truncate_chars(request.description.trim(), 600);
    let mut description = escape_html(&preview);
    if truncated {
        description.push_str("...");
    }

    match request.mode {
        Mode::Influencer => {
            let detail = request.detail.unwrap_or(DetailLevel::DEFAULT);
            let camera = request.camera.unwrap_or(CameraStyle::Auto);
            let lighting = request.lighting.unwrap_or(LightingStyle::Auto);
            format!(
                "<b>Influencer Photo Draft</b>\n\n<i>{}</i>\n\nDetail: {}\nCamera: {}\nLighting: {}\n\nPick options below, then press Generate.",
                description,
                escape_html(detail.label()),
                escape_html(camera.label()),
                escape_html(lighting.label())
            )
        }
        Mode::Website => {
            let site_type = request.site_type.unwrap_or(SiteType::Landing);
            let design_style = request.design_style.unwrap_or(DesignStyle::Minimal);
            format!(
                "<b>Website Build Draft</b>\n\n<i>{}</i>\n\nSite Type: {}\nDesign Style: {}\n\nPick options below, then press Generate.",
                description,
                escape_html(site_type.label()),
                escape_html(design_style.label())
            )
        }
    }
}

fn draft_keyboard(request: &GenerationRequest) -> InlineKeyboardMarkup {
    let mut keyboard: Vec<Vec<InlineKeyboardButton>> = Vec::new();

    match request.mode {
        Mode::Influencer => {
            let detail = request.detail.unwrap_or(DetailLevel::DEFAULT);
            let detail_buttons: Vec<_> = DetailLevel::ALL
                .into_iter()
                .map(|level| {
                    InlineKeyboardButton::callback(
                        mark(level.label(), level == detail),
                        format!("{}{}", DETAIL_CALLBACK_PREFIX, level.level()),
                    )
                })
                .collect();
            for chunk in detail_buttons.chunks(2) {
                keyboard.push(chunk.to_vec());
            }

            let camera = request.camera.unwrap_or(CameraStyle::Auto);
            let camera_buttons: Vec<_> = CameraStyle::ALL
                .into_iter()
                .map(|style| {
                    InlineKeyboardButton::callback(
                        mark(style.label(), style == camera),
                        format!("{}{}", CAMERA_CALLBACK_PREFIX, style.id()),
                    )
                })
                .collect();
            for chunk in camera_buttons.chunks(2) {
                keyboard.push(chunk.to_vec());
            }

            let lighting = request.lighting.unwrap_or(LightingStyle::Auto);
            let lighting_buttons: Vec<_> = LightingStyle::ALL
                .into_iter()
                .map(|style| {
                    InlineKeyboardButton::callback(
                        mark(style.label(), style == lighting),
                        format!("{}{}", LIGHTING_CALLBACK_PREFIX, style.id()),
                    )
                })
                .collect();
            for chunk in lighting_buttons.chunks(2) {
                keyboard.push(chunk.to_vec());
            }
        }
        Mode::Website => {
            let site_type = request.site_type.unwrap_or(SiteType::Landing);
            let site_buttons: Vec<_> = SiteType::ALL
                .into_iter()
                .map(|site| {
                    InlineKeyboardButton::callback(
                        mark(site.label(), site == site_type),
                        format!("{}{}", SITE_CALLBACK_PREFIX, site.id()),
                    )
                })
                .collect();
            for chunk in site_buttons.chunks(2) {
                keyboard.push(chunk.to_vec());
            }

            let design_style = request.design_style.unwrap_or(DesignStyle::Minimal);
            let style_buttons: Vec<_> = DesignStyle::ALL
                .into_iter()
                .map(|style| {
                    InlineKeyboardButton::callback(
                        mark(style.label(), style == design_style),
                        format!("{}{}", STYLE_CALLBACK_PREFIX, style.id()),
                    )
                })
                .collect();
            for chunk in style_buttons.chunks(2) {
                keyboard.push(chunk.to_vec());
            }
        }
    }

    keyboard.push(vec![
        InlineKeyboardButton::callback("Enhance Description", ENHANCE_CALLBACK.to_string()),
        InlineKeyboardButton::callback("Generate", GENERATE_CALLBACK.to_string()),
    ]);

    InlineKeyboardMarkup::new(keyboard)
}

fn apply_update(request: &mut GenerationRequest, data: &str) -> bool {
    if let Some(level) = data.strip_prefix(DETAIL_CALLBACK_PREFIX) {
        if let Some(level) = level.parse::<u8>().ok().and_then(DetailLevel::from_level) {
            request.detail = Some(level);
            return true;
        }
        return false;
    }
    if let Some(id) = data.strip_prefix(CAMERA_CALLBACK_PREFIX) {
        if let Some(style) = CameraStyle::from_id(id) {
            request.camera = Some(style);
            return true;
        }
        return false;
    }
    if let Some(id) = data.strip_prefix(LIGHTING_CALLBACK_PREFIX) {
        if let Some(style) = LightingStyle::from_id(id) {
            request.lighting = Some(style);
            return true;
        }
        return false;
    }
    if let Some(id) = data.strip_prefix(SITE_CALLBACK_PREFIX) {
        if let Some(site) = SiteType::from_id(id) {
            request.site_type = Some(site);
            return true;
        }
        return false;
    }
    if let Some(id) = data.strip_prefix(STYLE_CALLBACK_PREFIX) {
        if let Some(style) = DesignStyle::from_id(id) {
            request.design_style = Some(style);
            return true;
        }
        return false;
    }
    false
}

enum DraftGate<T> {
    Missing,
    Expired(Option<CommandTimer>),
    Ignored,
    Updated(T),
}

fn with_draft<T>(
    state: &AppState,
    key: &str,
    query_user_id: i64,
    apply: impl FnOnce(&mut PromptDraft) -> Option<T>,
) -> DraftGate<T> {
    let mut drafts = state.drafts.lock();

    let expired = match drafts.get_mut(key) {
        None => return DraftGate::Missing,
        Some(draft) => {
            if draft.user_id != query_user_id || draft.busy {
                return DraftGate::Ignored;
            }
            now_unix_seconds() - draft.timestamp > CONFIG.draft_timeout_seconds as i64
        }
    };

    if expired {
        let timer = drafts
            .remove(key)
            .and_then(|mut draft| draft.command_timer.take());
        return DraftGate::Expired(timer);
    }

    match drafts.get_mut(key) {
        Some(draft) => match apply(draft) {
            Some(value) => DraftGate::Updated(value),
            None => DraftGate::Ignored,
        },
        None => DraftGate::Missing,
    }
}

async fn refresh_panel(
    bot: &Bot,
    chat_id: ChatId,
    panel_id: MessageId,
    request: &GenerationRequest,
) -> Result<()> {
    bot.edit_message_text(chat_id, panel_id, panel_text(request))
        .parse_mode(ParseMode::Html)
        .reply_markup(draft_keyboard(request))
        .await?;
    Ok(())
}

pub async fn influencer_handler(
    bot: Bot,
    state: AppState,
    message: Message,
    description: Option<String>,
) -> Result<()> {
    start_draft(bot, state, message, description, Mode::Influencer, "influencer").await
}

pub async fn website_handler(
    bot: Bot,
    state: AppState,
    message: Message,
    description: Option<String>,
) -> Result<()> {
    start_draft(bot, state, message, description, Mode::Website, "website").await
}

async fn start_draft(
    bot: Bot,
    state: AppState,
    message: Message,
    description: Option<String>,
    mode: Mode,
    command_name: &str,
) -> Result<()> {
    if !check_access_control(&bot, &message).await {
        return Ok(());
    }

    let user_id = message
        .from
        .as_ref()
        .and_then(|user| i64::try_from(user.id.0).ok())
        .unwrap_or_default();
    if is_rate_limited(user_id) {
        bot.send_message(
            message.chat.id,
            "You're sending commands too quickly. Please wait a moment before trying again.",
        )
        .reply_parameters(ReplyParameters::new(message.id))
        .await?;
        return Ok(());
    }

    let description = description.unwrap_or_default().trim().to_string();
    if description.is_empty() {
        let usage = match mode {
            Mode::Influencer => {
                "Please describe the photo you want, e.g. /influencer a girl drinking coffee on a rooftop at sunset."
            }
            Mode::Website => {
                "Please describe the website you want, e.g. /website a landing page for a plant care app."
            }
        };
        bot.send_message(message.chat.id, usage)
            .reply_parameters(ReplyParameters::new(message.id))
            .await?;
        return Ok(());
    }

    let request = match mode {
        Mode::Influencer => GenerationRequest::influencer(description),
        Mode::Website => GenerationRequest::website(description),
    };

    let panel_message = bot
        .send_message(message.chat.id, panel_text(&request))
        .reply_parameters(ReplyParameters::new(message.id))
        .reply_markup(draft_keyboard(&request))
        .parse_mode(ParseMode::Html)
        .await?;

    let key = draft_key(message.chat.id.0, panel_message.id.0 as i64);
    let timer = start_command_timer(command_name, &message);

    let draft = PromptDraft {
        user_id,
        chat_id: message.chat.id.0,
        panel_message_id: panel_message.id.0 as i64,
        request,
        busy: false,
        timestamp: now_unix_seconds(),
        command_timer: Some(timer),
    };
    state.drafts.lock().insert(key.clone(), draft);

    let bot_clone = bot.clone();
    let state_clone = state.clone();
    tokio::spawn(async move {
        handle_draft_timeout(bot_clone, state_clone, key).await;
    });

    Ok(())
}

pub async fn handle_draft_timeout(bot: Bot, state: AppState, key: String) {
    loop {
        tokio::time::sleep(Duration::from_secs(CONFIG.draft_timeout_seconds)).await;

        let draft = {
            let mut drafts = state.drafts.lock();
            match drafts.get(&key) {
                None => return,
                Some(draft) if draft.busy => continue,
                Some(_) => drafts.remove(&key),
            }
        };
        let Some(mut draft) = draft else {
            return;
        };

        if let Some(mut timer) = draft.command_timer.take() {
            complete_command_timer(&mut timer, "expired", Some("draft_timeout".to_string()));
        }
        let _ = bot
            .edit_message_text(
                ChatId(draft.chat_id),
                MessageId(draft.panel_message_id as i32),
                DRAFT_EXPIRED_TEXT,
            )
            .await;
        return;
    }
}

pub async fn draft_callback(bot: Bot, state: AppState, query: CallbackQuery) -> Result<()> {
    bot.answer_callback_query(query.id.clone()).await?;

    let Some(data) = query.data.clone() else {
        return Ok(());
    };
    let Some(message) = query.message.clone() else {
        return Ok(());
    };

    let chat_id = message.chat().id;
    let panel_id = message.id();
    let key = draft_key(chat_id.0, panel_id.0 as i64);
    let query_user_id = i64::try_from(query.from.id.0).unwrap_or_default();

    match data.as_str() {
        GENERATE_CALLBACK => {
            handle_generate(&bot, &state, &key, chat_id, panel_id, query_user_id).await
        }
        ENHANCE_CALLBACK => {
            handle_enhance(&bot, &state, &key, chat_id, panel_id, query_user_id).await
        }
        _ => handle_option(&bot, &state, &key, chat_id, panel_id, query_user_id, &data).await,
    }
}

async fn handle_option(
    bot: &Bot,
    state: &AppState,
    key: &str,
    chat_id: ChatId,
    panel_id: MessageId,
    query_user_id: i64,
    data: &str,
) -> Result<()> {
    let gate = with_draft(state, key, query_user_id, |draft| {
        apply_update(&mut draft.request, data).then(|| draft.request.clone())
    });

    match gate {
        DraftGate::Updated(request) => refresh_panel(bot, chat_id, panel_id, &request).await,
        DraftGate::Missing => expire_panel(bot, chat_id, panel_id, None).await,
        DraftGate::Expired(timer) => expire_panel(bot, chat_id, panel_id, timer).await,
        DraftGate::Ignored => Ok(()),
    }
}

async fn handle_generate(
    bot: &Bot,
    state: &AppState,
    key: &str,
    chat_id: ChatId,
    panel_id: MessageId,
    query_user_id: i64,
) -> Result<()> {
    let gate = with_draft(state, key, query_user_id, |draft| {
        draft.busy = true;
        Some((draft.request.clone(), draft.command_timer.take()))
    });

    let (request, mut timer) = match gate {
        DraftGate::Updated(ready) => ready,
        DraftGate::Missing => return expire_panel(bot, chat_id, panel_id, None).await,
        DraftGate::Expired(timer) => return expire_panel(bot, chat_id, panel_id, timer).await,
        DraftGate::Ignored => return Ok(()),
    };

    let progress = match request.mode {
        Mode::Influencer => "Generating your influencer photo prompt...",
        Mode::Website => "Generating your website build prompt...",
    };
    if let Err(err) = bot.edit_message_text(chat_id, panel_id, progress).await {
        clear_busy(state, key);
        if let Some(mut timer) = timer.take() {
            complete_command_timer(&mut timer, "error", Some("panel_edit_failed".to_string()));
        }
        return Err(err.into());
    }

    match generate_and_store(state, &request, chat_id.0).await {
        Ok(entry) => {
            state.drafts.lock().remove(key);
            present_result(bot, chat_id, panel_id, &entry.result).await?;
            if let Some(mut timer) = timer.take() {
                complete_command_timer(&mut timer, "success", None);
            }
        }
        Err(err) => {
            error!("Prompt generation failed: {err:#}");
            if let Some(mut timer) = timer.take() {
                complete_command_timer(&mut timer, "error", None);
            }

            let request_after = {
                let mut drafts = state.drafts.lock();
                drafts.get_mut(key).map(|draft| {
                    draft.busy = false;
                    draft.request.clone()
                })
            };
            match request_after {
                Some(request) => {
                    let text = format!("{}\n\n{}", panel_text(&request), GENERATION_FAILED_TEXT);
                    let edit = bot
                        .edit_message_text(chat_id, panel_id, text)
                        .parse_mode(ParseMode::Html)
                        .reply_markup(draft_keyboard(&request))
                        .await;
                    if let Err(edit_err) = edit {
                        warn!("Failed to restore draft panel: {edit_err}");
                    }
                }
                None => {
                    edit_text_with_retry(bot, chat_id, panel_id, GENERATION_FAILED_TEXT, None)
                        .await?;
                }
            }
        }
    }

    Ok(())
}

async fn handle_enhance(
    bot: &Bot,
    state: &AppState,
    key: &str,
    chat_id: ChatId,
    panel_id: MessageId,
    query_user_id: i64,
) -> Result<()> {
    let gate = with_draft(state, key, query_user_id, |draft| {
        draft.busy = true;
        Some(draft.request.clone())
    });

    let request = match gate {
        DraftGate::Updated(request) => request,
        DraftGate::Missing => return expire_panel(bot, chat_id, panel_id, None).await,
        DraftGate::Expired(timer) => return expire_panel(bot, chat_id, panel_id, timer).await,
        DraftGate::Ignored => return Ok(()),
    };

    if let Err(err) = bot
        .edit_message_text(chat_id, panel_id, "Polishing your description...")
        .await
    {
        clear_busy(state, key);
        return Err(err.into());
    }

    let enhanced = enhance_description(&request.description, request.mode).await;

    let updated = {
        let mut drafts = state.drafts.lock();
        drafts.get_mut(key).map(|draft| {
            draft.busy = false;
            draft.request.description = enhanced;
            draft.request.clone()
        })
    };

    match updated {
        Some(request) => refresh_panel(bot, chat_id, panel_id, &request).await,
        None => expire_panel(bot, chat_id, panel_id, None).await,
    }
}

async fn generate_and_store(
    state: &AppState,
    request: &GenerationRequest,
    chat_id: i64,
) -> Result<HistoryEntry> {
    let plan = build_prompt_plan(request);
    let raw = generate_structured(&plan).await?;
    let result = normalize(&raw, request.mode)?;

    let entry = HistoryEntry {
        entry_id: Uuid::new_v4().to_string(),
        chat_id,
        created_at: Utc::now(),
        request: request.clone(),
        result,
    };
    state.db.insert_entry(&entry).await?;
    Ok(entry)
}

fn clear_busy(state: &AppState, key: &str) {
    let mut drafts = state.drafts.lock();
    if let Some(draft) = drafts.get_mut(key) {
        draft.busy = false;
    }
}

async fn expire_panel(
    bot: &Bot,
    chat_id: ChatId,
    panel_id: MessageId,
    timer: Option<CommandTimer>,
) -> Result<()> {
    if let Some(mut timer) = timer {
        complete_command_timer(&mut timer, "expired", Some("draft_timeout".to_string()));
    }
    bot.edit_message_text(chat_id, panel_id, DRAFT_EXPIRED_TEXT)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::InlineKeyboardButtonKind;

    fn influencer_request() -> GenerationRequest {
        GenerationRequest::influencer("a girl drinking coffee on a rooftop")
    }

    #[test]
    fn callback_data_updates_each_dimension() {
        let mut request = influencer_request();
        assert!(apply_update(&mut request, "draft_detail:4"));
        assert_eq!(request.detail, Some(DetailLevel::HyperReal));
        assert!(apply_update(&mut request, "draft_camera:ultra_wide"));
        assert_eq!(request.camera, Some(CameraStyle::UltraWide));
        assert!(apply_update(&mut request, "draft_lighting:golden_hour"));
        assert_eq!(request.lighting, Some(LightingStyle::GoldenHour));

        let mut request = GenerationRequest::website("plant shop");
        assert!(apply_update(&mut request, "draft_site:saas"));
        assert_eq!(request.site_type, Some(SiteType::Saas));
        assert!(apply_update(&mut request, "draft_style:bento"));
        assert_eq!(request.design_style, Some(DesignStyle::Bento));
    }

    #[test]
    fn unknown_callback_data_changes_nothing() {
        let mut request = influencer_request();
        let before = request.clone();
        assert!(!apply_update(&mut request, "draft_camera:hologram"));
        assert!(!apply_update(&mut request, "draft_detail:9"));
        assert!(!apply_update(&mut request, "unrelated"));
        assert_eq!(request, before);
    }

    #[test]
    fn panel_shows_effective_defaults() {
        let text = panel_text(&influencer_request());
        assert!(text.contains("Detail: High Fidelity"));
        assert!(text.contains("Camera: Auto (Let AI Decide)"));

        let text = panel_text(&GenerationRequest::website("plant shop"));
        assert!(text.contains("Site Type: Landing Page"));
        assert!(text.contains("Design Style: Minimal &amp; Clean"));
    }

    #[test]
    fn keyboard_marks_current_selection_and_ends_with_actions() {
        let mut request = influencer_request();
        request.camera = Some(CameraStyle::UltraWide);
        let markup = draft_keyboard(&request);

        let buttons: Vec<&InlineKeyboardButton> =
            markup.inline_keyboard.iter().flatten().collect();
        let ultra_wide = buttons
            .iter()
            .find(|button| {
                matches!(
                    &button.kind,
                    InlineKeyboardButtonKind::CallbackData(data) if data == "draft_camera:ultra_wide"
                )
            })
            .unwrap();
        assert!(ultra_wide.text.starts_with("• "));

        let last_row = markup.inline_keyboard.last().unwrap();
        assert_eq!(last_row.len(), 2);
        assert_eq!(last_row[1].text, "Generate");
    }

    #[test]
    fn website_keyboard_offers_no_camera_options() {
        let markup = draft_keyboard(&GenerationRequest::website("plant shop"));
        for button in markup.inline_keyboard.iter().flatten() {
            if let InlineKeyboardButtonKind::CallbackData(data) = &button.kind {
                assert!(!data.starts_with(CAMERA_CALLBACK_PREFIX));
                assert!(!data.starts_with(LIGHTING_CALLBACK_PREFIX));
                assert!(!data.starts_with(DETAIL_CALLBACK_PREFIX));
            }
        }
    }
}

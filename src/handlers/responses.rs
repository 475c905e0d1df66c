use std::time::Duration;

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{InputFile, MessageId, ParseMode, ReplyParameters};
use tracing::warn;

use crate::config::CONFIG;
use crate::studio::result::{GeneratedPrompt, InfluencerPrompt, WebsitePrompt};

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

pub fn truncate_chars(text: &str, max_chars: usize) -> (String, bool) {
    let mut iter = text.chars();
    let truncated: String = iter.by_ref().take(max_chars).collect();
    let was_truncated = iter.next().is_some();
    (truncated, was_truncated)
}

fn block_section(label: &str, value: &str) -> String {
    format!("<b>{}</b>\n<pre>{}</pre>\n", label, escape_html(value))
}

fn inline_field(label: &str, value: &str) -> String {
    format!("<b>{}:</b> {}\n", label, escape_html(value))
}

pub fn render_result(result: &GeneratedPrompt) -> String {
    match result {
        GeneratedPrompt::Influencer(prompt) => render_influencer(prompt),
        GeneratedPrompt::Website(prompt) => render_website(prompt),
    }
}

pub fn render_influencer(prompt: &InfluencerPrompt) -> String {
    let mut text = String::from("<b>Influencer Photo Prompt</b>\n\n");
    text.push_str(&block_section("Detailed Prompt", &prompt.detailed_prompt));
    text.push_str(&block_section("Negative Prompt", &prompt.negative_prompt));
    text.push_str(&inline_field("Subject", &prompt.subject));
    text.push_str(&inline_field("Art Style", &prompt.art_style));
    text.push_str(&inline_field("Lighting", &prompt.lighting));
    text.push_str(&inline_field("Camera", &prompt.camera_settings));
    text.push_str(&inline_field("Mood", &prompt.mood));
    text.push_str(&inline_field("Palette", &prompt.color_palette.join(", ")));
    text.push_str(&inline_field("Composition", &prompt.composition));
    text
}

pub fn render_website(prompt: &WebsitePrompt) -> String {
    let mut text = String::from("<b>Website Build Prompt</b>\n\n");
    text.push_str(&block_section("v0 / Lovable Prompt", &prompt.detailed_prompt));
    text.push_str(&inline_field("Project Name", &prompt.project_name));
    text.push_str(&inline_field("Target Audience", &prompt.target_audience));
    text.push_str(&inline_field("Tech Stack", &prompt.tech_stack.join(", ")));
    text.push_str(&inline_field("Palette", &prompt.color_palette.join(", ")));
    text.push_str(&inline_field("Sections", &prompt.sections.join(", ")));
    text.push_str(&inline_field("UI Style", &prompt.ui_style));
    text
}

fn result_export_json(result: &GeneratedPrompt) -> Result<Vec<u8>> {
    let bytes = match result {
        GeneratedPrompt::Influencer(prompt) => serde_json::to_vec_pretty(prompt)?,
        GeneratedPrompt::Website(prompt) => serde_json::to_vec_pretty(prompt)?,
    };
    Ok(bytes)
}

const EDIT_RETRY_ATTEMPTS: u32 = 3;

pub async fn edit_text_with_retry(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    text: &str,
    parse_mode: Option<ParseMode>,
) -> Result<()> {
    for attempt in 1..=EDIT_RETRY_ATTEMPTS {
        let mut request = bot.edit_message_text(chat_id, message_id, text.to_string());
        if let Some(mode) = parse_mode {
            request = request.parse_mode(mode);
        }

        match request.await {
            Ok(_) => return Ok(()),
            Err(err) if attempt == EDIT_RETRY_ATTEMPTS => return Err(err.into()),
            Err(err) => {
                warn!("edit_message_text failed (attempt {attempt}): {err}");
                let backoff = Duration::from_millis(1500 * 2u64.pow(attempt - 1));
                tokio::time::sleep(backoff).await;
            }
        }
    }

    Ok(())
}

pub async fn present_result(
    bot: &Bot,
    chat_id: ChatId,
    panel_message_id: MessageId,
    result: &GeneratedPrompt,
) -> Result<()> {
    let rendered = render_result(result);

    if rendered.chars().count() > CONFIG.telegram_max_length {
        let export = result_export_json(result)?;
        bot.send_document(
            chat_id,
            InputFile::memory(export).file_name("prompt.json"),
        )
        .caption(result.title().to_string())
        .await?;
        edit_text_with_retry(
            bot,
            chat_id,
            panel_message_id,
            "The generated prompt was too long for a message, so it was sent as a JSON file instead.",
            None,
        )
        .await?;
        return Ok(());
    }

    if let Err(err) = edit_text_with_retry(
        bot,
        chat_id,
        panel_message_id,
        &rendered,
        Some(ParseMode::Html),
    )
    .await
    {
        warn!("Failed to send formatted prompt: {err}");
        edit_text_with_retry(bot, chat_id, panel_message_id, &rendered, None).await?;
    }

    Ok(())
}

pub async fn send_result(
    bot: &Bot,
    chat_id: ChatId,
    reply_to: MessageId,
    result: &GeneratedPrompt,
) -> Result<()> {
    let rendered = render_result(result);

    if rendered.chars().count() > CONFIG.telegram_max_length {
        let export = result_export_json(result)?;
        bot.send_document(
            chat_id,
            InputFile::memory(export).file_name("prompt.json"),
        )
        .caption(result.title().to_string())
        .reply_parameters(ReplyParameters::new(reply_to))
        .await?;
        return Ok(());
    }

    let sent = bot
        .send_message(chat_id, rendered.clone())
        .reply_parameters(ReplyParameters::new(reply_to))
        .parse_mode(ParseMode::Html)
        .await;
    if let Err(err) = sent {
        warn!("Failed to send formatted prompt: {err}");
        bot.send_message(chat_id, rendered)
            .reply_parameters(ReplyParameters::new(reply_to))
            .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_escaping_covers_markup_characters() {
        assert_eq!(
            escape_html(r#"<b val="x"> & 'y'"#),
            "&lt;b val=&quot;x&quot;&gt; &amp; &#39;y&#39;"
        );
    }

    #[test]
    fn truncation_reports_whether_it_cut() {
        assert_eq!(truncate_chars("hello", 10), ("hello".to_string(), false));
        assert_eq!(truncate_chars("hello", 3), ("hel".to_string(), true));
    }

    #[test]
    fn influencer_rendering_escapes_model_output() {
        let prompt = InfluencerPrompt {
            subject: "<script>".to_string(),
            detailed_prompt: "raw photo".to_string(),
            negative_prompt: "cgi".to_string(),
            art_style: "photorealism".to_string(),
            lighting: "window light".to_string(),
            camera_settings: "35mm".to_string(),
            color_palette: vec!["#fff".to_string(), "#000".to_string()],
            composition: "centered".to_string(),
            mood: "calm".to_string(),
        };
        let rendered = render_influencer(&prompt);
        assert!(rendered.contains("&lt;script&gt;"));
        assert!(!rendered.contains("<script>"));
        assert!(rendered.contains("<pre>raw photo</pre>"));
        assert!(rendered.contains("<b>Palette:</b> #fff, #000"));
    }

    #[test]
    fn website_rendering_lists_sections_in_order() {
        let prompt = WebsitePrompt {
            project_name: "Brewbox".to_string(),
            detailed_prompt: "Build a landing page".to_string(),
            ui_style: "Minimal & Clean".to_string(),
            tech_stack: vec!["Next.js".to_string()],
            color_palette: vec!["#78350f".to_string()],
            sections: vec!["Hero".to_string(), "Pricing".to_string()],
            target_audience: "remote workers".to_string(),
        };
        let rendered = render_website(&prompt);
        let prompt_pos = rendered.find("v0 / Lovable Prompt").unwrap();
        let name_pos = rendered.find("Project Name").unwrap();
        assert!(prompt_pos < name_pos);
        assert!(rendered.contains("<b>Sections:</b> Hero, Pricing"));
        assert!(rendered.contains("Minimal &amp; Clean"));
    }
}

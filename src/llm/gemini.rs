use std::time::Duration;

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::config::CONFIG;
use crate::studio::builder::{enhance_instruction, enhance_user_content, PromptPlan};
use crate::studio::options::Mode;
use crate::utils::timing::log_llm_timing;

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .expect("Failed to build HTTP client")
});

const GEMINI_RETRY_BASE_DELAY_MS: u64 = 900;
const GEMINI_REQUEST_TIMEOUT_SECS: u64 = 90;

const HARM_CATEGORIES: [&str; 5] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
    "HARM_CATEGORY_CIVIC_INTEGRITY",
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    parts: Option<Vec<GeminiPart>>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

fn redact_api_key(text: &str) -> String {
    let key = CONFIG.gemini_api_key.trim();
    if key.is_empty() {
        return text.to_string();
    }
    text.replace(key, "[redacted]")
}

fn is_transient_transport_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}

fn retry_backoff(attempt: usize) -> Duration {
    Duration::from_millis(GEMINI_RETRY_BASE_DELAY_MS.saturating_mul(attempt.max(1) as u64))
}

fn build_safety_settings() -> Vec<Value> {
    let threshold = match CONFIG.gemini_safety_settings.as_str() {
        "standard" => "BLOCK_MEDIUM_AND_ABOVE",
        "permissive" => "OFF",
        other => {
            warn!(
                "Unknown GEMINI_SAFETY_SETTINGS value '{}', using permissive defaults.",
                other
            );
            "OFF"
        }
    };
    HARM_CATEGORIES
        .iter()
        .map(|category| json!({ "category": category, "threshold": threshold }))
        .collect()
}

fn truncate_for_log(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        return value.to_string();
    }
    let truncated: String = value.chars().take(limit).collect();
    format!("{truncated}... (truncated)")
}

fn summarize_payload(payload: &Value, system_prompt_label: Option<&str>) -> Value {
    let mut summary = Map::new();

    if payload.get("systemInstruction").is_some() {
        let label = system_prompt_label.unwrap_or("inline_system_prompt");
        summary.insert("systemInstruction".to_string(), json!(label));
    }

    if let Some(text) = payload
        .pointer("/contents/0/parts/0/text")
        .and_then(Value::as_str)
    {
        summary.insert("userText".to_string(), json!(truncate_for_log(text, 200)));
    }

    if let Some(config) = payload.get("generationConfig").and_then(Value::as_object) {
        let mut masked = config.clone();
        if masked.contains_key("responseSchema") {
            masked.insert("responseSchema".to_string(), json!("structured"));
        }
        summary.insert("generationConfig".to_string(), Value::Object(masked));
    }

    if let Some(safety) = payload.get("safetySettings").and_then(Value::as_array) {
        summary.insert("safetySettingsCount".to_string(), json!(safety.len()));
    }

    Value::Object(summary)
}

fn summarize_response(response: &GeminiResponse) -> Value {
    let candidates = response.candidates.as_deref().unwrap_or(&[]);
    let texts: Vec<&String> = candidates
        .iter()
        .filter_map(|candidate| candidate.content.as_ref())
        .filter_map(|content| content.parts.as_ref())
        .flatten()
        .filter_map(|part| part.text.as_ref())
        .collect();

    json!({
        "candidates": candidates.len(),
        "textParts": texts.len(),
        "textPreview": texts
            .iter()
            .find(|text| !text.trim().is_empty())
            .map(|text| truncate_for_log(text, 200)),
        "blockReason": response
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.clone()),
    })
}

fn summarize_error_body(body: &str) -> (Option<String>, String) {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return (None, "empty response body".to_string());
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => {
            let message = ["/error/message", "/message"]
                .iter()
                .find_map(|path| value.pointer(path))
                .and_then(Value::as_str)
                .map(str::to_string);
            (message, truncate_for_log(&value.to_string(), 2000))
        }
        Err(_) => (None, truncate_for_log(trimmed, 2000)),
    }
}

fn extract_text_from_response(response: GeminiResponse) -> Result<String> {
    let block_reason = response
        .prompt_feedback
        .as_ref()
        .and_then(|feedback| feedback.block_reason.clone());

    let text_parts: Vec<String> = response
        .candidates
        .unwrap_or_default()
        .into_iter()
        .filter_map(|candidate| candidate.content)
        .filter_map(|content| content.parts)
        .flatten()
        .filter_map(|part| part.text)
        .filter(|text| !text.trim().is_empty())
        .collect();

    if text_parts.is_empty() {
        return match block_reason {
            Some(reason) => Err(anyhow!("Gemini blocked the request: {}", reason)),
            None => Ok(String::new()),
        };
    }

    Ok(text_parts.join("\n"))
}

async fn call_gemini_api(
    model: &str,
    payload: Value,
    system_prompt_label: Option<&str>,
) -> Result<GeminiResponse> {
    let url = format!(
        "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
        model, CONFIG.gemini_api_key
    );

    if tracing::enabled!(tracing::Level::DEBUG) {
        debug!(
            target: "llm.gemini",
            model,
            payload = %summarize_payload(&payload, system_prompt_label)
        );
    }

    let max_attempts = CONFIG.gemini_max_retry_attempts;
    for attempt in 1..=max_attempts {
        let more_attempts = attempt < max_attempts;
        let response = match HTTP_CLIENT
            .post(&url)
            .timeout(Duration::from_secs(GEMINI_REQUEST_TIMEOUT_SECS))
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                let err_text = redact_api_key(&err.to_string());
                let retrying = more_attempts && is_transient_transport_error(&err);
                warn!(
                    "Gemini request failed to send: {} (timeout={}, connect={}, status={:?}, retrying={})",
                    err_text,
                    err.is_timeout(),
                    err.is_connect(),
                    err.status(),
                    retrying
                );
                if !retrying {
                    return Err(anyhow!("Gemini request failed: {}", err_text));
                }
                tokio::time::sleep(retry_backoff(attempt)).await;
                continue;
            }
        };

        let status = response.status();
        if status.is_success() {
            let parsed = response.json::<GeminiResponse>().await?;
            if tracing::enabled!(tracing::Level::DEBUG) {
                debug!(target: "llm.gemini", model, response = %summarize_response(&parsed));
            }
            return Ok(parsed);
        }

        let body = response.text().await.unwrap_or_default();
        let (message, body_summary) = summarize_error_body(&body);
        let retrying = more_attempts && is_retryable_status(status);
        warn!(
            "Gemini API error: status={}, body={}, retrying={}",
            status, body_summary, retrying
        );
        if tracing::enabled!(tracing::Level::DEBUG) {
            debug!(
                target: "llm.gemini",
                status = %status,
                body = %truncate_for_log(&body, 4000)
            );
        }
        if !retrying {
            return Err(anyhow!(
                "Gemini request failed with status {}: {}",
                status,
                message.unwrap_or(body_summary)
            ));
        }
        tokio::time::sleep(retry_backoff(attempt)).await;
    }

    Err(anyhow!("Gemini retry attempts exhausted"))
}

pub async fn generate_structured(plan: &PromptPlan) -> Result<String> {
    let payload = json!({
        "systemInstruction": { "parts": [{ "text": &plan.system_instruction }] },
        "contents": [{ "role": "user", "parts": [{ "text": &plan.user_content }] }],
        "generationConfig": {
            "temperature": plan.temperature,
            "maxOutputTokens": CONFIG.gemini_max_output_tokens,
            "responseMimeType": "application/json",
            "responseSchema": plan.response_schema.clone(),
        },
        "safetySettings": build_safety_settings(),
    });

    let (operation, label) = match plan.mode {
        Mode::Influencer => ("generate_influencer", "influencer_system_prompt"),
        Mode::Website => ("generate_website", "website_system_prompt"),
    };
    let model = &CONFIG.gemini_model;

    log_llm_timing(
        model,
        operation,
        Some(json!({ "mode": plan.mode.id() })),
        || async {
            let response = call_gemini_api(model, payload, Some(label)).await?;
            extract_text_from_response(response)
        },
    )
    .await
}

pub async fn enhance_description(description: &str, mode: Mode) -> String {
    let payload = json!({
        "systemInstruction": { "parts": [{ "text": enhance_instruction(mode) }] },
        "contents": [{ "role": "user", "parts": [{ "text": enhance_user_content(description) }] }],
        "safetySettings": build_safety_settings(),
    });

    let model = &CONFIG.gemini_model;
    let outcome = log_llm_timing(
        model,
        "enhance_description",
        Some(json!({ "mode": mode.id() })),
        || async {
            let response = call_gemini_api(model, payload, Some("enhance_system_prompt")).await?;
            extract_text_from_response(response)
        },
    )
    .await;

    enhanced_or_original(description, outcome)
}

fn enhanced_or_original(original: &str, outcome: Result<String>) -> String {
    match outcome {
        Ok(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                original.to_string()
            } else {
                trimmed.to_string()
            }
        }
        Err(err) => {
            warn!("Enhance request failed, keeping original input: {err:#}");
            original.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enhance_failure_keeps_original_input() {
        let outcome: Result<String> = Err(anyhow!("network down"));
        assert_eq!(
            enhanced_or_original("girl with red hair", outcome),
            "girl with red hair"
        );
    }

    #[test]
    fn enhance_blank_response_keeps_original_input() {
        assert_eq!(
            enhanced_or_original("girl with red hair", Ok("  \n ".to_string())),
            "girl with red hair"
        );
    }

    #[test]
    fn enhance_success_returns_trimmed_text() {
        assert_eq!(
            enhanced_or_original("short", Ok("  a longer rewrite  ".to_string())),
            "a longer rewrite"
        );
    }

    #[test]
    fn error_body_summary_prefers_nested_message() {
        let body = r#"{"error": {"code": 400, "message": "Invalid JSON payload"}}"#;
        let (message, summary) = summarize_error_body(body);
        assert_eq!(message.as_deref(), Some("Invalid JSON payload"));
        assert!(summary.contains("Invalid JSON payload"));
        assert_eq!(summarize_error_body("").0, None);
    }

    #[test]
    fn blocked_response_with_no_candidates_is_an_error() {
        let response = GeminiResponse {
            candidates: None,
            prompt_feedback: Some(GeminiPromptFeedback {
                block_reason: Some("SAFETY".to_string()),
            }),
        };
        let err = extract_text_from_response(response).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn response_text_parts_are_joined() {
        let response = GeminiResponse {
            candidates: Some(vec![GeminiCandidate {
                content: Some(GeminiContent {
                    parts: Some(vec![
                        GeminiPart {
                            text: Some("{\"a\":".to_string()),
                        },
                        GeminiPart {
                            text: Some("1}".to_string()),
                        },
                    ]),
                }),
            }]),
            prompt_feedback: None,
        };
        assert_eq!(extract_text_from_response(response).unwrap(), "{\"a\":\n1}");
    }

    #[test]
    fn payload_summary_masks_schema_and_counts_safety_rules() {
        let payload = json!({
            "systemInstruction": { "parts": [{ "text": "system" }] },
            "contents": [{ "role": "user", "parts": [{ "text": "hello" }] }],
            "generationConfig": {
                "temperature": 0.7,
                "responseSchema": { "type": "OBJECT" }
            },
            "safetySettings": [{}, {}, {}]
        });
        let summary = summarize_payload(&payload, Some("test_prompt"));
        assert_eq!(summary["systemInstruction"], "test_prompt");
        assert_eq!(summary["userText"], "hello");
        assert_eq!(summary["generationConfig"]["responseSchema"], "structured");
        assert_eq!(summary["safetySettingsCount"], 3);
    }

    #[test]
    fn retry_delay_scales_with_attempt() {
        assert_eq!(retry_backoff(0), Duration::from_millis(900));
        assert_eq!(retry_backoff(1), Duration::from_millis(900));
        assert_eq!(retry_backoff(2), Duration::from_millis(1800));
    }

    #[test]
    fn retryable_statuses_cover_throttling_and_server_errors() {
        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable_status(StatusCode::BAD_GATEWAY));
        assert!(!is_retryable_status(StatusCode::BAD_REQUEST));
        assert!(!is_retryable_status(StatusCode::UNAUTHORIZED));
    }
}

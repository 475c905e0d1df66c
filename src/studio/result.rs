use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::studio::options::Mode;

static CODE_FENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^```[a-zA-Z0-9]*\s*(.*?)\s*```$").expect("valid code fence regex")
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfluencerPrompt {
    pub subject: String,
    pub detailed_prompt: String,
    pub negative_prompt: String,
    pub art_style: String,
    pub lighting: String,
    pub camera_settings: String,
    pub color_palette: Vec<String>,
    pub composition: String,
    pub mood: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebsitePrompt {
    pub project_name: String,
    pub detailed_prompt: String,
    pub ui_style: String,
    pub tech_stack: Vec<String>,
    pub color_palette: Vec<String>,
    pub sections: Vec<String>,
    pub target_audience: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum GeneratedPrompt {
    Influencer(InfluencerPrompt),
    Website(WebsitePrompt),
}

impl GeneratedPrompt {
    pub fn mode(&self) -> Mode {
        match self {
            GeneratedPrompt::Influencer(_) => Mode::Influencer,
            GeneratedPrompt::Website(_) => Mode::Website,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            GeneratedPrompt::Influencer(prompt) => &prompt.subject,
            GeneratedPrompt::Website(prompt) => &prompt.project_name,
        }
    }
}

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("model returned an empty response")]
    Empty,
    #[error("model returned malformed JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

pub fn normalize(raw: &str, mode: Mode) -> Result<GeneratedPrompt, NormalizeError> {
    let payload = strip_code_fence(raw);
    if payload.is_empty() {
        return Err(NormalizeError::Empty);
    }
    let result = match mode {
        Mode::Influencer => GeneratedPrompt::Influencer(serde_json::from_str(payload)?),
        Mode::Website => GeneratedPrompt::Website(serde_json::from_str(payload)?),
    };
    Ok(result)
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    if let Some(captures) = CODE_FENCE_RE.captures(trimmed) {
        if let Some(inner) = captures.get(1) {
            return inner.as_str();
        }
    }
    trimmed
}

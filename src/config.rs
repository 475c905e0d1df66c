use std::env;
use std::str::FromStr;

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub log_level: String,
    pub database_url: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_max_output_tokens: i32,
    pub gemini_max_retry_attempts: usize,
    pub gemini_safety_settings: String,
    pub history_max_entries: u32,
    pub history_page_size: i64,
    pub rate_limit_seconds: u64,
    pub draft_timeout_seconds: u64,
    pub telegram_max_length: usize,
    pub whitelist_file_path: String,
}

pub static CONFIG: Lazy<Config> =
    Lazy::new(|| Config::load().expect("Invalid environment configuration"));

fn env_string(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

fn normalize_safety_settings(value: String) -> String {
    let normalized = value.trim().to_lowercase();
    match normalized.as_str() {
        "" | "permissive" | "off" | "none" => "permissive".to_string(),
        "standard" => "standard".to_string(),
        _ => {
            warn!(
                "Unknown GEMINI_SAFETY_SETTINGS value '{}'; defaulting to permissive.",
                value
            );
            "permissive".to_string()
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let bot_token = env::var("BOT_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());
        let Some(bot_token) = bot_token else {
            bail!("BOT_TOKEN is required");
        };

        Ok(Config {
            bot_token,
            log_level: env_string("LOG_LEVEL", "info").to_lowercase(),
            database_url: env_string("DATABASE_URL", "sqlite:prompt_studio.db?mode=rwc"),
            gemini_api_key: env_string("GEMINI_API_KEY", ""),
            gemini_model: env_string("GEMINI_MODEL", "gemini-2.5-flash"),
            gemini_max_output_tokens: env_parse("GEMINI_MAX_OUTPUT_TOKENS", 4096),
            gemini_max_retry_attempts: env_parse("GEMINI_MAX_RETRY_ATTEMPTS", 2usize).max(1),
            gemini_safety_settings: normalize_safety_settings(env_string(
                "GEMINI_SAFETY_SETTINGS",
                "permissive",
            )),
            history_max_entries: env_parse("HISTORY_MAX_ENTRIES", 100u32).max(1),
            history_page_size: env_parse("HISTORY_PAGE_SIZE", 10i64).max(1),
            rate_limit_seconds: env_parse("RATE_LIMIT_SECONDS", 15),
            draft_timeout_seconds: env_parse("DRAFT_TIMEOUT_SECONDS", 300),
            telegram_max_length: env_parse("TELEGRAM_MAX_LENGTH", 4000usize),
            whitelist_file_path: env_string("WHITELIST_FILE_PATH", "allowed_chat.txt"),
        })
    }
}

pub const INFLUENCER_SYSTEM_PROMPT: &str = "You are an expert Photographer for AI Models.\n1. Interpret User Input.\n2. {detail_instruction}\n3. JSON Output.\n4. detailed_prompt keywords: 'raw photo, unedited, 8k, uhd, dslr, high texture'.\n5. If nostalgic style is requested, ensure the keywords reflect that era (e.g., 'y2k', 'digital noise', 'soft glow').\n";

pub const WEBSITE_SYSTEM_PROMPT: &str = "You are an Elite Frontend Engineer and UI/UX Designer specialized in creating prompts for AI Coding Agents (v0, Lovable, Bolt).\n\nGoal: Create a detailed prompt that will generate a stunning, modern website.\n\nFocus on:\n1. Modern Design: Shadcn UI, Tailwind CSS, Lucide Icons, Bento Grids, Glassmorphism.\n2. Layout: Responsive, clean whitespace, strong typography (Inter/Geist).\n3. Interactivity: Framer Motion animations, hover states, smooth scrolling.\n\nIf a design style is provided, strictly adhere to it.\n";

pub const ENHANCE_INFLUENCER_CONTEXT: &str =
    "You are a photography director. Describe physical attributes, location, and action.";

pub const ENHANCE_WEBSITE_CONTEXT: &str = "You are a Senior UI/UX Designer. Describe the website's purpose, target audience, key features, and visual vibe.";

pub const ENHANCE_USER_PROMPT: &str =
    "Rewrite the user's input into a detailed description.\nInput: \"{input}\"";

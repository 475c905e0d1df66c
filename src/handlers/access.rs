use std::collections::{HashMap, HashSet};
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use teloxide::prelude::*;
use tracing::{info, warn};

use crate::config::CONFIG;

static LAST_COMMAND_AT: Lazy<Mutex<HashMap<i64, Instant>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));
static WHITELIST: Lazy<Mutex<Option<HashSet<i64>>>> = Lazy::new(|| Mutex::new(None));
static WHITELIST_LOADED: AtomicBool = AtomicBool::new(false);

const UNAUTHORIZED_TEXT: &str =
    "You are not authorized to use this command. Please contact the administrator.";

pub fn is_rate_limited(user_id: i64) -> bool {
    let window = Duration::from_secs(CONFIG.rate_limit_seconds);
    let now = Instant::now();
    let mut last_seen = LAST_COMMAND_AT.lock();
    match last_seen.get(&user_id) {
        Some(last) if now.duration_since(*last) < window => true,
        _ => {
            last_seen.insert(user_id, now);
            false
        }
    }
}

fn parse_whitelist(content: &str) -> HashSet<i64> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| match line.parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                warn!("Skipping non-numeric whitelist entry: {line}");
                None
            }
        })
        .collect()
}

pub fn load_whitelist() {
    let path = &CONFIG.whitelist_file_path;
    let loaded = match fs::read_to_string(path) {
        Ok(content) => {
            let ids = parse_whitelist(&content);
            info!("Loaded {} whitelist entries from {}", ids.len(), path);
            Some(ids)
        }
        Err(err) => {
            info!(
                "Whitelist file {} not readable ({}); access control disabled",
                path, err
            );
            None
        }
    };
    *WHITELIST.lock() = loaded;
    WHITELIST_LOADED.store(true, Ordering::SeqCst);
}

fn ensure_loaded() {
    if !WHITELIST_LOADED.load(Ordering::SeqCst) {
        load_whitelist();
    }
}

pub fn whitelist_active() -> bool {
    ensure_loaded();
    WHITELIST.lock().is_some()
}

fn is_access_allowed(user_id: i64, chat_id: i64) -> bool {
    ensure_loaded();
    match WHITELIST.lock().as_ref() {
        Some(ids) => ids.contains(&user_id) || ids.contains(&chat_id),
        None => true,
    }
}

pub async fn check_access_control(bot: &Bot, message: &Message) -> bool {
    let user_id = message
        .from
        .as_ref()
        .and_then(|user| i64::try_from(user.id.0).ok())
        .unwrap_or_default();
    let chat_id = message.chat.id.0;

    if is_access_allowed(user_id, chat_id) {
        return true;
    }

    info!("Denied command from user {} in chat {}", user_id, chat_id);
    if let Err(err) = bot.send_message(message.chat.id, UNAUTHORIZED_TEXT).await {
        warn!("Failed to send unauthorized notice: {}", err);
    }
    false
}

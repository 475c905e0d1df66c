use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::db::database::Database;
use crate::studio::builder::GenerationRequest;
use crate::utils::timing::CommandTimer;

#[derive(Debug)]
pub struct PromptDraft {
    pub user_id: i64,
    pub chat_id: i64,
    pub panel_message_id: i64,
    pub request: GenerationRequest,
    pub busy: bool,
    pub timestamp: i64,
    pub command_timer: Option<CommandTimer>,
}

pub fn draft_key(chat_id: i64, panel_message_id: i64) -> String {
    format!("{}_{}", chat_id, panel_message_id)
}

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub drafts: Arc<Mutex<HashMap<String, PromptDraft>>>,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState {
            db,
            drafts: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

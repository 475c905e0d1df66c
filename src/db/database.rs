use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::db::models::{HistoryEntry, HistoryRow};

const HISTORY_COLUMNS: &str = "id, entry_id, chat_id, created_at, mode, description, \
     detail_level, camera, lighting, site_type, design_style, result_json";

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    history_cap: u32,
}

impl Database {
    pub async fn init(database_url: &str, history_cap: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        migrate(&pool).await?;
        info!("Database tables created successfully");

        Ok(Database {
            pool,
            history_cap: history_cap.max(1),
        })
    }

    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn insert_entry(&self, entry: &HistoryEntry) -> Result<()> {
        let result_json = serde_json::to_string(&entry.result)?;
        sqlx::query(
            "INSERT INTO prompt_history \
             (entry_id, chat_id, created_at, mode, description, detail_level, camera, lighting, site_type, design_style, result_json) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&entry.entry_id)
        .bind(entry.chat_id)
        .bind(entry.created_at)
        .bind(entry.request.mode.id())
        .bind(&entry.request.description)
        .bind(entry.request.detail.map(|level| level.level() as i64))
        .bind(entry.request.camera.map(|style| style.id()))
        .bind(entry.request.lighting.map(|style| style.id()))
        .bind(entry.request.site_type.map(|site| site.id()))
        .bind(entry.request.design_style.map(|style| style.id()))
        .bind(&result_json)
        .execute(&self.pool)
        .await?;

        self.evict_overflow(entry.chat_id).await
    }

    async fn evict_overflow(&self, chat_id: i64) -> Result<()> {
        let evicted = sqlx::query(
            "DELETE FROM prompt_history WHERE chat_id = ? AND id NOT IN (\
             SELECT id FROM prompt_history WHERE chat_id = ? ORDER BY id DESC LIMIT ?)",
        )
        .bind(chat_id)
        .bind(chat_id)
        .bind(self.history_cap as i64)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if evicted > 0 {
            info!("Evicted {evicted} oldest history entries for chat {chat_id}");
        }
        Ok(())
    }

    pub async fn list_entries(&self, chat_id: i64, limit: i64) -> Result<Vec<HistoryEntry>> {
        let rows = sqlx::query_as::<_, HistoryRow>(&format!(
            "SELECT {HISTORY_COLUMNS} FROM prompt_history WHERE chat_id = ? ORDER BY id DESC LIMIT ?",
        ))
        .bind(chat_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let entry_id = row.entry_id.clone();
            match HistoryEntry::try_from(row) {
                Ok(entry) => entries.push(entry),
                Err(err) => warn!("Skipping unreadable history entry {entry_id}: {err:#}"),
            }
        }
        Ok(entries)
    }

    pub async fn get_entry(&self, chat_id: i64, entry_id: &str) -> Result<Option<HistoryEntry>> {
        let row = sqlx::query_as::<_, HistoryRow>(&format!(
            "SELECT {HISTORY_COLUMNS} FROM prompt_history WHERE chat_id = ? AND entry_id = ?",
        ))
        .bind(chat_id)
        .bind(entry_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            None => Ok(None),
            Some(row) => match HistoryEntry::try_from(row) {
                Ok(entry) => Ok(Some(entry)),
                Err(err) => {
                    warn!("Treating unreadable history entry {entry_id} as missing: {err:#}");
                    Ok(None)
                }
            },
        }
    }

    pub async fn delete_entry(&self, chat_id: i64, entry_id: &str) -> Result<bool> {
        let deleted = sqlx::query("DELETE FROM prompt_history WHERE chat_id = ? AND entry_id = ?")
            .bind(chat_id)
            .bind(entry_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }

    pub async fn clear_entries(&self, chat_id: i64) -> Result<u64> {
        let cleared = sqlx::query("DELETE FROM prompt_history WHERE chat_id = ?")
            .bind(chat_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(cleared)
    }

    pub async fn count_entries(&self, chat_id: i64) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM prompt_history WHERE chat_id = ?")
                .bind(chat_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    #[allow(dead_code)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS prompt_history (\
            id INTEGER PRIMARY KEY AUTOINCREMENT,\
            entry_id TEXT NOT NULL UNIQUE,\
            chat_id INTEGER NOT NULL,\
            created_at TEXT NOT NULL,\
            mode TEXT NOT NULL,\
            description TEXT NOT NULL,\
            detail_level INTEGER,\
            camera TEXT,\
            lighting TEXT,\
            site_type TEXT,\
            design_style TEXT,\
            result_json TEXT NOT NULL\
        );",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_prompt_history_chat_id ON prompt_history(chat_id);",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_prompt_history_chat_entry ON prompt_history(chat_id, entry_id);",
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    use crate::studio::builder::GenerationRequest;
    use crate::studio::options::{CameraStyle, DetailLevel, LightingStyle, Mode};
    use crate::studio::result::{GeneratedPrompt, InfluencerPrompt, WebsitePrompt};

    async fn test_db(history_cap: u32) -> Database {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        migrate(&pool).await.unwrap();
        Database { pool, history_cap }
    }

    fn fixed_time(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
    }

    fn influencer_entry(chat_id: i64, entry_id: &str) -> HistoryEntry {
        let mut request = GenerationRequest::influencer("golden retriever on a skateboard");
        request.detail = Some(DetailLevel::HyperReal);
        request.camera = Some(CameraStyle::UltraWide);
        request.lighting = Some(LightingStyle::GoldenHour);
        HistoryEntry {
            entry_id: entry_id.to_string(),
            chat_id,
            created_at: fixed_time("2026-08-21T10:30:00Z"),
            request,
            result: GeneratedPrompt::Influencer(InfluencerPrompt {
                subject: "golden retriever".to_string(),
                detailed_prompt: "raw photo, unedited, 8k".to_string(),
                negative_prompt: "cgi, plastic".to_string(),
                art_style: "photorealism".to_string(),
                lighting: "golden hour backlight".to_string(),
                camera_settings: "0.6x ultra wide".to_string(),
                color_palette: vec!["#f59e0b".to_string()],
                composition: "low angle".to_string(),
                mood: "playful".to_string(),
            }),
        }
    }

    fn website_entry(chat_id: i64, entry_id: &str) -> HistoryEntry {
        HistoryEntry {
            entry_id: entry_id.to_string(),
            chat_id,
            created_at: fixed_time("2026-08-21T11:00:00Z"),
            request: GenerationRequest::website("landing page for a coffee subscription"),
            result: GeneratedPrompt::Website(WebsitePrompt {
                project_name: "Brewbox".to_string(),
                detailed_prompt: "Build a landing page...".to_string(),
                ui_style: "Minimal & Clean".to_string(),
                tech_stack: vec!["Next.js".to_string(), "Tailwind".to_string()],
                color_palette: vec!["#78350f".to_string()],
                sections: vec!["Hero".to_string(), "Pricing".to_string()],
                target_audience: "remote workers".to_string(),
            }),
        }
    }

    #[tokio::test]
    async fn entries_round_trip_exactly() {
        let db = test_db(10).await;
        let entry = influencer_entry(42, "entry-a");
        db.insert_entry(&entry).await.unwrap();

        let listed = db.list_entries(42, 10).await.unwrap();
        assert_eq!(listed, vec![entry.clone()]);

        let fetched = db.get_entry(42, "entry-a").await.unwrap();
        assert_eq!(fetched, Some(entry));
    }

    #[tokio::test]
    async fn absent_options_stay_absent() {
        let db = test_db(10).await;
        let entry = website_entry(7, "entry-w");
        db.insert_entry(&entry).await.unwrap();

        let fetched = db.get_entry(7, "entry-w").await.unwrap().unwrap();
        assert_eq!(fetched.request.detail, None);
        assert_eq!(fetched.request.camera, None);
        assert_eq!(fetched.request.lighting, None);
        assert_eq!(fetched.request.site_type, None);
        assert_eq!(fetched.request.design_style, None);
        assert_eq!(fetched.request.mode, Mode::Website);
    }

    #[tokio::test]
    async fn delete_removes_exactly_one_and_preserves_order() {
        let db = test_db(10).await;
        db.insert_entry(&influencer_entry(5, "first")).await.unwrap();
        db.insert_entry(&influencer_entry(5, "second")).await.unwrap();
        db.insert_entry(&influencer_entry(5, "third")).await.unwrap();

        assert!(db.delete_entry(5, "second").await.unwrap());
        assert!(!db.delete_entry(5, "second").await.unwrap());

        let remaining: Vec<String> = db
            .list_entries(5, 10)
            .await
            .unwrap()
            .into_iter()
            .map(|entry| entry.entry_id)
            .collect();
        assert_eq!(remaining, vec!["third".to_string(), "first".to_string()]);
    }

    #[tokio::test]
    async fn overflow_evicts_oldest_entries_first() {
        let db = test_db(2).await;
        db.insert_entry(&influencer_entry(9, "one")).await.unwrap();
        db.insert_entry(&influencer_entry(9, "two")).await.unwrap();
        db.insert_entry(&influencer_entry(9, "three")).await.unwrap();

        assert_eq!(db.count_entries(9).await.unwrap(), 2);
        let kept: Vec<String> = db
            .list_entries(9, 10)
            .await
            .unwrap()
            .into_iter()
            .map(|entry| entry.entry_id)
            .collect();
        assert_eq!(kept, vec!["three".to_string(), "two".to_string()]);
    }

    #[tokio::test]
    async fn eviction_and_clear_are_scoped_per_chat() {
        let db = test_db(2).await;
        db.insert_entry(&influencer_entry(1, "a1")).await.unwrap();
        db.insert_entry(&influencer_entry(1, "a2")).await.unwrap();
        db.insert_entry(&influencer_entry(1, "a3")).await.unwrap();
        db.insert_entry(&website_entry(2, "b1")).await.unwrap();

        assert_eq!(db.count_entries(1).await.unwrap(), 2);
        assert_eq!(db.count_entries(2).await.unwrap(), 1);

        assert_eq!(db.clear_entries(1).await.unwrap(), 2);
        assert_eq!(db.count_entries(1).await.unwrap(), 0);
        assert_eq!(db.count_entries(2).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn unreadable_rows_are_skipped_not_fatal() {
        let db = test_db(10).await;
        db.insert_entry(&influencer_entry(3, "good")).await.unwrap();

        sqlx::query(
            "INSERT INTO prompt_history \
             (entry_id, chat_id, created_at, mode, description, detail_level, camera, lighting, site_type, design_style, result_json) \
             VALUES ('broken', 3, '2026-08-21T12:00:00Z', 'influencer', 'x', NULL, NULL, NULL, NULL, NULL, 'not json')",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let listed = db.list_entries(3, 10).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].entry_id, "good");

        assert_eq!(db.get_entry(3, "broken").await.unwrap(), None);
    }

    #[tokio::test]
    async fn unknown_option_ids_are_treated_as_unreadable() {
        let db = test_db(10).await;
        sqlx::query(
            "INSERT INTO prompt_history \
             (entry_id, chat_id, created_at, mode, description, detail_level, camera, lighting, site_type, design_style, result_json) \
             VALUES ('stale', 4, '2026-08-21T12:00:00Z', 'influencer', 'x', 3, 'discontinued_lens', NULL, NULL, NULL, '{}')",
        )
        .execute(db.pool())
        .await
        .unwrap();

        assert_eq!(db.get_entry(4, "stale").await.unwrap(), None);
        assert!(db.list_entries(4, 10).await.unwrap().is_empty());
    }
}

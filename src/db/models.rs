use anyhow::anyhow;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::studio::builder::GenerationRequest;
use crate::studio::options::{
    CameraStyle, DesignStyle, DetailLevel, LightingStyle, Mode, SiteType,
};
use crate::studio::result::GeneratedPrompt;

#[derive(Debug, Clone, FromRow)]
pub struct HistoryRow {
    pub id: i64,
    pub entry_id: String,
    pub chat_id: i64,
    pub created_at: DateTime<Utc>,
    pub mode: String,
    pub description: String,
    pub detail_level: Option<i64>,
    pub camera: Option<String>,
    pub lighting: Option<String>,
    pub site_type: Option<String>,
    pub design_style: Option<String>,
    pub result_json: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub entry_id: String,
    pub chat_id: i64,
    pub created_at: DateTime<Utc>,
    pub request: GenerationRequest,
    pub result: GeneratedPrompt,
}

fn parse_option_id<T>(
    value: Option<&str>,
    parse: impl Fn(&str) -> Option<T>,
    field: &str,
    entry_id: &str,
) -> Result<Option<T>, anyhow::Error> {
    match value {
        None => Ok(None),
        Some(id) => parse(id)
            .map(Some)
            .ok_or_else(|| anyhow!("unknown {field} '{id}' in history entry {entry_id}")),
    }
}

impl TryFrom<HistoryRow> for HistoryEntry {
    type Error = anyhow::Error;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        let mode = Mode::from_id(&row.mode).ok_or_else(|| {
            anyhow!("unknown mode '{}' in history entry {}", row.mode, row.entry_id)
        })?;
        let detail = match row.detail_level {
            None => None,
            Some(level) => Some(
                u8::try_from(level)
                    .ok()
                    .and_then(DetailLevel::from_level)
                    .ok_or_else(|| {
                        anyhow!(
                            "unknown detail level {} in history entry {}",
                            level,
                            row.entry_id
                        )
                    })?,
            ),
        };
        let camera = parse_option_id(
            row.camera.as_deref(),
            CameraStyle::from_id,
            "camera",
            &row.entry_id,
        )?;
        let lighting = parse_option_id(
            row.lighting.as_deref(),
            LightingStyle::from_id,
            "lighting",
            &row.entry_id,
        )?;
        let site_type = parse_option_id(
            row.site_type.as_deref(),
            SiteType::from_id,
            "site type",
            &row.entry_id,
        )?;
        let design_style = parse_option_id(
            row.design_style.as_deref(),
            DesignStyle::from_id,
            "design style",
            &row.entry_id,
        )?;
        let result: GeneratedPrompt = serde_json::from_str(&row.result_json).map_err(|err| {
            anyhow!(
                "unreadable stored result in history entry {}: {}",
                row.entry_id,
                err
            )
        })?;

        Ok(HistoryEntry {
            entry_id: row.entry_id,
            chat_id: row.chat_id,
            created_at: row.created_at,
            request: GenerationRequest {
                description: row.description,
                mode,
                detail,
                camera,
                lighting,
                site_type,
                design_style,
            },
            result,
        })
    }
}

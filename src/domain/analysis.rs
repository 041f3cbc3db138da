/// AI analysis attached to a diary entry
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::EntryId;

/// Structured result returned by the analysis provider
///
/// Field names match the JSON document the provider is instructed to return;
/// every field is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisPayload {
    pub summary: String,
    pub trigger_pattern: String,
    pub hashtags: Vec<String>,
    pub actions: Vec<String>,
    pub mission_summary: String,
    pub full_text: String,
}

/// Cached analysis for exactly one diary entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiAnalysis {
    /// Database id; `None` until saved
    pub id: Option<i64>,
    pub entry_id: EntryId,
    pub summary: String,
    pub trigger_pattern: String,
    pub actions: Vec<String>,
    pub hashtags: Vec<String>,
    pub mission_summary: String,
    pub full_text: String,
    pub created_at: DateTime<Utc>,
}

impl AiAnalysis {
    pub fn from_payload(entry_id: EntryId, payload: AnalysisPayload) -> Self {
        Self {
            id: None,
            entry_id,
            summary: payload.summary,
            trigger_pattern: payload.trigger_pattern,
            actions: payload.actions,
            hashtags: payload.hashtags,
            mission_summary: payload.mission_summary,
            full_text: payload.full_text,
            created_at: Utc::now(),
        }
    }
}

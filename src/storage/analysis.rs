/// Cached AI analysis, one row per entry
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::{AiAnalysis, EntryId};
use crate::storage::{codec, conversion_error, from_millis, to_millis, StorageError};

pub struct AnalysisStore<'c> {
    conn: &'c Connection,
}

impl<'c> AnalysisStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Insert, or update in place when the entry already has an analysis
    pub fn upsert(&self, analysis: &AiAnalysis) -> Result<i64, StorageError> {
        let id = self.conn.query_row(
            "INSERT INTO analysis (
                entry_id, summary, trigger_pattern, actions_json, hashtags_json,
                mission_summary, full_text, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT (entry_id) DO UPDATE SET
                summary = excluded.summary,
                trigger_pattern = excluded.trigger_pattern,
                actions_json = excluded.actions_json,
                hashtags_json = excluded.hashtags_json,
                mission_summary = excluded.mission_summary,
                full_text = excluded.full_text,
                created_at = excluded.created_at
            RETURNING analysis_id",
            params![
                analysis.entry_id,
                analysis.summary,
                analysis.trigger_pattern,
                codec::encode(&analysis.actions),
                codec::encode(&analysis.hashtags),
                analysis.mission_summary,
                analysis.full_text,
                to_millis(analysis.created_at),
            ],
            |row| row.get(0),
        )?;
        tracing::debug!("Stored analysis {} for entry {}", id, analysis.entry_id);
        Ok(id)
    }

    pub fn get_by_entry_id(&self, entry_id: EntryId) -> Result<Option<AiAnalysis>, StorageError> {
        Ok(self
            .conn
            .query_row(
                "SELECT analysis_id, entry_id, summary, trigger_pattern, actions_json,
                        hashtags_json, mission_summary, full_text, created_at
                 FROM analysis WHERE entry_id = ?1",
                params![entry_id],
                map_analysis,
            )
            .optional()?)
    }
}

fn map_analysis(row: &Row<'_>) -> rusqlite::Result<AiAnalysis> {
    let actions: String = row.get(4)?;
    let hashtags: String = row.get(5)?;
    Ok(AiAnalysis {
        id: Some(row.get(0)?),
        entry_id: row.get(1)?,
        summary: row.get(2)?,
        trigger_pattern: row.get(3)?,
        actions: codec::decode(&actions).map_err(|e| conversion_error(4, e))?,
        hashtags: codec::decode(&hashtags).map_err(|e| conversion_error(5, e))?,
        mission_summary: row.get(6)?,
        full_text: row.get(7)?,
        created_at: from_millis(row.get(8)?),
    })
}

/// Monthly summary persistence, one row per (owner, year-month)
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::{Mood, MonthlySummary, Owner, YearMonth};
use crate::storage::{codec, conversion_error, from_millis, to_millis, StorageError};

const MONTHLY_COLUMNS: &str = "owner_id, year_month, dominant_mood, one_line_summary, \
                               detail_summary, emotion_flow, keywords_json, updated_at";

pub struct MonthlyStore<'c> {
    conn: &'c Connection,
}

impl<'c> MonthlyStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn upsert(&self, summary: &MonthlySummary) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO monthly_summaries (
                owner_id, year_month, dominant_mood, one_line_summary,
                detail_summary, emotion_flow, keywords_json, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT (owner_id, year_month) DO UPDATE SET
                dominant_mood = excluded.dominant_mood,
                one_line_summary = excluded.one_line_summary,
                detail_summary = excluded.detail_summary,
                emotion_flow = excluded.emotion_flow,
                keywords_json = excluded.keywords_json,
                updated_at = excluded.updated_at",
            params![
                summary.owner.to_string(),
                summary.year_month.to_string(),
                summary.dominant_mood.ordinal(),
                summary.one_line_summary,
                summary.detail_summary,
                summary.emotion_flow,
                codec::encode(&summary.keywords),
                to_millis(summary.updated_at),
            ],
        )?;
        tracing::debug!("Stored monthly summary {} for {}", summary.year_month, summary.owner);
        Ok(())
    }

    pub fn get(&self, owner: &Owner, ym: YearMonth) -> Result<Option<MonthlySummary>, StorageError> {
        let sql = format!(
            "SELECT {} FROM monthly_summaries WHERE owner_id = ?1 AND year_month = ?2",
            MONTHLY_COLUMNS
        );
        Ok(self
            .conn
            .query_row(&sql, params![owner.to_string(), ym.to_string()], map_summary)
            .optional()?)
    }

    /// Every stored summary of one year, January first
    pub fn get_year(&self, owner: &Owner, year: i32) -> Result<Vec<MonthlySummary>, StorageError> {
        let sql = format!(
            "SELECT {} FROM monthly_summaries
             WHERE owner_id = ?1 AND year_month LIKE ?2
             ORDER BY year_month ASC",
            MONTHLY_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let summaries = stmt
            .query_map(params![owner.to_string(), format!("{:04}-%", year)], map_summary)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(summaries)
    }

    pub fn delete_all_for_owner(&self, owner: &Owner) -> Result<usize, StorageError> {
        Ok(self.conn.execute(
            "DELETE FROM monthly_summaries WHERE owner_id = ?1",
            params![owner.to_string()],
        )?)
    }
}

fn map_summary(row: &Row<'_>) -> rusqlite::Result<MonthlySummary> {
    let owner: String = row.get(0)?;
    let year_month: String = row.get(1)?;
    let keywords: String = row.get(6)?;
    Ok(MonthlySummary {
        owner: owner.parse::<Owner>().map_err(|e| conversion_error(0, e))?,
        year_month: year_month.parse::<YearMonth>().map_err(|e| conversion_error(1, e))?,
        dominant_mood: Mood::from_ordinal(row.get(2)?).map_err(|e| conversion_error(2, e))?,
        one_line_summary: row.get(3)?,
        detail_summary: row.get(4)?,
        emotion_flow: row.get(5)?,
        keywords: codec::decode(&keywords).map_err(|e| conversion_error(6, e))?,
        updated_at: from_millis(row.get(7)?),
    })
}

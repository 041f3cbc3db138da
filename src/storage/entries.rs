/// Diary entry persistence
///
/// Entries are unique per (owner, date). Aggregate views (month, week,
/// favorites, mood map) skip temporary entries; direct lookups by id or date
/// still return them.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::{DiaryEntry, EntryId, Mood, Owner, YearMonth};
use crate::storage::{codec, conversion_error, from_millis, to_millis, StorageError};

const ENTRY_COLUMNS: &str = "entry_id, owner_id, date_ymd, title, content, mood, tags_json, \
                             is_favorite, is_temporary, created_at, updated_at";

/// Entry queries against a borrowed connection or transaction
pub struct EntryStore<'c> {
    conn: &'c Connection,
}

impl<'c> EntryStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Insert the entry, or fully replace the one already stored for its
    /// (owner, date), and return the row id
    ///
    /// On update the stored `created_at` and favorite flag are kept. If the
    /// content, mood or tags change, the cached analysis of the old text is
    /// dropped with the update.
    pub fn upsert(&self, entry: &DiaryEntry) -> Result<EntryId, StorageError> {
        let owner = entry.owner.to_string();
        let existing: Option<(EntryId, String, i64, String)> = self
            .conn
            .query_row(
                "SELECT entry_id, content, mood, tags_json FROM entries
                 WHERE owner_id = ?1 AND date_ymd = ?2",
                params![owner, entry.date],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;

        let tags_json = codec::encode(&entry.tags);

        match existing {
            Some((id, old_content, old_mood, old_tags)) => {
                let unchanged = old_content == entry.content
                    && old_mood == entry.mood.ordinal()
                    && codec::decode(&old_tags).map_or(false, |tags| tags == entry.tags);
                if !unchanged {
                    let dropped = self
                        .conn
                        .execute("DELETE FROM analysis WHERE entry_id = ?1", params![id])?;
                    if dropped > 0 {
                        tracing::debug!("Dropped stale analysis of entry {}", id);
                    }
                }

                self.conn.execute(
                    "UPDATE entries SET
                        title = ?2,
                        content = ?3,
                        mood = ?4,
                        tags_json = ?5,
                        is_temporary = ?6,
                        updated_at = ?7
                     WHERE entry_id = ?1",
                    params![
                        id,
                        entry.title,
                        entry.content,
                        entry.mood.ordinal(),
                        tags_json,
                        entry.is_temporary,
                        to_millis(entry.updated_at),
                    ],
                )?;
                tracing::debug!("Updated entry {} for {} on {}", id, owner, entry.date);
                Ok(id)
            }
            None => {
                self.conn.execute(
                    "INSERT INTO entries (
                        owner_id, date_ymd, title, content, mood, tags_json,
                        is_favorite, is_temporary, created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    params![
                        owner,
                        entry.date,
                        entry.title,
                        entry.content,
                        entry.mood.ordinal(),
                        tags_json,
                        entry.is_favorite,
                        entry.is_temporary,
                        to_millis(entry.created_at),
                        to_millis(entry.updated_at),
                    ],
                )?;
                let id = self.conn.last_insert_rowid();
                tracing::debug!("Created entry {} for {} on {}", id, owner, entry.date);
                Ok(id)
            }
        }
    }

    pub fn get_by_id(&self, id: EntryId) -> Result<Option<DiaryEntry>, StorageError> {
        let sql = format!("SELECT {} FROM entries WHERE entry_id = ?1", ENTRY_COLUMNS);
        Ok(self.conn.query_row(&sql, params![id], map_entry).optional()?)
    }

    pub fn get_by_date(&self, owner: &Owner, date: NaiveDate) -> Result<Option<DiaryEntry>, StorageError> {
        let sql = format!(
            "SELECT {} FROM entries WHERE owner_id = ?1 AND date_ymd = ?2",
            ENTRY_COLUMNS
        );
        Ok(self
            .conn
            .query_row(&sql, params![owner.to_string(), date], map_entry)
            .optional()?)
    }

    /// Non-temporary entries of one month, oldest first
    pub fn get_by_month(&self, owner: &Owner, ym: YearMonth) -> Result<Vec<DiaryEntry>, StorageError> {
        self.get_by_range(owner, ym.first_day(), ym.last_day())
    }

    /// Non-temporary entries between `start` and `end` inclusive, oldest first
    pub fn get_by_week(
        &self,
        owner: &Owner,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DiaryEntry>, StorageError> {
        self.get_by_range(owner, start, end)
    }

    fn get_by_range(
        &self,
        owner: &Owner,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DiaryEntry>, StorageError> {
        let sql = format!(
            "SELECT {} FROM entries
             WHERE owner_id = ?1 AND is_temporary = 0 AND date_ymd BETWEEN ?2 AND ?3
             ORDER BY date_ymd ASC",
            ENTRY_COLUMNS
        );
        self.query_entries(&sql, params![owner.to_string(), start, end])
    }

    /// Favorite, non-temporary entries, newest first
    pub fn get_favorites(&self, owner: &Owner) -> Result<Vec<DiaryEntry>, StorageError> {
        let sql = format!(
            "SELECT {} FROM entries
             WHERE owner_id = ?1 AND is_favorite = 1 AND is_temporary = 0
             ORDER BY date_ymd DESC",
            ENTRY_COLUMNS
        );
        self.query_entries(&sql, params![owner.to_string()])
    }

    /// Mood per day for calendar rendering
    pub fn get_mood_map_by_month(
        &self,
        owner: &Owner,
        ym: YearMonth,
    ) -> Result<BTreeMap<NaiveDate, Mood>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT date_ymd, mood FROM entries
             WHERE owner_id = ?1 AND is_temporary = 0 AND date_ymd BETWEEN ?2 AND ?3",
        )?;
        let rows = stmt.query_map(
            params![owner.to_string(), ym.first_day(), ym.last_day()],
            |row| {
                let date: NaiveDate = row.get(0)?;
                let mood = Mood::from_ordinal(row.get(1)?).map_err(|e| conversion_error(1, e))?;
                Ok((date, mood))
            },
        )?;

        let mut map = BTreeMap::new();
        for row in rows {
            let (date, mood) = row?;
            map.insert(date, mood);
        }
        Ok(map)
    }

    /// Set the favorite flag on an entry of `owner`
    ///
    /// Returns false when `owner` has no entry with that id.
    pub fn set_favorite(&self, owner: &Owner, id: EntryId, value: bool) -> Result<bool, StorageError> {
        let rows = self.conn.execute(
            "UPDATE entries SET is_favorite = ?3, updated_at = ?4
             WHERE entry_id = ?1 AND owner_id = ?2",
            params![id, owner.to_string(), value, to_millis(Utc::now())],
        )?;
        Ok(rows > 0)
    }

    /// Delete an entry; its analysis goes with it
    pub fn delete(&self, id: EntryId) -> Result<bool, StorageError> {
        let rows = self.conn.execute("DELETE FROM entries WHERE entry_id = ?1", params![id])?;
        tracing::debug!("Deleted entry {} ({} rows)", id, rows);
        Ok(rows > 0)
    }

    pub fn delete_all_for_owner(&self, owner: &Owner) -> Result<usize, StorageError> {
        Ok(self
            .conn
            .execute("DELETE FROM entries WHERE owner_id = ?1", params![owner.to_string()])?)
    }

    pub fn count_for_owner(&self, owner: &Owner) -> Result<u32, StorageError> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM entries WHERE owner_id = ?1",
            params![owner.to_string()],
            |row| row.get(0),
        )?)
    }

    /// Every entry date of `owner`, newest first
    pub fn dates_desc(&self, owner: &Owner) -> Result<Vec<NaiveDate>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT date_ymd FROM entries WHERE owner_id = ?1 ORDER BY date_ymd DESC")?;
        let dates = stmt
            .query_map(params![owner.to_string()], |row| row.get(0))?
            .collect::<Result<Vec<NaiveDate>, _>>()?;
        Ok(dates)
    }

    pub fn distinct_mood_count(&self, owner: &Owner) -> Result<u32, StorageError> {
        Ok(self.conn.query_row(
            "SELECT COUNT(DISTINCT mood) FROM entries WHERE owner_id = ?1",
            params![owner.to_string()],
            |row| row.get(0),
        )?)
    }

    fn query_entries(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<DiaryEntry>, StorageError> {
        let mut stmt = self.conn.prepare(sql)?;
        let entries = stmt
            .query_map(params, map_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

fn map_entry(row: &Row<'_>) -> rusqlite::Result<DiaryEntry> {
    let owner: String = row.get(1)?;
    let owner = owner.parse::<Owner>().map_err(|e| conversion_error(1, e))?;
    let mood = Mood::from_ordinal(row.get(5)?).map_err(|e| conversion_error(5, e))?;
    let tags_json: String = row.get(6)?;
    let tags = codec::decode(&tags_json).map_err(|e| conversion_error(6, e))?;

    Ok(DiaryEntry {
        id: Some(row.get(0)?),
        owner,
        date: row.get(2)?,
        title: row.get(3)?,
        content: row.get(4)?,
        mood,
        tags,
        is_favorite: row.get(7)?,
        is_temporary: row.get(8)?,
        created_at: from_millis(row.get(9)?),
        updated_at: from_millis(row.get(10)?),
    })
}

/// Per-owner key/value settings
use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::Owner;
use crate::storage::StorageError;

pub const PROFILE_IMAGE_URI: &str = "profile_image_uri";
pub const NICKNAME: &str = "nickname";

pub struct SettingsStore<'c> {
    conn: &'c Connection,
}

impl<'c> SettingsStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn get(&self, owner: &Owner, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE owner_id = ?1 AND setting_key = ?2",
                params![owner.to_string(), key],
                |row| row.get(0),
            )
            .optional()?)
    }

    /// Overwrite the value for `key`
    pub fn put(&self, owner: &Owner, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO settings (owner_id, setting_key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT (owner_id, setting_key) DO UPDATE SET value = excluded.value",
            params![owner.to_string(), key, value],
        )?;
        Ok(())
    }

    pub fn delete_all_for_owner(&self, owner: &Owner) -> Result<usize, StorageError> {
        Ok(self
            .conn
            .execute("DELETE FROM settings WHERE owner_id = ?1", params![owner.to_string()])?)
    }
}

/// Registered account persistence
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::User;
use crate::storage::{from_millis, to_millis, StorageError};

const USER_COLUMNS: &str = "user_id, nickname, email, password_hash, created_at";

pub struct UserStore<'c> {
    conn: &'c Connection,
}

impl<'c> UserStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Insert a new account and return its id; `email` must already be
    /// normalized
    pub fn insert(
        &self,
        nickname: &str,
        email: &str,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> Result<i64, StorageError> {
        self.conn.execute(
            "INSERT INTO users (nickname, email, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![nickname, email, password_hash, to_millis(created_at)],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!("Created user {}", id);
        Ok(id)
    }

    pub fn get(&self, user_id: i64) -> Result<Option<User>, StorageError> {
        let sql = format!("SELECT {} FROM users WHERE user_id = ?1", USER_COLUMNS);
        Ok(self.conn.query_row(&sql, params![user_id], map_user).optional()?)
    }

    pub fn find_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let sql = format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS);
        Ok(self.conn.query_row(&sql, params![email], map_user).optional()?)
    }

    pub fn email_exists(&self, email: &str) -> Result<bool, StorageError> {
        Ok(self.find_by_email(email)?.is_some())
    }

    pub fn update_nickname(&self, user_id: i64, nickname: &str) -> Result<bool, StorageError> {
        let rows = self.conn.execute(
            "UPDATE users SET nickname = ?2 WHERE user_id = ?1",
            params![user_id, nickname],
        )?;
        Ok(rows > 0)
    }

    pub fn delete(&self, user_id: i64) -> Result<bool, StorageError> {
        let rows = self
            .conn
            .execute("DELETE FROM users WHERE user_id = ?1", params![user_id])?;
        Ok(rows > 0)
    }
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        nickname: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: from_millis(row.get(4)?),
    })
}

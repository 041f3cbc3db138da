/// Storage layer for persisting diary data
///
/// This module handles all database operations using SQLite. `SqliteStorage`
/// owns the connection; the per-table stores borrow it (or an open
/// transaction) for the duration of one logical operation.

pub mod codec;
pub mod sqlite;
pub mod migrations;
pub mod entries;
pub mod analysis;
pub mod monthly;
pub mod badges;
pub mod settings;
pub mod users;

// Re-export the main storage types
pub use sqlite::*;
pub use entries::EntryStore;
pub use analysis::AnalysisStore;
pub use monthly::MonthlyStore;
pub use badges::BadgeStore;
pub use settings::SettingsStore;
pub use users::UserStore;

use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;

use crate::domain::DomainError;
use crate::storage::codec::CodecError;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Stored list is corrupt: {0}")]
    Codec(#[from] CodecError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid stored value: {0}")]
    Domain(#[from] DomainError),

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Timestamps are stored as epoch milliseconds
pub(crate) fn to_millis(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

pub(crate) fn from_millis(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap_or_default()
}

/// Wrap a conversion failure inside a row mapper as a rusqlite error
pub(crate) fn conversion_error<E>(column: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(err))
}

/// Database migration management
///
/// This module creates the SQLite schema on a fresh database and upgrades
/// older databases step by step. Each step inspects the live column set
/// before changing anything, so a step can be re-run against a database that
/// already has it. All steps and the version bump run inside one transaction.

use rusqlite::{Connection, OptionalExtension, Transaction};

use crate::domain::BADGE_CATALOG;
use crate::storage::StorageError;

/// Current database schema version
///
/// Increment this when you add a step to `MIGRATIONS`
pub const CURRENT_VERSION: i32 = 6;

/// Result of a single migration step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Applied,
    AlreadyApplied,
}

impl StepOutcome {
    fn and(self, other: StepOutcome) -> StepOutcome {
        if self == StepOutcome::Applied || other == StepOutcome::Applied {
            StepOutcome::Applied
        } else {
            StepOutcome::AlreadyApplied
        }
    }
}

struct Migration {
    /// Runs when the database is below this version
    version: i32,
    description: &'static str,
    apply: fn(&Transaction<'_>) -> Result<StepOutcome, StorageError>,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 2,
        description: "entries.is_favorite",
        apply: migration_v2,
    },
    Migration {
        version: 3,
        description: "entries.is_temporary",
        apply: migration_v3,
    },
    Migration {
        version: 4,
        description: "analysis hashtags and mission summary",
        apply: migration_v4,
    },
    Migration {
        version: 5,
        description: "settings.key renamed to setting_key",
        apply: migration_v5,
    },
    Migration {
        version: 6,
        description: "monthly_summaries rebuilt with detail fields",
        apply: migration_v6,
    },
];

/// Initialize or upgrade the database schema
///
/// A database with no recorded version and no tables gets the current schema
/// directly. One with tables but no version record predates version tracking
/// and is upgraded from version 1.
pub fn initialize_database(conn: &mut Connection) -> Result<(), StorageError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        [],
    )?;

    let current_version = get_current_version(conn)?;
    if current_version > CURRENT_VERSION {
        tracing::warn!(
            "Database schema version {} is newer than this build ({})",
            current_version,
            CURRENT_VERSION
        );
        return Ok(());
    }
    if current_version == CURRENT_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    if current_version == 0 && !table_exists(&tx, "entries")? {
        create_current_schema(&tx)?;
        tracing::info!("Created database schema at version {}", CURRENT_VERSION);
    } else {
        run_migrations(&tx, current_version.max(1))?;
    }
    seed_badges(&tx)?;
    set_version(&tx, CURRENT_VERSION)?;
    tx.commit()?;

    Ok(())
}

/// Get the current database schema version, 0 when none is recorded
pub fn get_current_version(conn: &Connection) -> Result<i32, StorageError> {
    let version = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<i32>>(0)
        })
        .optional()?
        .flatten()
        .unwrap_or(0);

    Ok(version)
}

fn set_version(conn: &Connection, version: i32) -> Result<(), StorageError> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

fn run_migrations(tx: &Transaction<'_>, from_version: i32) -> Result<(), StorageError> {
    for migration in MIGRATIONS.iter().filter(|m| from_version < m.version) {
        let outcome = (migration.apply)(tx).map_err(|e| {
            StorageError::Migration(format!("v{} ({}): {}", migration.version, migration.description, e))
        })?;
        tracing::info!(
            "Migration v{} ({}): {:?}",
            migration.version,
            migration.description,
            outcome
        );
    }
    Ok(())
}

/// Create every table and index at the current version
fn create_current_schema(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS entries (
            entry_id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id TEXT NOT NULL,
            date_ymd TEXT NOT NULL,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            mood INTEGER NOT NULL,
            tags_json TEXT NOT NULL DEFAULT '[]',
            is_favorite INTEGER NOT NULL DEFAULT 0,
            is_temporary INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            UNIQUE (owner_id, date_ymd)
        );

        CREATE TABLE IF NOT EXISTS analysis (
            analysis_id INTEGER PRIMARY KEY AUTOINCREMENT,
            entry_id INTEGER NOT NULL UNIQUE,
            summary TEXT NOT NULL,
            trigger_pattern TEXT NOT NULL,
            actions_json TEXT NOT NULL DEFAULT '[]',
            hashtags_json TEXT NOT NULL DEFAULT '[]',
            mission_summary TEXT NOT NULL DEFAULT '',
            full_text TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            FOREIGN KEY (entry_id) REFERENCES entries (entry_id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS badges (
            badge_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            rule_type TEXT NOT NULL,
            rule_value INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS user_badges (
            owner_id TEXT NOT NULL,
            badge_id INTEGER NOT NULL,
            earned_at INTEGER NOT NULL,
            is_selected INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (owner_id, badge_id),
            FOREIGN KEY (badge_id) REFERENCES badges (badge_id)
        );

        CREATE TABLE IF NOT EXISTS users (
            user_id INTEGER PRIMARY KEY AUTOINCREMENT,
            nickname TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );",
    )?;

    create_settings_table(conn, "settings")?;
    create_monthly_table(conn, "monthly_summaries")?;
    create_entry_indexes(conn)?;
    Ok(())
}

fn create_settings_table(conn: &Connection, name: &str) -> Result<(), StorageError> {
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {} (
            owner_id TEXT NOT NULL,
            setting_key TEXT NOT NULL,
            value TEXT NOT NULL,
            PRIMARY KEY (owner_id, setting_key)
        )",
        name
    ))?;
    Ok(())
}

fn create_monthly_table(conn: &Connection, name: &str) -> Result<(), StorageError> {
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {} (
            owner_id TEXT NOT NULL,
            year_month TEXT NOT NULL,
            dominant_mood INTEGER NOT NULL,
            one_line_summary TEXT NOT NULL DEFAULT '',
            detail_summary TEXT NOT NULL DEFAULT '',
            emotion_flow TEXT NOT NULL DEFAULT '',
            keywords_json TEXT NOT NULL DEFAULT '[]',
            updated_at INTEGER NOT NULL,
            PRIMARY KEY (owner_id, year_month)
        )",
        name
    ))?;
    Ok(())
}

fn create_entry_indexes(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_entries_owner_date
            ON entries (owner_id, date_ymd);
        CREATE INDEX IF NOT EXISTS idx_entries_owner_favorite
            ON entries (owner_id, is_favorite, date_ymd);
        CREATE INDEX IF NOT EXISTS idx_entries_owner_temporary
            ON entries (owner_id, is_temporary, date_ymd);",
    )?;
    Ok(())
}

/// Insert the fixed badge catalog; existing rows are left alone
fn seed_badges(conn: &Connection) -> Result<(), StorageError> {
    let mut stmt = conn.prepare(
        "INSERT OR IGNORE INTO badges (badge_id, name, description, rule_type, rule_value)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for (id, name, description, rule_type, value) in BADGE_CATALOG {
        stmt.execute(rusqlite::params![id, name, description, rule_type, value])?;
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool, StorageError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn column_names(conn: &Connection, table: &str) -> Result<Vec<String>, StorageError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool, StorageError> {
    Ok(column_names(conn, table)?.iter().any(|c| c.eq_ignore_ascii_case(column)))
}

/// `ALTER TABLE .. ADD COLUMN`, treating an existing column as success
fn add_column(conn: &Connection, table: &str, column: &str, decl: &str) -> Result<StepOutcome, StorageError> {
    if has_column(conn, table, column)? {
        return Ok(StepOutcome::AlreadyApplied);
    }
    match conn.execute_batch(&format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, decl)) {
        Ok(()) => Ok(StepOutcome::Applied),
        Err(e) if e.to_string().contains("duplicate column") => Ok(StepOutcome::AlreadyApplied),
        Err(e) => Err(e.into()),
    }
}

fn migration_v2(tx: &Transaction<'_>) -> Result<StepOutcome, StorageError> {
    let outcome = add_column(tx, "entries", "is_favorite", "INTEGER NOT NULL DEFAULT 0")?;
    tx.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_entries_owner_favorite
            ON entries (owner_id, is_favorite, date_ymd)",
    )?;
    Ok(outcome)
}

fn migration_v3(tx: &Transaction<'_>) -> Result<StepOutcome, StorageError> {
    let outcome = add_column(tx, "entries", "is_temporary", "INTEGER NOT NULL DEFAULT 0")?;
    tx.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_entries_owner_temporary
            ON entries (owner_id, is_temporary, date_ymd)",
    )?;
    Ok(outcome)
}

fn migration_v4(tx: &Transaction<'_>) -> Result<StepOutcome, StorageError> {
    let hashtags = add_column(tx, "analysis", "hashtags_json", "TEXT NOT NULL DEFAULT '[]'")?;
    let mission = add_column(tx, "analysis", "mission_summary", "TEXT NOT NULL DEFAULT ''")?;

    // Best effort: the monthly table is rebuilt in v6 anyway
    let top_tag = if has_column(tx, "monthly_summaries", "detail_summary")? {
        StepOutcome::AlreadyApplied
    } else {
        add_column(tx, "monthly_summaries", "top_tag", "TEXT").unwrap_or_else(|e| {
            tracing::warn!("Skipping monthly_summaries.top_tag: {}", e);
            StepOutcome::AlreadyApplied
        })
    };

    Ok(hashtags.and(mission).and(top_tag))
}

fn migration_v5(tx: &Transaction<'_>) -> Result<StepOutcome, StorageError> {
    if has_column(tx, "settings", "setting_key")? {
        return Ok(StepOutcome::AlreadyApplied);
    }
    match tx.execute_batch("ALTER TABLE settings RENAME COLUMN \"key\" TO setting_key") {
        Ok(()) => Ok(StepOutcome::Applied),
        Err(e) => {
            tracing::info!("In-place column rename unavailable ({}), rebuilding settings", e);
            rebuild_settings_table(tx)?;
            Ok(StepOutcome::Applied)
        }
    }
}

/// Rebuild `settings` with the `setting_key` column: create, copy, drop, rename
pub(crate) fn rebuild_settings_table(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch("DROP TABLE IF EXISTS settings_new")?;
    create_settings_table(conn, "settings_new")?;
    conn.execute_batch(
        "INSERT OR REPLACE INTO settings_new (owner_id, setting_key, value)
            SELECT owner_id, \"key\", value FROM settings;
        DROP TABLE settings;
        ALTER TABLE settings_new RENAME TO settings;",
    )?;
    Ok(())
}

fn migration_v6(tx: &Transaction<'_>) -> Result<StepOutcome, StorageError> {
    if has_column(tx, "monthly_summaries", "detail_summary")? {
        return Ok(StepOutcome::AlreadyApplied);
    }

    let keywords = if has_column(tx, "monthly_summaries", "top_tag")? {
        "CASE WHEN top_tag IS NULL OR top_tag = '' THEN '[]' ELSE json_array(top_tag) END"
    } else {
        "'[]'"
    };

    tx.execute_batch("DROP TABLE IF EXISTS monthly_summaries_new")?;
    create_monthly_table(tx, "monthly_summaries_new")?;
    tx.execute_batch(&format!(
        "INSERT INTO monthly_summaries_new (
            owner_id, year_month, dominant_mood, one_line_summary,
            detail_summary, emotion_flow, keywords_json, updated_at
        )
        SELECT owner_id, year_month, dominant_mood, '',
            COALESCE(summary_text, ''), '', {}, updated_at
        FROM monthly_summaries;
        DROP TABLE monthly_summaries;
        ALTER TABLE monthly_summaries_new RENAME TO monthly_summaries;",
        keywords
    ))?;
    Ok(StepOutcome::Applied)
}

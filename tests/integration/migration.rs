/// Opening a database written by the first schema version
use chrono::NaiveDate;
use mind_diary::config::session_path_for;
use mind_diary::*;
use rusqlite::Connection;
use tempfile::TempDir;

const FIRST_SCHEMA: &str = "
    CREATE TABLE entries (
        entry_id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_id TEXT NOT NULL,
        date_ymd TEXT NOT NULL,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        mood INTEGER NOT NULL,
        tags_json TEXT NOT NULL DEFAULT '[]',
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL,
        UNIQUE (owner_id, date_ymd)
    );
    CREATE TABLE analysis (
        analysis_id INTEGER PRIMARY KEY AUTOINCREMENT,
        entry_id INTEGER NOT NULL UNIQUE,
        summary TEXT NOT NULL,
        trigger_pattern TEXT NOT NULL,
        actions_json TEXT NOT NULL DEFAULT '[]',
        full_text TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        FOREIGN KEY (entry_id) REFERENCES entries (entry_id) ON DELETE CASCADE
    );
    CREATE TABLE monthly_summaries (
        owner_id TEXT NOT NULL,
        year_month TEXT NOT NULL,
        dominant_mood INTEGER NOT NULL,
        summary_text TEXT,
        updated_at INTEGER NOT NULL,
        PRIMARY KEY (owner_id, year_month)
    );
    CREATE TABLE badges (
        badge_id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        rule_type TEXT NOT NULL,
        rule_value INTEGER NOT NULL
    );
    CREATE TABLE user_badges (
        owner_id TEXT NOT NULL,
        badge_id INTEGER NOT NULL,
        earned_at INTEGER NOT NULL,
        is_selected INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (owner_id, badge_id)
    );
    CREATE TABLE settings (
        owner_id TEXT NOT NULL,
        \"key\" TEXT NOT NULL,
        value TEXT NOT NULL,
        PRIMARY KEY (owner_id, \"key\")
    );
    CREATE TABLE users (
        user_id INTEGER PRIMARY KEY AUTOINCREMENT,
        nickname TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at INTEGER NOT NULL
    );
    CREATE TABLE schema_version (version INTEGER PRIMARY KEY);
    INSERT INTO schema_version (version) VALUES (1);

    INSERT INTO entries (owner_id, date_ymd, title, content, mood, tags_json, created_at, updated_at)
        VALUES ('ANON_legacy', '2025-12-24', 'Eve', 'Quiet night', 2, '[\"family\",\"snow\"]', 1, 2);
    INSERT INTO analysis (entry_id, summary, trigger_pattern, actions_json, full_text, created_at)
        VALUES (1, 'A gentle evening.', 'none', '[\"Call a friend\"]', 'Full text', 3);
    INSERT INTO monthly_summaries (owner_id, year_month, dominant_mood, summary_text, updated_at)
        VALUES ('ANON_legacy', '2025-12', 2, 'A calm month', 4);
    INSERT INTO settings (owner_id, \"key\", value)
        VALUES ('ANON_legacy', 'profile_image_uri', 'content://old');
";

fn schema_version(storage: &SqliteStorage) -> i32 {
    storage
        .read(|conn| Ok(conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?))
        .unwrap()
}

#[test]
fn test_first_version_database_upgrades_in_place() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("diary.db");
    {
        let conn = Connection::open(&db_path).unwrap();
        conn.execute_batch(FIRST_SCHEMA).unwrap();
    }

    let owner: Owner = "ANON_legacy".parse().unwrap();
    let session = FileSessionStore::new(session_path_for(&db_path));
    session
        .save(&SessionState {
            current_owner: Some(owner.clone()),
            anonymous_owner: Some(owner.clone()),
            anonymous_started_at: None,
        })
        .unwrap();

    let storage = SqliteStorage::new(db_path.clone()).expect("Failed to upgrade database");
    assert_eq!(schema_version(&storage), SCHEMA_VERSION);
    let service = DiaryService::new(storage, Box::new(DisabledProvider), Box::new(session));

    let entry = service
        .get_entry_by_date(&owner, NaiveDate::from_ymd_opt(2025, 12, 24).unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(entry.title, "Eve");
    assert_eq!(entry.mood, Mood::Calm);
    assert_eq!(entry.tags, vec!["family", "snow"]);
    assert!(!entry.is_favorite);
    assert!(!entry.is_temporary);

    let preview = service.get_mind_card_preview_by_entry_id(1).unwrap();
    assert_eq!(preview.comfort_preview, "A gentle evening.");
    assert_eq!(preview.mission, "Call a friend");

    let summaries = service.get_monthly_summaries_for_year(&owner, 2025).unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].dominant_mood, Mood::Calm);
    assert_eq!(summaries[0].detail_summary, "A calm month");

    let profile = service.get_user_profile().unwrap();
    assert_eq!(profile.profile_image_uri.as_deref(), Some("content://old"));

    // Badge catalog is seeded by the upgrade
    assert_eq!(service.get_badge_statuses(&owner).unwrap().len(), 5);
}

#[test]
fn test_reopening_current_database_is_a_no_op() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("diary.db");

    let first = SqliteStorage::new(db_path.clone()).unwrap();
    assert_eq!(schema_version(&first), SCHEMA_VERSION);
    drop(first);

    let second = SqliteStorage::new(db_path).unwrap();
    assert_eq!(schema_version(&second), SCHEMA_VERSION);
    let badges: i64 = second
        .read(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM badges", [], |row| row.get(0))?))
        .unwrap();
    assert_eq!(badges, 5);
}

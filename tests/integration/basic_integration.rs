/// Basic integration tests
use chrono::NaiveDate;
use mind_diary::config::session_path_for;
use mind_diary::*;
use tempfile::TempDir;

fn open(dir: &TempDir) -> DiaryService {
    let db_path = dir.path().join("diary.db");
    let storage = SqliteStorage::new(db_path.clone()).expect("Failed to open storage");
    DiaryService::new(
        storage,
        Box::new(DisabledProvider),
        Box::new(FileSessionStore::new(session_path_for(&db_path))),
    )
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
}

fn write(service: &DiaryService, owner: &Owner, date: NaiveDate, mood: Mood) -> EntryId {
    let entry = DiaryEntry::new(owner.clone(), date, "title", "content", mood, vec!["daily".to_string()])
        .unwrap()
        .temporary(owner.is_anonymous());
    service.upsert_entry(&entry).unwrap()
}

#[tokio::test]
async fn test_anonymous_session_survives_restart() {
    let dir = TempDir::new().expect("Failed to create temp dir");

    let owner = {
        let service = open(&dir);
        let owner = service.start_anonymous_session().unwrap();
        write(&service, &owner, day(1), Mood::Joy);
        owner
    };

    let service = open(&dir);
    assert_eq!(service.current_owner().unwrap(), Some(owner.clone()));
    let entry = service.get_entry_by_date(&owner, day(1)).unwrap().unwrap();
    assert!(entry.is_temporary);

    // Temporary entries stay out of the calendar views
    let march = "2026-03".parse::<YearMonth>().unwrap();
    assert!(service.get_entries_by_month(&owner, march).unwrap().is_empty());

    // Logging out and back in as anonymous returns to the same identity
    service.logout().unwrap();
    assert_eq!(service.current_owner().unwrap(), None);
    assert_eq!(service.start_anonymous_session().unwrap(), owner);
}

#[tokio::test]
async fn test_account_lifecycle() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let service = open(&dir);

    let owner = service
        .sign_up(" Me@Example.com ", "diary2026ok", "diary2026ok", "Cloud")
        .unwrap();
    assert!(!owner.is_anonymous());

    let entry = DiaryEntry::new(owner.clone(), day(2), "t", "c", Mood::Calm, vec![]).unwrap();
    let card = service.save_entry_and_prepare_mind_card(entry).await.unwrap();
    assert_eq!(card.comfort_preview, DEFAULT_COMFORT);

    // Duplicate email
    assert!(matches!(
        service.sign_up("me@example.com", "diary2026ok", "diary2026ok", "Other"),
        Err(AppError::Validation(_))
    ));

    service.logout().unwrap();
    assert!(matches!(
        service.login("me@example.com", "wrongpass99"),
        Err(AppError::Validation(_))
    ));
    assert_eq!(service.login("ME@example.com", "diary2026ok").unwrap(), owner);

    let profile = service.get_user_profile().unwrap();
    assert_eq!(profile.nickname, "Cloud");
    assert_eq!(profile.account_label, "me@example.com");
    assert_eq!(profile.service_days, 1);

    service.withdraw_current_user().unwrap();
    assert_eq!(service.current_owner().unwrap(), None);
    assert!(matches!(service.get_entry(card.entry_id), Err(AppError::NotFound(_))));
    assert!(matches!(
        service.login("me@example.com", "diary2026ok"),
        Err(AppError::Validation(_))
    ));
}

#[test]
fn test_sign_up_rejects_weak_or_mismatched_passwords() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let service = open(&dir);

    for (password, confirm) in [("short1", "short1"), ("onlyletters", "onlyletters"), ("diary2026ok", "diary2026no")] {
        assert!(matches!(
            service.sign_up("a@b.com", password, confirm, "nick"),
            Err(AppError::Validation(_))
        ));
    }
    assert_eq!(service.current_owner().unwrap(), None);
}

#[test]
fn test_anonymous_profile_settings() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let service = open(&dir);
    service.start_anonymous_session().unwrap();

    let profile = service.get_user_profile().unwrap();
    assert_eq!(profile.nickname, DEFAULT_NICKNAME);
    assert_eq!(profile.account_label, ANONYMOUS_LABEL);
    assert_eq!(profile.profile_image_uri, None);

    service.update_nickname("Moon").unwrap();
    service.update_profile_image("content://avatar/1").unwrap();
    let profile = service.get_user_profile().unwrap();
    assert_eq!(profile.nickname, "Moon");
    assert_eq!(profile.profile_image_uri.as_deref(), Some("content://avatar/1"));

    // Only registered accounts can be withdrawn
    assert!(matches!(service.withdraw_current_user(), Err(AppError::Validation(_))));
}

#[test]
fn test_badges_follow_entries() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let service = open(&dir);
    let owner = Owner::Registered(7);

    for d in 1..=3 {
        write(&service, &owner, day(d), Mood::Normal);
    }

    let earned: Vec<BadgeId> = service
        .get_badge_statuses(&owner)
        .unwrap()
        .into_iter()
        .filter(|s| s.is_earned)
        .map(|s| s.badge.id)
        .collect();
    assert_eq!(earned, vec![1, 4]);

    service.select_badge(&owner, 4).unwrap();
    assert!(matches!(service.select_badge(&owner, 2), Err(AppError::Validation(_))));
    assert!(matches!(service.select_badge(&owner, 99), Err(AppError::NotFound(_))));

    let selected: Vec<BadgeId> = service
        .get_badge_statuses(&owner)
        .unwrap()
        .into_iter()
        .filter(|s| s.is_selected)
        .map(|s| s.badge.id)
        .collect();
    assert_eq!(selected, vec![4]);
}

#[test]
fn test_calendar_views() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let service = open(&dir);
    let owner = Owner::Registered(3);

    write(&service, &owner, day(2), Mood::Joy);
    write(&service, &owner, day(9), Mood::Angry);
    write(&service, &owner, NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(), Mood::Calm);

    let march = "2026-03".parse::<YearMonth>().unwrap();
    let dates: Vec<NaiveDate> = service
        .get_entries_by_month(&owner, march)
        .unwrap()
        .into_iter()
        .map(|e| e.date)
        .collect();
    assert_eq!(dates, vec![day(2), day(9)]);

    let moods = service.get_mood_map_by_month(&owner, march).unwrap();
    assert_eq!(moods.get(&day(9)), Some(&Mood::Angry));
    assert_eq!(moods.len(), 2);

    assert_eq!(service.get_entries_by_week(&owner, day(1), day(7)).unwrap().len(), 1);
    assert!(matches!(
        service.get_entries_by_week(&owner, day(7), day(1)),
        Err(AppError::Validation(_))
    ));

    // Rewriting a day replaces the entry instead of adding one
    write(&service, &owner, day(2), Mood::Tired);
    let entries = service.get_entries_by_month(&owner, march).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].mood, Mood::Tired);
}

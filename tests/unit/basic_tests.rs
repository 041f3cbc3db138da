/// Basic unit tests to verify core functionality
use chrono::NaiveDate;
use mind_diary::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_entry_creation() {
    let entry = DiaryEntry::new(
        Owner::Registered(1),
        date(2026, 2, 1),
        "Sunday",
        "Slept in.",
        Mood::Calm,
        vec![" rest ".to_string(), "".to_string(), "home".to_string()],
    )
    .unwrap();

    assert_eq!(entry.id, None);
    assert_eq!(entry.tags, vec!["rest", "home"]);
    assert!(!entry.is_favorite);
    assert!(!entry.is_temporary);
    assert!(entry.clone().temporary(true).is_temporary);
}

#[test]
fn test_entry_rejects_overlong_title() {
    let title = "x".repeat(101);
    assert!(DiaryEntry::new(Owner::Registered(1), date(2026, 2, 1), title, "", Mood::Joy, vec![]).is_err());
}

#[test]
fn test_owner_round_trips_through_text() {
    let anonymous: Owner = "ANON_abc123".parse().unwrap();
    assert_eq!(anonymous, Owner::Anonymous("abc123".to_string()));
    assert_eq!(anonymous.to_string(), "ANON_abc123");

    let registered: Owner = "USER_42".parse().unwrap();
    assert_eq!(registered.user_id(), Some(42));

    assert!("USER_x".parse::<Owner>().is_err());
    assert!("ANON_".parse::<Owner>().is_err());
    assert!("42".parse::<Owner>().is_err());

    let fresh = Owner::new_anonymous();
    assert!(fresh.is_anonymous());
    assert_ne!(fresh, Owner::new_anonymous());
}

#[test]
fn test_mood_parsing_and_ordinals() {
    assert_eq!("tired".parse::<Mood>().unwrap(), Mood::Tired);
    assert_eq!("JOY".parse::<Mood>().unwrap(), Mood::Joy);
    assert!("sleepy".parse::<Mood>().is_err());

    for mood in Mood::ALL {
        assert_eq!(Mood::from_ordinal(mood.ordinal()).unwrap(), mood);
    }
    assert!(Mood::from_ordinal(7).is_err());
}

#[test]
fn test_year_month_navigation() {
    let january: YearMonth = "2026-01".parse().unwrap();
    assert_eq!(january.previous().to_string(), "2025-12");
    assert_eq!(january.next().to_string(), "2026-02");
    assert_eq!(january.first_day(), date(2026, 1, 1));
    assert_eq!(january.last_day(), date(2026, 1, 31));
    assert!(january.contains(date(2026, 1, 31)));
    assert!(!january.contains(date(2026, 2, 1)));

    let february = YearMonth::new(2024, 2).unwrap();
    assert_eq!(february.last_day(), date(2024, 2, 29));
    assert_eq!(YearMonth::of(date(2024, 2, 10)), february);

    assert!(YearMonth::new(2026, 13).is_err());
    assert!("2026-1x".parse::<YearMonth>().is_err());
}

#[test]
fn test_streak_counting() {
    assert_eq!(consecutive_days(&[]), 0);
    assert_eq!(consecutive_days(&[date(2026, 3, 1)]), 1);
    assert_eq!(
        consecutive_days(&[date(2026, 3, 1), date(2026, 2, 28), date(2026, 2, 27)]),
        3
    );
    assert_eq!(
        consecutive_days(&[date(2026, 3, 5), date(2026, 3, 3), date(2026, 3, 2)]),
        1
    );
}

#[test]
fn test_codec_handles_tag_lists() {
    let tags = vec!["walk".to_string(), "rainy day".to_string()];
    let text = codec::encode(&tags);
    assert_eq!(text, r#"["walk","rainy day"]"#);
    let decoded = codec::decode(&text).unwrap();
    assert_eq!(decoded, tags);

    assert!(codec::decode("not json").is_err());
    assert!(codec::decode(r#"{"a":1}"#).is_err());
}

#[test]
fn test_mission_slots_are_always_three() {
    assert_eq!(normalize_missions(&[]), vec!["", "", ""]);
    let many: Vec<String> = ["a", " ", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
    assert_eq!(normalize_missions(&many).len(), DETAIL_MISSION_SLOTS);
}

#[test]
fn test_badge_rules_read_stats() {
    let stats = BadgeStats {
        entry_count: 30,
        current_streak: 2,
        distinct_moods: 7,
    };
    assert!(BadgeRule::from_parts(BadgeRule::ENTRY_COUNT_AT_LEAST, 30).is_satisfied_by(&stats));
    assert!(!BadgeRule::from_parts(BadgeRule::STREAK_AT_LEAST, 3).is_satisfied_by(&stats));
    assert!(BadgeRule::from_parts(BadgeRule::DISTINCT_MOOD_AT_LEAST, 7).is_satisfied_by(&stats));
}

#[test]
fn test_payload_parsing_is_strict() {
    let text = r#"{"summary":"s","trigger_pattern":"t","hashtags":[],"actions":["a"],"mission_summary":"m","full_text":"f"}"#;
    assert_eq!(parse_payload(text).unwrap().actions, vec!["a"]);
    assert!(matches!(
        parse_payload(&format!("```json\n{}\n```", text)),
        Err(ProviderError::Parse(_))
    ));
}

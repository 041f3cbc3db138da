/// Mind card flows against a mocked Gemini endpoint
use std::time::Duration;

use chrono::NaiveDate;
use mind_diary::config::ProviderConfig;
use mind_diary::*;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

fn gemini_answer(text: &str) -> serde_json::Value {
    json!({
        "candidates": [
            { "content": { "parts": [ { "text": text } ], "role": "model" } }
        ]
    })
}

fn service_for(server: &MockServer) -> DiaryService {
    let config = ProviderConfig::default()
        .with_api_key("test-key")
        .with_endpoint(format!("{}{}", server.uri(), MODEL_PATH))
        .with_timeout(Duration::from_secs(5));
    let client = GeminiClient::new(&config).expect("Failed to build client");

    DiaryService::new(
        SqliteStorage::in_memory().expect("Failed to open storage"),
        Box::new(client),
        Box::new(MemorySessionStore::new()),
    )
    .with_analysis_timeout(config.timeout)
}

fn entry() -> DiaryEntry {
    DiaryEntry::new(
        Owner::Registered(1),
        NaiveDate::from_ymd_opt(2026, 5, 4).unwrap(),
        "Monday",
        "The meeting ran late and I skipped lunch.",
        Mood::Tired,
        vec!["work".to_string(), "meeting".to_string()],
    )
    .unwrap()
}

#[tokio::test]
async fn test_successful_analysis_fills_mind_card() {
    let server = MockServer::start().await;
    let payload = json!({
        "summary": "It sounds like the day asked a lot of you.",
        "trigger_pattern": "Long meetings without breaks",
        "hashtags": ["#tired", "#work"],
        "actions": ["Eat a proper lunch tomorrow", "Stretch for five minutes"],
        "mission_summary": "Protect one break tomorrow",
        "full_text": "Skipping meals on busy days drains your energy."
    });
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_answer(&payload.to_string())))
        .expect(1)
        .mount(&server)
        .await;

    let service = service_for(&server);
    let card = service.save_entry_and_prepare_mind_card(entry()).await.unwrap();
    assert_eq!(card.comfort_preview, "It sounds like the day asked a lot of you.");
    assert_eq!(card.mission, "Eat a proper lunch tomorrow");
    assert_eq!(card.mood, Mood::Tired);

    let detail = service.get_mind_card_detail_by_entry_id(card.entry_id).unwrap();
    assert_eq!(detail.trigger_pattern, "Long meetings without breaks");
    assert_eq!(detail.hashtags, vec!["#tired", "#work"]);
    assert_eq!(
        detail.missions,
        vec!["Eat a proper lunch tomorrow", "Stretch for five minutes", ""]
    );

    // The cached analysis backs later previews without another call
    let preview = service.get_mind_card_preview_by_entry_id(card.entry_id).unwrap();
    assert_eq!(preview, card);
}

#[tokio::test]
async fn test_server_error_keeps_entry_and_default_card() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let service = service_for(&server);
    let card = service.save_entry_and_prepare_mind_card(entry()).await.unwrap();
    assert_eq!(card.comfort_preview, DEFAULT_COMFORT);
    assert_eq!(card.mission, DEFAULT_MISSION);

    let stored = service.get_entry(card.entry_id).unwrap();
    assert_eq!(stored.title, "Monday");

    let err = service.run_analysis_safe(card.entry_id).await.unwrap_err();
    assert!(matches!(err, AppError::Network(_)));
    assert!(!err.user_message().is_empty());
}

#[tokio::test]
async fn test_prose_answer_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(gemini_answer("Sure! Here is how you might feel...")),
        )
        .mount(&server)
        .await;

    let service = service_for(&server);
    let id = service.upsert_entry(&entry()).unwrap();
    assert!(matches!(
        service.run_analysis_safe(id).await,
        Err(AppError::Parse(_))
    ));
    assert!(matches!(
        service.get_mind_card_detail_by_entry_id(id),
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_answer("{}"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let service = service_for(&server).with_analysis_timeout(Duration::from_millis(200));
    let card = service.save_entry_and_prepare_mind_card(entry()).await.unwrap();
    assert_eq!(card.mission, DEFAULT_MISSION);
}

#[test]
fn test_missing_api_key_is_not_configured() {
    assert!(matches!(
        GeminiClient::new(&ProviderConfig::default().with_api_key("  ")),
        Err(ProviderError::NotConfigured)
    ));
}

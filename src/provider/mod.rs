/// Analysis provider seam
///
/// The service only knows the `AnalysisProvider` trait: hand it the mood,
/// tags and text of an entry and get back a structured `AnalysisPayload`, or
/// a classified error. `GeminiClient` is the HTTP implementation.

pub mod gemini;
pub mod prompt;

pub use gemini::GeminiClient;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{AnalysisPayload, DiaryEntry, Mood};

/// What the provider is asked to analyze
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub mood: Mood,
    pub tags: Vec<String>,
    pub content: String,
}

impl AnalysisRequest {
    pub fn from_entry(entry: &DiaryEntry) -> Self {
        Self {
            mood: entry.mood,
            tags: entry.tags.clone(),
            content: entry.content.clone(),
        }
    }
}

/// Why an analysis call failed
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("No analysis provider is configured")]
    NotConfigured,

    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("Provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Provider did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Malformed provider response: {0}")]
    Parse(String),

    #[error("Provider response contained no text")]
    EmptyContent,
}

impl ProviderError {
    /// Classify a transport error, reporting timeouts against `limit`
    pub fn transport(err: reqwest::Error, limit: Duration) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(limit)
        } else {
            ProviderError::Http(err)
        }
    }
}

#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisPayload, ProviderError>;
}

/// Stand-in used when no API key is configured; every call fails
pub struct DisabledProvider;

#[async_trait]
impl AnalysisProvider for DisabledProvider {
    async fn analyze(&self, _request: &AnalysisRequest) -> Result<AnalysisPayload, ProviderError> {
        Err(ProviderError::NotConfigured)
    }
}

/// Strictly parse the JSON document the model was told to return
///
/// Surrounding whitespace is ignored; anything else that is not exactly an
/// object with the six expected fields is a parse error.
pub fn parse_payload(text: &str) -> Result<AnalysisPayload, ProviderError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ProviderError::EmptyContent);
    }
    serde_json::from_str(text).map_err(|e| ProviderError::Parse(e.to_string()))
}

/// Gemini `generateContent` client
///
/// Sends the prompt as a single user part, authenticates with the
/// `x-goog-api-key` header and reads the model's answer from
/// `candidates[0].content.parts[0].text`. That text must itself be the JSON
/// payload; any non-2xx status fails immediately.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::config::ProviderConfig;
use crate::domain::AnalysisPayload;
use crate::provider::{parse_payload, prompt, AnalysisProvider, AnalysisRequest, ProviderError};

/// Longest response body kept in a status error
const MAX_ERROR_BODY: usize = 500;

pub struct GeminiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    timeout: Duration,
}

impl GeminiClient {
    /// Build a client; fails with `NotConfigured` when there is no API key
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let api_key = config.api_key.clone().ok_or(ProviderError::NotConfigured)?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ProviderError::Http)?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
            timeout: config.timeout,
        })
    }

    fn request_body(prompt: &str) -> Value {
        json!({
            "contents": [
                { "parts": [ { "text": prompt } ] }
            ]
        })
    }

    /// The first candidate's first text part
    fn extract_text(data: &Value) -> Option<&str> {
        data.get("candidates")?
            .get(0)?
            .get("content")?
            .get("parts")?
            .get(0)?
            .get("text")?
            .as_str()
    }
}

#[async_trait]
impl AnalysisProvider for GeminiClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisPayload, ProviderError> {
        let body = Self::request_body(&prompt::build_prompt(request));
        debug!(endpoint = %self.endpoint, "Calling analysis provider");

        let resp = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Analysis request failed: {}", e);
                ProviderError::transport(e, self.timeout)
            })?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ProviderError::transport(e, self.timeout))?;

        if !status.is_success() {
            error!(status = %status, "Analysis provider error");
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let data: Value = serde_json::from_str(&text)
            .map_err(|e| ProviderError::Parse(format!("response is not JSON: {}", e)))?;
        let content = Self::extract_text(&data).ok_or(ProviderError::EmptyContent)?;
        parse_payload(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_reads_first_part() {
        let data = json!({
            "candidates": [
                { "content": { "parts": [ { "text": "first" }, { "text": "second" } ] } },
                { "content": { "parts": [ { "text": "other" } ] } }
            ]
        });
        assert_eq!(GeminiClient::extract_text(&data), Some("first"));
        assert_eq!(GeminiClient::extract_text(&json!({ "candidates": [] })), None);
        assert_eq!(GeminiClient::extract_text(&json!({})), None);
    }

    #[test]
    fn test_request_body_shape() {
        let body = GeminiClient::request_body("hello");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
    }

    #[test]
    fn test_missing_api_key_is_not_configured() {
        assert!(matches!(
            GeminiClient::new(&ProviderConfig::default()),
            Err(ProviderError::NotConfigured)
        ));
    }
}

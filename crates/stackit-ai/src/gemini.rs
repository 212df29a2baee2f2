use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];
const BLOCK_THRESHOLD: &str = "BLOCK_MEDIUM_AND_ABOVE";

/// Something that turns a prompt into model text.
///
/// `None` means "no usable reply" for any reason (no key configured, upstream
/// error, empty candidate list). Implementations log the cause; callers only
/// decide what to do instead.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Option<String>;
}

#[derive(Clone)]
pub struct GeminiClientConfig {
    /// `None` keeps every call on the synthetic path without touching the network.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub default_timeout: Duration,
    pub max_error_body_bytes: usize,
}

impl GeminiClientConfig {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            default_timeout: Duration::from_secs(30),
            max_error_body_bytes: 8 * 1024,
        }
    }

    pub fn from_env() -> Self {
        let mut config = Self::new(std::env::var("GEMINI_API_KEY").ok());

        if let Ok(base_url) = std::env::var("GEMINI_BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }

        if let Some(model) = std::env::var("GEMINI_MODEL")
            .ok()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
        {
            config.model = model;
        }

        if let Some(timeout) = std::env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            config.default_timeout = Duration::from_secs(timeout);
        }

        if let Some(max) = std::env::var("GEMINI_MAX_ERROR_BODY_BYTES")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
        {
            config.max_error_body_bytes = max;
        }

        config
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

impl fmt::Debug for GeminiClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClientConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("default_timeout", &self.default_timeout)
            .field("max_error_body_bytes", &self.max_error_body_bytes)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("no API key configured")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid response JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("upstream returned error: status={status} message={message}")]
    Upstream { status: StatusCode, message: String },

    #[error("upstream returned non-JSON error: status={status} body={body}")]
    UpstreamBody { status: StatusCode, body: String },

    #[error("response contained no candidate text")]
    NoCandidates,
}

#[derive(Clone)]
pub struct GeminiClient {
    config: GeminiClientConfig,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiClientConfig) -> Result<Self, GeminiError> {
        let http = reqwest::Client::builder()
            .user_agent("stackit-ai")
            .build()?;
        Ok(Self { config, http })
    }

    /// Single `generateContent` round trip. No retries.
    pub async fn generate_content(&self, prompt: &str) -> Result<String, GeminiError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(GeminiError::MissingApiKey)?;

        let resp = self
            .http
            .post(self.config.endpoint())
            .timeout(self.config.default_timeout)
            .header("x-goog-api-key", api_key)
            .json(&GenerateContentRequest::for_prompt(prompt))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Self::to_upstream_error(resp, self.config.max_error_body_bytes).await);
        }

        let body = resp.bytes().await?;
        let parsed: GenerateContentResponse = serde_json::from_slice(&body)?;
        parsed.first_text().ok_or(GeminiError::NoCandidates)
    }

    async fn to_upstream_error(resp: reqwest::Response, max_error_body_bytes: usize) -> GeminiError {
        let status = resp.status();
        let body = read_limited_text(resp, max_error_body_bytes).await;
        if let Ok(parsed) = serde_json::from_str::<GeminiErrorEnvelope>(&body) {
            let message = parsed
                .error
                .message
                .unwrap_or_else(|| "unknown upstream error".to_string());
            return GeminiError::Upstream { status, message };
        }
        GeminiError::UpstreamBody { status, body }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Option<String> {
        match self.generate_content(prompt).await {
            Ok(text) => Some(text),
            Err(GeminiError::MissingApiKey) => {
                debug!("gemini api key not configured, skipping remote call");
                None
            }
            Err(e) => {
                warn!(error = %e, model = %self.config.model, "gemini unavailable, falling back to synthetic data");
                None
            }
        }
    }
}

async fn read_limited_text(resp: reqwest::Response, max_bytes: usize) -> String {
    match resp.bytes().await {
        Ok(mut b) => {
            if b.len() > max_bytes {
                b.truncate(max_bytes);
            }
            String::from_utf8_lossy(&b).to_string()
        }
        Err(e) => {
            warn!(error = %e, "failed to read upstream error body");
            "<failed to read error body>".to_string()
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorObject,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorObject {
    message: Option<String>,
    #[allow(dead_code)]
    code: Option<i64>,
    #[allow(dead_code)]
    status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
    pub safety_settings: Vec<SafetySetting>,
}

impl GenerateContentRequest {
    pub fn for_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GenerationConfig::default(),
            safety_settings: HARM_CATEGORIES
                .iter()
                .map(|category| SafetySetting {
                    category: category.to_string(),
                    threshold: BLOCK_THRESHOLD.to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub top_p: f64,
    pub max_output_tokens: u32,
    pub candidate_count: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            max_output_tokens: 2048,
            candidate_count: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SafetySetting {
    pub category: String,
    pub threshold: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, parts joined. Blocked candidates carry no
    /// content and count as empty.
    pub fn first_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;

    fn config_for(server: &ServerGuard, api_key: Option<&str>) -> GeminiClientConfig {
        let mut config = GeminiClientConfig::new(api_key.map(str::to_string));
        config.base_url = server.url();
        config
    }

    const PATH: &str = "/models/gemini-2.0-flash:generateContent";

    #[tokio::test]
    async fn missing_api_key_skips_network() {
        let mut server = Server::new_async().await;
        let mock = server.mock("POST", PATH).expect(0).create_async().await;

        let client = GeminiClient::new(config_for(&server, None)).expect("client");
        assert!(matches!(
            client.generate_content("hello").await,
            Err(GeminiError::MissingApiKey)
        ));
        assert_eq!(client.generate("hello").await, None);
        mock.assert_async().await;
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let config = GeminiClientConfig::new(Some("   ".to_string()));
        assert!(!config.has_api_key());
    }

    #[tokio::test]
    async fn returns_first_candidate_text() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::PartialJson(json!({
                "contents": [{ "parts": [{ "text": "explain lifetimes" }] }],
                "generationConfig": {
                    "temperature": 0.7,
                    "topP": 0.95,
                    "maxOutputTokens": 2048,
                    "candidateCount": 1
                }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                "candidates": [{
                    "content": { "parts": [{ "text": "Lifetimes describe borrows." }], "role": "model" },
                    "finishReason": "STOP"
                }]
            }"#,
            )
            .create_async()
            .await;

        let client = GeminiClient::new(config_for(&server, Some("test-key"))).expect("client");
        let text = client.generate("explain lifetimes").await;
        assert_eq!(text.as_deref(), Some("Lifetimes describe borrows."));
        mock.assert_async().await;
    }

    #[test]
    fn sends_all_safety_settings() {
        let request = GenerateContentRequest::for_prompt("x");
        let value = serde_json::to_value(&request).expect("serialize");
        let settings = value["safetySettings"].as_array().expect("array");
        assert_eq!(settings.len(), 4);
        assert!(settings
            .iter()
            .all(|s| s["threshold"] == "BLOCK_MEDIUM_AND_ABOVE"));
        assert_eq!(settings[1]["category"], "HARM_CATEGORY_HATE_SPEECH");
    }

    #[tokio::test]
    async fn rate_limited_response_is_soft_failure() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", PATH)
            .with_status(429)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#)
            .create_async()
            .await;

        let client = GeminiClient::new(config_for(&server, Some("k"))).expect("client");
        match client.generate_content("x").await {
            Err(GeminiError::Upstream { status, message }) => {
                assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
                assert_eq!(message, "Quota exceeded");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(client.generate("x").await, None);
    }

    #[tokio::test]
    async fn server_error_with_plain_body_is_soft_failure() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", PATH)
            .with_status(500)
            .with_body("internal")
            .create_async()
            .await;

        let client = GeminiClient::new(config_for(&server, Some("k"))).expect("client");
        assert!(matches!(
            client.generate_content("x").await,
            Err(GeminiError::UpstreamBody { .. })
        ));
        assert_eq!(client.generate("x").await, None);
    }

    #[tokio::test]
    async fn empty_candidates_is_soft_failure() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"candidates":[]}"#)
            .create_async()
            .await;

        let client = GeminiClient::new(config_for(&server, Some("k"))).expect("client");
        assert!(matches!(
            client.generate_content("x").await,
            Err(GeminiError::NoCandidates)
        ));
    }

    #[test]
    fn blocked_candidate_has_no_text() {
        let resp: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).expect("parse");
        assert_eq!(resp.first_text(), None);
    }

    #[test]
    fn debug_output_redacts_key() {
        let config = GeminiClientConfig::new(Some("secret-key".to_string()));
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("<redacted>"));
    }
}

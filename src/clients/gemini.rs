//! Google Gemini `generateContent` client.
//!
//! Used for summaries and for topic grouping. Calls are made once; a failure is
//! returned to the caller, which falls back to a deterministic path.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Gemini client settings.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl GeminiClient {
    /// # Errors
    /// Fails when the base URL is invalid or the HTTP client cannot be built.
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build gemini HTTP client")?;

        let endpoint = Url::parse(&config.base_url)
            .context("invalid gemini base URL")?
            .join(&format!("v1beta/models/{}:generateContent", config.model))
            .context("failed to build gemini generateContent URL")?;

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
        })
    }

    /// Sends one prompt and returns the concatenated text of the first candidate.
    ///
    /// # Errors
    /// Fails on transport errors, non-success status, or a response without text.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("gemini request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let truncated: String = body.chars().take(200).collect();
            return Err(anyhow!("gemini returned error status {status}: {truncated}"));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .context("failed to deserialize gemini response")?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(anyhow!("gemini response contained no text"));
        }
        debug!(chars = text.chars().count(), "gemini response received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GeminiClient {
        GeminiClient::new(&GeminiConfig {
            base_url: server.uri(),
            api_key: "test-key".to_string(),
            model: "gemini-test".to_string(),
            timeout: Duration::from_secs(5),
        })
        .expect("client builds")
    }

    #[tokio::test]
    async fn generate_joins_candidate_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-test:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "첫 문장이다. "}, {"text": "둘째 문장이다."}]}}]
            })))
            .mount(&server)
            .await;

        let text = client(&server).generate("요약해줘").await.expect("generate succeeds");
        assert_eq!(text, "첫 문장이다. 둘째 문장이다.");
    }

    #[tokio::test]
    async fn generate_fails_on_error_status_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .expect(1)
            .mount(&server)
            .await;

        let error = client(&server).generate("요약해줘").await.expect_err("should fail");
        assert!(error.to_string().contains("503"));
    }

    #[tokio::test]
    async fn generate_fails_on_empty_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
            )
            .mount(&server)
            .await;

        let error = client(&server).generate("요약해줘").await.expect_err("should fail");
        assert!(error.to_string().contains("no text"));
    }
}

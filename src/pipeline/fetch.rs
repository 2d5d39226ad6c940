use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use tracing::debug;

use crate::util::retry::{RetryConfig, send_with_retry};

/// Fetches article pages.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Returns the page body for a `200 OK` response.
    ///
    /// # Errors
    /// Any transport failure or non-200 status.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Page fetcher settings.
#[derive(Debug, Clone)]
pub struct HttpPageFetcherConfig {
    pub timeout: Duration,
    pub user_agent: String,
    pub retry: RetryConfig,
}

/// reqwest-backed [`PageFetcher`] with per-request timeout and capped retry.
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
    retry: RetryConfig,
}

impl HttpPageFetcher {
    /// # Errors
    /// Fails when the HTTP client cannot be built.
    pub fn new(config: &HttpPageFetcherConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT_LANGUAGE,
            header::HeaderValue::from_static("ko-KR,ko;q=0.9"),
        );
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("failed to build page fetch HTTP client")?;

        Ok(Self {
            client,
            retry: config.retry,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = send_with_retry(&self.retry, || self.client.get(url))
            .await
            .with_context(|| format!("page request failed: {url}"))?;

        let status = response.status();
        if status != StatusCode::OK {
            debug!(%url, %status, "page fetch returned non-200 status");
            return Err(anyhow!("page fetch returned status {status}"));
        }

        response
            .text()
            .await
            .with_context(|| format!("failed to read page body: {url}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header as header_eq, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> HttpPageFetcher {
        HttpPageFetcher::new(&HttpPageFetcherConfig {
            timeout: Duration::from_secs(5),
            user_agent: "KR-RE-NEWS/test".to_string(),
            retry: RetryConfig::new(3, 1, 2),
        })
        .expect("fetcher builds")
    }

    #[tokio::test]
    async fn fetch_returns_body_on_200() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/article/1"))
            .and(header_eq("user-agent", "KR-RE-NEWS/test"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>기사</html>"))
            .mount(&server)
            .await;

        let body = fetcher()
            .fetch(&format!("{}/article/1", server.uri()))
            .await
            .expect("fetch succeeds");

        assert_eq!(body, "<html>기사</html>");
    }

    #[tokio::test]
    async fn fetch_retries_transient_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/article/2"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/article/2"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let body = fetcher()
            .fetch(&format!("{}/article/2", server.uri()))
            .await
            .expect("fetch succeeds on third attempt");

        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn fetch_fails_on_non_200() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let error = fetcher()
            .fetch(&format!("{}/gone", server.uri()))
            .await
            .expect_err("404 is an error");

        assert!(error.to_string().contains("404"));
    }
}

//! Naver Open API news search client.
//!
//! Pages through `pages_per_query` result batches per query, newest first.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::pipeline::collect::{RawSearchItem, SearchProvider};
use crate::util::retry::{RetryConfig, send_with_retry};

/// Naver search client settings.
#[derive(Debug, Clone)]
pub struct NaverSearchConfig {
    pub endpoint: String,
    pub client_id: String,
    pub client_secret: String,
    pub page_size: usize,
    pub pages_per_query: usize,
    pub timeout: Duration,
    pub user_agent: String,
    pub retry: RetryConfig,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<RawSearchItem>,
}

#[derive(Debug, Clone)]
pub struct NaverSearchClient {
    client: Client,
    endpoint: Url,
    client_id: String,
    client_secret: String,
    page_size: usize,
    pages_per_query: usize,
    retry: RetryConfig,
}

impl NaverSearchClient {
    /// # Errors
    /// Fails when the endpoint is invalid or the HTTP client cannot be built.
    pub fn new(config: &NaverSearchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .context("failed to build naver search HTTP client")?;
        let endpoint = Url::parse(&config.endpoint).context("invalid naver search endpoint")?;

        Ok(Self {
            client,
            endpoint,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            page_size: config.page_size,
            pages_per_query: config.pages_per_query,
            retry: config.retry,
        })
    }

    async fn fetch_page(&self, query: &str, start: usize) -> Result<Vec<RawSearchItem>> {
        let display = self.page_size.to_string();
        let start = start.to_string();
        let response = send_with_retry(&self.retry, || {
            self.client
                .get(self.endpoint.clone())
                .header("X-Naver-Client-Id", &self.client_id)
                .header("X-Naver-Client-Secret", &self.client_secret)
                .query(&[
                    ("query", query),
                    ("display", display.as_str()),
                    ("start", start.as_str()),
                    ("sort", "date"),
                ])
        })
        .await
        .context("naver search request failed")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("naver search returned error status {status}"));
        }

        let page: SearchResponse = response
            .json()
            .await
            .context("failed to deserialize naver search response")?;
        Ok(page.items)
    }
}

#[async_trait]
impl SearchProvider for NaverSearchClient {
    async fn search(&self, query: &str) -> Result<Vec<RawSearchItem>> {
        let mut items = Vec::new();

        for page in 0..self.pages_per_query {
            let start = 1 + page * self.page_size;
            match self.fetch_page(query, start).await {
                Ok(batch) => {
                    let exhausted = batch.len() < self.page_size;
                    debug!(%query, start, count = batch.len(), "fetched search page");
                    items.extend(batch);
                    if exhausted {
                        break;
                    }
                }
                Err(error) if page == 0 => return Err(error),
                Err(error) => {
                    warn!(%query, start, error = %error, "search paging stopped early");
                    break;
                }
            }
        }

        Ok(items)
    }
}

//! Article summarization capability and its Gemini-backed implementation.
//!
//! The pipeline holds an `Option<Arc<dyn Summarizer>>`; `None` means every
//! article falls back to its cleaned search description.

use std::sync::{Arc, LazyLock};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use regex::Regex;

use crate::clients::gemini::GeminiClient;

/// Sentence-like spans ending in terminal punctuation.
static SENTENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^.!?]+(?:[다요]\.|[.!?])").expect("compile sentence pattern")
});

/// Longest body excerpt sent to the model, in characters.
const MAX_BODY_CHARS: usize = 6000;

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Produces a short summary of `body`.
    ///
    /// # Errors
    /// Any capability failure; the caller falls back to the description.
    async fn summarize(&self, body: &str) -> Result<String>;
}

/// Keeps only complete sentences from a model response and re-joins them.
///
/// Drops any trailing fragment cut off mid-sentence; leading commentary that
/// ends with a period is kept, matching the terminal-punctuation rule.
#[must_use]
pub fn tidy_summary(raw: &str) -> String {
    SENTENCE_RE
        .find_iter(raw)
        .map(|found| found.as_str().trim())
        .filter(|sentence| !sentence.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn summary_prompt(body: &str) -> String {
    let excerpt: String = body.chars().take(MAX_BODY_CHARS).collect();
    format!(
        "다음 한국어 부동산 뉴스 본문을 3~5개의 완결된 문장으로 요약하세요. \
         모든 문장은 '다' 또는 '요'로 끝나야 합니다. 핵심 수치, 정책, 시장 동향을 \
         사실 위주로 담고, 머리말이나 부연 설명 없이 요약 문장만 출력하세요.\n\n\
         [뉴스 본문]\n{excerpt}\n"
    )
}

/// Gemini-backed [`Summarizer`]. Not retried.
#[derive(Debug, Clone)]
pub struct GeminiSummarizer {
    client: Arc<GeminiClient>,
}

impl GeminiSummarizer {
    #[must_use]
    pub fn new(client: Arc<GeminiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    async fn summarize(&self, body: &str) -> Result<String> {
        if body.trim().is_empty() {
            return Err(anyhow!("empty body"));
        }
        let raw = self.client.generate(&summary_prompt(body)).await?;
        let summary = tidy_summary(&raw);
        if summary.is_empty() {
            return Err(anyhow!("summary response had no complete sentence"));
        }
        Ok(summary)
    }
}

//! Topic grouping through an external model.
//!
//! The grouper sees a bounded prefix of the ranked list and answers with one
//! representative id per topic group. Its answer is untrusted text.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use tracing::debug;

use crate::clients::gemini::GeminiClient;
use crate::pipeline::process::ProcessedArticle;

#[async_trait]
pub trait Grouper: Send + Sync {
    /// Returns positions into `articles`, one per topic group, best first.
    ///
    /// # Errors
    /// Any capability failure or an answer with no usable id.
    async fn group(&self, articles: &[ProcessedArticle], target: usize) -> Result<Vec<usize>>;
}

/// Parses a comma-separated id list, keeping in-range ids once each, in order.
///
/// # Errors
/// Fails when no valid id remains.
pub fn parse_ids(raw: &str, len: usize) -> Result<Vec<usize>> {
    let mut seen = HashSet::new();
    let ids: Vec<usize> = raw
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()))
        .filter_map(|token| token.parse::<usize>().ok())
        .filter(|id| *id < len && seen.insert(*id))
        .collect();
    if ids.is_empty() {
        return Err(anyhow!("grouping response contained no valid id: {raw:?}"));
    }
    Ok(ids)
}

fn grouping_prompt(articles: &[ProcessedArticle], target: usize) -> String {
    let mut listing = String::new();
    for (id, article) in articles.iter().enumerate() {
        let _ = write!(
            listing,
            "ID: {id}\n제목: {}\n요약: {}\n---\n",
            article.title, article.summary
        );
    }
    format!(
        "당신은 한국 부동산 뉴스 전문 편집장입니다. 아래는 오늘 수집된 뉴스 기사의 요약문 목록입니다.\n\n\
         [임무]\n\
         1. 같은 핵심 사건이나 주제를 다루는 기사끼리 그룹으로 묶으세요.\n\
         2. 각 그룹에서 내용을 가장 포괄적으로 설명하는 대표 기사 ID를 하나씩 고르세요.\n\
         3. 선택한 대표 기사 ID를 쉼표(,)로 구분하여 {target}개만 출력하세요. 다른 설명은 붙이지 마세요.\n\n\
         [기사 목록]\n{listing}\n\
         [출력 형식]\nID1,ID2,ID3"
    )
}

/// Gemini-backed [`Grouper`]. Not retried.
#[derive(Debug, Clone)]
pub struct GeminiGrouper {
    client: Arc<GeminiClient>,
}

impl GeminiGrouper {
    #[must_use]
    pub fn new(client: Arc<GeminiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Grouper for GeminiGrouper {
    async fn group(&self, articles: &[ProcessedArticle], target: usize) -> Result<Vec<usize>> {
        if articles.is_empty() {
            return Err(anyhow!("nothing to group"));
        }
        let raw = self
            .client
            .generate(&grouping_prompt(articles, target))
            .await?;
        let ids = parse_ids(&raw, articles.len())?;
        debug!(?ids, "grouper picked representatives");
        Ok(ids)
    }
}

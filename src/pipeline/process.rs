use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{debug, error, info, warn};

use super::collect::CandidateArticle;
use super::extract::BodyExtractor;
use super::fetch::PageFetcher;
use super::keywords::KeywordTables;
use super::outlet::{OutletResolver, OutletTable};
use super::page_meta::page_title;
use super::summarizer::Summarizer;
use crate::util::text::{collapse_whitespace, normalize_title};

/// An article that passed every per-article gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedArticle {
    pub title: String,
    /// Never empty.
    pub summary: String,
    /// Always a whitelisted outlet.
    pub outlet: String,
    /// `YYYY-MM-DD` in KST.
    pub date: String,
    pub link: String,
    pub published_at: DateTime<FixedOffset>,
}

/// Inclusive publish-time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub since: DateTime<FixedOffset>,
    pub until: DateTime<FixedOffset>,
}

impl TimeWindow {
    #[must_use]
    pub fn contains(&self, at: DateTime<FixedOffset>) -> bool {
        self.since <= at && at <= self.until
    }
}

/// Why a candidate produced no article.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NotWhitelisted,
    OutsideWindow,
    FetchFailed,
    EmptyBody,
    OffTopic,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotWhitelisted => "outlet not whitelisted",
            Self::OutsideWindow => "outside time window",
            Self::FetchFailed => "page fetch failed",
            Self::EmptyBody => "no extractable body",
            Self::OffTopic => "body off topic",
        };
        f.write_str(label)
    }
}

/// Per-article pipeline: resolve outlet, fetch, extract, topicality gate, summarize.
pub struct ArticleProcessor {
    resolver: OutletResolver,
    fetcher: Arc<dyn PageFetcher>,
    extractor: BodyExtractor,
    keywords: Arc<KeywordTables>,
    outlets: Arc<OutletTable>,
    summarizer: Option<Arc<dyn Summarizer>>,
    min_topic_hits: usize,
    window: Option<TimeWindow>,
}

impl ArticleProcessor {
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        resolver: OutletResolver,
        fetcher: Arc<dyn PageFetcher>,
        extractor: BodyExtractor,
        keywords: Arc<KeywordTables>,
        outlets: Arc<OutletTable>,
        summarizer: Option<Arc<dyn Summarizer>>,
        min_topic_hits: usize,
        window: Option<TimeWindow>,
    ) -> Self {
        Self {
            resolver,
            fetcher,
            extractor,
            keywords,
            outlets,
            summarizer,
            min_topic_hits,
            window,
        }
    }

    /// Runs one candidate through every gate.
    ///
    /// # Errors
    /// Returns the first gate that rejected the candidate.
    pub async fn process(
        &self,
        candidate: &CandidateArticle,
    ) -> Result<ProcessedArticle, RejectReason> {
        let resolution = self.resolver.resolve(&candidate.link).await;
        if !resolution.is_accepted() {
            return Err(RejectReason::NotWhitelisted);
        }

        let published_at = resolution.published_at.unwrap_or(candidate.published_at);
        if let Some(window) = &self.window {
            if !window.contains(published_at) {
                return Err(RejectReason::OutsideWindow);
            }
        }

        let link = resolution.link;
        let html = match resolution.html {
            Some(html) => html,
            None => self.fetcher.fetch(&link).await.map_err(|error| {
                debug!(%link, error = %error, "article page fetch failed");
                RejectReason::FetchFailed
            })?,
        };

        let (body, page_title) = self.extract_off_thread(&link, html).await;
        if body.is_empty() {
            return Err(RejectReason::EmptyBody);
        }
        if !self.keywords.body_is_on_topic(&body, self.min_topic_hits) {
            return Err(RejectReason::OffTopic);
        }

        let summary = self.summary_for(&link, &body, candidate).await;
        let title = page_title
            .map(|title| normalize_title(&title, self.outlets.outlet_names()))
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| candidate.title.clone());

        Ok(ProcessedArticle {
            title,
            summary,
            outlet: resolution.outlet,
            date: published_at.format("%Y-%m-%d").to_string(),
            link,
            published_at,
        })
    }

    async fn extract_off_thread(&self, link: &str, html: String) -> (String, Option<String>) {
        let extractor = self.extractor.clone();
        let url = link.to_string();
        let joined = tokio::task::spawn_blocking(move || {
            let body = extractor.extract(&url, &html);
            (body, page_title(&html))
        })
        .await;
        joined.unwrap_or_else(|join_error| {
            warn!(%link, error = %join_error, "body extraction task failed");
            (String::new(), None)
        })
    }

    async fn summary_for(&self, link: &str, body: &str, candidate: &CandidateArticle) -> String {
        if let Some(summarizer) = &self.summarizer {
            match summarizer.summarize(body).await {
                Ok(summary) => {
                    let summary = collapse_whitespace(&summary);
                    if !summary.is_empty() {
                        return summary;
                    }
                    warn!(%link, "summarizer returned empty text, using description");
                }
                Err(error) => {
                    warn!(%link, error = %error, "summarizer failed, using description");
                }
            }
        }
        let description = collapse_whitespace(&candidate.description);
        if description.is_empty() {
            candidate.title.clone()
        } else {
            description
        }
    }
}

/// Processes every candidate on a bounded worker pool.
///
/// Results are gathered in completion order; a failure or panic in one task
/// only loses that article.
pub async fn process_all(
    processor: Arc<ArticleProcessor>,
    candidates: Vec<CandidateArticle>,
    workers: NonZeroUsize,
) -> Vec<ProcessedArticle> {
    let submitted = candidates.len();
    let permits = Arc::new(Semaphore::new(workers.get()));
    let mut tasks = JoinSet::new();

    for candidate in candidates {
        let processor = Arc::clone(&processor);
        let permits = Arc::clone(&permits);
        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await.ok();
            let outcome = processor.process(&candidate).await;
            (candidate.link, outcome)
        });
    }

    let mut processed = Vec::with_capacity(submitted);
    let mut rejected = 0usize;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((_, Ok(article))) => processed.push(article),
            Ok((link, Err(reason))) => {
                rejected += 1;
                debug!(%link, %reason, "candidate rejected");
            }
            Err(join_error) => {
                rejected += 1;
                error!(error = %join_error, "article task aborted");
            }
        }
    }

    info!(
        submitted,
        processed = processed.len(),
        rejected,
        "article processing finished"
    );
    processed
}

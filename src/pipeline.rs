use std::num::NonZeroUsize;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Duration, FixedOffset};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::digest::Digest;
use crate::util::time::{kst, start_of_day_kst};

pub mod collect;
pub mod extract;
pub mod fetch;
pub mod keywords;
pub mod outlet;
pub mod page_meta;
pub mod process;
pub mod rerank;
pub mod select;
pub mod summarizer;

use collect::{QueryCollector, SearchProvider};
use extract::BodyExtractor;
use fetch::PageFetcher;
use keywords::{KeywordTables, QUERY_TERMS};
use outlet::{OutletResolver, OutletTable};
use process::{ArticleProcessor, TimeWindow, process_all};
use rerank::rerank;
use select::{DiversitySelector, diversity::SelectionPolicy, grouping::Grouper};
use summarizer::Summarizer;

/// Optional publish-time restriction, resolved against the run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindowSetting {
    Unbounded,
    /// KST midnight through the run time.
    Today,
    LastHours(u32),
}

impl TimeWindowSetting {
    #[must_use]
    pub fn resolve(self, now: DateTime<FixedOffset>) -> Option<TimeWindow> {
        let until = now.with_timezone(&kst());
        match self {
            Self::Unbounded => None,
            Self::Today => Some(TimeWindow {
                since: start_of_day_kst(until),
                until,
            }),
            Self::LastHours(hours) => Some(TimeWindow {
                since: until - Duration::hours(i64::from(hours)),
                until,
            }),
        }
    }
}

/// Immutable numeric settings handed to every stage at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurationPolicy {
    pub selection: SelectionPolicy,
    pub candidate_cap: usize,
    pub workers: NonZeroUsize,
    pub grouping_prefix: usize,
    pub min_body_words: usize,
    pub min_topic_hits: usize,
    pub time_window: TimeWindowSetting,
}

impl Default for CurationPolicy {
    fn default() -> Self {
        Self {
            selection: SelectionPolicy::default(),
            candidate_cap: 50,
            workers: NonZeroUsize::new(10).unwrap_or(NonZeroUsize::MIN),
            grouping_prefix: 15,
            min_body_words: 60,
            min_topic_hits: 2,
            time_window: TimeWindowSetting::Unbounded,
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every query failed or the pre-filter rejected everything.
    NoCandidates,
    /// Candidates existed but none survived the per-article gates.
    NothingSelected,
    Digest(Digest),
}

/// One end-to-end curation run: collect, process, rerank, select, render.
pub struct DigestPipeline {
    policy: CurationPolicy,
    keywords: Arc<KeywordTables>,
    outlets: Arc<OutletTable>,
    queries: Vec<String>,
    search: Arc<dyn SearchProvider>,
    fetcher: Arc<dyn PageFetcher>,
    summarizer: Option<Arc<dyn Summarizer>>,
    grouper: Option<Arc<dyn Grouper>>,
    version: String,
}

pub struct DigestPipelineBuilder {
    search: Arc<dyn SearchProvider>,
    fetcher: Arc<dyn PageFetcher>,
    policy: CurationPolicy,
    keywords: Option<Arc<KeywordTables>>,
    outlets: Option<Arc<OutletTable>>,
    queries: Option<Vec<String>>,
    summarizer: Option<Arc<dyn Summarizer>>,
    grouper: Option<Arc<dyn Grouper>>,
    version: Option<String>,
}

impl DigestPipeline {
    #[must_use]
    pub fn builder(
        search: Arc<dyn SearchProvider>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> DigestPipelineBuilder {
        DigestPipelineBuilder::new(search, fetcher)
    }

    #[must_use]
    pub fn policy(&self) -> &CurationPolicy {
        &self.policy
    }

    /// Each run is logged under a fresh `run_id`.
    #[instrument(skip_all, fields(run_id = %Uuid::new_v4()))]
    pub async fn run(&self, now: DateTime<FixedOffset>) -> RunOutcome {
        let collector = QueryCollector::new(
            Arc::clone(&self.search),
            Arc::clone(&self.keywords),
            Arc::clone(&self.outlets),
            self.queries.clone(),
            self.policy.candidate_cap,
        );
        let candidates = collector.collect().await;
        if candidates.is_empty() {
            info!("no candidates collected, nothing to report");
            return RunOutcome::NoCandidates;
        }

        let processor = Arc::new(ArticleProcessor::new(
            OutletResolver::new(Arc::clone(&self.outlets), Arc::clone(&self.fetcher)),
            Arc::clone(&self.fetcher),
            BodyExtractor::new(self.policy.min_body_words),
            Arc::clone(&self.keywords),
            Arc::clone(&self.outlets),
            self.summarizer.clone(),
            self.policy.min_topic_hits,
            self.policy.time_window.resolve(now),
        ));
        let processed = process_all(processor, candidates, self.policy.workers).await;

        let ranked = rerank(processed, &self.keywords);
        let selector = DiversitySelector::new(
            self.policy.selection,
            self.grouper.clone(),
            self.policy.grouping_prefix,
        );
        let selected = selector.select(&ranked).await;
        if selected.is_empty() {
            info!("no article survived processing, nothing to report");
            return RunOutcome::NothingSelected;
        }

        let digest = Digest::render(selected, now, &self.version);
        info!(subject = %digest.subject, count = digest.articles.len(), "digest rendered");
        RunOutcome::Digest(digest)
    }
}

impl DigestPipelineBuilder {
    #[must_use]
    pub fn new(search: Arc<dyn SearchProvider>, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            search,
            fetcher,
            policy: CurationPolicy::default(),
            keywords: None,
            outlets: None,
            queries: None,
            summarizer: None,
            grouper: None,
            version: None,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: CurationPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_keywords(mut self, keywords: Arc<KeywordTables>) -> Self {
        self.keywords = Some(keywords);
        self
    }

    #[must_use]
    pub fn with_outlets(mut self, outlets: Arc<OutletTable>) -> Self {
        self.outlets = Some(outlets);
        self
    }

    #[must_use]
    pub fn with_queries(mut self, queries: Vec<String>) -> Self {
        self.queries = Some(queries);
        self
    }

    #[must_use]
    pub fn with_summarizer(mut self, summarizer: Option<Arc<dyn Summarizer>>) -> Self {
        self.summarizer = summarizer;
        self
    }

    #[must_use]
    pub fn with_grouper(mut self, grouper: Option<Arc<dyn Grouper>>) -> Self {
        self.grouper = grouper;
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Fills unset tables with the built-in Korean national defaults.
    ///
    /// # Errors
    /// Fails when the default keyword tables cannot be compiled.
    pub fn build(self) -> Result<DigestPipeline> {
        let keywords = match self.keywords {
            Some(keywords) => keywords,
            None => Arc::new(KeywordTables::default_tables()?),
        };
        Ok(DigestPipeline {
            policy: self.policy,
            keywords,
            outlets: self
                .outlets
                .unwrap_or_else(|| Arc::new(OutletTable::korean_national())),
            queries: self
                .queries
                .unwrap_or_else(|| QUERY_TERMS.iter().map(ToString::to_string).collect()),
            search: self.search,
            fetcher: self.fetcher,
            summarizer: self.summarizer,
            grouper: self.grouper,
            version: self
                .version
                .unwrap_or_else(|| format!("v{}", env!("CARGO_PKG_VERSION"))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<FixedOffset> {
        kst()
            .with_ymd_and_hms(2026, 10, 14, 7, 30, 0)
            .single()
            .expect("valid time")
    }

    #[test]
    fn unbounded_window_resolves_to_none() {
        assert!(TimeWindowSetting::Unbounded.resolve(now()).is_none());
    }

    #[test]
    fn today_window_starts_at_kst_midnight() {
        let window = TimeWindowSetting::Today.resolve(now()).expect("window");
        assert_eq!(window.since.to_rfc3339(), "2026-10-14T00:00:00+09:00");
        assert_eq!(window.until, now());
    }

    #[test]
    fn hour_window_reaches_back_from_now() {
        let window = TimeWindowSetting::LastHours(24)
            .resolve(now())
            .expect("window");
        assert_eq!(window.since.to_rfc3339(), "2026-10-13T07:30:00+09:00");
        assert!(window.contains(now()));
    }
}

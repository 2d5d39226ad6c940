use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::keywords::KeywordTables;
use super::outlet::OutletTable;
use crate::util::{
    text::{clean_markup, normalize_link, normalize_title},
    time::parse_rfc2822_kst,
};

/// One hit as returned by the search capability.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawSearchItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: String,
    #[serde(default, rename = "originallink")]
    pub original_link: String,
    #[serde(default, rename = "pubDate")]
    pub pub_date: String,
}

/// Issues one topical query, newest first, paging as configured.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> anyhow::Result<Vec<RawSearchItem>>;
}

/// A pre-filtered search hit awaiting per-article processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateArticle {
    /// Query- and fragment-free link; unique within a run.
    pub link: String,
    pub title: String,
    /// Snippet with markup stripped; used when no summary can be produced.
    pub description: String,
    pub published_at: DateTime<FixedOffset>,
}

/// Runs every query and builds the bounded, recency-sorted candidate pool.
pub struct QueryCollector {
    search: Arc<dyn SearchProvider>,
    keywords: Arc<KeywordTables>,
    outlets: Arc<OutletTable>,
    queries: Vec<String>,
    candidate_cap: usize,
}

impl QueryCollector {
    #[must_use]
    pub fn new(
        search: Arc<dyn SearchProvider>,
        keywords: Arc<KeywordTables>,
        outlets: Arc<OutletTable>,
        queries: Vec<String>,
        candidate_cap: usize,
    ) -> Self {
        Self {
            search,
            keywords,
            outlets,
            queries,
            candidate_cap,
        }
    }

    /// A failing query is logged and skipped; it never stops the others.
    pub async fn collect(&self) -> Vec<CandidateArticle> {
        let mut raw_items = Vec::new();
        let mut failed_queries = 0usize;

        for query in &self.queries {
            match self.search.search(query).await {
                Ok(items) => {
                    debug!(%query, count = items.len(), "search query returned items");
                    raw_items.extend(items);
                }
                Err(error) => {
                    failed_queries += 1;
                    warn!(%query, error = %error, "search query failed, skipping");
                }
            }
        }

        let raw_count = raw_items.len();
        let pool = build_candidate_pool(
            raw_items,
            &self.keywords,
            &self.outlets,
            self.candidate_cap,
        );
        info!(
            queries = self.queries.len(),
            failed_queries,
            raw_items = raw_count,
            candidates = pool.len(),
            "candidate pool collected"
        );
        pool
    }
}

/// Link-dedups, title-filters, sorts newest first, and truncates to `cap`.
#[must_use]
pub fn build_candidate_pool<I>(
    items: I,
    keywords: &KeywordTables,
    outlets: &OutletTable,
    cap: usize,
) -> Vec<CandidateArticle>
where
    I: IntoIterator<Item = RawSearchItem>,
{
    let mut seen = HashSet::new();
    let mut pool = Vec::new();

    for item in items {
        let source = if item.original_link.trim().is_empty() {
            &item.link
        } else {
            &item.original_link
        };
        let link = normalize_link(source);
        if link.is_empty() || seen.contains(&link) {
            continue;
        }

        // Bracketed desk tags such as [사설] are still present at this point.
        let cleaned_title = clean_markup(&item.title);
        if !keywords.title_passes(&cleaned_title) {
            continue;
        }
        let title = normalize_title(&cleaned_title, outlets.outlet_names());

        let Some(published_at) = parse_rfc2822_kst(&item.pub_date) else {
            debug!(%link, pub_date = %item.pub_date, "dropping item with unparsable pubDate");
            continue;
        };

        seen.insert(link.clone());
        pool.push(CandidateArticle {
            link,
            title,
            description: clean_markup(&item.description),
            published_at,
        });
    }

    pool.sort_by(|a, b| {
        b.published_at
            .cmp(&a.published_at)
            .then_with(|| a.link.cmp(&b.link))
    });
    pool.truncate(cap);
    pool
}

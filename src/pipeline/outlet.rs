//! URL → outlet resolution.
//!
//! The primary path matches the host against [`OutletTable`] in declaration
//! order; the first entry whose domain is a label-aligned suffix of the host
//! wins, so more specific domains are declared before their parents. Hosts that
//! belong to an aggregator are fetched and re-resolved from page metadata.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use tracing::debug;

use super::fetch::PageFetcher;
use super::page_meta::aggregator_meta;
use crate::util::text::{host_of, normalize_link};

const DOMAIN_TO_OUTLET: &[(&str, &str)] = &[
    ("mk.co.kr", "매일경제"),
    ("hankyung.com", "한국경제"),
    ("sedaily.com", "서울경제"),
    ("biz.chosun.com", "조선비즈"),
    ("chosun.com", "조선일보"),
    ("joongang.co.kr", "중앙일보"),
    ("donga.com", "동아일보"),
    ("hani.co.kr", "한겨레"),
    ("khan.co.kr", "경향신문"),
    ("yna.co.kr", "연합뉴스"),
    ("newsis.com", "뉴시스"),
    ("mt.co.kr", "머니투데이"),
    ("fnnews.com", "파이낸셜뉴스"),
    ("news.kbs.co.kr", "KBS"),
    ("news.sbs.co.kr", "SBS"),
    ("imnews.imbc.com", "MBC"),
    ("korea.kr", "정책브리핑"),
];

const AGGREGATOR_DOMAINS: &[&str] = &["news.naver.com"];

/// Whitelisted outlets and the domain table that maps to them.
#[derive(Debug, Clone)]
pub struct OutletTable {
    domains: Vec<(String, String)>,
    whitelist: HashSet<String>,
    aggregators: Vec<String>,
}

impl OutletTable {
    #[must_use]
    pub fn new(
        domains: Vec<(String, String)>,
        whitelist: HashSet<String>,
        aggregators: Vec<String>,
    ) -> Self {
        Self {
            domains,
            whitelist,
            aggregators,
        }
    }

    /// The seventeen national outlets the digest accepts.
    #[must_use]
    pub fn korean_national() -> Self {
        let domains: Vec<(String, String)> = DOMAIN_TO_OUTLET
            .iter()
            .map(|(domain, outlet)| ((*domain).to_string(), (*outlet).to_string()))
            .collect();
        let whitelist = domains.iter().map(|(_, outlet)| outlet.clone()).collect();
        let aggregators = AGGREGATOR_DOMAINS.iter().map(|d| (*d).to_string()).collect();
        Self::new(domains, whitelist, aggregators)
    }

    #[must_use]
    pub fn is_whitelisted(&self, outlet: &str) -> bool {
        self.whitelist.contains(outlet)
    }

    pub fn outlet_names(&self) -> impl Iterator<Item = &str> {
        self.whitelist.iter().map(String::as_str)
    }

    /// Primary-path lookup; `None` when no table entry matches.
    #[must_use]
    pub fn outlet_for_host(&self, host: &str) -> Option<&str> {
        self.domains
            .iter()
            .find(|(domain, _)| host_matches(host, domain))
            .map(|(_, outlet)| outlet.as_str())
    }

    #[must_use]
    pub fn is_aggregator(&self, host: &str) -> bool {
        self.aggregators
            .iter()
            .any(|domain| host_matches(host, domain))
    }
}

fn host_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Outcome of resolving one link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Whitelisted outlet name, or empty when the link must be dropped.
    pub outlet: String,
    pub link: String,
    /// Publish time read from the aggregator page, when it overrode the search item.
    pub published_at: Option<DateTime<FixedOffset>>,
    /// Page HTML already fetched during resolution, reusable for extraction.
    pub html: Option<String>,
}

impl Resolution {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        !self.outlet.is_empty()
    }
}

/// Resolves links to whitelisted outlets.
#[derive(Clone)]
pub struct OutletResolver {
    table: Arc<OutletTable>,
    fetcher: Arc<dyn PageFetcher>,
}

impl OutletResolver {
    #[must_use]
    pub fn new(table: Arc<OutletTable>, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { table, fetcher }
    }

    /// Resolves `link` (already normalized) to an outlet and canonical link.
    pub async fn resolve(&self, link: &str) -> Resolution {
        let host = host_of(link);
        let mut resolution = Resolution {
            outlet: self
                .table
                .outlet_for_host(&host)
                .unwrap_or_default()
                .to_string(),
            link: link.to_string(),
            published_at: None,
            html: None,
        };

        if self.table.is_aggregator(&host) {
            match self.fetcher.fetch(link).await {
                Ok(html) => {
                    let meta = aggregator_meta(&html);
                    if let Some(publisher) = meta
                        .publisher
                        .filter(|publisher| self.table.is_whitelisted(publisher))
                    {
                        resolution.outlet = publisher;
                        if let Some(canonical) = meta.canonical {
                            resolution.link = normalize_link(&canonical);
                        }
                        resolution.published_at = meta.published_at;
                    }
                    resolution.html = Some(html);
                }
                Err(error) => {
                    debug!(%link, error = %error, "aggregator page fetch failed");
                }
            }
        }

        if !self.table.is_whitelisted(&resolution.outlet) {
            resolution.outlet.clear();
        }
        resolution
    }
}

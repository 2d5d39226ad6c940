//! Greedy outlet-capped, dissimilarity-enforcing selection.

use std::collections::{HashMap, HashSet};

use crate::pipeline::process::ProcessedArticle;

use super::similarity::{token_sets_similar, tokenize};

/// Numeric limits shared by the primary pass and backfill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionPolicy {
    pub target: usize,
    pub max_per_outlet: usize,
    pub similarity_threshold: f64,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            target: 5,
            max_per_outlet: 2,
            similarity_threshold: 0.4,
        }
    }
}

/// Everything a selection pass has committed to so far.
///
/// Owned by a single sequential stage; backfill continues from the state the
/// primary pass left behind.
#[derive(Debug, Default)]
pub struct SelectionState {
    links: HashSet<String>,
    summaries: Vec<HashSet<String>>,
    outlet_counts: HashMap<String, usize>,
    results: Vec<ProcessedArticle>,
}

impl SelectionState {
    /// State as if `primary` had been accepted in order.
    #[must_use]
    pub fn seeded(primary: Vec<ProcessedArticle>) -> Self {
        let mut state = Self::default();
        for article in primary {
            state.commit(tokenize(&article.summary), article);
        }
        state
    }

    #[must_use]
    pub fn is_full(&self, policy: &SelectionPolicy) -> bool {
        self.results.len() >= policy.target
    }

    pub(crate) fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn outlet_count(&self, outlet: &str) -> usize {
        self.outlet_counts.get(outlet).copied().unwrap_or(0)
    }

    /// Accepts `article` when there is room, its link is new, its outlet is
    /// under the cap, and its summary is not similar to any accepted one.
    pub fn try_accept(&mut self, article: &ProcessedArticle, policy: &SelectionPolicy) -> bool {
        if self.is_full(policy)
            || self.links.contains(&article.link)
            || self.outlet_count(&article.outlet) >= policy.max_per_outlet
        {
            return false;
        }
        let tokens = tokenize(&article.summary);
        if self
            .summaries
            .iter()
            .any(|accepted| token_sets_similar(&tokens, accepted, policy.similarity_threshold))
        {
            return false;
        }
        self.commit(tokens, article.clone());
        true
    }

    #[must_use]
    pub fn into_results(self) -> Vec<ProcessedArticle> {
        self.results
    }

    fn commit(&mut self, tokens: HashSet<String>, article: ProcessedArticle) {
        self.links.insert(article.link.clone());
        self.summaries.push(tokens);
        *self.outlet_counts.entry(article.outlet.clone()).or_insert(0) += 1;
        self.results.push(article);
    }
}

/// Single greedy pass over `ranked` in order.
#[must_use]
pub fn select_diverse(
    ranked: &[ProcessedArticle],
    policy: &SelectionPolicy,
) -> Vec<ProcessedArticle> {
    let mut state = SelectionState::default();
    for article in ranked {
        if state.is_full(policy) {
            break;
        }
        state.try_accept(article, policy);
    }
    state.into_results()
}

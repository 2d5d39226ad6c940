use std::sync::Arc;

use tracing::{info, warn};

use super::process::ProcessedArticle;

pub mod backfill;
pub mod diversity;
pub mod grouping;
pub mod similarity;

use backfill::backfill;
use diversity::{SelectionPolicy, SelectionState, select_diverse};
use grouping::Grouper;

/// Picks the final ordered subset from the ranked pool.
///
/// The primary pass is either the keyword greedy pass or, when a grouper is
/// configured, its representatives filtered through the same caps. Backfill
/// then tops up from the full ranked pool.
#[derive(Clone)]
pub struct DiversitySelector {
    policy: SelectionPolicy,
    grouper: Option<Arc<dyn Grouper>>,
    grouping_prefix: usize,
}

impl DiversitySelector {
    #[must_use]
    pub fn new(
        policy: SelectionPolicy,
        grouper: Option<Arc<dyn Grouper>>,
        grouping_prefix: usize,
    ) -> Self {
        Self {
            policy,
            grouper,
            grouping_prefix,
        }
    }

    pub async fn select(&self, ranked: &[ProcessedArticle]) -> Vec<ProcessedArticle> {
        let primary = match &self.grouper {
            Some(grouper) => self.grouped(grouper.as_ref(), ranked).await,
            None => select_diverse(ranked, &self.policy),
        };
        let primary_len = primary.len();
        let selected = backfill(ranked, primary, &self.policy);
        info!(
            pool = ranked.len(),
            primary = primary_len,
            selected = selected.len(),
            target = self.policy.target,
            "selection finished"
        );
        selected
    }

    async fn grouped(
        &self,
        grouper: &dyn Grouper,
        ranked: &[ProcessedArticle],
    ) -> Vec<ProcessedArticle> {
        let prefix = &ranked[..ranked.len().min(self.grouping_prefix)];
        match grouper.group(prefix, self.policy.target).await {
            Ok(ids) => {
                let mut state = SelectionState::default();
                for id in ids {
                    if state.is_full(&self.policy) {
                        break;
                    }
                    if let Some(article) = prefix.get(id) {
                        state.try_accept(article, &self.policy);
                    }
                }
                state.into_results()
            }
            Err(error) => {
                warn!(error = %error, "grouping failed, using keyword selection");
                select_diverse(ranked, &self.policy)
            }
        }
    }
}

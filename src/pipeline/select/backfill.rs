//! Tops an under-filled selection up from the ranked pool.

use tracing::debug;

use crate::pipeline::process::ProcessedArticle;

use super::diversity::{SelectionPolicy, SelectionState};

/// Continues from `primary` over `ranked` in order, under the same outlet cap
/// and dissimilarity rule. May return fewer than `target` when the pool runs out.
#[must_use]
pub fn backfill(
    ranked: &[ProcessedArticle],
    primary: Vec<ProcessedArticle>,
    policy: &SelectionPolicy,
) -> Vec<ProcessedArticle> {
    let mut state = SelectionState::seeded(primary);
    let before = state.len();
    for article in ranked {
        if state.is_full(policy) {
            break;
        }
        state.try_accept(article, policy);
    }
    debug!(added = state.len() - before, total = state.len(), "backfill finished");
    state.into_results()
}

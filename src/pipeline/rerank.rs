//! Keyword-driven reranking of processed articles.

use super::keywords::KeywordTables;
use super::process::ProcessedArticle;

const PENALTY_WEIGHT: f64 = 0.8;
/// Scales a unix timestamp so recency only separates otherwise equal scores.
const RECENCY_SCALE: f64 = 1e-12;

/// Title bonus hits minus weighted penalty hits, plus a tiny recency term.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn score(article: &ProcessedArticle, keywords: &KeywordTables) -> f64 {
    let bonus = keywords.title_bonus.distinct_hits(&article.title) as f64;
    let penalty = keywords.title_penalty.distinct_hits(&article.title) as f64;
    let recency = article.published_at.timestamp() as f64 * RECENCY_SCALE;
    bonus - PENALTY_WEIGHT * penalty + recency
}

/// Sorts by score descending, newer first on ties, then by link.
#[must_use]
pub fn rerank(
    articles: Vec<ProcessedArticle>,
    keywords: &KeywordTables,
) -> Vec<ProcessedArticle> {
    let mut scored: Vec<(f64, ProcessedArticle)> = articles
        .into_iter()
        .map(|article| (score(&article, keywords), article))
        .collect();
    scored.sort_by(|(score_a, a), (score_b, b)| {
        score_b
            .total_cmp(score_a)
            .then_with(|| b.published_at.cmp(&a.published_at))
            .then_with(|| a.link.cmp(&b.link))
    });
    scored.into_iter().map(|(_, article)| article).collect()
}

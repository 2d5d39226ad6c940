//! Token-set Jaccard similarity between article summaries.

use std::collections::HashSet;

/// Words too common in this beat to say anything about topic overlap.
const STOPWORDS: &[&str] = &[
    "서울", "지역", "정부", "시장", "경제", "기자", "정책", "부동산", "아파트", "관련", "위해",
    "대한", "따르면", "밝혔다", "전망", "예상", "올해", "내년",
];

/// Lowercased word tokens longer than one character, minus stopwords.
#[must_use]
pub fn tokenize(text: &str) -> HashSet<String> {
    let spaced: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    spaced
        .split_whitespace()
        .filter(|token| token.chars().count() > 1 && !STOPWORDS.contains(token))
        .map(str::to_string)
        .collect()
}

/// `|a ∩ b| / |a ∪ b|`; `None` when either side has no tokens.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> Option<f64> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    let shared = a.intersection(b).count();
    let union = a.len() + b.len() - shared;
    Some(shared as f64 / union as f64)
}

/// Similar when the Jaccard index reaches `threshold`; incomparable pairs are not similar.
#[must_use]
pub fn token_sets_similar(a: &HashSet<String>, b: &HashSet<String>, threshold: f64) -> bool {
    jaccard(a, b).is_some_and(|index| index >= threshold)
}

#[must_use]
pub fn are_similar(a: &str, b: &str, threshold: f64) -> bool {
    token_sets_similar(&tokenize(a), &tokenize(b), threshold)
}

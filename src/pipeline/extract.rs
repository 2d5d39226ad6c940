//! Main-text extraction from article HTML.

use std::io::Cursor;

use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::util::text::{collapse_whitespace, word_count};

/// Article-body containers used by the outlets on the whitelist, tried in order.
const BODY_SELECTORS: &[&str] = &[
    "#dic_area",
    ".newsct_article",
    "article",
    "#articleBody",
    ".article_body",
    ".art_txt",
    ".article-txt",
    "#news_view",
    "#content",
    ".view_con",
    ".text_area",
];

/// Readability pass first, structural selectors second.
#[derive(Debug, Clone)]
pub struct BodyExtractor {
    min_words: usize,
    selectors: Vec<Selector>,
}

impl BodyExtractor {
    #[must_use]
    pub fn new(min_words: usize) -> Self {
        let selectors = BODY_SELECTORS
            .iter()
            .filter_map(|css| Selector::parse(css).ok())
            .collect();
        Self {
            min_words,
            selectors,
        }
    }

    /// Returns the article text, or an empty string when nothing reaches the
    /// word threshold.
    #[must_use]
    pub fn extract(&self, url: &str, html: &str) -> String {
        if let Some(text) = self.readability(url, html) {
            return text;
        }
        self.structural(html).unwrap_or_default()
    }

    fn readability(&self, url: &str, html: &str) -> Option<String> {
        let parsed = Url::parse(url).ok()?;
        let mut reader = Cursor::new(html.as_bytes());
        match readability::extractor::extract(&mut reader, &parsed) {
            Ok(product) => {
                let text = collapse_whitespace(&product.text);
                (word_count(&text) >= self.min_words).then_some(text)
            }
            Err(error) => {
                debug!(%url, error = ?error, "readability extraction failed");
                None
            }
        }
    }

    fn structural(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        self.selectors.iter().find_map(|selector| {
            let node = document.select(selector).next()?;
            let text = node
                .text()
                .map(str::trim)
                .filter(|fragment| !fragment.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            (word_count(&text) >= self.min_words).then_some(text)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        (0..n)
            .map(|i| format!("단어{i}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn structural_fallback_finds_body_container() {
        let html = format!(
            r#"<html><body><nav>메뉴</nav><div id="dic_area">{}</div></body></html>"#,
            words(80)
        );
        let extractor = BodyExtractor::new(60);
        let text = extractor.structural(&html).expect("container found");
        assert_eq!(word_count(&text), 80);
        assert!(text.starts_with("단어0"));
    }

    #[test]
    fn structural_fallback_skips_short_containers() {
        let html = format!(
            r#"<html><body><article>짧은 글</article><div class="article_body">{}</div></body></html>"#,
            words(70)
        );
        let text = BodyExtractor::new(60)
            .structural(&html)
            .expect("second container used");
        assert!(!text.contains("짧은"));
    }

    #[test]
    fn extract_returns_empty_when_everything_is_short() {
        let html = "<html><body><article>짧은 글 하나</article></body></html>";
        let text = BodyExtractor::new(60).extract("https://www.yna.co.kr/view/1", html);
        assert!(text.is_empty());
    }

    #[test]
    fn extract_returns_long_article_text() {
        let html = format!(
            "<html><head><title>t</title></head><body><article><p>{}</p></article></body></html>",
            words(120)
        );
        let text = BodyExtractor::new(60).extract("https://www.yna.co.kr/view/1", &html);
        assert!(word_count(&text) >= 60);
    }
}

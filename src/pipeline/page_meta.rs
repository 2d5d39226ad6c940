//! Readers for the metadata an article page carries in its `<head>`.

use chrono::{DateTime, FixedOffset};
use scraper::{ElementRef, Html, Selector};

use crate::util::{text::collapse_whitespace, time::parse_page_datetime_kst};

const PUBLISHED_SELECTORS: &[&str] = &[
    "meta[property='article:published_time']",
    "meta[name='date']",
    "time",
];

/// What an aggregator page says about the article it mirrors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatorMeta {
    /// Publisher name shown in the aggregator's header logo.
    pub publisher: Option<String>,
    /// `link[rel=canonical]` target.
    pub canonical: Option<String>,
    pub published_at: Option<DateTime<FixedOffset>>,
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn first<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = selector(css)?;
    document.select(&selector).next()
}

fn content_or_text(element: ElementRef<'_>) -> String {
    let value = element
        .value()
        .attr("content")
        .or_else(|| element.value().attr("datetime"))
        .map(str::to_string)
        .unwrap_or_else(|| element.text().collect());
    value.trim().to_string()
}

fn published_at(document: &Html) -> Option<DateTime<FixedOffset>> {
    PUBLISHED_SELECTORS.iter().find_map(|css| {
        let element = first(document, css)?;
        parse_page_datetime_kst(&content_or_text(element))
    })
}

/// Full headline: `og:title`, otherwise `<title>`.
#[must_use]
pub fn page_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let og = first(&document, "meta[property='og:title']")
        .and_then(|element| element.value().attr("content"))
        .map(collapse_whitespace)
        .filter(|title| !title.is_empty());
    og.or_else(|| {
        first(&document, "title")
            .map(|element| collapse_whitespace(&element.text().collect::<String>()))
            .filter(|title| !title.is_empty())
    })
}

/// Reads publisher, canonical link, and publish time from a Naver News page.
#[must_use]
pub fn aggregator_meta(html: &str) -> AggregatorMeta {
    let document = Html::parse_document(html);
    let publisher = first(&document, ".media_end_head_top_logo img[alt]")
        .and_then(|element| element.value().attr("alt"))
        .map(str::trim)
        .filter(|alt| !alt.is_empty())
        .map(str::to_string);
    let canonical = first(&document, "link[rel='canonical']")
        .and_then(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(str::to_string);

    AggregatorMeta {
        publisher,
        canonical,
        published_at: published_at(&document),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    const NAVER_PAGE: &str = r#"
        <html><head>
          <link rel="canonical" href="https://www.yna.co.kr/view/AKR20261013000100003?input=1195m">
          <meta property="article:published_time" content="2026-10-13T08:05:00+09:00">
          <meta property="og:title" content="서울 아파트값  12주째 상승">
          <title>네이버 뉴스</title>
        </head><body>
          <div class="media_end_head_top_logo"><img alt=" 연합뉴스 " src="logo.png"></div>
        </body></html>
    "#;

    #[test]
    fn reads_aggregator_metadata() {
        let meta = aggregator_meta(NAVER_PAGE);
        assert_eq!(meta.publisher.as_deref(), Some("연합뉴스"));
        assert_eq!(
            meta.canonical.as_deref(),
            Some("https://www.yna.co.kr/view/AKR20261013000100003?input=1195m")
        );
        assert_eq!(meta.published_at.map(|dt| dt.hour()), Some(8));
    }

    #[test]
    fn aggregator_metadata_is_empty_for_plain_pages() {
        let meta = aggregator_meta("<html><body><p>본문</p></body></html>");
        assert_eq!(meta, AggregatorMeta::default());
    }

    #[test]
    fn title_prefers_og_title() {
        assert_eq!(page_title(NAVER_PAGE).as_deref(), Some("서울 아파트값 12주째 상승"));
        assert_eq!(
            page_title("<html><head><title> 전세가격 반등 </title></head></html>").as_deref(),
            Some("전세가격 반등")
        );
        assert_eq!(page_title("<html></html>"), None);
    }

    #[test]
    fn published_time_falls_through_selectors() {
        let html = r#"<html><head><meta name="date" content="garbage"></head>
            <body><time datetime="2026-10-13T01:00:00Z">어제</time></body></html>"#;
        let published = published_at(&Html::parse_document(html)).expect("time element parses");
        assert_eq!(published.hour(), 10);
    }
}

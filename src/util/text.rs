//! Text and link normalization helpers shared by the collector and the processors.

use scraper::Html;
use unicode_normalization::UnicodeNormalization;
use url::Url;

/// Collapses every whitespace run into a single space and trims both ends.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strips markup and entities from a search-API snippet.
///
/// Naver wraps query hits in `<b>` and escapes quotes as `&quot;`, so the
/// fragment is parsed as HTML and only its text nodes are kept.
#[must_use]
pub fn clean_markup(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let fragment = Html::parse_fragment(raw);
    let text: String = fragment.root_element().text().collect();
    collapse_whitespace(&text)
}

/// Normalizes a headline for display and keyword matching.
///
/// One leading bracketed tag (`[속보]`, `[단독]`) is dropped, as is a trailing
/// ` - <outlet>` suffix when `outlet_names` contains that outlet.
#[must_use]
pub fn normalize_title<'a, I>(title: &str, outlet_names: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let normalized: String = title.nfc().collect();
    let mut title = collapse_whitespace(&normalized);

    if title.starts_with('[') {
        if let Some(end) = title.find(']') {
            title = title[end + ']'.len_utf8()..].trim_start().to_string();
        }
    }

    if let Some(idx) = title.rfind('-') {
        let suffix = title[idx + 1..].trim();
        if outlet_names.into_iter().any(|name| name == suffix) {
            title = title[..idx].trim_end().to_string();
        }
    }

    title
}

/// Reduces a link to `scheme://host/path`, dropping query and fragment.
///
/// Links that do not parse are returned trimmed so that the caller can still
/// use them as a dedup key.
#[must_use]
pub fn normalize_link(link: &str) -> String {
    let trimmed = link.trim();
    match Url::parse(trimmed) {
        Ok(mut url) => {
            url.set_query(None);
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => trimmed
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    }
}

/// Lowercase host of `link`, or an empty string when it has none.
#[must_use]
pub fn host_of(link: &str) -> String {
    Url::parse(link.trim())
        .ok()
        .and_then(|url| url.host_str().map(str::to_lowercase))
        .unwrap_or_default()
}

/// Whitespace-delimited word count.
#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

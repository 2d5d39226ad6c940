//! Plain-text and HTML renderings of the final article list.

use std::fmt::Write as _;

use ammonia::{Builder, clean_text};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::pipeline::process::ProcessedArticle;
use crate::util::time::kst;

const STYLES: &str = "<style>\
body { font-family: sans-serif; margin: 20px; }\
h1 { font-size: 1.3em; }\
h2 { font-size: 1.1em; margin-bottom: 5px; color: #000; }\
p { font-size: 0.95em; color: #333; margin-top: 5px; line-height: 1.5; }\
span { font-size: 0.85em; color: #777; }\
div.article-item { border-bottom: 1px solid #eee; padding-bottom: 15px; margin-bottom: 15px; }\
div.links-section { margin-top: 30px; border-top: 2px solid #000; padding-top: 15px; }\
div.links-section p { font-size: 0.9em; margin: 8px 0; }\
div.links-section a { color: #007bff; text-decoration: none; }\
</style>";

/// Rendered payloads for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Digest {
    pub subject: String,
    pub text: String,
    pub html: String,
    #[serde(skip)]
    pub articles: Vec<ProcessedArticle>,
}

impl Digest {
    /// Renders both payloads from the same ordered list.
    #[must_use]
    pub fn render(
        articles: Vec<ProcessedArticle>,
        run_at: DateTime<FixedOffset>,
        version: &str,
    ) -> Self {
        let subject = subject_line(run_at, articles.len());
        let text = render_text(&subject, version, &articles);
        let html = render_html(&subject, &articles);
        Self {
            subject,
            text,
            html,
            articles,
        }
    }
}

#[must_use]
pub fn subject_line(run_at: DateTime<FixedOffset>, count: usize) -> String {
    let date = run_at.with_timezone(&kst()).format("%Y-%m-%d");
    format!("📰 [{date}] 부동산 뉴스 요약 ({count}건)")
}

fn render_text(subject: &str, version: &str, articles: &[ProcessedArticle]) -> String {
    let mut out = format!("{subject} · {version}\n```text\n");
    for (n, article) in articles.iter().enumerate() {
        let _ = writeln!(out, "{}) 기사제목: {}", n + 1, article.title);
        let _ = writeln!(out, "   본문 요약: {}", article.summary);
        let _ = writeln!(out, "   ({}, {})\n", article.date, article.outlet);
    }
    out.push_str("```\n\n근거 링크\n");
    for (n, article) in articles.iter().enumerate() {
        let _ = writeln!(out, "- ({}) {}", n + 1, article.link);
    }
    out
}

/// Text-node escaping: markup in article fields is dropped, entities are escaped.
fn text(cleaner: &Builder<'_>, value: &str) -> String {
    cleaner.clean(value).to_string()
}

fn render_html(subject: &str, articles: &[ProcessedArticle]) -> String {
    let cleaner = Builder::empty();
    let mut out = format!(
        "<html><head><meta charset=\"utf-8\">{STYLES}</head><body>\n<h1>{}</h1>\n",
        text(&cleaner, subject)
    );
    for article in articles {
        let _ = write!(
            out,
            "<div class='article-item'>\n<h2>[{}] {}</h2>\n<p>{}</p>\n<span>({})</span>\n</div>\n",
            text(&cleaner, &article.outlet),
            text(&cleaner, &article.title),
            text(&cleaner, &article.summary),
            text(&cleaner, &article.date),
        );
    }
    out.push_str("<div class='links-section'>\n<p><b>기사 링크 :</b></p>\n");
    for (n, article) in articles.iter().enumerate() {
        let _ = writeln!(
            out,
            "<p>{}) <a href=\"{}\" target=\"_blank\">{}</a></p>",
            n + 1,
            clean_text(&article.link),
            text(&cleaner, &article.link),
        );
    }
    out.push_str("</div>\n</body></html>\n");
    out
}

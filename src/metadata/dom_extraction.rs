//! DOM-based Metadata Sources
//!
//! The last two tiers of the metadata chain: semantic HTML elements
//! (`<h1>`, `<time>`, `rel="author"`, `<title>`) and heuristic class-name
//! matches (`.byline`, `.entry-title`, `.post-date`). Also holds the
//! per-field cleanup applied to whatever source wins.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;

use super::Source;
use crate::patterns::TITLE_SITE_SUFFIX;

/// Leading "By" / "Written by" in bylines.
#[allow(clippy::expect_used)]
static BYLINE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(written\s+|posted\s+|words\s+)?by[:\s]+").expect("valid regex")
});

// === Semantic HTML ===

pub static TITLE_SEMANTIC: &[Source] = &[
    Source::Text("article h1"),
    Source::Text("h1"),
    Source::Text("head > title"),
];

pub static DESCRIPTION_SEMANTIC: &[Source] = &[Source::Text("article header p")];

pub static AUTHOR_SEMANTIC: &[Source] = &[
    Source::Text("[rel='author']"),
    Source::Text("[itemprop='author'] [itemprop='name']"),
    Source::Text("[itemprop='author']"),
    Source::Text("address"),
];

pub static DATE_SEMANTIC: &[Source] = &[
    Source::Attr("article time[datetime]", "datetime"),
    Source::Attr("time[datetime]", "datetime"),
    Source::Text("time"),
];

pub static IMAGE_SEMANTIC: &[Source] = &[
    Source::Attr("link[rel='image_src']", "href"),
    Source::Attr("article figure img[src]", "src"),
    Source::Attr("article img[src]", "src"),
];

pub static SITE_NAME_SEMANTIC: &[Source] = &[];

// === Class-name heuristics ===

pub static TITLE_HEURISTIC: &[Source] = &[Source::Text(
    ".entry-title, .post-title, .article-title, .headline, .story-title, .page-title",
)];

pub static DESCRIPTION_HEURISTIC: &[Source] = &[Source::Text(
    ".standfirst, .dek, .subheadline, .article-summary, .summary, .excerpt, .lede",
)];

pub static AUTHOR_HEURISTIC: &[Source] = &[
    Source::Text(".author-name, .byline-name, .author a, .byline a"),
    Source::Text(".byline, .author, .by-line, .post-author, .entry-author, .writer"),
];

pub static DATE_HEURISTIC: &[Source] = &[Source::Text(
    ".published, .pubdate, .post-date, .entry-date, .article-date, .date, .timestamp",
)];

pub static IMAGE_HEURISTIC: &[Source] = &[Source::Attr(
    ".featured-image img[src], .hero img[src], .lead-image img[src], .post-thumbnail img[src]",
    "src",
)];

pub static SITE_NAME_HEURISTIC: &[Source] = &[Source::Text(".site-title, .site-name, .logo-text, .brand")];

// === Field cleanup ===

/// Strip a trailing ` | Site` / ` - Site` suffix when the remaining prefix is
/// longer than `min_prefix` characters.
#[must_use]
pub fn strip_title_suffix(title: &str, min_prefix: usize) -> String {
    TITLE_SITE_SUFFIX
        .captures(title)
        .and_then(|caps| caps.name("prefix"))
        .map(|m| m.as_str().trim())
        .filter(|prefix| prefix.chars().count() > min_prefix)
        .unwrap_or(title)
        .to_string()
}

/// Remove "By" prefixes from a byline.
#[must_use]
pub fn clean_author(author: &str) -> Option<String> {
    let cleaned = BYLINE_PREFIX.replace(author, "");
    let cleaned = cleaned.trim().trim_end_matches([',', '|', '-']).trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

/// Normalize a date string to RFC 3339 UTC when it parses; date-only values
/// become `YYYY-MM-DD`. Unparseable values are returned trimmed.
#[must_use]
pub fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Secs, true);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return dt.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Secs, true);
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return naive.and_utc().to_rfc3339_opts(SecondsFormat::Secs, true);
        }
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.format("%Y-%m-%d").to_string();
        }
    }
    raw.to_string()
}

//! Heuristic extraction engine.
//!
//! Runs one HTML document through the whole pipeline:
//!
//! ```text
//! parse -> metadata -> noise filter -> locate -> headings/quotes -> text -> Content
//! ```
//!
//! Metadata is read before filtering since the filter drops `<script>`
//! (JSON-LD) and page chrome that carries bylines.

use tracing::debug;
use url::Url;

use crate::content::{Content, Metadata};
use crate::dom::{self, Selection};
use crate::error::{Error, Result};
use crate::filter::{self, FilterReport};
use crate::locator::{self, Strategy};
use crate::metadata;
use crate::normalize;
use crate::options::ExtractOptions;
use crate::structure;
use crate::url_utils;

/// Attributes kept in `htmlStructured`.
const STRUCTURED_ATTRIBUTES: &[&str] = &["href", "src", "alt"];

/// Fallback title when neither metadata nor the content has one.
const UNTITLED: &str = "Untitled";

/// How an extraction went, for profiling and debug logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostics {
    pub filter: FilterReport,
    pub strategy: Strategy,
}

/// Extract story content from an HTML document.
///
/// `url` is the page's final URL when known; it anchors relative image URLs
/// and the site-name fallback.
///
/// # Errors
/// [`Error::ParseError`] for an empty document, [`Error::NoContent`] when
/// nothing readable is left after filtering.
pub fn extract(html: &str, url: Option<&str>, opts: &ExtractOptions) -> Result<Content> {
    extract_with_diagnostics(html, url, opts).map(|(content, _)| content)
}

/// [`extract`], also returning what the filter and locator did.
pub fn extract_with_diagnostics(
    html: &str,
    url: Option<&str>,
    opts: &ExtractOptions,
) -> Result<(Content, Diagnostics)> {
    if html.trim().is_empty() {
        return Err(Error::ParseError("empty document".to_string()));
    }
    let base = url.and_then(url_utils::parse_url);

    let doc = dom::parse(html);
    let metadata = metadata::extract_metadata(&doc, base.as_ref(), opts);

    let report = filter::filter(&doc, opts);
    let located = locator::locate(&doc, opts);
    let node = &located.node;

    let headings = structure::extract_headings(node, opts);
    let quotes = structure::extract_quotes(node, opts);
    let text_only = normalize::render_text(node, opts);
    if text_only.is_empty() {
        return Err(Error::NoContent);
    }

    let title = metadata
        .title
        .clone()
        .or_else(|| headings.iter().find(|h| h.level == 1).map(|h| h.text.clone()))
        .unwrap_or_else(|| UNTITLED.to_string());

    let mut content = Content {
        title,
        text_only,
        metadata,
        headings,
        quotes,
        ..Content::default()
    };
    content.refresh_counts(opts.words_per_minute);
    content.html_structured = structured_html(&content, node, base.as_ref());

    debug!(
        words = content.word_count,
        headings = content.headings.len(),
        quotes = content.quotes.len(),
        strategy = ?located.strategy,
        "extracted content"
    );

    Ok((
        content,
        Diagnostics {
            filter: report,
            strategy: located.strategy,
        },
    ))
}

/// Self-contained HTML document: title, byline, and the cleaned content.
///
/// Every attribute except `href`, `src` and `alt` is dropped; relative
/// links and image sources are made absolute when `base` is known.
#[must_use]
pub fn structured_html(content: &Content, node: &Selection, base: Option<&Url>) -> String {
    for element in dom::descendants(node) {
        dom::retain_attributes(&element, STRUCTURED_ATTRIBUTES);
        for attr in ["href", "src"] {
            if let Some(value) = dom::get_attribute(&element, attr) {
                if let Some(absolute) = url_utils::resolve(&value, base) {
                    element.set_attr(attr, &absolute);
                }
            }
        }
    }
    let body = dom::inner_html(node);
    let title = escape_html(&content.title);

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n<article>\n<header>\n<h1>{title}</h1>\n<p>{byline}</p>\n</header>\n{body}\n</article>\n</body>\n</html>\n",
        byline = escape_html(&byline(&content.metadata, &content.estimated_read_time)),
    )
}

/// `By Author · 2024-01-15 · 3 minutes`, skipping missing parts.
#[must_use]
pub fn byline(metadata: &Metadata, read_time: &str) -> String {
    let author = metadata.author.as_ref().map(|a| format!("By {a}"));
    [author, metadata.published_date.clone(), Some(read_time.to_string())]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" · ")
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Noise-filtered body HTML, cut to at most `max_chars` characters.
///
/// Used to shrink a page before handing it to an extraction agent.
#[must_use]
pub fn prepare_for_agent(html: &str, max_chars: usize, opts: &ExtractOptions) -> String {
    let doc = dom::parse(html);
    filter::filter(&doc, opts);
    let body = doc.select("body");
    let filtered = if body.exists() {
        dom::inner_html(&body).to_string()
    } else {
        doc.html().to_string()
    };
    let filtered = filtered.trim();
    match filtered.char_indices().nth(max_chars) {
        Some((cut, _)) => filtered[..cut].to_string(),
        None => filtered.to_string(),
    }
}

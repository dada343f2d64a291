//! Headings and quotes under the located content node.

use dom_query::{NodeId, NodeRef, Selection};

use crate::content::{Heading, Quote};
use crate::dom;
use crate::normalize;
use crate::options::ExtractOptions;
use crate::patterns::{NOISE_LINE, NOISE_TEXT};

const HEADING_TAGS: &str = "h1, h2, h3, h4, h5, h6";

/// Every heading in document order, skipping short or boilerplate text.
#[must_use]
pub fn extract_headings(content: &Selection, opts: &ExtractOptions) -> Vec<Heading> {
    dom::select_all(content, HEADING_TAGS)
        .iter()
        .filter_map(|heading| {
            let level = heading_level(heading)?;
            let text = normalize::selection_text(heading)?;
            if text.chars().count() < opts.min_heading_len || is_noise(&text) {
                return None;
            }
            Some(Heading { level, text })
        })
        .collect()
}

fn heading_level(sel: &Selection) -> Option<u8> {
    let tag = dom::tag_name(sel)?;
    let level = tag.strip_prefix('h')?.parse::<u8>().ok()?;
    (1..=6).contains(&level).then_some(level)
}

fn is_noise(text: &str) -> bool {
    NOISE_LINE.is_match(text) || (text.chars().count() < 50 && NOISE_TEXT.is_match(text))
}

/// Every block quote longer than `min_quote_len`, with its citation.
///
/// The citation comes from a nested `<cite>` (or `<footer>`) and is not
/// repeated in the quote text. A `cite` attribute URL is the fallback.
#[must_use]
pub fn extract_quotes(content: &Selection, opts: &ExtractOptions) -> Vec<Quote> {
    dom::select_all(content, "blockquote")
        .iter()
        .filter_map(|quote| {
            let cite_node = quote.select("cite, footer").first();
            let nested_cite = normalize::selection_text(&cite_node).and_then(|c| clean_cite(&c));

            let text = if nested_cite.is_some() {
                text_without(quote, &cite_node)?
            } else {
                normalize::selection_text(quote)?
            };
            let cite = nested_cite.or_else(|| dom::non_empty_attribute(quote, "cite"));
            (text.chars().count() > opts.min_quote_len).then_some(Quote { text, cite })
        })
        .collect()
}

fn clean_cite(cite: &str) -> Option<String> {
    let cite = cite.trim_start_matches(['—', '–', '-', ' ']).trim();
    (!cite.is_empty()).then(|| cite.to_string())
}

/// Quote text with the citation node left out, minus a trailing dash.
fn text_without(quote: &Selection, cite_node: &Selection) -> Option<String> {
    let skip = cite_node.nodes().first().map(|node| node.id);
    let mut raw = String::new();
    for node in quote.nodes() {
        collect_text_skipping(node, skip, &mut raw);
    }
    let text = normalize::normalize_text(raw.trim().trim_end_matches(['—', '–', '-']).trim());
    (!text.is_empty()).then_some(text)
}

fn collect_text_skipping(node: &NodeRef, skip: Option<NodeId>, out: &mut String) {
    let mut child = node.first_child();
    while let Some(current) = child {
        if Some(current.id) != skip {
            if current.is_text() {
                out.push_str(&current.text());
            } else if current.is_element() {
                collect_text_skipping(&current, skip, out);
            }
        }
        child = current.next_sibling();
    }
}

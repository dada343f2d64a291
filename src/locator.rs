//! Content Locator
//!
//! Picks the single region of a filtered document that holds the narrative
//! body. The decision is an explicit three-tier evaluation:
//!
//! 1. ranked selector candidates, accepting the first that passes both the
//!    text-length gate and the paragraph-count gate;
//! 2. a density scan over container elements, keeping the best score above
//!    the floor;
//! 3. the document body.
//!
//! After selection the chosen node is deep-cleaned of in-content noise.

use dom_query::{Document, Selection};
use tracing::debug;

use crate::dom;
use crate::options::ExtractOptions;
use crate::patterns::NAV_LINK_TEXT;
use crate::selector::content::{CONTENT_SELECTORS, DENSITY_CONTAINERS, PARAGRAPH_ELEMENTS};
use crate::selector::{self, noise};

/// Which tier produced the located node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Accepted from the ranked selector list.
    Selector(&'static str),
    /// Best density-scan candidate with its score.
    Density { score: usize },
    /// Nothing qualified; the body was used.
    Body,
}

/// The located content node and how it was found.
pub struct Located<'a> {
    pub node: Selection<'a>,
    pub strategy: Strategy,
}

/// A density-scan candidate.
struct Scored<'a> {
    node: Selection<'a>,
    score: usize,
}

/// Locate the content node of a (filtered) document and deep-clean it.
#[must_use]
pub fn locate<'a>(doc: &'a Document, opts: &ExtractOptions) -> Located<'a> {
    let located = select_candidate(doc, opts)
        .or_else(|| density_candidate(doc, opts))
        .unwrap_or_else(|| Located {
            node: body(doc),
            strategy: Strategy::Body,
        });

    debug!(strategy = ?located.strategy, "content located");
    deep_clean(&located.node, opts);
    located
}

fn body(doc: &Document) -> Selection<'_> {
    let body = doc.select("body");
    if body.exists() {
        body.first()
    } else {
        doc.select("html").first()
    }
}

/// Tier 1: first ranked selector candidate passing both gates.
fn select_candidate<'a>(doc: &'a Document, opts: &ExtractOptions) -> Option<Located<'a>> {
    let root = doc.select("html");
    CONTENT_SELECTORS.iter().find_map(|css| {
        dom::select_all(&root, css)
            .into_iter()
            .find(|candidate| passes_gates(candidate, opts))
            .map(|node| Located {
                node,
                strategy: Strategy::Selector(css),
            })
    })
}

/// Text-length gate and paragraph-count gate.
#[must_use]
pub fn passes_gates(candidate: &Selection, opts: &ExtractOptions) -> bool {
    dom::visible_text_len(candidate) > opts.min_content_length
        && candidate.select(PARAGRAPH_ELEMENTS).length() >= opts.min_paragraphs
}

/// Density score: `100 * paragraphs + paragraph text length`, over direct
/// paragraph children.
#[must_use]
pub fn density_score(container: &Selection) -> (usize, usize) {
    let paragraphs = dom::children_with_tag(container, "p");
    let text_len: usize = paragraphs.iter().map(dom::visible_text_len).sum();
    (paragraphs.len(), 100 * paragraphs.len() + text_len)
}

/// Tier 2: highest-scoring container above the floor.
///
/// A winner must also clear the text-length gate, so a dense cluster of
/// short paragraphs never displaces the body fallback.
fn density_candidate<'a>(doc: &'a Document, opts: &ExtractOptions) -> Option<Located<'a>> {
    let root = doc.select("html");
    let best = dom::select_all(&root, DENSITY_CONTAINERS)
        .into_iter()
        .filter_map(|node| {
            let (paragraphs, score) = density_score(&node);
            (paragraphs >= opts.density_min_paragraphs
                && score > opts.density_min_score
                && dom::visible_text_len(&node) >= opts.min_content_length)
                .then_some(Scored { node, score })
        })
        .fold(None::<Scored<'a>>, |best, current| match best {
            Some(best) if best.score >= current.score => Some(best),
            _ => Some(current),
        })?;

    Some(Located {
        node: best.node,
        strategy: Strategy::Density { score: best.score },
    })
}

/// Remove in-content noise blocks and short navigational anchors.
pub fn deep_clean(node: &Selection, opts: &ExtractOptions) -> usize {
    let mut removed = selector::apply_rules(node, noise::IN_CONTENT_RULES);
    for anchor in dom::select_all(node, "a") {
        if is_navigational_anchor(&anchor, opts) {
            anchor.remove();
            removed += 1;
        }
    }
    removed
}

/// Short anchor labelled "read more"/"next"/... or a short fragment link.
#[must_use]
pub fn is_navigational_anchor(anchor: &Selection, opts: &ExtractOptions) -> bool {
    let text = dom::text_content(anchor);
    let text = text.trim();
    if text.chars().count() >= opts.nav_link_max_len {
        return false;
    }
    if NAV_LINK_TEXT.is_match(text) {
        return true;
    }
    dom::get_attribute(anchor, "href").is_some_and(|href| href.trim_start().starts_with('#'))
}

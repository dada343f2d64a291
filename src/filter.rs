//! Noise Filter
//!
//! Removes structural boilerplate, short noise-text fragments, decorative
//! images and the empty containers they leave behind. The filter runs its
//! passes until a pass removes nothing, so its output is a fixed point:
//! filtering an already-filtered tree removes nothing further.

use dom_query::{Document, Selection};
use tracing::trace;

use crate::dom;
use crate::options::ExtractOptions;
use crate::patterns::{DECORATIVE_IMAGE, NOISE_TEXT};
use crate::selector::{self, noise};

/// Upper bound on filter passes; real pages settle in two or three.
const MAX_PASSES: usize = 8;

/// Inline elements a "leaf-ish" node may still contain.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "em", "i", "kbd", "mark", "q", "s",
    "small", "span", "strong", "sub", "sup", "time", "u", "br", "wbr",
];

/// Block containers removed when they hold no text and no images.
const EMPTY_CONTAINER_TAGS: &str =
    "div, section, article, aside, header, footer, nav, p, span, ul, ol, li, figure, blockquote, table, tbody, tr, td, dl, h1, h2, h3, h4, h5, h6, a, strong, em, b, i";

/// Counts of removals per pass category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterReport {
    pub structural: usize,
    pub noise_text: usize,
    pub images: usize,
    pub empty: usize,
    pub passes: usize,
}

impl FilterReport {
    #[must_use]
    pub fn total(&self) -> usize {
        self.structural + self.noise_text + self.images + self.empty
    }
}

/// Filter the whole document in place.
pub fn filter(doc: &Document, opts: &ExtractOptions) -> FilterReport {
    filter_selection(&doc.select("html"), opts)
}

/// Filter everything under `root` in place.
pub fn filter_selection(root: &Selection, opts: &ExtractOptions) -> FilterReport {
    let mut report = FilterReport::default();
    for _ in 0..MAX_PASSES {
        let structural = selector::apply_rules(root, noise::STRUCTURAL_RULES);
        let noise_text = remove_noise_text(root, opts);
        let images = remove_decorative_images(root);
        let empty = remove_empty_containers(root);

        report.structural += structural;
        report.noise_text += noise_text;
        report.images += images;
        report.empty += empty;
        report.passes += 1;

        if structural + noise_text + images + empty == 0 {
            break;
        }
    }
    trace!(
        structural = report.structural,
        noise_text = report.noise_text,
        images = report.images,
        empty = report.empty,
        passes = report.passes,
        "noise filter finished"
    );
    report
}

/// Whether the element only holds text and inline markup.
#[must_use]
pub fn is_leafish(sel: &Selection) -> bool {
    sel.children()
        .nodes()
        .iter()
        .all(|child| {
            child
                .node_name()
                .is_some_and(|name| INLINE_TAGS.contains(&name.as_ref()))
        })
}

/// Remove leaf-ish nodes whose short text is a boilerplate phrase.
pub fn remove_noise_text(root: &Selection, opts: &ExtractOptions) -> usize {
    let mut removed = 0;
    for sel in dom::descendants(root) {
        if dom::is_one_of_tags(&sel, &["html", "head", "body", "title", "meta"]) {
            continue;
        }
        if !selector::is_attached(&sel) || !is_leafish(&sel) {
            continue;
        }
        let text = dom::text_content(&sel);
        let text = text.trim();
        if text.is_empty() || text.chars().count() >= opts.noise_text_max_len {
            continue;
        }
        if NOISE_TEXT.is_match(text) {
            sel.remove();
            removed += 1;
        }
    }
    removed
}

/// Whether an image is decorative: no `src`, or icon/logo/pixel markers.
#[must_use]
pub fn is_decorative_image(img: &Selection) -> bool {
    let src = dom::get_attribute(img, "src")
        .or_else(|| dom::get_attribute(img, "data-src"))
        .unwrap_or_default();
    if src.trim().is_empty() {
        return true;
    }
    let alt = dom::get_attribute(img, "alt").unwrap_or_default();
    DECORATIVE_IMAGE.is_match(&src) || DECORATIVE_IMAGE.is_match(&alt)
}

/// Remove decorative and placeholder images.
pub fn remove_decorative_images(root: &Selection) -> usize {
    let mut removed = 0;
    for img in dom::select_all(root, "img") {
        if is_decorative_image(&img) {
            img.remove();
            removed += 1;
        }
    }
    removed
}

/// Remove block containers with no text and no images.
///
/// Runs in reverse document order so children are judged before their
/// parents and a chain of nested empty wrappers disappears in one pass.
pub fn remove_empty_containers(root: &Selection) -> usize {
    let mut removed = 0;
    let candidates = dom::select_all(root, EMPTY_CONTAINER_TAGS);
    for sel in candidates.iter().rev() {
        if !selector::is_attached(sel) {
            continue;
        }
        if dom::text_content(sel).trim().is_empty() && !sel.select("img, picture, video").exists() {
            sel.remove();
            removed += 1;
        }
    }
    removed
}

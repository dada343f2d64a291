//! DOM Operations Adapter
//!
//! Thin helpers over the `dom_query` crate. Everything that walks or mutates
//! the parsed tree goes through these functions so the noise filter, the
//! locator and the extractors share one vocabulary.

pub use dom_query::{Document, NodeRef, Selection};

pub use tendril::StrTendril;

// === Parsing ===

/// Parse an HTML string into a document.
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

// === Attribute Operations ===

/// Get element ID attribute.
#[inline]
#[must_use]
pub fn id(sel: &Selection) -> Option<String> {
    sel.attr("id").map(|s| s.to_string())
}

/// Get element class attribute.
#[inline]
#[must_use]
pub fn class_name(sel: &Selection) -> Option<String> {
    sel.attr("class").map(|s| s.to_string())
}

/// Get any attribute value.
#[inline]
#[must_use]
pub fn get_attribute(sel: &Selection, name: &str) -> Option<String> {
    sel.attr(name).map(|s| s.to_string())
}

/// Get a trimmed, non-empty attribute value.
#[must_use]
pub fn non_empty_attribute(sel: &Selection, name: &str) -> Option<String> {
    sel.attr(name)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Get all attributes as key-value pairs.
///
/// Returns empty vector if node has no attributes or if selection is empty.
#[must_use]
pub fn get_all_attributes(sel: &Selection) -> Vec<(String, String)> {
    sel.nodes()
        .first()
        .map(|node| {
            node.attrs()
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

/// Whether any attribute name starts with `prefix` (e.g. `data-ad`).
#[must_use]
pub fn has_attribute_prefix(sel: &Selection, prefix: &str) -> bool {
    get_all_attributes(sel).iter().any(|(key, _)| key.starts_with(prefix))
}

/// Remove every attribute except those listed in `keep`.
pub fn retain_attributes(sel: &Selection, keep: &[&str]) {
    for (key, _) in get_all_attributes(sel) {
        if !keep.contains(&key.as_str()) {
            sel.remove_attr(&key);
        }
    }
}

/// Whitespace-separated `class` tokens followed by the `id`, if any.
#[must_use]
pub fn class_and_id_tokens(sel: &Selection) -> Vec<String> {
    let mut tokens: Vec<String> = class_name(sel)
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    if let Some(id) = id(sel) {
        let id = id.trim();
        if !id.is_empty() {
            tokens.push(id.to_string());
        }
    }
    tokens
}

// === Tag/Node Information ===

/// Get tag name (lowercase).
#[must_use]
pub fn tag_name(sel: &Selection) -> Option<String> {
    sel.nodes()
        .first()
        .and_then(dom_query::NodeRef::node_name)
        .map(|t| t.to_string())
}

/// Check if element is one of the specified tags.
#[must_use]
pub fn is_one_of_tags(sel: &Selection, tags: &[&str]) -> bool {
    tag_name(sel).is_some_and(|t| tags.contains(&t.as_str()))
}

/// Whether any ancestor of the selection matches the CSS selector.
#[must_use]
pub fn has_ancestor(sel: &Selection, css: &str) -> bool {
    let mut current = sel.parent();
    while current.exists() {
        if current.is(css) {
            return true;
        }
        current = current.parent();
    }
    false
}

// === Text Content ===

/// Get all text content of node and descendants.
#[inline]
#[must_use]
pub fn text_content(sel: &Selection) -> StrTendril {
    sel.text()
}

/// Get inner HTML content.
#[inline]
#[must_use]
pub fn inner_html(sel: &Selection) -> StrTendril {
    sel.inner_html()
}

/// Character count of the selection's text with whitespace runs collapsed.
#[must_use]
pub fn visible_text_len(sel: &Selection) -> usize {
    let text = text_content(sel);
    let mut count = 0;
    let mut in_space = true;
    for c in text.trim().chars() {
        if c.is_whitespace() {
            if !in_space {
                count += 1;
                in_space = true;
            }
        } else {
            count += 1;
            in_space = false;
        }
    }
    count
}

// === Querying ===

/// All descendants of the selection matching `css`, in document order.
#[must_use]
pub fn select_all<'a>(sel: &Selection<'a>, css: &str) -> Vec<Selection<'a>> {
    sel.select(css)
        .nodes()
        .iter()
        .map(|node| Selection::from(*node))
        .collect()
}

/// All element descendants in document order.
#[must_use]
pub fn descendants<'a>(sel: &Selection<'a>) -> Vec<Selection<'a>> {
    select_all(sel, "*")
}

/// Direct element children with the given tag.
#[must_use]
pub fn children_with_tag<'a>(sel: &Selection<'a>, tag: &str) -> Vec<Selection<'a>> {
    sel.children()
        .nodes()
        .iter()
        .map(|node| Selection::from(*node))
        .filter(|child| tag_name(child).as_deref() == Some(tag))
        .collect()
}

// === Tree Manipulation ===

/// Remove elements from tree.
#[inline]
pub fn remove(sel: &Selection) {
    sel.remove();
}

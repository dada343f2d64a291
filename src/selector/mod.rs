//! Selector Infrastructure
//!
//! Noise removal and content location are driven by static tables of rules.
//! A rule either names a CSS selector or a predicate over a single element;
//! the tables live in [`noise`] and [`content`], and the functions here are
//! the generic machinery that applies them to a tree.

use dom_query::Selection;

use crate::dom;

pub mod content;
pub mod noise;

/// A predicate rule over a single element.
///
/// Rules are plain functions so tables of them can be `static`.
pub type Rule = fn(&Selection) -> bool;

/// How a table entry picks elements.
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// Any element matched by the CSS selector.
    Css(&'static str),
    /// Any element the predicate accepts.
    Predicate(Rule),
}

/// Where a rule is allowed to remove elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Remove wherever the rule matches.
    Anywhere,
    /// Skip matches nested inside an article container.
    OutsideArticle,
}

/// One structural removal rule.
#[derive(Debug, Clone, Copy)]
pub struct NoiseRule {
    pub name: &'static str,
    pub matcher: Matcher,
    pub scope: Scope,
}

/// Selector for the article container used by [`Scope::OutsideArticle`].
pub const ARTICLE_CONTAINER: &str = "article, [role='article'], [itemprop='articleBody']";

/// Query for first element matching the rule.
///
/// Iterates through all descendants in document order and returns the first
/// element for which the rule returns true.
///
/// # Example
///
/// ```rust
/// use story_extractor::selector;
/// use story_extractor::dom;
///
/// let doc = dom::parse(r#"<div><p class="content">text</p></div>"#);
/// let root = doc.select("div");
///
/// fn has_content_class(sel: &dom_query::Selection) -> bool {
///     dom::class_name(sel).is_some_and(|c| c.contains("content"))
/// }
///
/// let result = selector::query(&root, has_content_class);
/// assert!(result.is_some());
/// ```
#[must_use]
pub fn query<'a>(root: &Selection<'a>, rule: Rule) -> Option<Selection<'a>> {
    dom::descendants(root).into_iter().find(|sel| rule(sel))
}

/// Query for all elements matching the rule, in document order.
#[must_use]
pub fn query_all<'a>(root: &Selection<'a>, rule: Rule) -> Vec<Selection<'a>> {
    dom::descendants(root).into_iter().filter(|sel| rule(sel)).collect()
}

/// Elements under `root` picked by the matcher, in document order.
#[must_use]
pub fn matches<'a>(root: &Selection<'a>, matcher: Matcher) -> Vec<Selection<'a>> {
    match matcher {
        Matcher::Css(css) => dom::select_all(root, css),
        Matcher::Predicate(rule) => query_all(root, rule),
    }
}

/// Apply a rule table to the tree, removing every match in table order.
///
/// Returns the number of elements removed. Elements already detached by an
/// earlier removal (because an ancestor went first) are skipped so the count
/// reflects real removals only.
pub fn apply_rules(root: &Selection, rules: &[NoiseRule]) -> usize {
    let mut removed = 0;
    for rule in rules {
        for sel in matches(root, rule.matcher) {
            if !is_attached(&sel) {
                continue;
            }
            if rule.scope == Scope::OutsideArticle && dom::has_ancestor(&sel, ARTICLE_CONTAINER) {
                continue;
            }
            sel.remove();
            removed += 1;
        }
    }
    removed
}

/// Whether the element still hangs off a document root.
#[must_use]
pub fn is_attached(sel: &Selection) -> bool {
    let mut current = sel.parent();
    while current.exists() {
        if dom::tag_name(&current).as_deref() == Some("html") {
            return true;
        }
        current = current.parent();
    }
    dom::tag_name(sel).as_deref() == Some("html")
}

/// Whether any class/id token of the element matches the pattern.
#[must_use]
pub fn any_token_matches(sel: &Selection, pattern: &regex::Regex) -> bool {
    dom::class_and_id_tokens(sel).iter().any(|t| pattern.is_match(t))
}

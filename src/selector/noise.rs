//! Noise Rule Tables
//!
//! Static, ordered tables consumed by [`crate::selector::apply_rules`].
//! Structural rules run first (tags that never carry narrative text), then
//! semantic page chrome, then class/id/role patterns. Adding a rule means
//! adding a row here; the removal logic does not change.

use dom_query::Selection;

use crate::dom;
use crate::patterns::{
    ADVERTISING_TOKEN, BANNER_TOKEN, COMMENTS_TOKEN, HIDDEN_STYLE, HIDDEN_TOKEN,
    IN_CONTENT_NOISE_TOKEN, NAVIGATION_TOKEN, PAGINATION_TOKEN, RELATED_TOKEN, SOCIAL_TOKEN,
};
use crate::selector::{any_token_matches, Matcher, NoiseRule, Scope};

/// Tags that never hold narrative text. `form` is absent: some CMS themes
/// wrap the whole page in one.
pub const NON_CONTENT_TAGS: &str =
    "script, style, noscript, template, iframe, embed, object, applet, canvas, svg, button, input, select, textarea, dialog";

/// Semantic chrome regions, kept when they belong to the article itself.
pub const CHROME_REGIONS: &str =
    "nav, header, footer, aside, [role='banner'], [role='contentinfo'], [role='complementary']";

/// Landmark roles that are navigation wherever they appear.
pub const NAVIGATION_ROLES: &str =
    "[role='navigation'], [role='menu'], [role='menubar'], [role='search'], [role='dialog'], [role='alertdialog']";

/// Hidden and accessibility-only nodes.
pub const HIDDEN_NODES: &str = "[hidden], [aria-hidden='true'], [type='hidden']";

/// Tags pattern rules may remove. `article`, `main` and `body` are never
/// removed by a class pattern.
const PATTERN_TAGS: &[&str] = &[
    "div", "section", "aside", "nav", "header", "footer", "ul", "ol", "li", "p", "span",
    "figure", "dl", "table", "a",
];

/// Structural removal rules, applied in order.
pub static STRUCTURAL_RULES: &[NoiseRule] = &[
    NoiseRule { name: "non-content-tags", matcher: Matcher::Css(NON_CONTENT_TAGS), scope: Scope::Anywhere },
    NoiseRule { name: "chrome-regions", matcher: Matcher::Css(CHROME_REGIONS), scope: Scope::OutsideArticle },
    NoiseRule { name: "navigation-roles", matcher: Matcher::Css(NAVIGATION_ROLES), scope: Scope::Anywhere },
    NoiseRule { name: "hidden-nodes", matcher: Matcher::Css(HIDDEN_NODES), scope: Scope::Anywhere },
    NoiseRule { name: "hidden-classes", matcher: Matcher::Predicate(is_hidden), scope: Scope::Anywhere },
    NoiseRule { name: "navigation", matcher: Matcher::Predicate(is_navigation), scope: Scope::Anywhere },
    NoiseRule { name: "advertising", matcher: Matcher::Predicate(is_advertising), scope: Scope::Anywhere },
    NoiseRule { name: "social-sharing", matcher: Matcher::Predicate(is_social), scope: Scope::Anywhere },
    NoiseRule { name: "comments", matcher: Matcher::Predicate(is_comments), scope: Scope::Anywhere },
    NoiseRule { name: "related-content", matcher: Matcher::Predicate(is_related), scope: Scope::Anywhere },
    NoiseRule { name: "banners", matcher: Matcher::Predicate(is_banner), scope: Scope::Anywhere },
    NoiseRule { name: "pagination", matcher: Matcher::Predicate(is_pagination), scope: Scope::Anywhere },
];

/// Rules applied inside the located content node.
pub static IN_CONTENT_RULES: &[NoiseRule] = &[
    NoiseRule { name: "in-content-noise", matcher: Matcher::Predicate(is_in_content_noise), scope: Scope::Anywhere },
];

fn pattern_candidate(sel: &Selection) -> bool {
    dom::is_one_of_tags(sel, PATTERN_TAGS)
}

/// `class`/`id` hides the node, or an inline style does.
#[must_use]
pub fn is_hidden(sel: &Selection) -> bool {
    if dom::is_one_of_tags(sel, &["html", "body"]) {
        return false;
    }
    if any_token_matches(sel, &HIDDEN_TOKEN) {
        return true;
    }
    dom::get_attribute(sel, "style").is_some_and(|style| HIDDEN_STYLE.is_match(&style))
}

#[must_use]
pub fn is_navigation(sel: &Selection) -> bool {
    pattern_candidate(sel) && any_token_matches(sel, &NAVIGATION_TOKEN)
}

#[must_use]
pub fn is_advertising(sel: &Selection) -> bool {
    if dom::has_attribute_prefix(sel, "data-ad") {
        return pattern_candidate(sel);
    }
    pattern_candidate(sel) && any_token_matches(sel, &ADVERTISING_TOKEN)
}

#[must_use]
pub fn is_social(sel: &Selection) -> bool {
    pattern_candidate(sel) && any_token_matches(sel, &SOCIAL_TOKEN)
}

#[must_use]
pub fn is_comments(sel: &Selection) -> bool {
    pattern_candidate(sel) && any_token_matches(sel, &COMMENTS_TOKEN)
}

#[must_use]
pub fn is_related(sel: &Selection) -> bool {
    pattern_candidate(sel) && any_token_matches(sel, &RELATED_TOKEN)
}

#[must_use]
pub fn is_banner(sel: &Selection) -> bool {
    pattern_candidate(sel) && any_token_matches(sel, &BANNER_TOKEN)
}

#[must_use]
pub fn is_pagination(sel: &Selection) -> bool {
    pattern_candidate(sel) && any_token_matches(sel, &PAGINATION_TOKEN)
}

/// Related, share, author-bio and tag blocks left inside the article.
#[must_use]
pub fn is_in_content_noise(sel: &Selection) -> bool {
    pattern_candidate(sel) && any_token_matches(sel, &IN_CONTENT_NOISE_TOKEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first<'a>(doc: &'a dom::Document, css: &str) -> Selection<'a> {
        doc.select(css).first()
    }

    #[test]
    fn navigation_rule_matches_menu_classes() {
        let doc = dom::parse(r#"<div class="site-nav">x</div><div class="canvas-wrap">y</div>"#);
        assert!(is_navigation(&first(&doc, ".site-nav")));
        assert!(!is_navigation(&first(&doc, ".canvas-wrap")));
    }

    #[test]
    fn pattern_rules_never_match_article_or_main() {
        let doc = dom::parse(r#"<article class="share">x</article><main class="related">y</main>"#);
        assert!(!is_social(&first(&doc, "article")));
        assert!(!is_related(&first(&doc, "main")));
    }

    #[test]
    fn advertising_rule_matches_ad_tokens_and_data_attributes() {
        let doc = dom::parse(r#"
            <div class="ad-slot">a</div>
            <div data-ad-unit="top">b</div>
            <div class="header shadow">c</div>
        "#);
        assert!(is_advertising(&first(&doc, ".ad-slot")));
        assert!(is_advertising(&first(&doc, "[data-ad-unit]")));
        assert!(!is_advertising(&first(&doc, ".header")));
    }

    #[test]
    fn hidden_rule_reads_inline_style() {
        let doc = dom::parse(r#"<div style="display: none">x</div><div class="sr-only">y</div><div>z</div>"#);
        let divs = dom::select_all(&doc.select("body"), "div");
        assert!(is_hidden(&divs[0]));
        assert!(is_hidden(&divs[1]));
        assert!(!is_hidden(&divs[2]));
    }

    #[test]
    fn in_content_noise_matches_author_bio_and_tags() {
        let doc = dom::parse(r#"<div class="author-bio">a</div><ul class="post-tags">b</ul><div class="body-copy">c</div>"#);
        assert!(is_in_content_noise(&first(&doc, ".author-bio")));
        assert!(is_in_content_noise(&first(&doc, ".post-tags")));
        assert!(!is_in_content_noise(&first(&doc, ".body-copy")));
    }

    #[test]
    fn non_content_tags_leave_page_wrapping_form() {
        let doc = dom::parse(r#"<form id="aspnetForm"><article><p>x</p></article><input type="text"><button>Go</button></form>"#);
        crate::selector::apply_rules(&doc.select("html"), STRUCTURAL_RULES);
        assert!(doc.select("form#aspnetForm article p").exists());
        assert!(!doc.select("input").exists());
        assert!(!doc.select("button").exists());
    }

    #[test]
    fn structural_table_order_starts_with_tags() {
        assert_eq!(STRUCTURAL_RULES[0].name, "non-content-tags");
        assert_eq!(STRUCTURAL_RULES[1].scope, Scope::OutsideArticle);
    }
}

//! Content Candidate Tables
//!
//! Hand-ordered selectors for the content locator, most specific article-ish
//! patterns first and generic containers last, plus the element set the
//! density scan considers.

/// Article body selectors in priority order.
pub static CONTENT_SELECTORS: &[&str] = &[
    "[itemprop='articleBody']",
    "[data-testid='article-body']",
    "article .article-body",
    "article .article-content",
    "article .entry-content",
    "article .post-content",
    ".article-body",
    ".article-content",
    ".article__body",
    ".article-text",
    ".story-body",
    ".story-content",
    ".entry-content",
    ".post-content",
    ".post-body",
    ".blog-post-content",
    ".c-entry-content",
    ".rich-text",
    "article",
    "[role='article']",
    "[role='main']",
    "main",
    "#article",
    "#content",
    "#main-content",
    ".content",
    "#main",
    ".main",
    ".post",
    ".entry",
];

/// Containers eligible for the density scan.
pub const DENSITY_CONTAINERS: &str = "div, section, article, main, td";

/// Paragraph-level elements counted by the selector gate.
pub const PARAGRAPH_ELEMENTS: &str = "p";

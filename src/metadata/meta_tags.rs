//! HTML Meta Tag Sources
//!
//! The first two tiers of the metadata chain: structured page metadata
//! (`<meta name=...>`, `itemprop`, Dublin Core, plus JSON-LD) and social-card
//! metadata (Open Graph, Twitter cards).

use dom_query::Document;

use super::Source;
use crate::dom;

// === Structured page metadata ===

pub static TITLE_PAGE: &[Source] = &[
    Source::JsonLd,
    Source::Meta("meta[name='title'], meta[name='dc.title'], meta[name='DC.title']"),
    Source::Meta("meta[itemprop='headline'], meta[itemprop='name']"),
    Source::Meta("meta[name='parsely-title'], meta[name='sailthru.title']"),
];

pub static DESCRIPTION_PAGE: &[Source] = &[
    Source::JsonLd,
    Source::Meta("meta[name='description'], meta[name='Description']"),
    Source::Meta("meta[itemprop='description'], meta[name='dc.description']"),
];

pub static AUTHOR_PAGE: &[Source] = &[
    Source::JsonLd,
    Source::Meta("meta[name='author'], meta[name='Author']"),
    Source::Meta("meta[name='byl'], meta[name='dc.creator'], meta[name='DC.creator']"),
    Source::Meta("meta[name='parsely-author'], meta[name='sailthru.author']"),
];

pub static DATE_PAGE: &[Source] = &[
    Source::JsonLd,
    Source::Meta("meta[itemprop='datePublished']"),
    Source::Meta("meta[name='date'], meta[name='pubdate'], meta[name='publish_date'], meta[name='publishdate']"),
    Source::Meta("meta[name='dc.date'], meta[name='dc.date.issued'], meta[name='dcterms.created']"),
    Source::Meta("meta[name='parsely-pub-date'], meta[name='sailthru.date']"),
];

pub static IMAGE_PAGE: &[Source] = &[
    Source::JsonLd,
    Source::Meta("meta[itemprop='image'], meta[name='thumbnail']"),
];

pub static SITE_NAME_PAGE: &[Source] = &[
    Source::JsonLd,
    Source::Meta("meta[name='application-name'], meta[name='publisher'], meta[name='dc.publisher']"),
];

// === Social cards ===

pub static TITLE_SOCIAL: &[Source] = &[
    Source::Meta("meta[property='og:title']"),
    Source::Meta("meta[name='twitter:title'], meta[property='twitter:title']"),
];

pub static DESCRIPTION_SOCIAL: &[Source] = &[
    Source::Meta("meta[property='og:description']"),
    Source::Meta("meta[name='twitter:description'], meta[property='twitter:description']"),
];

pub static AUTHOR_SOCIAL: &[Source] = &[
    Source::Meta("meta[property='article:author'], meta[name='article:author']"),
    Source::Meta("meta[name='twitter:creator']"),
];

pub static DATE_SOCIAL: &[Source] = &[
    Source::Meta("meta[property='article:published_time'], meta[name='article:published_time']"),
    Source::Meta("meta[property='og:article:published_time'], meta[property='article:published']"),
];

pub static IMAGE_SOCIAL: &[Source] = &[
    Source::Meta("meta[property='og:image'], meta[property='og:image:url']"),
    Source::Meta("meta[name='twitter:image'], meta[name='twitter:image:src'], meta[property='twitter:image']"),
];

pub static SITE_NAME_SOCIAL: &[Source] = &[Source::Meta("meta[property='og:site_name']")];

/// `content` of the first matching `<meta>` tag that has a non-empty one.
#[must_use]
pub fn meta_content(doc: &Document, css: &str) -> Option<String> {
    dom::select_all(&doc.select("html"), css)
        .iter()
        .find_map(|meta| dom::non_empty_attribute(meta, "content"))
}

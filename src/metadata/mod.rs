//! Metadata extraction.
//!
//! Every [`Metadata`] field is resolved through its own ordered chain of
//! sources, grouped in four tiers:
//!
//! 1. structured page metadata (JSON-LD, `<meta name>`, `itemprop`)
//! 2. social-card metadata (Open Graph, Twitter)
//! 3. semantic HTML elements
//! 4. heuristic class-name matches
//!
//! The first source yielding a non-empty value wins. Chains are data in the
//! [`meta_tags`] and [`dom_extraction`] tables; this module only walks them.

pub mod dom_extraction;
pub mod json_ld;
pub mod meta_tags;

use dom_query::Document;
use url::Url;

use crate::content::Metadata;
use crate::dom;
use crate::normalize;
use crate::options::ExtractOptions;
use crate::url_utils;

pub use json_ld::{extract_json_ld, JsonLdArticle};

/// One place a field value may come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// The field's counterpart in the page's JSON-LD article.
    JsonLd,
    /// `content` attribute of the first matching `<meta>`.
    Meta(&'static str),
    /// Attribute of the first matching element.
    Attr(&'static str, &'static str),
    /// Normalized text of the first matching element.
    Text(&'static str),
}

/// Metadata fields resolved by the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Description,
    Author,
    PublishedDate,
    ImageUrl,
    SiteName,
}

impl Field {
    /// Tier tables in resolution order.
    #[must_use]
    pub fn tiers(self) -> [&'static [Source]; 4] {
        use dom_extraction as d;
        use meta_tags as m;
        match self {
            Self::Title => [m::TITLE_PAGE, m::TITLE_SOCIAL, d::TITLE_SEMANTIC, d::TITLE_HEURISTIC],
            Self::Description => [
                m::DESCRIPTION_PAGE,
                m::DESCRIPTION_SOCIAL,
                d::DESCRIPTION_SEMANTIC,
                d::DESCRIPTION_HEURISTIC,
            ],
            Self::Author => [m::AUTHOR_PAGE, m::AUTHOR_SOCIAL, d::AUTHOR_SEMANTIC, d::AUTHOR_HEURISTIC],
            Self::PublishedDate => [m::DATE_PAGE, m::DATE_SOCIAL, d::DATE_SEMANTIC, d::DATE_HEURISTIC],
            Self::ImageUrl => [m::IMAGE_PAGE, m::IMAGE_SOCIAL, d::IMAGE_SEMANTIC, d::IMAGE_HEURISTIC],
            Self::SiteName => [
                m::SITE_NAME_PAGE,
                m::SITE_NAME_SOCIAL,
                d::SITE_NAME_SEMANTIC,
                d::SITE_NAME_HEURISTIC,
            ],
        }
    }

    /// Longest element text accepted from a `Text` source. Keeps a whole
    /// author-bio box from being read as a byline.
    fn max_text_len(self) -> usize {
        match self {
            Self::Author | Self::SiteName => 100,
            Self::PublishedDate => 64,
            Self::Title => 300,
            Self::Description | Self::ImageUrl => 1000,
        }
    }

    fn json_ld_value(self, ld: &JsonLdArticle) -> Option<String> {
        match self {
            Self::Title => ld.headline.clone(),
            Self::Description => ld.description.clone(),
            Self::Author => ld.author.clone(),
            Self::PublishedDate => ld.date_published.clone(),
            Self::ImageUrl => ld.image.clone(),
            Self::SiteName => ld.publisher.clone(),
        }
    }
}

/// Extract all metadata from an unfiltered document.
///
/// `base` is the page's final URL; relative image URLs are resolved against
/// it and its hostname is the site-name fallback.
#[must_use]
pub fn extract_metadata(doc: &Document, base: Option<&Url>, opts: &ExtractOptions) -> Metadata {
    let ld = extract_json_ld(doc);
    let resolve = |field: Field| resolve_field(doc, &ld, field, base, opts);

    let mut metadata = Metadata {
        title: resolve(Field::Title),
        description: resolve(Field::Description),
        author: resolve(Field::Author),
        published_date: resolve(Field::PublishedDate),
        image_url: resolve(Field::ImageUrl),
        site_name: resolve(Field::SiteName),
    };

    if metadata.site_name.is_none() {
        metadata.site_name = base.and_then(|u| url_utils::site_hostname(u.as_str()));
    }
    metadata
}

/// Walk one field's chain and return the first cleaned, non-empty value.
#[must_use]
pub fn resolve_field(
    doc: &Document,
    ld: &JsonLdArticle,
    field: Field,
    base: Option<&Url>,
    opts: &ExtractOptions,
) -> Option<String> {
    field
        .tiers()
        .iter()
        .flat_map(|tier| tier.iter())
        .find_map(|source| read_source(doc, ld, field, *source).and_then(|raw| clean(field, &raw, base, opts)))
}

fn read_source(doc: &Document, ld: &JsonLdArticle, field: Field, source: Source) -> Option<String> {
    match source {
        Source::JsonLd => field.json_ld_value(ld),
        Source::Meta(css) => meta_tags::meta_content(doc, css),
        Source::Attr(css, attr) => dom::select_all(&doc.select("html"), css)
            .iter()
            .find_map(|sel| dom::non_empty_attribute(sel, attr)),
        Source::Text(css) => dom::select_all(&doc.select("html"), css)
            .iter()
            .filter_map(normalize::selection_text)
            .find(|text| text.chars().count() <= field.max_text_len()),
    }
}

fn clean(field: Field, raw: &str, base: Option<&Url>, opts: &ExtractOptions) -> Option<String> {
    let text = normalize::normalize_text(raw);
    if text.is_empty() {
        return None;
    }
    match field {
        Field::Title => Some(dom_extraction::strip_title_suffix(&text, opts.title_prefix_min_len)),
        Field::Author => dom_extraction::clean_author(&text),
        Field::PublishedDate => Some(dom_extraction::normalize_date(&text)),
        Field::ImageUrl => Some(url_utils::resolve(&text, base).unwrap_or(text)),
        Field::Description | Field::SiteName => Some(text),
    }
}

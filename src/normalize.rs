//! Text normalization.
//!
//! Entity decoding, control-character stripping and whitespace collapsing for
//! every piece of extracted text, plus the block-aware plain-text rendering of
//! the located content node with its line-level noise filter.

use std::borrow::Cow;

use dom_query::{NodeRef, Selection};

use crate::options::ExtractOptions;
use crate::patterns::{HTML_ENTITY, MULTIPLE_NEWLINES, NOISE_LINE, WHITESPACE_NORMALIZE};

/// Elements followed by a paragraph break in rendered text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main",
    "ol", "p", "pre", "section", "table", "tr", "ul",
];

/// Named entities decoded by [`decode_entities`].
const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("amp", "&"),
    ("lt", "<"),
    ("gt", ">"),
    ("quot", "\""),
    ("apos", "'"),
    ("nbsp", " "),
    ("ndash", "–"),
    ("mdash", "—"),
    ("hellip", "…"),
    ("lsquo", "‘"),
    ("rsquo", "’"),
    ("ldquo", "“"),
    ("rdquo", "”"),
    ("laquo", "«"),
    ("raquo", "»"),
    ("copy", "©"),
    ("reg", "®"),
    ("trade", "™"),
    ("bull", "•"),
    ("middot", "·"),
];

/// Decode the fixed entity table plus numeric references.
///
/// Unknown named entities are left untouched. Decoding is a single pass, so
/// `&amp;lt;` becomes `&lt;`, not `<`.
#[must_use]
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    HTML_ENTITY.replace_all(text, |caps: &regex::Captures| {
        let body = &caps[1];
        decode_entity(body).unwrap_or_else(|| caps[0].to_string())
    })
}

fn decode_entity(body: &str) -> Option<String> {
    if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
        return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32).map(String::from);
    }
    if let Some(dec) = body.strip_prefix('#') {
        return dec.parse::<u32>().ok().and_then(char::from_u32).map(String::from);
    }
    NAMED_ENTITIES
        .iter()
        .find(|(name, _)| *name == body)
        .map(|(_, value)| (*value).to_string())
}

/// Drop control characters. Newlines and tabs survive when `keep_lines` is set.
#[must_use]
pub fn strip_control_chars(text: &str, keep_lines: bool) -> String {
    text.chars()
        .filter(|c| !c.is_control() || (keep_lines && matches!(c, '\n' | '\t')))
        .collect()
}

/// Decode, strip control characters, collapse whitespace runs, trim.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    let decoded = decode_entities(text);
    let stripped = strip_control_chars(&decoded, true);
    WHITESPACE_NORMALIZE.replace_all(&stripped, " ").trim().to_string()
}

/// Normalized text of a selection, or `None` when it is empty.
#[must_use]
pub fn selection_text(sel: &Selection) -> Option<String> {
    let text = normalize_text(&sel.text());
    (!text.is_empty()).then_some(text)
}

/// Render the node as plain text with paragraph breaks after block elements,
/// then apply the line filter.
#[must_use]
pub fn render_text(sel: &Selection, opts: &ExtractOptions) -> String {
    let mut raw = String::new();
    for node in sel.nodes() {
        collect_text(node, &mut raw);
    }
    filter_lines(&raw, opts)
}

fn collect_text(node: &NodeRef, out: &mut String) {
    let mut child = node.first_child();
    while let Some(current) = child {
        if current.is_text() {
            out.push_str(&WHITESPACE_NORMALIZE.replace_all(&current.text(), " "));
        } else if current.is_element() {
            let name = current.node_name().map(|n| n.to_string()).unwrap_or_default();
            if name == "br" {
                out.push('\n');
            } else {
                let is_block = BLOCK_TAGS.contains(&name.as_str());
                if is_block {
                    out.push('\n');
                }
                collect_text(&current, out);
                if is_block {
                    out.push_str("\n\n");
                }
            }
        }
        child = current.next_sibling();
    }
}

/// Line-level noise filter.
///
/// A line is dropped if it matches a noise phrase; otherwise it is kept when
/// it is longer than `min_line_len` or contains a space. Blank-line runs are
/// collapsed to a single blank line.
#[must_use]
pub fn filter_lines(raw: &str, opts: &ExtractOptions) -> String {
    let mut kept: Vec<String> = Vec::new();
    for line in raw.split('\n') {
        let line = normalize_text(line);
        if line.is_empty() {
            kept.push(String::new());
            continue;
        }
        if NOISE_LINE.is_match(&line) {
            continue;
        }
        if line.chars().count() > opts.min_line_len || line.contains(' ') {
            kept.push(line);
        }
    }
    let joined = kept.join("\n");
    MULTIPLE_NEWLINES.replace_all(&joined, "\n\n").trim().to_string()
}

/// Count of whitespace-delimited non-empty tokens.
#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Whole minutes needed to read `words` at `words_per_minute`, rounded up.
#[must_use]
pub fn read_time_minutes(words: usize, words_per_minute: usize) -> usize {
    words.div_ceil(words_per_minute.max(1))
}

/// Human label for the read time: `"1 minute"`, `"4 minutes"`.
#[must_use]
pub fn estimated_read_time(words: usize, words_per_minute: usize) -> String {
    let minutes = read_time_minutes(words, words_per_minute);
    if minutes == 1 {
        "1 minute".to_string()
    } else {
        format!("{minutes} minutes")
    }
}

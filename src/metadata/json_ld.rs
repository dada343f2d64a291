//! JSON-LD Metadata Parsing
//!
//! Reads Schema.org objects embedded as `application/ld+json` and reduces
//! them to the article-level fields the metadata chain consumes. Handles
//! `@graph` containers, arrays of objects and nested author/publisher nodes.

use dom_query::Document;
use serde_json::{Map, Value};

use crate::dom;

/// Article fields found in JSON-LD blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonLdArticle {
    pub headline: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub date_published: Option<String>,
    pub image: Option<String>,
    pub publisher: Option<String>,
}

/// Typed schema object with an importance score (higher = more relevant).
#[derive(Debug, Clone)]
struct SchemaData {
    data: Map<String, Value>,
    importance: i32,
}

#[derive(Default)]
struct Collected {
    persons: Vec<SchemaData>,
    organizations: Vec<SchemaData>,
    articles: Vec<SchemaData>,
}

/// Parse every JSON-LD block of the document.
///
/// Malformed blocks are skipped. Article objects take precedence; standalone
/// Person and Organization objects fill author and publisher when the
/// article does not name them.
#[must_use]
pub fn extract_json_ld(doc: &Document) -> JsonLdArticle {
    let mut collected = Collected::default();

    for script in dom::select_all(&doc.select("html"), r#"script[type="application/ld+json"]"#) {
        let json_text = dom::text_content(&script);
        let json_text = json_text.trim();
        if json_text.is_empty() {
            continue;
        }
        let Ok(data) = serde_json::from_str::<Value>(json_text) else {
            continue;
        };
        process_schema_value(&data, 0, &mut collected);
    }

    collected.articles.sort_by(|a, b| b.importance.cmp(&a.importance));
    collected.persons.sort_by(|a, b| b.importance.cmp(&a.importance));
    collected.organizations.sort_by(|a, b| b.importance.cmp(&a.importance));

    let mut result = JsonLdArticle::default();
    for article in &collected.articles {
        let data = &article.data;
        fill(&mut result.headline, || {
            get_single_string_value(data, "headline").or_else(|| get_single_string_value(data, "name"))
        });
        fill(&mut result.description, || get_single_string_value(data, "description"));
        fill(&mut result.date_published, || get_single_string_value(data, "datePublished"));
        fill(&mut result.image, || extract_schema_image(data));
        fill(&mut result.author, || data.get("author").and_then(entity_name));
        fill(&mut result.publisher, || data.get("publisher").and_then(entity_name));
    }

    fill(&mut result.author, || {
        collected.persons.iter().find_map(|p| get_schema_name(&p.data))
    });
    fill(&mut result.publisher, || {
        collected.organizations.iter().find_map(|o| get_schema_name(&o.data))
    });

    result
}

fn fill(slot: &mut Option<String>, value: impl FnOnce() -> Option<String>) {
    if slot.is_none() {
        *slot = value();
    }
}

fn process_schema_value(value: &Value, depth: i32, out: &mut Collected) {
    match value {
        Value::Object(map) => {
            let types = schema_types(map);
            if types.is_empty() {
                for val in map.values() {
                    process_schema_value(val, depth, out);
                }
                return;
            }

            let schema = SchemaData {
                data: map.clone(),
                importance: calculate_importance(&types, depth),
            };
            if is_article_type(&types) {
                out.articles.push(schema);
            } else if is_person_type(&types) {
                out.persons.push(schema);
            } else if is_organization_type(&types) {
                out.organizations.push(schema);
            }

            for val in map.values() {
                process_schema_value(val, depth + 1, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                process_schema_value(item, depth, out);
            }
        }
        _ => {}
    }
}

/// Lowercased `@type` values of a schema object.
fn schema_types(map: &Map<String, Value>) -> Vec<String> {
    match map.get("@type") {
        Some(Value::String(s)) => vec![s.to_lowercase()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_lowercase)
            .collect(),
        _ => Vec::new(),
    }
}

/// Name of a person/organization value: a string, an object, or the first
/// of an array of either.
fn entity_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_empty(s),
        Value::Object(map) => get_schema_name(map),
        Value::Array(items) => {
            let names: Vec<String> = items.iter().filter_map(entity_name).collect();
            (!names.is_empty()).then(|| names.join(", "))
        }
        _ => None,
    }
}

/// `name`, or `givenName familyName`.
fn get_schema_name(data: &Map<String, Value>) -> Option<String> {
    if let Some(name) = data.get("name").and_then(Value::as_str).and_then(non_empty) {
        return Some(name);
    }
    let given = data.get("givenName").and_then(Value::as_str).unwrap_or("");
    let family = data.get("familyName").and_then(Value::as_str).unwrap_or("");
    non_empty(&format!("{} {}", given.trim(), family.trim()))
}

fn get_single_string_value(data: &Map<String, Value>, key: &str) -> Option<String> {
    match data.get(key)? {
        Value::String(s) => non_empty(s),
        Value::Array(items) => items.first().and_then(Value::as_str).and_then(non_empty),
        _ => None,
    }
}

fn extract_schema_image(data: &Map<String, Value>) -> Option<String> {
    fn image_url(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => non_empty(s),
            Value::Object(obj) => obj
                .get("url")
                .or_else(|| obj.get("contentUrl"))
                .and_then(Value::as_str)
                .and_then(non_empty),
            Value::Array(items) => items.iter().find_map(image_url),
            _ => None,
        }
    }
    data.get("image").and_then(image_url)
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn is_person_type(types: &[String]) -> bool {
    types.iter().any(|t| matches!(t.as_str(), "person" | "author" | "creator"))
}

fn is_organization_type(types: &[String]) -> bool {
    types
        .iter()
        .any(|t| matches!(t.as_str(), "organization" | "newsmediaorganization" | "website" | "publisher"))
}

fn is_article_type(types: &[String]) -> bool {
    types.iter().any(|t| {
        matches!(
            t.as_str(),
            "article" | "newsarticle" | "blogposting" | "report" | "techarticle"
                | "scholarlyarticle" | "reportagenewsarticle" | "analysisnewsarticle"
                | "opinionnewsarticle" | "socialmediaposting"
        )
    })
}

fn calculate_importance(types: &[String], depth: i32) -> i32 {
    let base = if is_article_type(types) { 100 } else { 50 };
    base - depth * 10
}

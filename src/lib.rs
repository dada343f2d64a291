//! # story-extractor
//!
//! Web story extraction: isolates the main narrative of a page, pulls out
//! its structured facts, and runs resumable batch pipelines over many URLs.
//!
//! The heuristic engine strips page chrome with a table of noise rules,
//! locates the article body (priority selectors, then paragraph density,
//! then `<body>`), and assembles a [`Content`] record with plain text,
//! self-contained HTML, metadata, headings and quotes.
//!
//! ## Quick Start
//!
//! ```rust
//! use story_extractor::{extract, ExtractOptions};
//!
//! let html = r#"<html><head><title>Harbour repairs begin</title></head>
//! <body><nav><a href="/">Home</a></nav>
//! <article><p>Repairs to the northern breakwater begin next week.</p></article>
//! </body></html>"#;
//!
//! let content = extract(html, Some("https://coast.example/news/1"), &ExtractOptions::default())?;
//! assert_eq!(content.title, "Harbour repairs begin");
//! assert!(!content.text_only.contains("Home"));
//! # Ok::<(), story_extractor::Error>(())
//! ```
//!
//! ## Pipelines
//!
//! - [`Fetcher`]: HTTP with retry, exponential backoff and user-agent
//!   rotation; optional headless-browser rendering.
//! - [`ContentProducer`]: the heuristic engine or an AI extraction agent.
//! - [`Orchestrator`]: single URLs and windowed batches, persisted through a
//!   [`Storage`] backend; failed items can be retried in place.

mod error;
mod options;
mod patterns;

/// Runtime configuration (fetch, batch, storage, agent).
pub mod config;

/// DOM helpers over `dom_query`.
pub mod dom;

/// Noise rules and content-candidate tables.
pub mod selector;

/// Noise filter.
pub mod filter;

/// Main-content locator.
pub mod locator;

/// Metadata extraction (JSON-LD, meta tags, semantic elements).
pub mod metadata;

/// Headings and quotes.
pub mod structure;

/// Text normalization, word counts and read time.
pub mod normalize;

/// Character encoding detection and transcoding.
pub mod encoding;

/// URL validation and resolution.
pub mod url_utils;

/// Extracted content records.
pub mod content;

/// Story and batch records.
pub mod story;

/// Heuristic extraction engine.
pub mod engine;

/// HTTP and headless-browser fetching.
pub mod fetch;

/// Content producer seam.
pub mod producer;

/// AI extraction agent.
pub mod agent;

/// Document generation.
pub mod docgen;

/// Story, batch and artifact persistence.
pub mod storage;

/// Single-item and batch pipelines.
pub mod orchestrator;

// Public API - re-exports
pub use config::Config;
pub use content::{Content, Heading, Metadata, Quote};
pub use engine::{extract, extract_with_diagnostics};
pub use error::{Error, ErrorKind, FailureInfo, Result};
pub use fetch::{FetchOptions, FetchResponse, Fetcher, HtmlSource};
pub use options::ExtractOptions;
pub use orchestrator::{parse_url_list, Orchestrator};
pub use producer::{ContentProducer, HeuristicProducer};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use story::{Batch, Story, StoryStatus};

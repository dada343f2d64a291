//! Content producers: turn a fetched page into [`Content`].
//!
//! The orchestrator only sees [`ContentProducer`]. The heuristic engine and
//! the AI agent ([`crate::agent::AgentProducer`]) both implement it, so
//! switching between them is a construction-time choice.

use async_trait::async_trait;

use crate::content::Content;
use crate::engine;
use crate::error::Result;
use crate::fetch::FetchResponse;
use crate::options::ExtractOptions;

/// Produces story content from a fetched page.
#[async_trait]
pub trait ContentProducer: Send + Sync {
    async fn produce(&self, page: &FetchResponse) -> Result<Content>;
}

/// The heuristic engine as a producer.
#[derive(Debug, Clone, Default)]
pub struct HeuristicProducer {
    options: ExtractOptions,
}

impl HeuristicProducer {
    #[must_use]
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl ContentProducer for HeuristicProducer {
    async fn produce(&self, page: &FetchResponse) -> Result<Content> {
        // The parsed document is not `Send`; it lives and dies inside this
        // synchronous call.
        engine::extract(&page.html, Some(&page.final_url), &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn page(html: &str) -> FetchResponse {
        FetchResponse {
            html: html.to_string(),
            final_url: "https://www.example.org/a/story".into(),
            redirected: false,
            status: 200,
            attempts: 1,
            rendered: false,
        }
    }

    #[tokio::test]
    async fn heuristic_producer_uses_final_url() {
        let html = "<html><body><article><p>The council voted on Tuesday to extend the harbour opening hours through the summer.</p></article></body></html>";
        let content = HeuristicProducer::default().produce(&page(html)).await.unwrap();

        assert!(content.text_only.contains("harbour opening hours"));
        assert_eq!(content.metadata.site_name.as_deref(), Some("example.org"));
    }

    #[tokio::test]
    async fn heuristic_producer_propagates_engine_errors() {
        let err = HeuristicProducer::default().produce(&page("")).await.unwrap_err();
        assert!(matches!(err, Error::ParseError(_)));
    }
}

//! [`ExtractionAgent`] over an OpenAI-compatible chat-completions API.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AgentContent, ExtractionAgent, Review};
use crate::config::AgentConfig;
use crate::error::{Error, Result};
use crate::fetch;

const EXTRACT_PROMPT: &str = "You extract news and blog stories from web pages. \
Return a JSON object with keys: title (string), textOnly (the story body as plain text, \
paragraphs separated by blank lines), metadata (object with optional title, description, \
author, publishedDate, imageUrl, siteName), headings (array of {level, text}) and quotes \
(array of {text, cite}). Leave out navigation, advertising, comments and related links.";

const REVIEW_PROMPT: &str = "You review story extractions. Given the JSON extraction, \
return a JSON object with keys: isValid (boolean, false if this is not a readable story), \
qualityScore (number from 0 to 1) and cleanedData (the extraction with leftover boilerplate \
removed, same shape as the input).";

const FORMAT_PROMPT: &str = "You format stories as clean HTML. Given the JSON story, \
return one complete HTML document with the title as <h1>, a byline with author and date \
when known, headings, paragraphs and blockquotes. Return only the HTML.";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiAgent {
    client: Client,
    endpoint: url::Url,
    api_key: String,
    model: String,
}

impl OpenAiAgent {
    pub fn new(config: &AgentConfig) -> Result<Self> {
        let base = config.base_url.trim_end_matches('/');
        let endpoint = url::Url::parse(&format!("{base}/chat/completions"))
            .map_err(|e| Error::Validation(format!("invalid agent base URL {base}: {e}")))?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Other(format!("failed to build agent client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    async fn complete(&self, system: &str, user: String, json: bool) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: system.to_string() },
                ChatMessage { role: "user", content: user },
            ],
            temperature: 0.0,
            response_format: json.then_some(ResponseFormat { kind: "json_object" }),
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| fetch::map_request_error(&e, &self.endpoint))?;
        fetch::check_status(response.status(), &self.endpoint)?;

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::ParseError(format!("agent response: {e}")))?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| Error::ParseError("agent returned no message content".into()))?;

        debug!(model = %self.model, chars = content.len(), "agent completion");
        Ok(content)
    }
}

/// Model output with any surrounding Markdown code fence removed.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[async_trait]
impl ExtractionAgent for OpenAiAgent {
    async fn extract(&self, html: &str, url: &str) -> Result<AgentContent> {
        let raw = self.complete(EXTRACT_PROMPT, format!("URL: {url}\n\nHTML:\n{html}"), true).await?;
        Ok(serde_json::from_str(strip_code_fence(&raw))?)
    }

    async fn review(&self, draft: &AgentContent, url: &str) -> Result<Review> {
        let payload = serde_json::to_string(draft)?;
        let raw = self.complete(REVIEW_PROMPT, format!("URL: {url}\n\nExtraction:\n{payload}"), true).await?;
        Ok(serde_json::from_str(strip_code_fence(&raw))?)
    }

    async fn format(&self, reviewed: &AgentContent, url: &str) -> Result<String> {
        let payload = serde_json::to_string(reviewed)?;
        let raw = self.complete(FORMAT_PROMPT, format!("URL: {url}\n\nStory:\n{payload}"), false).await?;
        Ok(strip_code_fence(&raw).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn completion(content: &str) -> serde_json::Value {
        json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] })
    }

    fn agent_for(server: &MockServer) -> OpenAiAgent {
        OpenAiAgent::new(&AgentConfig::new(format!("{}/v1/", server.uri()), "sk-test", "test-model")).unwrap()
    }

    #[test]
    fn strips_markdown_fences() {
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("  <html></html> "), "<html></html>");
    }

    #[tokio::test]
    async fn extract_parses_json_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(
                "```json\n{\"title\": \"Harbour repairs\", \"textOnly\": \"Work starts Monday.\"}\n```",
            )))
            .expect(1)
            .mount(&server)
            .await;

        let draft = agent_for(&server).extract("<p>Work starts Monday.</p>", "https://example.com/a").await.unwrap();
        assert_eq!(draft.title, "Harbour repairs");
        assert_eq!(draft.text_only, "Work starts Monday.");
        assert!(draft.headings.is_empty());
    }

    #[tokio::test]
    async fn unparseable_review_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("Looks good to me!")))
            .mount(&server)
            .await;

        let err = agent_for(&server).review(&AgentContent::default(), "https://example.com/a").await.unwrap_err();
        assert!(matches!(err, Error::ParseError(_)));
    }

    #[tokio::test]
    async fn rate_limit_maps_to_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = agent_for(&server).format(&AgentContent::default(), "https://example.com/a").await.unwrap_err();
        assert!(matches!(err, Error::RateLimited(_)));
    }
}

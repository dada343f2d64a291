//! Runtime configuration for the fetch and batch pipelines.
//!
//! `Config` gathers fetch behaviour, batch concurrency, the storage location
//! and the optional AI extraction agent. `Config::from_env` reads the
//! `STORY_*` environment variables used by the CLI.

use std::path::PathBuf;
use std::time::Duration;

use crate::agent::ReviewPolicy;
use crate::error::{Error, Result};
use crate::fetch::FetchOptions;
use crate::options::ExtractOptions;

/// Default number of URLs processed concurrently in one batch window.
pub const DEFAULT_CONCURRENCY: usize = 3;

/// Settings for the OpenAI-compatible extraction agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Base URL of the chat-completions API, e.g. `https://api.openai.com/v1`.
    pub base_url: String,

    /// Bearer token sent with each request.
    pub api_key: String,

    /// Model identifier passed through to the API.
    pub model: String,

    /// HTML sent to the agent is truncated to this many characters.
    ///
    /// Default: `60000`
    pub max_input_chars: usize,

    /// Per-request timeout.
    ///
    /// Default: 90 seconds
    pub timeout: Duration,

    /// What to do when the review step fails.
    pub review_policy: ReviewPolicy,
}

impl AgentConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            max_input_chars: 60_000,
            timeout: Duration::from_secs(90),
            review_policy: ReviewPolicy::default(),
        }
    }
}

/// Top-level runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Fetcher behaviour (timeouts, retries, browser path).
    pub fetch: FetchOptions,

    /// Heuristic engine thresholds.
    pub extract: ExtractOptions,

    /// Maximum number of items in flight per batch window.
    ///
    /// Default: `3`
    pub concurrency: usize,

    /// Directory used by `FileStorage`.
    ///
    /// Default: `./data`
    pub data_dir: PathBuf,

    /// When set, the AI agent replaces the heuristic engine.
    pub agent: Option<AgentConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch: FetchOptions::default(),
            extract: ExtractOptions::default(),
            concurrency: DEFAULT_CONCURRENCY,
            data_dir: PathBuf::from("data"),
            agent: None,
        }
    }
}

impl Config {
    /// Build a configuration from `STORY_*` environment variables.
    ///
    /// Unset variables keep their defaults; malformed values are rejected
    /// with `Error::Validation`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(ms) = parse_var::<u64>(&lookup, "STORY_FETCH_TIMEOUT_MS")? {
            config.fetch.timeout = Duration::from_millis(ms);
        }
        if let Some(retries) = parse_var::<u32>(&lookup, "STORY_MAX_RETRIES")? {
            config.fetch.max_retries = retries;
        }
        if let Some(concurrency) = parse_var::<usize>(&lookup, "STORY_CONCURRENCY")? {
            config.concurrency = concurrency;
        }
        if let Some(use_browser) = parse_var::<bool>(&lookup, "STORY_USE_BROWSER")? {
            config.fetch.use_browser = use_browser;
        }
        if let Some(dir) = lookup("STORY_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        if let Some(base_url) = lookup("STORY_AGENT_BASE_URL") {
            let api_key = lookup("STORY_AGENT_API_KEY").ok_or_else(|| {
                Error::Validation("STORY_AGENT_API_KEY is required when STORY_AGENT_BASE_URL is set".into())
            })?;
            let model = lookup("STORY_AGENT_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string());
            config.agent = Some(AgentConfig::new(base_url, api_key, model));
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the pipelines cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(Error::Validation("concurrency must be at least 1".into()));
        }
        if self.fetch.timeout.is_zero() {
            return Err(Error::Validation("fetch timeout must be non-zero".into()));
        }
        if let Some(agent) = &self.agent {
            if url::Url::parse(&agent.base_url).is_err() {
                return Err(Error::Validation(format!("invalid agent base URL: {}", agent.base_url)));
            }
        }
        Ok(())
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::Validation(format!("{key} has an invalid value: {raw:?}"))),
    }
}

//! Fetcher: HTTP retrieval with retry, backoff and user-agent rotation.
//!
//! Every attempt sends a GET with a randomly chosen browser user agent and
//! browser-like headers, following at most `max_redirects` redirects.
//! Transient failures (5xx, 429, timeouts, connection errors) are retried
//! with a `base_delay * 3^(attempt-1)` wait until `max_retries` attempts
//! have been made. When a [`PageRenderer`] is attached and `use_browser` is
//! set, the rendered DOM is tried first and plain HTTP is the fallback.

pub mod browser;

use std::error::Error as _;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use tracing::{debug, info, warn};
use url::Url;

pub use browser::{BrowserLauncher, BrowserSession, PageRenderer, RenderedPage, RenderingBrowser};

use crate::encoding;
use crate::error::{Error, Result};
use crate::url_utils;

/// User agents rotated across attempts.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
];

/// Fetch behaviour.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Per-attempt request deadline.
    ///
    /// Default: 30 seconds
    pub timeout: Duration,

    /// Total attempts, the first one included.
    ///
    /// Default: `3`
    pub max_retries: u32,

    /// Wait before the second attempt; later waits triple.
    ///
    /// Default: 1000 ms
    pub base_delay: Duration,

    /// Redirect hops followed before giving up.
    ///
    /// Default: `5`
    pub max_redirects: usize,

    /// Try the headless-browser path first when a renderer is attached.
    ///
    /// Default: `false`
    pub use_browser: bool,

    /// Extra wait after the browser reports the network settled.
    ///
    /// Default: 2 seconds
    pub browser_settle: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            max_redirects: 5,
            use_browser: false,
            browser_settle: Duration::from_secs(2),
        }
    }
}

/// A successfully fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// Decoded UTF-8 HTML.
    pub html: String,
    /// URL after redirects.
    pub final_url: String,
    /// Whether `final_url` differs from the requested URL.
    pub redirected: bool,
    pub status: u16,
    /// Attempts spent, the successful one included.
    pub attempts: u32,
    /// Whether the HTML came from the browser path.
    pub rendered: bool,
}

/// Anything that can produce HTML for a URL.
#[async_trait]
pub trait HtmlSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchResponse>;
}

/// Wait after failed attempt `attempt` (1-indexed): `base * 3^(attempt-1)`.
#[must_use]
pub fn backoff_delay(attempt: u32, base: Duration) -> Duration {
    let exponent = attempt.saturating_sub(1);
    base.saturating_mul(3u32.saturating_pow(exponent))
}

/// A user agent from the rotation pool.
#[must_use]
pub fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert("upgrade-insecure-requests", HeaderValue::from_static("1"));
    headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("none"));
    headers
}

/// HTTP fetcher with retry and an optional browser path.
#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    options: FetchOptions,
    renderer: Option<Arc<dyn PageRenderer>>,
}

impl Fetcher {
    /// Build a fetcher.
    ///
    /// # Errors
    /// [`Error::Validation`] when the HTTP client cannot be constructed.
    pub fn new(options: FetchOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .redirect(reqwest::redirect::Policy::limited(options.max_redirects))
            .default_headers(browser_headers())
            .build()
            .map_err(|e| Error::Validation(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            options,
            renderer: None,
        })
    }

    /// Attach a headless renderer used when `use_browser` is set.
    #[must_use]
    pub fn with_renderer(mut self, renderer: Arc<dyn PageRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    #[must_use]
    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Fetch a page.
    ///
    /// The URL is validated before any request: a non-http(s) URL fails
    /// with [`Error::InvalidUrl`] after zero attempts.
    pub async fn fetch(&self, url: &str) -> Result<FetchResponse> {
        let parsed = url_utils::validate_http_url(url)?;

        if self.options.use_browser {
            if let Some(renderer) = &self.renderer {
                match renderer.render(parsed.as_str(), self.options.browser_settle).await {
                    Ok(page) => {
                        let redirected = !url_utils::urls_match(parsed.as_str(), &page.final_url);
                        debug!(url = %parsed, final_url = %page.final_url, "rendered with browser");
                        return Ok(FetchResponse {
                            html: page.html,
                            final_url: page.final_url,
                            redirected,
                            status: 200,
                            attempts: 1,
                            rendered: true,
                        });
                    }
                    Err(e) => warn!(url = %parsed, error = %e, "browser render failed, falling back to HTTP"),
                }
            }
        }

        self.fetch_http(&parsed).await
    }

    async fn fetch_http(&self, url: &Url) -> Result<FetchResponse> {
        let max_attempts = self.options.max_retries.max(1);
        let mut attempt = 1;
        loop {
            match self.attempt(url).await {
                Ok(mut response) => {
                    response.attempts = attempt;
                    info!(url = %url, attempt, status = response.status, "fetched");
                    return Ok(response);
                }
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    let delay = backoff_delay(attempt, self.options.base_delay);
                    warn!(url = %url, attempt, delay_ms = delay.as_millis() as u64, error = %err, "retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    warn!(url = %url, attempt, error = %err, "fetch failed");
                    return Err(err);
                }
            }
        }
    }

    async fn attempt(&self, url: &Url) -> Result<FetchResponse> {
        let response = self
            .client
            .get(url.clone())
            .header(USER_AGENT, random_user_agent())
            .send()
            .await
            .map_err(|e| map_request_error(&e, url))?;

        let status = response.status();
        let final_url = response.url().clone();
        check_status(status, &final_url)?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(|e| map_request_error(&e, url))?;

        Ok(FetchResponse {
            html: encoding::decode_body(content_type.as_deref(), &body),
            redirected: !url_utils::urls_match(url.as_str(), final_url.as_str()),
            final_url: final_url.to_string(),
            status: status.as_u16(),
            attempts: 1,
            rendered: false,
        })
    }
}

#[async_trait]
impl HtmlSource for Fetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse> {
        Fetcher::fetch(self, url).await
    }
}

/// Map a non-success status to the error taxonomy.
pub fn check_status(status: StatusCode, url: &Url) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    let host = url.host_str().unwrap_or_default().to_string();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(Error::RateLimited(host));
    }
    if status.is_server_error() {
        return Err(Error::Server {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Err(Error::Http {
        status: status.as_u16(),
        url: url.to_string(),
    })
}

/// Map a transport error to the error taxonomy.
pub fn map_request_error(err: &reqwest::Error, url: &Url) -> Error {
    if err.is_timeout() {
        return Error::Timeout(url.to_string());
    }
    if is_dns_failure(err) {
        return Error::InvalidUrl(format!("{url}: domain does not resolve"));
    }
    if err.is_redirect() {
        return Error::ExtractionError(format!("{url}: too many redirects"));
    }
    Error::Network(format!("{url}: {err}"))
}

/// Whether the error chain reports a name-resolution failure.
fn is_dns_failure(err: &reqwest::Error) -> bool {
    let mut source: Option<&dyn std::error::Error> = err.source();
    while let Some(cause) = source {
        let message = cause.to_string().to_lowercase();
        if message.contains("dns error")
            || message.contains("failed to lookup address")
            || message.contains("name or service not known")
            || message.contains("no such host")
        {
            return true;
        }
        source = cause.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn backoff_triples_from_base() {
        let base = Duration::from_millis(1000);
        assert_eq!(backoff_delay(1, base), Duration::from_millis(1000));
        assert_eq!(backoff_delay(2, base), Duration::from_millis(3000));
        assert_eq!(backoff_delay(3, base), Duration::from_millis(9000));
    }

    #[test]
    fn backoff_saturates() {
        assert_eq!(backoff_delay(0, Duration::from_millis(10)), Duration::from_millis(10));
        assert_eq!(backoff_delay(200, Duration::from_secs(u64::MAX / 2)), Duration::MAX);
    }

    #[test]
    fn user_agent_comes_from_pool() {
        for _ in 0..20 {
            assert!(USER_AGENTS.contains(&random_user_agent()));
        }
    }

    #[test]
    fn status_mapping() {
        let url = Url::parse("https://news.example/a").unwrap();
        assert!(check_status(StatusCode::OK, &url).is_ok());

        let err = check_status(StatusCode::TOO_MANY_REQUESTS, &url).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RateLimited);
        assert!(err.is_transient());

        let err = check_status(StatusCode::SERVICE_UNAVAILABLE, &url).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExtractionFailed);
        assert!(err.is_transient());

        let err = check_status(StatusCode::NOT_FOUND, &url).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExtractionFailed);
        assert!(!err.is_transient());
    }

    #[test]
    fn default_options() {
        let options = FetchOptions::default();
        assert_eq!(options.timeout, Duration::from_secs(30));
        assert_eq!(options.max_retries, 3);
        assert_eq!(options.max_redirects, 5);
        assert!(!options.use_browser);
    }

    #[tokio::test]
    async fn invalid_scheme_fails_before_any_request() {
        let fetcher = Fetcher::new(FetchOptions::default()).unwrap();
        let err = fetcher.fetch("ftp://files.example/story.html").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidUrl);
    }
}

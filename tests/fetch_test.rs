use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use story_extractor::fetch::{PageRenderer, RenderedPage};
use story_extractor::{Error, ErrorKind, FetchOptions, Fetcher, Result};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE: &str = "<html><body><p>Hello from the harbour.</p></body></html>";

fn fetcher(base_delay_ms: u64) -> Fetcher {
    Fetcher::new(FetchOptions {
        base_delay: Duration::from_millis(base_delay_ms),
        timeout: Duration::from_secs(5),
        ..FetchOptions::default()
    })
    .unwrap()
}

/// Renders every page as if the site redirected to `/landing`, or fails.
struct StubRenderer {
    fail: bool,
    calls: AtomicUsize,
}

impl StubRenderer {
    fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self { fail, calls: AtomicUsize::new(0) })
    }
}

#[async_trait]
impl PageRenderer for StubRenderer {
    async fn render(&self, url: &str, _settle: Duration) -> Result<RenderedPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::Browser("target crashed".into()));
        }
        let landing = url.replace("/story", "/landing");
        Ok(RenderedPage {
            html: "<p>rendered body</p>".to_string(),
            final_url: landing,
        })
    }
}

fn browser_fetcher(renderer: Arc<StubRenderer>) -> Fetcher {
    Fetcher::new(FetchOptions {
        base_delay: Duration::from_millis(10),
        timeout: Duration::from_secs(5),
        use_browser: true,
        ..FetchOptions::default()
    })
    .unwrap()
    .with_renderer(renderer)
}

#[tokio::test]
async fn ftp_url_is_rejected_without_a_request() {
    let server = MockServer::start().await;
    let url = format!("ftp://{}/story", server.address());

    let err = fetcher(10).fetch(&url).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidUrl);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn rate_limit_twice_then_success_takes_two_backoffs() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/story"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/story"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let started = Instant::now();
    let response = fetcher(10).fetch(&format!("{}/story", server.uri())).await.unwrap();

    assert_eq!(response.attempts, 3);
    assert_eq!(response.status, 200);
    assert!(response.html.contains("Hello from the harbour"));
    // 10 ms then 30 ms.
    assert!(started.elapsed() >= Duration::from_millis(40));
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let err = fetcher(10).fetch(&format!("{}/missing", server.uri())).await.unwrap_err();

    assert!(matches!(err, Error::Http { status: 404, .. }));
    assert_eq!(err.kind(), ErrorKind::ExtractionFailed);
}

#[tokio::test]
async fn server_errors_use_every_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let err = fetcher(1).fetch(&format!("{}/busy", server.uri())).await.unwrap_err();

    assert!(matches!(err, Error::Server { status: 503, .. }));
    assert!(!err.to_failure().retryable);
}

#[tokio::test]
async fn persistent_rate_limit_is_retryable_for_callers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let err = fetcher(1).fetch(&format!("{}/story", server.uri())).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RateLimited);
    assert!(err.to_failure().retryable);
}

#[tokio::test]
async fn follows_redirects_and_reports_final_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .mount(&server)
        .await;

    let response = fetcher(10).fetch(&format!("{}/old", server.uri())).await.unwrap();

    assert!(response.redirected);
    assert_eq!(response.final_url, format!("{}/new", server.uri()));
    assert_eq!(response.attempts, 1);
}

#[tokio::test]
async fn decodes_legacy_charset_from_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"<html><body><p>Caf\xe9 on the quay</p></body></html>".to_vec(), "text/html; charset=windows-1252"),
        )
        .mount(&server)
        .await;

    let response = fetcher(10).fetch(&server.uri()).await.unwrap();
    assert!(response.html.contains("Café on the quay"));
}

#[tokio::test]
async fn broken_renderer_falls_back_to_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/story"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>http body</p>"))
        .expect(1)
        .mount(&server)
        .await;
    let renderer = StubRenderer::new(true);

    let response = browser_fetcher(Arc::clone(&renderer))
        .fetch(&format!("{}/story", server.uri()))
        .await
        .unwrap();

    assert!(!response.rendered);
    assert_eq!(response.html, "<p>http body</p>");
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn rendered_page_reports_where_it_landed() {
    let server = MockServer::start().await;
    let renderer = StubRenderer::new(false);
    let url = format!("{}/story", server.uri());

    let response = browser_fetcher(renderer).fetch(&url).await.unwrap();

    assert!(response.rendered);
    assert!(response.redirected);
    assert_eq!(response.final_url, format!("{}/landing", server.uri()));
    assert!(server.received_requests().await.unwrap().is_empty());
}

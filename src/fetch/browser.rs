//! Headless-browser render path.
//!
//! [`BrowserSession`] owns one lazily launched browser shared by every
//! render. Each render opens its own page inside that browser. Any render
//! error tears the shared instance down so the next render launches a fresh
//! one; renders still running against the old instance fail with it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::Result;

/// Serialized DOM of a rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub html: String,
    /// Where the page ended up after redirects.
    pub final_url: String,
}

/// Something that can turn a URL into rendered HTML.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Navigate to `url`, wait for the network to settle plus `settle`, and
    /// return the serialized DOM.
    async fn render(&self, url: &str, settle: Duration) -> Result<RenderedPage>;
}

/// A running browser instance.
#[async_trait]
pub trait RenderingBrowser: Send + Sync {
    async fn render_page(&self, url: &str, settle: Duration) -> Result<RenderedPage>;

    /// Shut the instance down. Errors are logged, not returned.
    async fn close(&self);
}

/// Starts browser instances for a [`BrowserSession`].
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    type Browser: RenderingBrowser + 'static;

    async fn launch(&self) -> Result<Self::Browser>;
}

/// Lazily launched, shared browser with reset-on-error.
pub struct BrowserSession<L: BrowserLauncher> {
    launcher: L,
    current: Mutex<Option<Arc<L::Browser>>>,
    launches: AtomicUsize,
}

impl<L: BrowserLauncher> BrowserSession<L> {
    #[must_use]
    pub fn new(launcher: L) -> Self {
        Self {
            launcher,
            current: Mutex::new(None),
            launches: AtomicUsize::new(0),
        }
    }

    /// The shared browser, launching it on first use.
    pub async fn acquire(&self) -> Result<Arc<L::Browser>> {
        let mut current = self.current.lock().await;
        if let Some(browser) = current.as_ref() {
            return Ok(Arc::clone(browser));
        }
        let browser = Arc::new(self.launcher.launch().await?);
        self.launches.fetch_add(1, Ordering::Relaxed);
        debug!(launches = self.launches.load(Ordering::Relaxed), "browser launched");
        *current = Some(Arc::clone(&browser));
        Ok(browser)
    }

    /// Tear down `failed` if it is still the shared instance.
    ///
    /// A second caller resetting the same instance finds it already replaced
    /// and does nothing.
    pub async fn reset(&self, failed: &Arc<L::Browser>) {
        let taken = {
            let mut current = self.current.lock().await;
            match current.as_ref() {
                Some(browser) if Arc::ptr_eq(browser, failed) => current.take(),
                _ => None,
            }
        };
        if let Some(browser) = taken {
            warn!("resetting browser session");
            browser.close().await;
        }
    }

    /// Number of instances launched so far.
    #[must_use]
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::Relaxed)
    }

    /// Whether an instance is currently held.
    pub async fn is_active(&self) -> bool {
        self.current.lock().await.is_some()
    }
}

#[async_trait]
impl<L: BrowserLauncher> PageRenderer for BrowserSession<L> {
    async fn render(&self, url: &str, settle: Duration) -> Result<RenderedPage> {
        let browser = self.acquire().await?;
        match browser.render_page(url, settle).await {
            Ok(page) => Ok(page),
            Err(err) => {
                self.reset(&browser).await;
                Err(err)
            }
        }
    }
}

#[cfg(feature = "browser")]
pub use chromium::{ChromiumBrowser, ChromiumLauncher};

#[cfg(feature = "browser")]
mod chromium {
    use std::path::PathBuf;
    use std::time::Duration;

    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser, BrowserConfig};
    use futures::StreamExt;
    use tokio::sync::Mutex;
    use tokio::task::JoinHandle;
    use tracing::warn;

    use super::{BrowserLauncher, RenderedPage, RenderingBrowser};
    use crate::error::{Error, Result};

    /// Launches headless Chromium through the DevTools protocol.
    #[derive(Debug, Clone, Default)]
    pub struct ChromiumLauncher {
        /// Explicit browser binary; chromiumoxide searches the usual
        /// locations when unset.
        pub executable: Option<PathBuf>,
        /// Per-navigation deadline.
        pub navigation_timeout: Option<Duration>,
    }

    /// A running Chromium with its CDP event-loop task.
    pub struct ChromiumBrowser {
        browser: Mutex<Browser>,
        handler: JoinHandle<()>,
        navigation_timeout: Duration,
    }

    #[async_trait]
    impl BrowserLauncher for ChromiumLauncher {
        type Browser = ChromiumBrowser;

        async fn launch(&self) -> Result<ChromiumBrowser> {
            let mut builder = BrowserConfig::builder()
                .arg("--headless=new")
                .arg("--disable-gpu")
                .arg("--no-sandbox")
                .arg("--disable-dev-shm-usage")
                .arg("--disable-extensions");
            if let Some(path) = &self.executable {
                builder = builder.chrome_executable(path);
            }
            let config = builder
                .build()
                .map_err(|e| Error::Browser(format!("invalid browser config: {e}")))?;

            let (browser, mut handler) = Browser::launch(config)
                .await
                .map_err(|e| Error::Browser(format!("launch failed: {e}")))?;
            let handler = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            Ok(ChromiumBrowser {
                browser: Mutex::new(browser),
                handler,
                navigation_timeout: self.navigation_timeout.unwrap_or(Duration::from_secs(30)),
            })
        }
    }

    #[async_trait]
    impl RenderingBrowser for ChromiumBrowser {
        async fn render_page(&self, url: &str, settle: Duration) -> Result<RenderedPage> {
            let page = {
                let browser = self.browser.lock().await;
                browser
                    .new_page("about:blank")
                    .await
                    .map_err(|e| Error::Browser(format!("new page: {e}")))?
            };

            let rendered = async {
                tokio::time::timeout(self.navigation_timeout, async {
                    page.goto(url).await?;
                    page.wait_for_navigation().await?;
                    Ok::<_, chromiumoxide::error::CdpError>(())
                })
                .await
                .map_err(|_| Error::Timeout(format!("browser navigation to {url}")))?
                .map_err(|e| Error::Browser(format!("navigation to {url}: {e}")))?;

                tokio::time::sleep(settle).await;
                let html = page
                    .content()
                    .await
                    .map_err(|e| Error::Browser(format!("page content: {e}")))?;
                let final_url = page
                    .url()
                    .await
                    .map_err(|e| Error::Browser(format!("page url: {e}")))?
                    .unwrap_or_else(|| url.to_string());
                Ok(RenderedPage { html, final_url })
            }
            .await;

            if let Err(e) = page.close().await {
                warn!(error = %e, "failed to close page");
            }
            rendered
        }

        async fn close(&self) {
            let mut browser = self.browser.lock().await;
            if let Err(e) = browser.close().await {
                warn!(error = %e, "browser close failed");
            }
            self.handler.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::AtomicBool;

    struct FakeBrowser {
        generation: usize,
        fail_next: Arc<AtomicBool>,
        closed: AtomicBool,
    }

    #[async_trait]
    impl RenderingBrowser for FakeBrowser {
        async fn render_page(&self, url: &str, _settle: Duration) -> Result<RenderedPage> {
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(Error::Browser("target crashed".into()));
            }
            Ok(RenderedPage {
                html: format!("<html><body>{url} #{}</body></html>", self.generation),
                final_url: url.to_string(),
            })
        }

        async fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct FakeLauncher {
        launched: AtomicUsize,
        fail_next: Arc<AtomicBool>,
    }

    #[async_trait]
    impl BrowserLauncher for FakeLauncher {
        type Browser = FakeBrowser;

        async fn launch(&self) -> Result<FakeBrowser> {
            let generation = self.launched.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(FakeBrowser {
                generation,
                fail_next: Arc::clone(&self.fail_next),
                closed: AtomicBool::new(false),
            })
        }
    }

    #[tokio::test]
    async fn launches_lazily_and_reuses_instance() {
        let session = BrowserSession::new(FakeLauncher::default());
        assert_eq!(session.launches(), 0);
        assert!(!session.is_active().await);

        let first = session.render("https://a.example", Duration::ZERO).await.unwrap();
        let second = session.render("https://b.example", Duration::ZERO).await.unwrap();

        assert!(first.html.contains("#1"));
        assert!(second.html.contains("#1"));
        assert_eq!(second.final_url, "https://b.example");
        assert_eq!(session.launches(), 1);
    }

    #[tokio::test]
    async fn render_error_resets_and_relaunches() {
        let launcher = FakeLauncher::default();
        let fail_next = Arc::clone(&launcher.fail_next);
        let session = BrowserSession::new(launcher);

        let original = session.acquire().await.unwrap();
        fail_next.store(true, Ordering::SeqCst);
        assert!(session.render("https://a.example", Duration::ZERO).await.is_err());

        assert!(original.closed.load(Ordering::SeqCst));
        assert!(!session.is_active().await);

        let page = session.render("https://a.example", Duration::ZERO).await.unwrap();
        assert!(page.html.contains("#2"));
        assert_eq!(session.launches(), 2);
    }

    #[tokio::test]
    async fn stale_reset_keeps_new_instance() {
        let session = BrowserSession::new(FakeLauncher::default());
        let old = session.acquire().await.unwrap();
        session.reset(&old).await;
        let fresh = session.acquire().await.unwrap();

        session.reset(&old).await;

        assert!(session.is_active().await);
        assert!(!fresh.closed.load(Ordering::SeqCst));
    }
}

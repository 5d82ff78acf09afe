//! Dual-mode page fetcher
//!
//! Every page is first requested over plain HTTP (the fast path). When that
//! fails, the page is loaded in the shared rendering engine instead. A full
//! round of both modes is repeated up to `retries` extra times before the
//! fetch gives up and reports an empty outcome.
//!
//! # Retry Logic
//!
//! | Condition | Action |
//! |-----------|--------|
//! | Fast path 2xx | Return immediately |
//! | Fast path non-2xx, timeout or network error | Fall back to the renderer |
//! | Renderer loads the page | Return, whatever its status |
//! | Renderer fails | Next round with the next proxy |
//! | Renderer closed | Stop; the crawl is being cancelled |

use crate::config::{FetchConfig, ProxyEntry, DEFAULT_USER_AGENTS};
use crate::crawler::proxy::ProxyRotator;
use crate::render::{RenderedPage, Renderer};
use crate::RenderResult;
use rand::Rng;
use reqwest::header::{ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Measured wall-clock load time is divided by this before reporting
pub const LOAD_TIME_DIVISOR: f64 = 10.0;

/// Which fetch mode produced a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchSource {
    Fast,
    Rendered,
    None,
}

/// Result of [`DualFetcher::smart_fetch`]
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    /// Page body, None when every attempt failed
    pub html: Option<String>,
    /// HTTP status; a rendered page whose status is unknown reports 0
    pub status: Option<u16>,
    /// Scaled load time in milliseconds, 0 on failure
    pub load_time_ms: f64,
    pub source: FetchSource,
}

impl FetchOutcome {
    fn failed(status: Option<u16>) -> Self {
        Self {
            html: None,
            status,
            load_time_ms: 0.0,
            source: FetchSource::None,
        }
    }
}

/// Why a fast-path attempt did not produce a page
#[derive(Debug)]
struct FastFailure {
    status: Option<u16>,
    message: String,
}

impl From<reqwest::Error> for FastFailure {
    fn from(error: reqwest::Error) -> Self {
        Self {
            status: error.status().map(|s| s.as_u16()),
            message: error.to_string(),
        }
    }
}

/// Fast-path HTTP fetcher with a rendering-engine fallback
#[derive(Debug, Clone)]
pub struct DualFetcher {
    config: FetchConfig,
}

impl DualFetcher {
    pub fn new(config: FetchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetches a page using the configured retry count
    pub async fn smart_fetch(
        &self,
        url: &str,
        proxies: &ProxyRotator,
        renderer: &dyn Renderer,
    ) -> FetchOutcome {
        self.fetch_with_retries(url, proxies, renderer, self.config.retries)
            .await
    }

    /// Fetches a page, allowing `retries` extra rounds after the first
    ///
    /// Never returns an error: total failure is an outcome with no HTML.
    pub async fn fetch_with_retries(
        &self,
        url: &str,
        proxies: &ProxyRotator,
        renderer: &dyn Renderer,
        retries: u32,
    ) -> FetchOutcome {
        let mut last_status = None;

        for attempt in 0..=retries {
            if renderer.is_closed() {
                tracing::debug!("Renderer closed, abandoning fetch of {}", url);
                break;
            }

            let proxy = proxies.next();

            self.human_delay(self.config.fast_delay_min_ms, self.config.fast_delay_max_ms)
                .await;
            match self.fetch_fast(url, proxy).await {
                Ok(outcome) => {
                    tracing::debug!("Fetched {} over HTTP (attempt {})", url, attempt + 1);
                    return outcome;
                }
                Err(failure) => {
                    if failure.status.is_some() {
                        last_status = failure.status;
                    }
                    tracing::debug!(
                        "Fast fetch of {} failed: {}, falling back to renderer",
                        url,
                        failure.message
                    );
                }
            }

            self.human_delay(
                self.config.fallback_delay_min_ms,
                self.config.fallback_delay_max_ms,
            )
            .await;
            match self.fetch_rendered(url, proxy, renderer).await {
                Ok(outcome) => {
                    tracing::debug!("Fetched {} with renderer (attempt {})", url, attempt + 1);
                    return outcome;
                }
                Err(e) => {
                    tracing::warn!(
                        "Rendered fetch of {} failed (attempt {}/{}): {}",
                        url,
                        attempt + 1,
                        retries + 1,
                        e
                    );
                }
            }
        }

        tracing::warn!("Giving up on {}", url);
        FetchOutcome::failed(last_status)
    }

    /// Plain GET through a per-attempt client bound to `proxy`
    async fn fetch_fast(
        &self,
        url: &str,
        proxy: Option<&ProxyEntry>,
    ) -> Result<FetchOutcome, FastFailure> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(self.config.fast_timeout_secs))
            .gzip(true)
            .brotli(true);
        if let Some(proxy) = proxy {
            builder = builder.proxy(proxy.to_reqwest()?);
        }
        let client = builder.build()?;

        let user_agent = self.random_user_agent();
        let start = Instant::now();
        let response = client
            .get(url)
            .header(USER_AGENT, user_agent)
            .header(ACCEPT_LANGUAGE, &self.config.accept_language)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FastFailure {
                status: Some(status.as_u16()),
                message: format!("HTTP {}", status),
            });
        }

        let body = response.text().await?;

        Ok(FetchOutcome {
            html: Some(body),
            status: Some(status.as_u16()),
            load_time_ms: scaled_load_time(start.elapsed()),
            source: FetchSource::Fast,
        })
    }

    /// Loads the page in a fresh renderer tab, closing the tab afterwards
    async fn fetch_rendered(
        &self,
        url: &str,
        proxy: Option<&ProxyEntry>,
        renderer: &dyn Renderer,
    ) -> RenderResult<FetchOutcome> {
        let mut page = renderer.new_page().await?;
        let result = self.load_rendered(page.as_mut(), url, proxy).await;

        if let Err(e) = page.close().await {
            tracing::debug!("Failed to close renderer page for {}: {}", url, e);
        }

        result
    }

    async fn load_rendered(
        &self,
        page: &mut dyn RenderedPage,
        url: &str,
        proxy: Option<&ProxyEntry>,
    ) -> RenderResult<FetchOutcome> {
        if let Some(ProxyEntry {
            username: Some(username),
            password,
            ..
        }) = proxy
        {
            page.authenticate(username, password.as_deref().unwrap_or(""))
                .await?;
        }

        let user_agent = self.random_user_agent().to_string();
        page.set_user_agent(&user_agent).await?;

        let start = Instant::now();
        let status = page
            .navigate(url, Duration::from_secs(self.config.render_timeout_secs))
            .await?;
        let load_time_ms = scaled_load_time(start.elapsed());
        let html = page.content().await?;

        Ok(FetchOutcome {
            html: Some(html),
            status: Some(status.unwrap_or(0)),
            load_time_ms,
            source: FetchSource::Rendered,
        })
    }

    fn random_user_agent(&self) -> &str {
        let agents = &self.config.user_agents;
        if agents.is_empty() {
            return DEFAULT_USER_AGENTS[0];
        }
        let index = rand::rng().random_range(0..agents.len());
        &agents[index]
    }

    /// Sleeps for a uniformly random duration in `[min_ms, max_ms]`
    async fn human_delay(&self, min_ms: u64, max_ms: u64) {
        if max_ms == 0 {
            return;
        }
        let millis = rand::rng().random_range(min_ms.min(max_ms)..=max_ms);
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
}

fn scaled_load_time(elapsed: Duration) -> f64 {
    elapsed.as_millis() as f64 / LOAD_TIME_DIVISOR
}

//! Crawler module for fetching and auditing a site
//!
//! This module contains the crawl side of the pipeline, including:
//! - The URL frontier with depth and page bounds
//! - Proxy rotation and the dual (HTTP + rendered) fetcher
//! - Sitemap resolution and link extraction
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod proxy;
mod sitemap;

pub use coordinator::{crawl_with_renderer, Coordinator, CrawlContext, LinkGraph};
pub use fetcher::{DualFetcher, FetchOutcome, FetchSource, LOAD_TIME_DIVISOR};
pub use frontier::{CrawlJob, Frontier};
pub use parser::extract_internal_links;
pub use proxy::ProxyRotator;
pub use sitemap::{extract_loc_values, resolve_sitemap_urls};

use crate::audit::PageAudit;
use crate::config::Config;
use crate::render::{Renderer, WebDriverRenderer};
use crate::url::is_sitemap_url;
use crate::AuditError;
use std::sync::Arc;
use url::Url;

/// One crawl invocation: where to start and how far to go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRequest {
    pub start_url: String,
    pub max_depth: u32,
    pub max_pages: usize,
}

impl CrawlRequest {
    /// Validates and builds a request
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlRequest)` - The start URL is absolute http(s) and `max_pages > 0`
    /// * `Err(AuditError::InvalidRequest)` - Otherwise
    pub fn new(
        start_url: impl Into<String>,
        max_depth: u32,
        max_pages: usize,
    ) -> Result<Self, AuditError> {
        let start_url = start_url.into();
        let parsed = Url::parse(start_url.trim()).map_err(|e| {
            AuditError::InvalidRequest(format!("start URL '{}' is not valid: {}", start_url, e))
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(AuditError::InvalidRequest(format!(
                "start URL must use http or https, got '{}'",
                start_url
            )));
        }

        if max_pages == 0 {
            return Err(AuditError::InvalidRequest(
                "max_pages must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            start_url: parsed.to_string(),
            max_depth,
            max_pages,
        })
    }

    /// Whether the crawl runs in sitemap mode
    pub fn is_sitemap(&self) -> bool {
        is_sitemap_url(&self.start_url)
    }
}

/// Runs a complete audit crawl
///
/// This is the main entry point. It will:
/// 1. Build the crawl context (proxies, robots gate, fetcher) from `config`
/// 2. Start a WebDriver session for the rendered fetch path
/// 3. Crawl and audit pages until the frontier drains or the page cap is hit
/// 4. Close the WebDriver session
///
/// # Returns
///
/// * `Ok(Vec<PageAudit>)` - Audits in crawl order
/// * `Err(AuditError)` - The renderer could not start or the crawl failed as a whole
pub async fn run_crawl(config: &Config, request: CrawlRequest) -> Result<Vec<PageAudit>, AuditError> {
    let context = CrawlContext::from_config(config)?;

    tracing::info!("Connecting to WebDriver at {}", config.renderer.webdriver_url);
    let renderer: Arc<dyn Renderer> = Arc::new(WebDriverRenderer::connect(&config.renderer).await?);

    crawl_with_renderer(context, renderer, request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_validation() {
        let request = CrawlRequest::new("https://example.com", 2, 50).unwrap();
        assert_eq!(request.start_url, "https://example.com/");
        assert!(!request.is_sitemap());

        assert!(matches!(
            CrawlRequest::new("example.com", 1, 10),
            Err(AuditError::InvalidRequest(_))
        ));
        assert!(CrawlRequest::new("ftp://example.com/", 1, 10).is_err());
        assert!(CrawlRequest::new("https://example.com/", 1, 0).is_err());
        assert!(CrawlRequest::new("https://example.com/", 0, 1).is_ok());
    }

    #[test]
    fn test_sitemap_request() {
        let request = CrawlRequest::new("https://example.com/SITEMAP.xml", 1, 10).unwrap();
        assert!(request.is_sitemap());
    }

    #[tokio::test]
    async fn test_run_crawl_fails_without_webdriver() {
        let mut config = Config::default();
        // Nothing listens on the discard port
        config.renderer.webdriver_url = "http://127.0.0.1:9".to_string();

        let request = CrawlRequest::new("https://example.com/", 0, 1).unwrap();
        let result = run_crawl(&config, request).await;
        assert!(matches!(result, Err(AuditError::Renderer(_))));
    }
}

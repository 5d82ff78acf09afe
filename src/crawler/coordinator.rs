//! Crawl coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties the pieces together:
//! - Seeding the frontier from the start URL or a resolved sitemap
//! - Gating every URL through robots.txt
//! - Fetching, analyzing and classifying pages
//! - Expanding the frontier with discovered same-origin links
//! - Closing the rendering session when the crawl ends

use crate::audit::{audit_page, PageAudit, PageOrigin};
use crate::config::Config;
use crate::crawler::fetcher::DualFetcher;
use crate::crawler::frontier::{CrawlJob, Frontier};
use crate::crawler::parser::extract_internal_links;
use crate::crawler::proxy::ProxyRotator;
use crate::crawler::sitemap::resolve_sitemap_urls;
use crate::crawler::CrawlRequest;
use crate::render::Renderer;
use crate::robots::RobotsGate;
use crate::AuditError;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use url::Url;

/// Per-crawl shared state, built once from the configuration
pub struct CrawlContext {
    pub proxies: ProxyRotator,
    pub robots: RobotsGate,
    pub fetcher: DualFetcher,
}

impl CrawlContext {
    pub fn new(proxies: ProxyRotator, robots: RobotsGate, fetcher: DualFetcher) -> Self {
        Self {
            proxies,
            robots,
            fetcher,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, AuditError> {
        Ok(Self::new(
            ProxyRotator::new(config.proxies.clone()),
            RobotsGate::new(&config.robots)?,
            DualFetcher::new(config.fetch.clone()),
        ))
    }
}

/// Internal link edges discovered during the crawl
#[derive(Debug, Default)]
pub struct LinkGraph {
    incoming: HashMap<String, HashSet<String>>,
}

impl LinkGraph {
    /// Records that `from` links to `to`; self links are ignored
    pub fn record(&mut self, from: &str, to: &str) {
        if from == to {
            return;
        }
        self.incoming
            .entry(to.to_string())
            .or_default()
            .insert(from.to_string());
    }

    /// Number of distinct crawled pages linking to `url`
    pub fn incoming_links(&self, url: &str) -> usize {
        self.incoming.get(url).map_or(0, HashSet::len)
    }

    /// Audited pages that no other audited page links to
    pub fn unlinked_pages<'a>(&self, pages: &'a [PageAudit]) -> Vec<&'a str> {
        pages
            .iter()
            .map(|page| page.url.as_str())
            .filter(|url| self.incoming_links(url) == 0)
            .collect()
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    context: CrawlContext,
    renderer: Arc<dyn Renderer>,
    request: CrawlRequest,
    sitemap_mode: bool,
    frontier: Frontier,
    processed: HashSet<String>,
    link_graph: LinkGraph,
    results: Vec<PageAudit>,
}

impl Coordinator {
    pub fn new(context: CrawlContext, renderer: Arc<dyn Renderer>, request: CrawlRequest) -> Self {
        let frontier = Frontier::new(request.max_depth, request.max_pages);
        let sitemap_mode = request.is_sitemap();

        Self {
            context,
            renderer,
            request,
            sitemap_mode,
            frontier,
            processed: HashSet::new(),
            link_graph: LinkGraph::default(),
            results: Vec::new(),
        }
    }

    /// Runs the crawl to completion and closes the rendering session
    ///
    /// The session is closed whether or not the crawl succeeded.
    pub async fn run(&mut self) -> Result<Vec<PageAudit>, AuditError> {
        let result = self.crawl().await;

        if let Err(e) = self.renderer.close().await {
            tracing::warn!("Failed to close rendering session: {}", e);
        }

        result
    }

    pub fn link_graph(&self) -> &LinkGraph {
        &self.link_graph
    }

    async fn crawl(&mut self) -> Result<Vec<PageAudit>, AuditError> {
        tracing::info!(
            "Starting audit of {} (max depth {}, max pages {}{})",
            self.request.start_url,
            self.request.max_depth,
            self.request.max_pages,
            if self.sitemap_mode { ", sitemap mode" } else { "" }
        );

        self.seed().await?;
        let start_time = std::time::Instant::now();

        while !self.frontier.is_empty() {
            let Some(job) = self.frontier.pop() else {
                break;
            };

            self.process_job(job).await;

            if self.results.len() >= self.request.max_pages {
                tracing::info!("Reached page limit of {}", self.request.max_pages);
                break;
            }
        }

        tracing::info!(
            "Crawl finished: {} pages audited, {} processed, {} still queued, {:.1}s",
            self.results.len(),
            self.frontier.processed_count(),
            self.frontier.queued(),
            start_time.elapsed().as_secs_f64()
        );

        if !self.sitemap_mode {
            for url in self.link_graph.unlinked_pages(&self.results) {
                if url != self.request.start_url {
                    tracing::debug!("No crawled page links to {}", url);
                }
            }
        }

        Ok(std::mem::take(&mut self.results))
    }

    /// Fills the frontier with the start URL or the sitemap's page list
    async fn seed(&mut self) -> Result<(), AuditError> {
        let start = Url::parse(&self.request.start_url)?;

        if !self.sitemap_mode {
            self.frontier.add(start.as_str(), 0);
            return Ok(());
        }

        let urls = resolve_sitemap_urls(
            start.as_str(),
            &self.context.fetcher,
            &self.context.proxies,
            self.renderer.as_ref(),
            self.request.max_pages,
        )
        .await;

        let mut queued = 0;
        for url in &urls {
            if self.frontier.add(url, 1) {
                queued += 1;
            }
        }
        tracing::info!("Seeded {} of {} sitemap URLs", queued, urls.len());

        Ok(())
    }

    /// Processes one job; page-level failures are logged, never returned
    async fn process_job(&mut self, job: CrawlJob) {
        if !self.processed.insert(job.url.clone()) {
            tracing::debug!("Skipping already processed {}", job.url);
            self.frontier.mark_processed();
            return;
        }

        tracing::info!(
            "[{}/{}] Auditing {} (depth {})",
            self.frontier.processed_count() + 1,
            self.request.max_pages,
            job.url,
            job.depth
        );

        if !self.context.robots.is_allowed(&job.url).await {
            tracing::info!("Blocked by robots.txt: {}", job.url);
            self.frontier.mark_processed();
            return;
        }

        let outcome = self
            .context
            .fetcher
            .smart_fetch(&job.url, &self.context.proxies, self.renderer.as_ref())
            .await;
        self.frontier.mark_processed();

        let Some(html) = outcome.html else {
            tracing::warn!("No content for {}, skipping", job.url);
            return;
        };

        let url = match Url::parse(&job.url) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Cannot audit malformed URL {}: {}", job.url, e);
                return;
            }
        };

        let expand = !self.sitemap_mode && job.depth < self.request.max_depth;
        let links = if expand {
            extract_internal_links(&html, &url)
        } else {
            Vec::new()
        };

        let origin = PageOrigin {
            status: outcome.status.unwrap_or(0),
            load_time_ms: outcome.load_time_ms,
            from_sitemap: self.sitemap_mode,
            depth: job.depth,
            source: outcome.source,
        };
        let audit = audit_page(html, &url, origin);
        tracing::debug!(
            "{}: status {}, {} critical, {} warning, {} notice issues",
            job.url,
            audit.status,
            audit.critical_issues.issues.len(),
            audit.warning_issues.issues.len(),
            audit.notice_issues.issues.len()
        );
        self.results.push(audit);

        self.enqueue_links(&job, links).await;
    }

    async fn enqueue_links(&mut self, job: &CrawlJob, links: Vec<String>) {
        let mut added = 0;

        for link in links {
            self.link_graph.record(&job.url, &link);

            if self.processed.contains(&link) || self.frontier.is_reserved(&link) {
                continue;
            }
            if !self.context.robots.is_allowed(&link).await {
                tracing::debug!("Not queueing {}: disallowed by robots.txt", link);
                continue;
            }
            if self.frontier.add(&link, job.depth + 1) {
                added += 1;
            }
        }

        if added > 0 {
            tracing::debug!("Queued {} new links from {}", added, job.url);
        }
    }
}

/// Crawls with an already connected renderer
///
/// The renderer is closed when the crawl ends.
pub async fn crawl_with_renderer(
    context: CrawlContext,
    renderer: Arc<dyn Renderer>,
    request: CrawlRequest,
) -> Result<Vec<PageAudit>, AuditError> {
    let mut coordinator = Coordinator::new(context, renderer, request);
    coordinator.run().await
}

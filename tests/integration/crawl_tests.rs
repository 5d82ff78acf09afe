//! Integration tests for the audit crawler
//!
//! These tests use wiremock to serve a small site and an in-process renderer
//! in place of a real browser, and run the full crawl cycle end-to-end.

use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use sumi_audit::config::FetchConfig;
use sumi_audit::crawler::{
    crawl_with_renderer, CrawlContext, CrawlRequest, DualFetcher, FetchSource, ProxyRotator,
};
use sumi_audit::render::{RenderedPage, Renderer};
use sumi_audit::robots::RobotsGate;
use sumi_audit::{Issue, PageAudit, RenderError, RenderResult};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Renderer standing in for a browser: serves one fixed document, or fails
#[derive(Default)]
struct StubRenderer {
    document: Option<(String, u16)>,
    closed: AtomicBool,
}

impl StubRenderer {
    fn failing() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn serving(html: &str, status: u16) -> Arc<Self> {
        Arc::new(Self {
            document: Some((html.to_string(), status)),
            ..Self::default()
        })
    }
}

#[async_trait]
impl Renderer for StubRenderer {
    async fn new_page(&self) -> RenderResult<Box<dyn RenderedPage>> {
        if self.is_closed() {
            return Err(RenderError::Closed);
        }
        Ok(Box::new(StubPage {
            document: self.document.clone(),
        }))
    }

    async fn close(&self) -> RenderResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

struct StubPage {
    document: Option<(String, u16)>,
}

#[async_trait]
impl RenderedPage for StubPage {
    async fn authenticate(&mut self, _username: &str, _password: &str) -> RenderResult<()> {
        Ok(())
    }

    async fn set_user_agent(&mut self, _user_agent: &str) -> RenderResult<()> {
        Ok(())
    }

    async fn navigate(&mut self, url: &str, _timeout: Duration) -> RenderResult<Option<u16>> {
        match &self.document {
            Some((_, status)) => Ok(Some(*status)),
            None => Err(RenderError::Timeout {
                url: url.to_string(),
            }),
        }
    }

    async fn content(&mut self) -> RenderResult<String> {
        self.document
            .as_ref()
            .map(|(html, _)| html.clone())
            .ok_or_else(|| RenderError::Protocol("no document".to_string()))
    }

    async fn close(&mut self) -> RenderResult<()> {
        Ok(())
    }
}

/// Crawl context with no delays, no proxies and a single fetch round
fn test_context() -> CrawlContext {
    CrawlContext::new(
        ProxyRotator::default(),
        RobotsGate::with_client(Client::new(), "SEO-Audit-Bot"),
        DualFetcher::new(FetchConfig {
            retries: 0,
            fast_delay_min_ms: 0,
            fast_delay_max_ms: 0,
            fallback_delay_min_ms: 0,
            fallback_delay_max_ms: 0,
            ..FetchConfig::default()
        }),
    )
}

async fn mount_html(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body.to_string())
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .mount(server)
        .await;
}

fn urls(pages: &[PageAudit]) -> Vec<String> {
    pages.iter().map(|p| p.url.clone()).collect()
}

fn assert_unique(pages: &[PageAudit]) {
    let unique: HashSet<_> = pages.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(unique.len(), pages.len(), "duplicate audits: {:?}", urls(pages));
}

async fn crawl(
    renderer: Arc<StubRenderer>,
    start_url: String,
    max_depth: u32,
    max_pages: usize,
) -> Vec<PageAudit> {
    let request = CrawlRequest::new(start_url, max_depth, max_pages).unwrap();
    crawl_with_renderer(test_context(), renderer, request)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_full_crawl_breadth_first() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_html(
        &server,
        "/",
        r#"<html><head><title>Home page of the site</title></head><body>
           <a href="/page1">Page 1</a>
           <a href="/page2">Page 2</a>
           <a href="/page1#again">Page 1 again</a>
           <a href="https://elsewhere.example/">External</a>
           </body></html>"#,
    )
    .await;
    mount_html(&server, "/page1", r#"<a href="/page3">3</a><a href="/">home</a>"#).await;
    mount_html(&server, "/page2", r#"<a href="/page1">1</a>"#).await;
    mount_html(&server, "/page3", r#"<a href="/page4">4</a>"#).await;
    mount_html(&server, "/page4", "<p>too deep</p>").await;

    let renderer = StubRenderer::failing();
    let pages = crawl(renderer.clone(), format!("{base}/"), 2, 100).await;

    assert_eq!(
        urls(&pages),
        vec![
            format!("{base}/"),
            format!("{base}/page1"),
            format!("{base}/page2"),
            format!("{base}/page3"),
        ]
    );
    assert_unique(&pages);
    assert!(pages.iter().all(|p| p.depth <= 2));
    assert!(pages.iter().all(|p| p.fetch_source == FetchSource::Fast));
    assert!(pages.iter().all(|p| !p.from_sitemap));

    let home = &pages[0];
    assert_eq!(home.status, 200);
    assert_eq!(home.title, "Home page of the site");
    assert_eq!(home.internal_link_count, 3);
    assert_eq!(home.external_link_count, 1);
    assert!(renderer.is_closed());
}

#[tokio::test]
async fn test_robots_disallowed_pages_never_fetched() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, "User-agent: *\nDisallow: /private").await;
    mount_html(
        &server,
        "/",
        r#"<a href="/public">Public</a><a href="/private/area">Private</a>"#,
    )
    .await;
    mount_html(&server, "/public", "<p>public</p>").await;
    Mock::given(method("GET"))
        .and(path("/private/area"))
        .respond_with(ResponseTemplate::new(200).set_body_string("secret"))
        .expect(0)
        .mount(&server)
        .await;

    let pages = crawl(StubRenderer::failing(), format!("{base}/"), 3, 100).await;

    assert_eq!(urls(&pages), vec![format!("{base}/"), format!("{base}/public")]);
}

#[tokio::test]
async fn test_disallowed_start_url_yields_nothing() {
    let server = MockServer::start().await;

    mount_robots(&server, "User-agent: SEO-Audit-Bot\nDisallow: /").await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("home"))
        .expect(0)
        .mount(&server)
        .await;

    let pages = crawl(StubRenderer::failing(), format!("{}/", server.uri()), 1, 10).await;
    assert!(pages.is_empty());
}

#[tokio::test]
async fn test_depth_zero_audits_only_start_page() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_html(&server, "/", r#"<a href="/a">A</a><a href="/b">B</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(200).set_body_string("a"))
        .expect(0)
        .mount(&server)
        .await;

    let pages = crawl(StubRenderer::failing(), format!("{base}/"), 0, 10).await;

    assert_eq!(urls(&pages), vec![format!("{base}/")]);
    assert_eq!(pages[0].depth, 0);
}

#[tokio::test]
async fn test_max_pages_caps_results() {
    let server = MockServer::start().await;
    let base = server.uri();

    let links: String = (1..=5).map(|i| format!(r#"<a href="/p{i}">{i}</a>"#)).collect();
    mount_html(&server, "/", &links).await;
    for i in 1..=5 {
        mount_html(&server, &format!("/p{i}"), "<p>child</p>").await;
    }

    let pages = crawl(StubRenderer::failing(), format!("{base}/"), 1, 2).await;

    assert_eq!(pages.len(), 2);
    assert_eq!(urls(&pages), vec![format!("{base}/"), format!("{base}/p1")]);
}

#[tokio::test]
async fn test_sitemap_mode_does_not_expand_links() {
    let server = MockServer::start().await;
    let base = server.uri();

    let sitemap = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
        <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
          <url><loc>{base}/s1</loc></url>
          <url><loc>{base}/s2</loc></url>
        </urlset>"#
    );
    mount_html(&server, "/sitemap.xml", &sitemap).await;
    mount_html(&server, "/s1", r#"<a href="/not-listed">hidden</a>"#).await;
    mount_html(&server, "/s2", "<p>listed</p>").await;
    Mock::given(method("GET"))
        .and(path("/not-listed"))
        .respond_with(ResponseTemplate::new(200).set_body_string("nope"))
        .expect(0)
        .mount(&server)
        .await;

    let pages = crawl(StubRenderer::failing(), format!("{base}/sitemap.xml"), 3, 10).await;

    assert_eq!(urls(&pages), vec![format!("{base}/s1"), format!("{base}/s2")]);
    assert!(pages.iter().all(|p| p.from_sitemap && p.depth == 1));
    assert!(!pages[0].critical_issues.has(Issue::SitemapError));
}

#[tokio::test]
async fn test_rendered_fallback_when_fast_path_blocked() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(403).set_body_string("blocked"))
        .mount(&server)
        .await;

    let renderer = StubRenderer::serving("<html><head><title>Rendered</title></head></html>", 200);
    let pages = crawl(renderer, format!("{base}/"), 0, 10).await;

    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].fetch_source, FetchSource::Rendered);
    assert_eq!(pages[0].status, 200);
    assert_eq!(pages[0].title, "Rendered");
}

#[tokio::test]
async fn test_closed_renderer_drains_crawl() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("home"))
        .expect(0)
        .mount(&server)
        .await;

    let renderer = StubRenderer::failing();
    renderer.close().await.unwrap();

    let pages = crawl(renderer, format!("{}/", server.uri()), 1, 10).await;
    assert!(pages.is_empty());
}

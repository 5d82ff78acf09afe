//! HTML analysis
//!
//! This module turns one fetched document into:
//! - the public [`PageAudit`] skeleton (title, meta, headings, links, images, ratios)
//! - the [`PageFacts`] the issue classifier evaluates
//!
//! Analysis never fails. Missing elements become empty strings, empty lists
//! or zero counts.

use crate::audit::types::{AuditResult, ImageRef, OpenGraph, PageAudit};
use crate::crawler::FetchSource;
use crate::url::{is_same_origin, resolve_link};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Elements whose text never renders as page copy
const HIDDEN_TEXT_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Structural facts of a page used by the classification passes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageFacts {
    /// First line of the first `<title>`
    pub title: String,
    pub meta_description: String,
    pub h1: Vec<String>,
    pub h2_h3_count: usize,
    /// Lower-cased content of every robots meta tag, space separated
    pub robots_meta: String,
    pub has_viewport: bool,
    /// Canonical href exactly as declared
    pub canonical: Option<String>,
    pub og: OpenGraph,
    pub twitter_card: Option<String>,
    pub image_count: usize,
    pub images_missing_alt: Vec<ImageRef>,
    /// Stylesheet hrefs and script srcs, empty when the attribute is blank
    pub css_js_refs: Vec<String>,
    /// Image and iframe sources
    pub media_refs: Vec<String>,
    /// Anchor occurrences pointing at the page's origin
    pub internal_link_count: usize,
    /// Anchor occurrences pointing elsewhere
    pub external_link_count: usize,
    pub word_count: usize,
    pub text_length: usize,
    pub html_length: usize,
    pub html_size_kb: f64,
    pub text_html_ratio: f64,
}

impl PageFacts {
    pub fn is_noindex(&self) -> bool {
        self.robots_meta.contains("noindex")
    }

    pub fn is_nofollow(&self) -> bool {
        self.robots_meta.contains("nofollow")
    }

    /// Number of stylesheet or script tags with a blank reference
    pub fn broken_resource_count(&self) -> usize {
        self.css_js_refs.iter().filter(|r| r.is_empty()).count()
    }

    /// Whether any subresource is loaded over plain HTTP
    pub fn has_insecure_resources(&self) -> bool {
        self.css_js_refs
            .iter()
            .chain(&self.media_refs)
            .any(|r| r.to_ascii_lowercase().starts_with("http://"))
    }

    /// Raw HTML size in KiB, unrounded
    pub fn html_size_kb_exact(&self) -> f64 {
        self.html_length as f64 / 1024.0
    }
}

/// Analyzes a page and returns its audit skeleton plus classifier facts
///
/// The skeleton carries no issues and no HTML snapshot yet; see
/// [`crate::audit::audit_page`] for the full pipeline. Analysis is a pure
/// function of its inputs.
///
/// # Example
///
/// ```
/// use sumi_audit::audit::analyze_page;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/").unwrap();
/// let html = "<html><head><title>Home\nignored</title></head><body><h1>Hi</h1></body></html>";
/// let (audit, facts) = analyze_page(html, &url, 200, 12.5, false);
/// assert_eq!(audit.title, "Home");
/// assert_eq!(audit.h1, vec!["Hi"]);
/// assert_eq!(facts.word_count, 1);
/// ```
pub fn analyze_page(
    html: &str,
    url: &Url,
    status: u16,
    load_time_ms: f64,
    from_sitemap: bool,
) -> (PageAudit, PageFacts) {
    let document = Html::parse_document(html);
    let facts = extract_facts(&document, html, url);

    let audit = PageAudit {
        url: url.to_string(),
        status,
        load_time_ms,
        html_size_kb: facts.html_size_kb,
        title: facts.title.clone(),
        meta_description: facts.meta_description.clone(),
        h1: facts.h1.clone(),
        word_count: facts.word_count,
        text_html_ratio: facts.text_html_ratio,
        canonical: facts.canonical.clone(),
        og: facts.og.clone(),
        images: facts.images_missing_alt.clone(),
        internal_link_count: facts.internal_link_count,
        external_link_count: facts.external_link_count,
        html: String::new(),
        critical_issues: AuditResult::default(),
        warning_issues: AuditResult::default(),
        notice_issues: AuditResult::default(),
        from_sitemap,
        depth: 0,
        fetch_source: FetchSource::None,
    };

    (audit, facts)
}

fn extract_facts(document: &Html, html: &str, url: &Url) -> PageFacts {
    let text = visible_text(document);
    let (internal_link_count, external_link_count) = count_links(document, url);
    let (image_count, images_missing_alt) = extract_images(document);

    let html_length = html.len();
    let text_length = text.len();
    let text_html_ratio = if html_length == 0 {
        0.0
    } else {
        round2(text_length as f64 / html_length as f64 * 100.0)
    };

    PageFacts {
        title: extract_title(document),
        meta_description: meta_content(document, "name", "description")
            .unwrap_or_default(),
        h1: select_all(document, "h1")
            .into_iter()
            .map(element_text)
            .collect(),
        h2_h3_count: select_all(document, "h2, h3").len(),
        robots_meta: robots_meta(document),
        has_viewport: !meta_elements(document, "name", "viewport").is_empty(),
        canonical: link_with_rel(document, "canonical")
            .into_iter()
            .next()
            .filter(|href| !href.is_empty()),
        og: OpenGraph {
            title: meta_content(document, "property", "og:title"),
            description: meta_content(document, "property", "og:description"),
            image: meta_content(document, "property", "og:image"),
            url: meta_content(document, "property", "og:url"),
        },
        twitter_card: meta_content(document, "name", "twitter:card"),
        image_count,
        images_missing_alt,
        css_js_refs: css_js_refs(document),
        media_refs: select_all(document, "img[src], iframe[src]")
            .into_iter()
            .filter_map(|el| el.value().attr("src"))
            .map(|src| src.trim().to_string())
            .collect(),
        internal_link_count,
        external_link_count,
        word_count: text.split_whitespace().count(),
        text_length,
        html_length,
        html_size_kb: round2(html_length as f64 / 1024.0),
        text_html_ratio,
    }
}

/// Selects every element matching `css`, or nothing if the selector is invalid
fn select_all<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => document.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// Whitespace-collapsed text content of an element
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn extract_title(document: &Html) -> String {
    select_all(document, "title")
        .into_iter()
        .next()
        .map(|el| el.text().collect::<String>())
        .and_then(|raw| raw.trim().lines().next().map(|line| line.trim().to_string()))
        .unwrap_or_default()
}

/// Every `<meta {key_attr}="{key}">`, key matched case-insensitively
fn meta_elements<'a>(document: &'a Html, key_attr: &str, key: &str) -> Vec<ElementRef<'a>> {
    select_all(document, "meta")
        .into_iter()
        .filter(|el| {
            el.value()
                .attr(key_attr)
                .is_some_and(|v| v.trim().eq_ignore_ascii_case(key))
        })
        .collect()
}

/// Content of the first matching meta tag with non-blank content
fn meta_content(document: &Html, key_attr: &str, key: &str) -> Option<String> {
    meta_elements(document, key_attr, key)
        .into_iter()
        .filter_map(|el| el.value().attr("content"))
        .map(|content| content.trim().to_string())
        .find(|content| !content.is_empty())
}

fn robots_meta(document: &Html) -> String {
    meta_elements(document, "name", "robots")
        .into_iter()
        .filter_map(|el| el.value().attr("content"))
        .map(|content| content.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Hrefs of `<link>` elements whose rel list contains `rel`
fn link_with_rel(document: &Html, rel: &str) -> Vec<String> {
    select_all(document, "link")
        .into_iter()
        .filter(|el| {
            el.value()
                .attr("rel")
                .is_some_and(|v| v.split_whitespace().any(|t| t.eq_ignore_ascii_case(rel)))
        })
        .map(|el| el.value().attr("href").unwrap_or("").trim().to_string())
        .collect()
}

fn css_js_refs(document: &Html) -> Vec<String> {
    let mut refs = link_with_rel(document, "stylesheet");
    refs.extend(
        select_all(document, "script[src]")
            .into_iter()
            .filter_map(|el| el.value().attr("src"))
            .map(|src| src.trim().to_string()),
    );
    refs
}

/// Counts every anchor occurrence as internal or external
///
/// Repeated links are counted each time; compare
/// [`crate::crawler::extract_internal_links`], which deduplicates.
fn count_links(document: &Html, page_url: &Url) -> (usize, usize) {
    let mut internal = 0;
    let mut external = 0;

    for anchor in select_all(document, "a[href]") {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        match resolve_link(href, page_url) {
            Some(target) if is_same_origin(&target, page_url) => internal += 1,
            Some(_) => external += 1,
            None => {}
        }
    }

    (internal, external)
}

fn extract_images(document: &Html) -> (usize, Vec<ImageRef>) {
    let images = select_all(document, "img");
    let missing = images
        .iter()
        .filter_map(|img| {
            let alt = img.value().attr("alt").unwrap_or("");
            if !alt.trim().is_empty() {
                return None;
            }
            Some(ImageRef {
                src: img.value().attr("src").unwrap_or("").to_string(),
                alt: alt.to_string(),
            })
        })
        .collect();

    (images.len(), missing)
}

/// Body text as a reader would see it, whitespace collapsed
fn visible_text(document: &Html) -> String {
    let mut words: Vec<&str> = Vec::new();

    for body in select_all(document, "body") {
        for node in body.descendants() {
            let Some(text) = node.value().as_text() else {
                continue;
            };
            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| HIDDEN_TEXT_ELEMENTS.contains(&el.name()))
            });
            if !hidden {
                words.extend(text.split_whitespace());
            }
        }
    }

    words.join(" ")
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

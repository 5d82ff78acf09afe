//! Sitemap resolution
//!
//! Expands a sitemap (or sitemap index) into a flat list of page URLs. Nested
//! sitemaps are followed breadth-first; every document is fetched through the
//! dual fetcher so sitemaps behind bot protection still resolve.

use crate::crawler::fetcher::DualFetcher;
use crate::crawler::proxy::ProxyRotator;
use crate::render::Renderer;
use crate::url::looks_like_sitemap;
use std::collections::{HashSet, VecDeque};

/// Collects up to `max_urls` distinct page URLs reachable from `root`
///
/// Sitemaps that fail to load are skipped. Each sitemap is fetched at most
/// once, so self-referencing indexes terminate.
pub async fn resolve_sitemap_urls(
    root: &str,
    fetcher: &DualFetcher,
    proxies: &ProxyRotator,
    renderer: &dyn Renderer,
    max_urls: usize,
) -> Vec<String> {
    let mut pages = Vec::new();
    let mut seen_pages = HashSet::new();
    let mut seen_sitemaps = HashSet::new();
    let mut pending = VecDeque::from([root.to_string()]);

    while let Some(sitemap) = pending.pop_front() {
        if pages.len() >= max_urls {
            break;
        }
        if !seen_sitemaps.insert(sitemap.clone()) {
            continue;
        }

        tracing::info!("Reading sitemap {}", sitemap);
        let outcome = fetcher.smart_fetch(&sitemap, proxies, renderer).await;
        let Some(xml) = outcome.html else {
            tracing::warn!("Could not load sitemap {}", sitemap);
            continue;
        };

        for loc in extract_loc_values(&xml) {
            if !loc.starts_with("http://") && !loc.starts_with("https://") {
                continue;
            }

            if looks_like_sitemap(&loc) {
                pending.push_back(loc);
            } else if seen_pages.insert(loc.clone()) {
                pages.push(loc);
                if pages.len() >= max_urls {
                    break;
                }
            }
        }
    }

    tracing::info!("Sitemap {} yielded {} page URLs", root, pages.len());
    pages
}

/// Extracts the text of every `<loc>` element
///
/// Handles CDATA sections and the XML entities that appear in URLs.
pub fn extract_loc_values(xml: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut rest = xml;

    while let Some(start) = rest.find("<loc>") {
        let after_open = &rest[start + "<loc>".len()..];
        let Some(end) = after_open.find("</loc>") else {
            break;
        };

        let raw = after_open[..end].trim();
        let raw = raw
            .strip_prefix("<![CDATA[")
            .and_then(|inner| inner.strip_suffix("]]>"))
            .unwrap_or(raw)
            .trim();

        if !raw.is_empty() {
            values.push(decode_xml_entities(raw));
        }

        rest = &after_open[end + "</loc>".len()..];
    }

    values
}

fn decode_xml_entities(input: &str) -> String {
    input
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

//! Link extraction for frontier expansion

use crate::url::{is_same_origin, normalize_link};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracts the distinct same-origin links of a page
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` resolving to an http(s) URL on the page's origin
///
/// **Exclude:**
/// - Empty and fragment-only hrefs
/// - `javascript:`, `mailto:`, `tel:` and `data:` links
/// - Links to other origins
///
/// Fragments are stripped; query strings are kept. The result is ordered by
/// first appearance.
///
/// # Example
///
/// ```
/// use sumi_audit::crawler::extract_internal_links;
/// use url::Url;
///
/// let html = r##"<a href="/a#top">A</a><a href="/a">A again</a><a href="https://other.com/">X</a>"##;
/// let base = Url::parse("https://example.com/").unwrap();
/// assert_eq!(extract_internal_links(html, &base), vec!["https://example.com/a"]);
/// ```
pub fn extract_internal_links(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(link) = normalize_link(href, base_url) else {
            continue;
        };
        if !is_same_origin(&link, base_url) {
            continue;
        }

        let link = link.to_string();
        if seen.insert(link.clone()) {
            links.push(link);
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/blog/").unwrap()
    }

    #[test]
    fn test_relative_links_resolved() {
        let html = r#"<a href="post-1">1</a><a href="../about">About</a><a href="/contact">C</a>"#;
        assert_eq!(
            extract_internal_links(html, &base()),
            vec![
                "https://example.com/blog/post-1",
                "https://example.com/about",
                "https://example.com/contact",
            ]
        );
    }

    #[test]
    fn test_skipped_schemes_and_fragments() {
        let html = r##"
            <a href="">empty</a>
            <a href="#section">frag</a>
            <a href="javascript:void(0)">js</a>
            <a href="mailto:a@example.com">mail</a>
            <a href="tel:+123">tel</a>
            <a href="data:text/html,hi">data</a>
            <a href="ftp://example.com/file">ftp</a>
        "##;
        assert!(extract_internal_links(html, &base()).is_empty());
    }

    #[test]
    fn test_external_and_other_scheme_excluded() {
        let html = r#"
            <a href="https://other.com/page">other</a>
            <a href="http://example.com/insecure">other scheme</a>
            <a href="https://sub.example.com/">subdomain</a>
            <a href="https://example.com/kept?page=2">kept</a>
        "#;
        assert_eq!(
            extract_internal_links(html, &base()),
            vec!["https://example.com/kept?page=2"]
        );
    }

    #[test]
    fn test_duplicates_collapse_after_fragment_strip() {
        let html = r##"<a href="/x">1</a><a href="/x#a">2</a><a href="https://example.com/x#b">3</a>"##;
        assert_eq!(
            extract_internal_links(html, &base()),
            vec!["https://example.com/x"]
        );
    }
}

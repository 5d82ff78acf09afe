use url::Url;

/// Returns true if a crawl should start in sitemap mode for this URL
///
/// Any URL containing `sitemap.xml` (case-insensitive) is treated as a
/// sitemap or sitemap index.
///
/// # Examples
///
/// ```
/// use sumi_audit::url::is_sitemap_url;
///
/// assert!(is_sitemap_url("https://example.com/Sitemap.xml"));
/// assert!(is_sitemap_url("https://example.com/sitemap.xml.gz"));
/// assert!(!is_sitemap_url("https://example.com/sitemap"));
/// ```
pub fn is_sitemap_url(url: &str) -> bool {
    url.to_lowercase().contains("sitemap.xml")
}

/// Returns true if a `<loc>` entry points at another sitemap rather than a page
///
/// Nested sitemaps are commonly named `sitemap-posts.xml`,
/// `post-sitemap2.xml` and so on, so the path only has to mention
/// `sitemap` and end in `.xml`.
pub fn looks_like_sitemap(url: &str) -> bool {
    if is_sitemap_url(url) {
        return true;
    }

    match Url::parse(url) {
        Ok(parsed) => {
            let path = parsed.path().to_lowercase();
            path.contains("sitemap") && path.ends_with(".xml")
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_sitemap_names() {
        assert!(looks_like_sitemap("https://example.com/sitemap-posts.xml"));
        assert!(looks_like_sitemap("https://example.com/post-sitemap2.xml"));
        assert!(looks_like_sitemap("https://example.com/SITEMAP.XML"));
    }

    #[test]
    fn test_pages_are_not_sitemaps() {
        assert!(!looks_like_sitemap("https://example.com/blog/sitemap-guide"));
        assert!(!looks_like_sitemap("https://example.com/feed.xml"));
        assert!(!looks_like_sitemap("https://example.com/"));
        assert!(!looks_like_sitemap("not a url"));
    }
}

use url::Url;

/// Schemes that never lead to a crawlable page
const SKIPPED_PREFIXES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Resolves an href against a base URL
///
/// Returns None if the link should be excluded:
/// - empty hrefs and fragment-only anchors (`#`, `#section`)
/// - `javascript:`, `mailto:`, `tel:` and `data:` links
/// - hrefs that fail to resolve
/// - non-HTTP(S) URLs after resolution
///
/// The fragment is kept; see [`normalize_link`] for the crawl form.
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if SKIPPED_PREFIXES.iter().any(|p| lowered.starts_with(p)) {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url),
        _ => None,
    }
}

/// Resolves an href and strips its fragment
///
/// This is the form URLs take when they enter the frontier, so two anchors
/// that differ only by `#fragment` map to the same crawl job.
///
/// # Examples
///
/// ```
/// use sumi_audit::url::normalize_link;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/docs/").unwrap();
/// let url = normalize_link("intro?lang=en#top", &base).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/docs/intro?lang=en");
/// ```
pub fn normalize_link(href: &str, base_url: &Url) -> Option<Url> {
    let mut url = resolve_link(href, base_url)?;
    url.set_fragment(None);
    Some(url)
}

/// Returns the serialized origin (`scheme://host[:port]`) of a URL
pub fn origin_of(url: &Url) -> String {
    url.origin().ascii_serialization()
}

/// Checks whether two URLs share scheme, host and port
pub fn is_same_origin(a: &Url, b: &Url) -> bool {
    let origin = a.origin();
    origin.is_tuple() && origin == b.origin()
}

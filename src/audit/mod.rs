//! Page auditing
//!
//! This module contains the per-page half of the pipeline:
//! - HTML analysis into structural facts
//! - The critical, warning and notice classification passes
//! - The issue taxonomy and the `PageAudit` record

mod analyzer;
mod classifier;
mod types;

pub use analyzer::{analyze_page, PageFacts};
pub use classifier::{audit_critical, audit_notice, audit_warning};
pub use types::{AuditResult, Cleared, ImageRef, Issue, OpenGraph, PageAudit, Severity};

use crate::crawler::FetchSource;
use url::Url;

/// Where and how a page was obtained
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageOrigin {
    pub status: u16,
    pub load_time_ms: f64,
    pub from_sitemap: bool,
    pub depth: u32,
    pub source: FetchSource,
}

/// Runs analysis and all three classification passes over a fetched page
///
/// Takes ownership of the HTML so it can be stored in the returned record.
pub fn audit_page(html: String, url: &Url, origin: PageOrigin) -> PageAudit {
    let (mut audit, facts) = analyze_page(
        &html,
        url,
        origin.status,
        origin.load_time_ms,
        origin.from_sitemap,
    );

    audit.critical_issues = audit_critical(&facts, url, origin.status, origin.from_sitemap);
    audit.warning_issues = audit_warning(&facts);
    audit.notice_issues = audit_notice(&facts, url);
    audit.depth = origin.depth;
    audit.fetch_source = origin.source;
    audit.html = html;

    audit
}

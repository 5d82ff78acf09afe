//! Statistics over a finished audit
//!
//! This module aggregates the per-page audits into totals for display and
//! for the markdown summary.

use crate::audit::{Issue, PageAudit, Severity};
use crate::crawler::FetchSource;
use std::collections::HashMap;

/// Audit statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditStatistics {
    /// Number of audited pages
    pub total_pages: usize,

    /// Occurrences of each issue across all pages
    pub issue_counts: HashMap<Issue, usize>,

    /// Issue occurrences per severity
    pub severity_counts: HashMap<Severity, usize>,

    /// Pages with at least one critical issue
    pub pages_with_critical: usize,

    /// Pages by fetch path
    pub pages_by_source: HashMap<FetchSource, usize>,

    /// Pages by discovery depth
    pub pages_by_depth: HashMap<u32, usize>,

    /// Mean reported load time in milliseconds
    pub average_load_time_ms: f64,

    /// Mean word count
    pub average_word_count: f64,
}

impl AuditStatistics {
    pub fn from_pages(pages: &[PageAudit]) -> Self {
        let mut stats = AuditStatistics {
            total_pages: pages.len(),
            ..Default::default()
        };

        if pages.is_empty() {
            return stats;
        }

        let mut load_time_total = 0.0;
        let mut word_total = 0usize;

        for page in pages {
            for issue in page.all_issues() {
                *stats.issue_counts.entry(issue).or_insert(0) += 1;
                *stats.severity_counts.entry(issue.severity()).or_insert(0) += 1;
            }

            if !page.critical_issues.issues.is_empty() {
                stats.pages_with_critical += 1;
            }

            *stats.pages_by_source.entry(page.fetch_source).or_insert(0) += 1;
            *stats.pages_by_depth.entry(page.depth).or_insert(0) += 1;

            load_time_total += page.load_time_ms;
            word_total += page.word_count;
        }

        stats.average_load_time_ms = load_time_total / pages.len() as f64;
        stats.average_word_count = word_total as f64 / pages.len() as f64;
        stats
    }

    pub fn severity_count(&self, severity: Severity) -> usize {
        self.severity_counts.get(&severity).copied().unwrap_or(0)
    }

    /// Issues sorted by occurrence count, most frequent first
    pub fn top_issues(&self) -> Vec<(Issue, usize)> {
        let mut issues: Vec<_> = self.issue_counts.iter().map(|(i, c)| (*i, *c)).collect();
        issues.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.code().cmp(b.0.code())));
        issues
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &AuditStatistics) {
    println!("=== Audit Statistics ===\n");

    println!("Overview:");
    println!("  Pages audited: {}", stats.total_pages);
    println!("  Pages with critical issues: {}", stats.pages_with_critical);
    println!("  Average load time: {:.1} ms", stats.average_load_time_ms);
    println!("  Average word count: {:.0}", stats.average_word_count);
    println!();

    println!("Issues by Severity:");
    for severity in [Severity::Critical, Severity::Warning, Severity::Notice] {
        println!("  {:?}: {}", severity, stats.severity_count(severity));
    }
    println!();

    let top = stats.top_issues();
    if !top.is_empty() {
        println!("Issues:");
        for (issue, count) in top {
            let percentage = (count as f64 / stats.total_pages as f64) * 100.0;
            println!("  {}: {} ({:.1}% of pages)", issue, count, percentage);
        }
        println!();
    }

    println!("Fetch Paths:");
    for source in [FetchSource::Fast, FetchSource::Rendered] {
        let count = stats.pages_by_source.get(&source).copied().unwrap_or(0);
        println!("  {:?}: {}", source, count);
    }
}

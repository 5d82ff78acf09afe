//! Markdown summary generation
//!
//! This module generates a human-readable markdown report of an audit,
//! including run information, issue totals and a per-page issue table.

use crate::audit::{PageAudit, Severity};
use crate::output::stats::AuditStatistics;
use crate::AuditError;
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Run metadata shown at the top of the summary
#[derive(Debug, Clone)]
pub struct RunInfo {
    pub start_url: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// SHA-256 of the config file, when one was used
    pub config_hash: Option<String>,
}

impl RunInfo {
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds().max(0)
    }
}

/// Writes the markdown summary of an audit to `output_path`
pub fn generate_markdown_summary(
    run: &RunInfo,
    pages: &[PageAudit],
    output_path: &Path,
) -> Result<(), AuditError> {
    let markdown = format_markdown_summary(run, pages);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats an audit as markdown
pub fn format_markdown_summary(run: &RunInfo, pages: &[PageAudit]) -> String {
    let stats = AuditStatistics::from_pages(pages);
    let mut md = String::new();

    md.push_str("# Sumi-Audit SEO Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Start URL**: {}\n", run.start_url));
    md.push_str(&format!("- **Started**: {}\n", run.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", run.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {} seconds\n",
        run.duration_seconds()
    ));
    if let Some(hash) = &run.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Pages Audited**: {}\n", stats.total_pages));
    md.push_str(&format!(
        "- **Pages With Critical Issues**: {}\n",
        stats.pages_with_critical
    ));
    md.push_str(&format!(
        "- **Critical Issues**: {}\n",
        stats.severity_count(Severity::Critical)
    ));
    md.push_str(&format!(
        "- **Warnings**: {}\n",
        stats.severity_count(Severity::Warning)
    ));
    md.push_str(&format!(
        "- **Notices**: {}\n",
        stats.severity_count(Severity::Notice)
    ));
    md.push_str(&format!(
        "- **Average Load Time**: {:.1} ms\n\n",
        stats.average_load_time_ms
    ));

    let top = stats.top_issues();
    if !top.is_empty() {
        md.push_str("## Issue Breakdown\n\n");
        md.push_str("| Issue | Severity | Occurrences |\n");
        md.push_str("|-------|----------|-------------|\n");
        for (issue, count) in top {
            md.push_str(&format!(
                "| {} | {:?} | {} |\n",
                issue,
                issue.severity(),
                count
            ));
        }
        md.push('\n');
    }

    if !stats.pages_by_depth.is_empty() {
        md.push_str("## Depth Breakdown\n\n");
        md.push_str("| Depth | Pages |\n");
        md.push_str("|-------|-------|\n");

        let mut depths: Vec<_> = stats.pages_by_depth.iter().collect();
        depths.sort_by_key(|(d, _)| **d);

        for (depth, count) in depths {
            md.push_str(&format!("| {} | {} |\n", depth, count));
        }
        md.push('\n');
    }

    if !pages.is_empty() {
        md.push_str("## Pages\n\n");
        md.push_str("| URL | Status | Critical | Warning | Notice |\n");
        md.push_str("|-----|--------|----------|---------|--------|\n");

        for page in pages {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                page.url,
                page.status,
                join_codes(&page.critical_issues.issues),
                join_codes(&page.warning_issues.issues),
                join_codes(&page.notice_issues.issues)
            ));
        }
        md.push('\n');
    }

    md
}

/// Issue codes with repeats collapsed to `CODE ×n`
fn join_codes(issues: &[crate::audit::Issue]) -> String {
    if issues.is_empty() {
        return "-".to_string();
    }

    let mut parts: Vec<(crate::audit::Issue, usize)> = Vec::new();
    for issue in issues {
        match parts.iter_mut().find(|(i, _)| i == issue) {
            Some((_, count)) => *count += 1,
            None => parts.push((*issue, 1)),
        }
    }

    parts
        .into_iter()
        .map(|(issue, count)| {
            if count > 1 {
                format!("{} ×{}", issue, count)
            } else {
                issue.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

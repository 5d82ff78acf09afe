//! Output module for audit reports
//!
//! This module handles:
//! - Writing the JSON report of all page audits
//! - Generating markdown summaries
//! - Computing and printing audit statistics

mod markdown;
pub mod stats;

pub use markdown::{format_markdown_summary, generate_markdown_summary, RunInfo};
pub use stats::{print_statistics, AuditStatistics};

use crate::audit::PageAudit;
use crate::AuditError;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Serializes the audits as a pretty-printed JSON array
///
/// Writes to `path`, or to stdout when no path is given.
pub fn write_json_report(pages: &[PageAudit], path: Option<&Path>) -> Result<(), AuditError> {
    match path {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(&mut writer, pages)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
            tracing::info!("Wrote {} page audits to {}", pages.len(), path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, pages)?;
            writer.write_all(b"\n")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{audit_page, PageOrigin};
    use crate::crawler::FetchSource;
    use url::Url;

    #[test]
    fn test_write_json_report() {
        let url = Url::parse("https://example.com/").unwrap();
        let page = audit_page(
            "<title>Example home page</title>".to_string(),
            &url,
            PageOrigin {
                status: 200,
                load_time_ms: 3.5,
                from_sitemap: false,
                depth: 0,
                source: FetchSource::Fast,
            },
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_json_report(&[page], Some(&path)).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let first = &value[0];
        assert_eq!(first["url"], "https://example.com/");
        assert_eq!(first["status"], 200);
        assert_eq!(first["title"], "Example home page");
        assert_eq!(first["loadTimeMs"], 3.5);
        assert!(first["html"].as_str().unwrap().contains("<title>"));
    }
}

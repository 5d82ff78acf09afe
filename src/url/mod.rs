//! URL handling module for Sumi-Audit
//!
//! This module provides link resolution, origin comparison and sitemap URL
//! detection. All crawl-side normalization goes through here so the frontier
//! and the audit counts agree on what "internal" means.

mod normalize;
mod sitemap;

// Re-export main functions
pub use normalize::{is_same_origin, normalize_link, origin_of, resolve_link};
pub use sitemap::{is_sitemap_url, looks_like_sitemap};

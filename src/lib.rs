//! Sumi-Audit: a polite single-site SEO auditor
//!
//! This crate crawls one website (or a sitemap) under depth and page-count
//! bounds, fetches every page through a fast HTTP path with a rendering-engine
//! fallback, and classifies each page against a fixed taxonomy of SEO issues.

pub mod audit;
pub mod config;
pub mod crawler;
pub mod output;
pub mod render;
pub mod robots;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Audit operations
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Invalid crawl request: {0}")]
    InvalidRequest(String),

    #[error("Rendering engine error: {0}")]
    Renderer(#[from] RenderError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Rendering-engine errors
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to start browser session: {0}")]
    Launch(String),

    #[error("Browser session is closed")]
    Closed,

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Navigation to {url} timed out")]
    Timeout { url: String },

    #[error("WebDriver protocol error: {0}")]
    Protocol(String),

    #[error("WebDriver transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Result type alias for Sumi-Audit operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for rendering-engine operations
pub type RenderResult<T> = std::result::Result<T, RenderError>;

// Re-export commonly used types
pub use audit::{AuditResult, Cleared, Issue, PageAudit};
pub use config::Config;
pub use crawler::{run_crawl, CrawlRequest};

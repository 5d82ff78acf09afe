//! Robots.txt gate
//!
//! Every URL is checked here before it is fetched or enqueued. Decisions are
//! cached per origin for the lifetime of one crawl; nothing persists between
//! runs. The gate fails open: an unreachable robots.txt, a non-200 answer or
//! any internal error all mean "allowed".

mod parser;

pub use parser::ParsedRobots;

use crate::config::RobotsConfig;
use crate::url::origin_of;
use crate::AuditError;
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use url::Url;

/// Per-origin robots.txt cache and allow/deny predicate
pub struct RobotsGate {
    client: Client,
    user_agent: String,
    cache: Mutex<HashMap<String, ParsedRobots>>,
}

impl RobotsGate {
    /// Builds a gate with its own HTTP client
    pub fn new(config: &RobotsConfig) -> Result<Self, AuditError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self::with_client(client, &config.user_agent))
    }

    /// Builds a gate around an existing client
    pub fn with_client(client: Client, user_agent: &str) -> Self {
        Self {
            client,
            user_agent: user_agent.to_string(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// The agent token checked against robots.txt groups
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Checks whether robots.txt allows fetching `url`
    ///
    /// Never fails: any error during the check allows the URL.
    pub async fn is_allowed(&self, url: &str) -> bool {
        match self.check(url).await {
            Ok(allowed) => allowed,
            Err(e) => {
                tracing::debug!("Robots check for {} failed, allowing: {}", url, e);
                true
            }
        }
    }

    async fn check(&self, url: &str) -> Result<bool, AuditError> {
        let parsed = Url::parse(url)?;
        let origin = origin_of(&parsed);

        // The lock is held across the fetch so an origin is only fetched once.
        let mut cache = self.cache.lock().await;
        if !cache.contains_key(&origin) {
            let robots = self.fetch_robots(&origin).await;
            cache.insert(origin.clone(), robots);
        }

        Ok(cache
            .get(&origin)
            .map(|robots| robots.is_allowed(url, &self.user_agent))
            .unwrap_or(true))
    }

    /// Fetches and parses `{origin}/robots.txt`
    ///
    /// Transport errors and non-200 responses yield an unrestricted rule set.
    pub async fn fetch_robots(&self, origin: &str) -> ParsedRobots {
        let robots_url = format!("{}/robots.txt", origin);
        tracing::debug!("Fetching robots.txt: {}", robots_url);

        let response = match self.client.get(&robots_url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("robots.txt unreachable at {}: {}", robots_url, e);
                return ParsedRobots::allow_all();
            }
        };

        if response.status() != StatusCode::OK {
            tracing::debug!(
                "robots.txt at {} returned {}, treating as unrestricted",
                robots_url,
                response.status()
            );
            return ParsedRobots::allow_all();
        }

        match response.text().await {
            Ok(body) => ParsedRobots::from_content(&body),
            Err(e) => {
                tracing::debug!("Failed to read robots.txt body at {}: {}", robots_url, e);
                ParsedRobots::allow_all()
            }
        }
    }

    /// Number of origins with a cached decision
    pub async fn cached_origins(&self) -> usize {
        self.cache.lock().await.len()
    }
}

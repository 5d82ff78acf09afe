use crate::config::types::{Config, CrawlConfig, FetchConfig, ProxyEntry, RendererConfig, RobotsConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_config(&config.crawl)?;
    validate_fetch_config(&config.fetch)?;
    validate_robots_config(&config.robots)?;
    validate_renderer_config(&config.renderer)?;
    validate_proxies(&config.proxies)?;
    Ok(())
}

/// Validates crawl bounds
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    // max_depth >= 0 is always true for u32, so no check needed

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    Ok(())
}

/// Validates fetcher timeouts, delays and user agents
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.fast_timeout_secs < 1 || config.render_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "fetch timeouts must be >= 1s, got fast={}s render={}s",
            config.fast_timeout_secs, config.render_timeout_secs
        )));
    }

    validate_delay_range("fast", config.fast_delay_min_ms, config.fast_delay_max_ms)?;
    validate_delay_range(
        "fallback",
        config.fallback_delay_min_ms,
        config.fallback_delay_max_ms,
    )?;

    if config.user_agents.is_empty() || config.user_agents.iter().any(|ua| ua.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "user_agents must contain at least one non-empty entry".to_string(),
        ));
    }

    Ok(())
}

fn validate_delay_range(name: &str, min: u64, max: u64) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::Validation(format!(
            "{}_delay_min_ms ({}) must not exceed {}_delay_max_ms ({})",
            name, min, name, max
        )));
    }
    Ok(())
}

/// Validates robots gate configuration
fn validate_robots_config(config: &RobotsConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "robots user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "robots timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

/// Validates the WebDriver endpoint
fn validate_renderer_config(config: &RendererConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.webdriver_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid webdriver_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "webdriver_url must use http or https, got '{}'",
            config.webdriver_url
        )));
    }

    Ok(())
}

/// Validates proxy entries
fn validate_proxies(proxies: &[ProxyEntry]) -> Result<(), ConfigError> {
    for proxy in proxies {
        if proxy.host.trim().is_empty() {
            return Err(ConfigError::Validation(
                "proxy host cannot be empty".to_string(),
            ));
        }

        if proxy.port == 0 {
            return Err(ConfigError::Validation(format!(
                "proxy '{}' must have a non-zero port",
                proxy.host
            )));
        }

        if proxy.password.is_some() && proxy.username.is_none() {
            return Err(ConfigError::Validation(format!(
                "proxy '{}' has a password but no username",
                proxy.host
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_zero_max_pages_rejected() {
        let mut config = Config::default();
        config.crawl.max_pages = 0;
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_inverted_delay_range_rejected() {
        let mut config = Config::default();
        config.fetch.fast_delay_min_ms = 5000;
        config.fetch.fast_delay_max_ms = 1000;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.fetch.fallback_delay_min_ms = 0;
        config.fetch.fallback_delay_max_ms = 0;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_user_agents_rejected() {
        let mut config = Config::default();
        config.fetch.user_agents.clear();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_invalid_webdriver_url_rejected() {
        let mut config = Config::default();
        config.renderer.webdriver_url = "not a url".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));

        config.renderer.webdriver_url = "ftp://localhost:9515".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_proxies() {
        let good = ProxyEntry {
            host: "proxy.example.com".to_string(),
            port: 8080,
            username: Some("user".to_string()),
            password: Some("secret".to_string()),
        };
        assert!(validate_proxies(&[good.clone()]).is_ok());

        let no_port = ProxyEntry { port: 0, ..good.clone() };
        assert!(validate_proxies(&[no_port]).is_err());

        let no_host = ProxyEntry {
            host: " ".to_string(),
            ..good.clone()
        };
        assert!(validate_proxies(&[no_host]).is_err());

        let password_only = ProxyEntry {
            username: None,
            ..good
        };
        assert!(validate_proxies(&[password_only]).is_err());
    }
}

use serde::Deserialize;

/// Main configuration structure for Sumi-Audit
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawl: CrawlConfig,
    pub fetch: FetchConfig,
    pub robots: RobotsConfig,
    pub renderer: RendererConfig,
    #[serde(rename = "proxy")]
    pub proxies: Vec<ProxyEntry>,
}

/// Crawl bounds used when the command line does not override them
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Maximum link depth from the start URL
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of pages processed per crawl
    #[serde(rename = "max-pages")]
    pub max_pages: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_depth: 1,
            max_pages: 5000,
        }
    }
}

/// Dual fetcher behaviour
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Timeout of the fast HTTP path (seconds)
    #[serde(rename = "fast-timeout-secs")]
    pub fast_timeout_secs: u64,

    /// Timeout of a rendered page load (seconds)
    #[serde(rename = "render-timeout-secs")]
    pub render_timeout_secs: u64,

    /// Extra attempts after the first fast/rendered round fails
    pub retries: u32,

    #[serde(rename = "fast-delay-min-ms")]
    pub fast_delay_min_ms: u64,

    #[serde(rename = "fast-delay-max-ms")]
    pub fast_delay_max_ms: u64,

    #[serde(rename = "fallback-delay-min-ms")]
    pub fallback_delay_min_ms: u64,

    #[serde(rename = "fallback-delay-max-ms")]
    pub fallback_delay_max_ms: u64,

    /// Accept-Language header sent on the fast path
    #[serde(rename = "accept-language")]
    pub accept_language: String,

    /// Pool of user agents, one picked at random per request
    #[serde(rename = "user-agents")]
    pub user_agents: Vec<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            fast_timeout_secs: 15,
            render_timeout_secs: 30,
            retries: 2,
            fast_delay_min_ms: 2000,
            fast_delay_max_ms: 6000,
            fallback_delay_min_ms: 3000,
            fallback_delay_max_ms: 7000,
            accept_language: "en-US,en;q=0.9".to_string(),
            user_agents: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Browser user agents rotated across requests
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1",
];

/// Robots gate configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RobotsConfig {
    /// Agent name matched against robots.txt groups
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Timeout for fetching robots.txt (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for RobotsConfig {
    fn default() -> Self {
        Self {
            user_agent: "SEO-Audit-Bot".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Rendering engine (WebDriver) configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// WebDriver endpoint, e.g. a local chromedriver
    #[serde(rename = "webdriver-url")]
    pub webdriver_url: String,

    /// Browser launch flags
    #[serde(rename = "browser-args")]
    pub browser_args: Vec<String>,

    /// Quiet period that counts as "network mostly idle" (milliseconds)
    #[serde(rename = "network-idle-ms")]
    pub network_idle_ms: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            browser_args: vec![
                "--headless=new".to_string(),
                "--no-sandbox".to_string(),
                "--disable-blink-features=AutomationControlled".to_string(),
            ],
            network_idle_ms: 500,
        }
    }
}

/// One upstream proxy
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProxyEntry {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

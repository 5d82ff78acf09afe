//! W3C WebDriver renderer
//!
//! Talks JSON to a running driver (chromedriver, geckodriver, a Selenium
//! grid). One session is created per crawl; each fetch opens its own tab and
//! closes it afterwards. User-agent overrides go through chromium's CDP bridge
//! and are skipped quietly on drivers without it.
//!
//! The session is not routed through the crawl's rotating proxies, since a
//! WebDriver session has one network configuration for all its tabs. Proxy
//! credentials handed to a page are therefore never sent anywhere.

use crate::config::RendererConfig;
use crate::render::{RenderedPage, Renderer};
use crate::{RenderError, RenderResult};
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OwnedMutexGuard};

const RESOURCE_COUNT_SCRIPT: &str = "return performance.getEntriesByType('resource').length;";

const STATUS_SCRIPT: &str = r#"
    const nav = performance.getEntriesByType('navigation')[0];
    return nav && typeof nav.responseStatus === 'number' ? nav.responseStatus : 0;
"#;

const CONTENT_SCRIPT: &str = r#"
    const doctype = document.doctype ? '<!DOCTYPE ' + document.doctype.name + '>' : '';
    return doctype + (document.documentElement ? document.documentElement.outerHTML : '');
"#;

/// Shared connection details of one WebDriver session
#[derive(Debug, Clone)]
struct Session {
    client: Client,
    endpoint: String,
    id: String,
    main_handle: String,
    closed: Arc<AtomicBool>,
}

impl Session {
    fn path(&self, suffix: &str) -> String {
        format!("/session/{}{}", self.id, suffix)
    }

    fn ensure_open(&self) -> RenderResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            Err(RenderError::Closed)
        } else {
            Ok(())
        }
    }

    async fn call(&self, method: Method, suffix: &str, body: Option<Value>) -> RenderResult<Value> {
        self.ensure_open()?;
        webdriver_call(&self.client, &self.endpoint, method, &self.path(suffix), body).await
    }

    async fn execute(&self, script: &str) -> RenderResult<Value> {
        self.call(
            Method::POST,
            "/execute/sync",
            Some(json!({ "script": script, "args": [] })),
        )
        .await
    }

    /// Sends a chromium DevTools command; unsupported drivers are tolerated
    async fn cdp(&self, cmd: &str, params: Value) -> RenderResult<()> {
        let result = self
            .call(
                Method::POST,
                "/goog/cdp/execute",
                Some(json!({ "cmd": cmd, "params": params })),
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(RenderError::Closed) => Err(RenderError::Closed),
            Err(e) => {
                tracing::debug!("CDP command {} not applied: {}", cmd, e);
                Ok(())
            }
        }
    }
}

/// Browser session driven over the WebDriver protocol
pub struct WebDriverRenderer {
    session: Session,
    network_idle: Duration,
    tab_lock: Arc<Mutex<()>>,
}

impl WebDriverRenderer {
    /// Starts a browser session on the configured driver
    ///
    /// # Returns
    ///
    /// * `Ok(WebDriverRenderer)` - Session created
    /// * `Err(RenderError::Launch)` - Driver unreachable or session refused
    pub async fn connect(config: &RendererConfig) -> RenderResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| RenderError::Launch(e.to_string()))?;
        let endpoint = config.webdriver_url.trim_end_matches('/').to_string();

        let capabilities = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "pageLoadStrategy": "normal",
                    "goog:chromeOptions": {
                        "args": config.browser_args,
                        "excludeSwitches": ["enable-automation"]
                    }
                }
            }
        });

        let value = webdriver_call(&client, &endpoint, Method::POST, "/session", Some(capabilities))
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let id = value
            .pointer("/sessionId")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| RenderError::Launch("session id missing in response".to_string()))?;

        let handle_value = webdriver_call(
            &client,
            &endpoint,
            Method::GET,
            &format!("/session/{}/window", id),
            None,
        )
        .await
        .map_err(|e| RenderError::Launch(e.to_string()))?;

        let main_handle = handle_value
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| RenderError::Launch("window handle missing in response".to_string()))?;

        tracing::info!("WebDriver session {} started at {}", id, endpoint);

        Ok(Self {
            session: Session {
                client,
                endpoint,
                id,
                main_handle,
                closed: Arc::new(AtomicBool::new(false)),
            },
            network_idle: Duration::from_millis(config.network_idle_ms),
            tab_lock: Arc::new(Mutex::new(())),
        })
    }
}

#[async_trait]
impl Renderer for WebDriverRenderer {
    async fn new_page(&self) -> RenderResult<Box<dyn RenderedPage>> {
        self.session.ensure_open()?;

        // WebDriver commands target the session's current tab, so tabs are used one at a time.
        let guard = self.tab_lock.clone().lock_owned().await;

        let value = self
            .session
            .call(Method::POST, "/window/new", Some(json!({ "type": "tab" })))
            .await?;
        let handle = value
            .pointer("/handle")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| RenderError::Protocol("new window handle missing".to_string()))?;

        self.session
            .call(Method::POST, "/window", Some(json!({ "handle": handle })))
            .await?;

        Ok(Box::new(WebDriverPage {
            session: self.session.clone(),
            handle,
            network_idle: self.network_idle,
            open: true,
            _guard: guard,
        }))
    }

    async fn close(&self) -> RenderResult<()> {
        if self.session.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        webdriver_call(
            &self.session.client,
            &self.session.endpoint,
            Method::DELETE,
            &self.session.path(""),
            None,
        )
        .await?;
        tracing::info!("WebDriver session {} closed", self.session.id);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.session.closed.load(Ordering::SeqCst)
    }
}

/// A single tab inside a [`WebDriverRenderer`] session
pub struct WebDriverPage {
    session: Session,
    handle: String,
    network_idle: Duration,
    open: bool,
    _guard: OwnedMutexGuard<()>,
}

impl WebDriverPage {
    /// Polls resource timing until no new requests start for `network_idle`
    async fn wait_for_network_idle(&self, deadline: Instant) -> RenderResult<()> {
        let poll = std::cmp::max(self.network_idle / 4, Duration::from_millis(50));
        let mut last_count = -1i64;
        let mut stable_since = Instant::now();

        while Instant::now() < deadline {
            let count = self
                .session
                .execute(RESOURCE_COUNT_SCRIPT)
                .await?
                .as_i64()
                .unwrap_or(0);

            if count != last_count {
                last_count = count;
                stable_since = Instant::now();
            } else if stable_since.elapsed() >= self.network_idle {
                return Ok(());
            }

            tokio::time::sleep(poll).await;
        }

        Ok(())
    }
}

#[async_trait]
impl RenderedPage for WebDriverPage {
    async fn authenticate(&mut self, username: &str, _password: &str) -> RenderResult<()> {
        // Only a proxy's 407 challenge may see these; the session has no proxy to answer.
        tracing::debug!(
            "Proxy credentials for {} not applied to tab {}: rendered fetches go direct",
            username,
            self.handle
        );
        Ok(())
    }

    async fn set_user_agent(&mut self, user_agent: &str) -> RenderResult<()> {
        self.session
            .cdp("Network.setUserAgentOverride", json!({ "userAgent": user_agent }))
            .await
    }

    async fn navigate(&mut self, url: &str, timeout: Duration) -> RenderResult<Option<u16>> {
        let deadline = Instant::now() + timeout;

        self.session
            .call(
                Method::POST,
                "/timeouts",
                Some(json!({ "pageLoad": timeout.as_millis() as u64 })),
            )
            .await?;

        let navigation = self
            .session
            .call(Method::POST, "/url", Some(json!({ "url": url })));
        match tokio::time::timeout(timeout, navigation).await {
            Ok(Ok(_)) => {}
            Ok(Err(RenderError::Protocol(message))) => {
                return Err(RenderError::Navigation {
                    url: url.to_string(),
                    message,
                })
            }
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                return Err(RenderError::Timeout {
                    url: url.to_string(),
                })
            }
        }

        self.wait_for_network_idle(deadline).await?;

        let status = self
            .session
            .execute(STATUS_SCRIPT)
            .await?
            .as_u64()
            .and_then(|s| u16::try_from(s).ok())
            .filter(|s| *s > 0);

        Ok(status)
    }

    async fn content(&mut self) -> RenderResult<String> {
        let value = self.session.execute(CONTENT_SCRIPT).await?;
        value
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| RenderError::Protocol("page content was not a string".to_string()))
    }

    async fn close(&mut self) -> RenderResult<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;

        tracing::trace!("Closing tab {}", self.handle);
        self.session.call(Method::DELETE, "/window", None).await?;
        self.session
            .call(
                Method::POST,
                "/window",
                Some(json!({ "handle": self.session.main_handle })),
            )
            .await?;
        Ok(())
    }
}

/// Sends one WebDriver command and unwraps the `value` member of the reply
async fn webdriver_call(
    client: &Client,
    endpoint: &str,
    method: Method,
    path: &str,
    body: Option<Value>,
) -> RenderResult<Value> {
    let url = format!("{}{}", endpoint, path);
    let mut request = client.request(method, &url);
    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request.send().await?;
    let status = response.status();
    let text = response.text().await?;
    let value: Value = serde_json::from_str(&text).unwrap_or_default();

    if let Some(err) = value.pointer("/value/error").and_then(|v| v.as_str()) {
        let message = value
            .pointer("/value/message")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown webdriver error");
        return Err(RenderError::Protocol(format!("{}: {}", err, message)));
    }

    if !status.is_success() {
        return Err(RenderError::Protocol(format!(
            "HTTP {} from {}: {}",
            status.as_u16(),
            path,
            truncate_for_log(&text, 240)
        )));
    }

    Ok(value.get("value").cloned().unwrap_or(Value::Null))
}

fn truncate_for_log(input: &str, max_chars: usize) -> String {
    input.chars().take(max_chars).collect()
}

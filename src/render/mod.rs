//! Rendering-engine seam
//!
//! The dual fetcher falls back to a real browser for pages the fast path
//! cannot load. The browser is reached through the narrow [`Renderer`] and
//! [`RenderedPage`] traits so any automation backend can be plugged in; the
//! crate ships a W3C WebDriver implementation.

mod webdriver;

pub use webdriver::{WebDriverPage, WebDriverRenderer};

use crate::RenderResult;
use async_trait::async_trait;
use std::time::Duration;

/// A long-lived browser session shared by one crawl
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Opens a fresh page (tab) inside the session
    async fn new_page(&self) -> RenderResult<Box<dyn RenderedPage>>;

    /// Ends the session; every later call fails with `RenderError::Closed`
    async fn close(&self) -> RenderResult<()>;

    /// Whether the session has been closed
    fn is_closed(&self) -> bool;
}

/// One page opened for a single fetch
#[async_trait]
pub trait RenderedPage: Send {
    /// Supplies proxy credentials for answering the proxy's auth challenge
    ///
    /// Implementations must never forward them to the pages being loaded.
    async fn authenticate(&mut self, username: &str, password: &str) -> RenderResult<()>;

    /// Overrides the user agent for the page's requests
    async fn set_user_agent(&mut self, user_agent: &str) -> RenderResult<()>;

    /// Loads `url` and waits until the network is mostly idle
    ///
    /// Returns the main document's HTTP status when the engine exposes it.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> RenderResult<Option<u16>>;

    /// Serializes the current DOM
    async fn content(&mut self) -> RenderResult<String>;

    /// Closes the page; the session stays open
    async fn close(&mut self) -> RenderResult<()>;
}

#[cfg(test)]
pub(crate) mod testing;

//! Round-robin proxy rotation

use crate::config::ProxyEntry;
use std::sync::atomic::{AtomicUsize, Ordering};

impl ProxyEntry {
    /// The proxy's URL without credentials
    pub fn proxy_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Builds a reqwest proxy routing all schemes through this entry
    pub fn to_reqwest(&self) -> Result<reqwest::Proxy, reqwest::Error> {
        let proxy = reqwest::Proxy::all(self.proxy_url())?;
        Ok(match &self.username {
            Some(username) => proxy.basic_auth(username, self.password.as_deref().unwrap_or("")),
            None => proxy,
        })
    }
}

/// Cursor over a fixed proxy pool
///
/// The pool is read-only after construction; the cursor advances atomically
/// on every [`ProxyRotator::next`] call, so the rotator can be shared between
/// concurrent fetches.
#[derive(Debug, Default)]
pub struct ProxyRotator {
    proxies: Vec<ProxyEntry>,
    cursor: AtomicUsize,
}

impl ProxyRotator {
    pub fn new(proxies: Vec<ProxyEntry>) -> Self {
        Self {
            proxies,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Returns the next proxy, or None when the pool is empty (direct connection)
    pub fn next(&self) -> Option<&ProxyEntry> {
        if self.proxies.is_empty() {
            return None;
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.proxies.len();
        self.proxies.get(index)
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }
}

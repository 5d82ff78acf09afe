//! In-process renderers for unit tests

use super::{RenderedPage, Renderer};
use crate::{RenderError, RenderResult};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Serves a fixed document for every navigation, or fails every navigation
/// when constructed with [`FakeRenderer::failing`]
#[derive(Debug, Default)]
pub(crate) struct FakeRenderer {
    html: Option<String>,
    status: Option<u16>,
    pub pages_opened: Arc<AtomicUsize>,
    pub closed: AtomicBool,
}

impl FakeRenderer {
    pub fn serving(html: &str, status: u16) -> Self {
        Self {
            html: Some(html.to_string()),
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn serving_unknown_status(html: &str) -> Self {
        Self {
            html: Some(html.to_string()),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn opened(&self) -> usize {
        self.pages_opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn new_page(&self) -> RenderResult<Box<dyn RenderedPage>> {
        if self.is_closed() {
            return Err(RenderError::Closed);
        }
        self.pages_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakePage {
            html: self.html.clone(),
            status: self.status,
        }))
    }

    async fn close(&self) -> RenderResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

struct FakePage {
    html: Option<String>,
    status: Option<u16>,
}

#[async_trait]
impl RenderedPage for FakePage {
    async fn authenticate(&mut self, _username: &str, _password: &str) -> RenderResult<()> {
        Ok(())
    }

    async fn set_user_agent(&mut self, _user_agent: &str) -> RenderResult<()> {
        Ok(())
    }

    async fn navigate(&mut self, url: &str, _timeout: Duration) -> RenderResult<Option<u16>> {
        match self.html {
            Some(_) => Ok(self.status),
            None => Err(RenderError::Navigation {
                url: url.to_string(),
                message: "net::ERR_CONNECTION_REFUSED".to_string(),
            }),
        }
    }

    async fn content(&mut self) -> RenderResult<String> {
        self.html
            .clone()
            .ok_or_else(|| RenderError::Protocol("no document".to_string()))
    }

    async fn close(&mut self) -> RenderResult<()> {
        Ok(())
    }
}

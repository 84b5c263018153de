use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// A browser page the bridge can navigate and query.
///
/// The poller only ever needs two things from a browser: load a URL and
/// evaluate an expression in the page context. Everything else (launching,
/// contexts, teardown) stays with the concrete driver.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Name of the browser engine, used in reports
    fn browser_name(&self) -> &str;

    /// Navigate the page to `url`
    async fn open(&self, url: &str) -> Result<()>;

    /// Evaluate `expression` in the page and return its JSON value
    async fn evaluate(&self, expression: &str) -> Result<Value>;
}

#[async_trait]
impl<T: PageDriver + ?Sized> PageDriver for Arc<T> {
    fn browser_name(&self) -> &str {
        (**self).browser_name()
    }

    async fn open(&self, url: &str) -> Result<()> {
        (**self).open(url).await
    }

    async fn evaluate(&self, expression: &str) -> Result<Value> {
        (**self).evaluate(expression).await
    }
}

#[async_trait]
impl<T: PageDriver + ?Sized> PageDriver for &T {
    fn browser_name(&self) -> &str {
        (**self).browser_name()
    }

    async fn open(&self, url: &str) -> Result<()> {
        (**self).open(url).await
    }

    async fn evaluate(&self, expression: &str) -> Result<Value> {
        (**self).evaluate(expression).await
    }
}

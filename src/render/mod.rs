//! Browser rendering seam
//!
//! The crawler only talks to a browser through [`Renderer`] and
//! [`RenderContext`]. The production implementation drives headless Chrome
//! (see [`chrome`]); tests substitute in-memory fakes.

pub mod chrome;
pub mod scripts;

use crate::config::{BrowserConfig, SnapshotConfig};
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// CSS pixels per inch, used to convert pixel margins for the PDF printer
pub const CSS_PIXELS_PER_INCH: f64 = 96.0;

/// Per-context browser settings applied before navigation
#[derive(Debug, Clone, PartialEq)]
pub struct ContextOptions {
    pub user_agent: String,
    pub locale: String,
    pub accept_language: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub navigation_timeout: Duration,
}

impl From<&BrowserConfig> for ContextOptions {
    fn from(config: &BrowserConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            locale: config.locale.clone(),
            accept_language: config.accept_language.clone(),
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
            navigation_timeout: Duration::from_millis(config.navigation_timeout_ms),
        }
    }
}

/// Paginated output settings
#[derive(Debug, Clone, PartialEq)]
pub struct PdfOptions {
    pub paper_width_in: f64,
    pub paper_height_in: f64,
    /// Margin applied to all four sides
    pub margin_in: f64,
    pub print_background: bool,
    pub prefer_css_page_size: bool,
}

impl From<&SnapshotConfig> for PdfOptions {
    fn from(config: &SnapshotConfig) -> Self {
        Self {
            paper_width_in: config.paper_width_in,
            paper_height_in: config.paper_height_in,
            margin_in: config.margin_px as f64 / CSS_PIXELS_PER_INCH,
            print_background: true,
            prefer_css_page_size: true,
        }
    }
}

/// One open browser tab
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Applies user agent, language, locale, and viewport
    async fn configure(&mut self, options: &ContextOptions) -> Result<()>;

    /// Loads `url` and waits for the page to settle, failing after `timeout`
    async fn navigate(&mut self, url: &Url, timeout: Duration) -> Result<()>;

    /// Invokes the JavaScript function expression `script` with `args`
    ///
    /// Promises returned by the function are awaited. The result is returned
    /// by value; `undefined` becomes `Value::Null`.
    async fn evaluate(&self, script: &str, args: Value) -> Result<Value>;

    /// Current serialized DOM
    async fn content(&self) -> Result<String>;

    /// Prints the current page to a PDF file at `path`
    async fn print_to_pdf(&self, options: &PdfOptions, path: &Path) -> Result<()>;

    /// Closes the tab
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Factory for render contexts
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Opens a fresh, blank context
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;

    /// Shuts the browser down
    async fn shutdown(&self) -> Result<()>;
}

//! Headless Chrome implementation of the rendering seam

use super::scripts::invocation;
use super::{ContextOptions, PdfOptions, RenderContext, Renderer};
use crate::config::BrowserConfig;
use crate::{ArchiveError, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as LaunchConfig};
use chromiumoxide::cdp::browser_protocol::emulation::{SetDeviceMetricsOverrideParams, SetLocaleOverrideParams};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::{EventLifecycleEvent, PrintToPdfParams};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use url::Url;

/// Launches one Chrome process and opens a fresh tab per context
pub struct ChromeRenderer {
    browser: Mutex<Browser>,
    handler: JoinHandle<()>,
}

impl ChromeRenderer {
    /// Starts Chrome with the configured flags and spawns the CDP event loop
    ///
    /// Every CDP command is bounded by the command timeout. Page loads get the
    /// tighter navigation timeout in [`RenderContext::navigate`].
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let mut builder = LaunchConfig::builder()
            .arg(format!("--lang={}", config.locale))
            .arg("--disable-dev-shm-usage")
            .arg("--disable-font-subpixel-positioning")
            .window_size(config.viewport_width, config.viewport_height)
            .request_timeout(Duration::from_millis(config.command_timeout_ms));

        if !config.sandbox {
            builder = builder.no_sandbox().arg("--disable-setuid-sandbox");
        }
        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(executable) = &config.executable {
            builder = builder.chrome_executable(executable);
        }

        let launch_config = builder.build().map_err(ArchiveError::Render)?;
        let (browser, mut handler) = Browser::launch(launch_config)
            .await
            .map_err(|e| ArchiveError::Render(format!("failed to launch Chrome: {}", e)))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler error: {}", e);
                }
            }
        });

        tracing::info!("Chrome launched (headless: {})", config.headless);
        Ok(Self {
            browser: Mutex::new(browser),
            handler,
        })
    }
}

#[async_trait]
impl Renderer for ChromeRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        let page = self
            .browser
            .lock()
            .await
            .new_page("about:blank")
            .await
            .map_err(|e| ArchiveError::Render(format!("failed to open tab: {}", e)))?;
        Ok(Box::new(ChromeContext { page }))
    }

    async fn shutdown(&self) -> Result<()> {
        let mut browser = self.browser.lock().await;
        browser
            .close()
            .await
            .map_err(|e| ArchiveError::Render(format!("failed to close Chrome: {}", e)))?;
        if let Err(e) = browser.wait().await {
            tracing::debug!("Chrome exit wait failed: {}", e);
        }
        self.handler.abort();
        Ok(())
    }
}

/// One Chrome tab
struct ChromeContext {
    page: Page,
}

#[async_trait]
impl RenderContext for ChromeContext {
    async fn configure(&mut self, options: &ContextOptions) -> Result<()> {
        let user_agent = SetUserAgentOverrideParams::builder()
            .user_agent(options.user_agent.clone())
            .accept_language(options.accept_language.clone())
            .build()
            .map_err(ArchiveError::Render)?;
        self.page
            .set_user_agent(user_agent)
            .await
            .map_err(|e| ArchiveError::Render(format!("failed to set user agent: {}", e)))?;

        self.page
            .execute(SetDeviceMetricsOverrideParams::new(
                options.viewport_width as i64,
                options.viewport_height as i64,
                1.0,
                false,
            ))
            .await
            .map_err(|e| ArchiveError::Render(format!("failed to set viewport: {}", e)))?;

        self.page
            .execute(SetLocaleOverrideParams {
                locale: Some(options.locale.clone()),
            })
            .await
            .map_err(|e| ArchiveError::Render(format!("failed to set locale: {}", e)))?;

        Ok(())
    }

    async fn navigate(&mut self, url: &Url, timeout: Duration) -> Result<()> {
        let navigation_error = |message: String| ArchiveError::Navigation {
            url: url.to_string(),
            message,
        };

        let load = async {
            // Subscribe first so no lifecycle event of the new document is missed
            let mut lifecycle = self.page.event_listener::<EventLifecycleEvent>().await?;
            let main_frame = self.page.mainframe().await?;
            self.page.goto(url.as_str()).await?;

            let mut idle = NetworkIdleWatch::new(main_frame.map(|id| id.inner().clone()));
            while let Some(event) = lifecycle.next().await {
                if idle.observe(event.frame_id.inner(), &event.name) {
                    break;
                }
            }
            Ok::<_, CdpError>(())
        };

        match tokio::time::timeout(timeout, load).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(navigation_error(e.to_string())),
            Err(_) => Err(navigation_error(format!(
                "timed out after {} ms",
                timeout.as_millis()
            ))),
        }
    }

    async fn evaluate(&self, script: &str, args: Value) -> Result<Value> {
        let params = EvaluateParams::builder()
            .expression(invocation(script, &args))
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(ArchiveError::Render)?;

        let result = self
            .page
            .evaluate_expression(params)
            .await
            .map_err(|e| ArchiveError::Render(format!("script evaluation failed: {}", e)))?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn content(&self) -> Result<String> {
        self.page
            .content()
            .await
            .map_err(|e| ArchiveError::Render(format!("failed to read page content: {}", e)))
    }

    async fn print_to_pdf(&self, options: &PdfOptions, path: &Path) -> Result<()> {
        let params = PrintToPdfParams {
            paper_width: Some(options.paper_width_in),
            paper_height: Some(options.paper_height_in),
            margin_top: Some(options.margin_in),
            margin_bottom: Some(options.margin_in),
            margin_left: Some(options.margin_in),
            margin_right: Some(options.margin_in),
            print_background: Some(options.print_background),
            prefer_css_page_size: Some(options.prefer_css_page_size),
            ..Default::default()
        };

        self.page
            .save_pdf(params, path)
            .await
            .map_err(|e| ArchiveError::Render(format!("print to PDF failed: {}", e)))?;
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.page
            .close()
            .await
            .map_err(|e| ArchiveError::Render(format!("failed to close tab: {}", e)))
    }
}

/// Tracks main-frame lifecycle events until the navigated document reports
/// `networkIdle`
///
/// Events belonging to the document that was showing before navigation (the
/// blank tab) are ignored: only an idle signal after the new document's
/// `init` counts.
#[derive(Debug)]
struct NetworkIdleWatch {
    main_frame: Option<String>,
    document_started: bool,
}

impl NetworkIdleWatch {
    fn new(main_frame: Option<String>) -> Self {
        Self {
            main_frame,
            document_started: false,
        }
    }

    /// Feeds one lifecycle event; returns true once the page is network-idle
    fn observe(&mut self, frame_id: &str, name: &str) -> bool {
        if let Some(main) = &self.main_frame {
            if main != frame_id {
                return false;
            }
        }

        match name {
            "init" => {
                self.document_started = true;
                false
            }
            "networkIdle" => self.document_started,
            _ => false,
        }
    }
}

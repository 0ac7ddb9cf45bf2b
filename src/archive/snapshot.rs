//! Paginated snapshots of rendered pages

use super::sanitize::{safe_url_component, sanitize_title};
use crate::config::SnapshotConfig;
use crate::output::SiteClock;
use crate::render::scripts::{FORCE_BACKGROUNDS, INJECT_FOOTER};
use crate::render::{PdfOptions, RenderContext};
use crate::{ArchiveError, Result};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use url::Url;

/// Extension of every snapshot file
pub const SNAPSHOT_EXTENSION: &str = "pdf";

/// Prints rendered pages to PDF with a source/capture-time footer
#[derive(Debug, Clone)]
pub struct SnapshotEngine {
    pdf: PdfOptions,
    footer_padding_px: u32,
    clock: SiteClock,
    untitled_label: String,
}

impl SnapshotEngine {
    pub fn new(config: &SnapshotConfig, clock: SiteClock, untitled_label: impl Into<String>) -> Self {
        Self {
            pdf: PdfOptions::from(config),
            footer_padding_px: config.footer_padding_px,
            clock,
            untitled_label: untitled_label.into(),
        }
    }

    /// `<sanitized title>_<sanitized path+query>.pdf`
    pub fn file_name(&self, title: &str, url: &Url) -> String {
        format!(
            "{}_{}.{}",
            sanitize_title(title, &self.untitled_label),
            safe_url_component(url),
            SNAPSHOT_EXTENSION
        )
    }

    /// Annotates the current page and prints it into `dir`
    ///
    /// The page is modified in place: a fixed footer carrying `url` and the
    /// capture time is appended and every element with a visible background
    /// is switched to exact color printing.
    ///
    /// # Returns
    ///
    /// The path of the written snapshot.
    pub async fn capture(
        &self,
        context: &dyn RenderContext,
        url: &Url,
        title: &str,
        dir: &Path,
    ) -> Result<PathBuf> {
        let path = dir.join(self.file_name(title, url));
        let snapshot_error = |e: ArchiveError| ArchiveError::Snapshot {
            url: url.to_string(),
            message: e.to_string(),
        };

        context
            .evaluate(INJECT_FOOTER, self.footer_args(url))
            .await
            .map_err(snapshot_error)?;
        let touched = context
            .evaluate(FORCE_BACKGROUNDS, Value::Null)
            .await
            .map_err(snapshot_error)?;
        tracing::debug!("Forced backgrounds on {} elements", touched);

        context
            .print_to_pdf(&self.pdf, &path)
            .await
            .map_err(snapshot_error)?;

        Ok(path)
    }

    fn footer_args(&self, url: &Url) -> Value {
        json!({
            "url": url.as_str(),
            "capturedAt": self.clock.timestamp(),
            "paddingPx": self.footer_padding_px,
        })
    }
}

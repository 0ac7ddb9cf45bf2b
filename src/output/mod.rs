//! Output module for the run log and crawl statistics
//!
//! This module handles:
//! - The append-only run log written next to the archive
//! - Timestamps in the site's timezone
//! - Counting and printing what a crawl produced

mod clock;
pub mod stats;

pub use clock::{SiteClock, TIMESTAMP_FORMAT};
pub use stats::{print_statistics, CrawlStatistics};

use crate::Result;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Append-only plain-text log of one crawl run
///
/// Every line has the form `[<site-local timestamp>] <message>`. The log is
/// opened once at startup and handed by reference to everything that
/// records events; each entry is mirrored to `tracing`.
pub struct RunLog {
    path: PathBuf,
    file: Mutex<File>,
    clock: SiteClock,
}

impl RunLog {
    /// Creates (or truncates) the log file and writes the start header
    ///
    /// # Arguments
    ///
    /// * `path` - Log file location; its parent directory must exist
    /// * `clock` - Clock used for every timestamp in the file
    pub fn create(path: &Path, clock: SiteClock) -> Result<Self> {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        writeln!(file, "Crawler started at {}", clock.timestamp())?;

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
            clock,
        })
    }

    /// Location of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Clock used for log timestamps
    pub fn clock(&self) -> &SiteClock {
        &self.clock
    }

    /// Records an informational event
    pub fn record(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        tracing::info!("{}", message);
        self.append(message);
    }

    /// Records a failure that the crawl absorbs
    pub fn warn(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        tracing::warn!("{}", message);
        self.append(message);
    }

    /// Records a failure that ends a page or the run
    pub fn error(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        tracing::error!("{}", message);
        self.append(message);
    }

    fn append(&self, message: &str) {
        let line = format!("[{}] {}\n", self.clock.timestamp(), message);
        let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = file.write_all(line.as_bytes()) {
            tracing::error!("Failed to write run log {}: {}", self.path.display(), e);
        }
    }
}

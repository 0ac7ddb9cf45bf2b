//! Statistics collected during a crawl run
//!
//! The orchestrator updates these counters as pages and attachments finish,
//! and prints them once the frontier is exhausted.

use crate::state::PageState;
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlStatistics {
    /// Pages that reached `Done`
    pub pages_done: u64,

    /// Pages that reached `Failed`
    pub pages_failed: u64,

    /// Snapshot documents written
    pub snapshots_saved: u64,

    /// Snapshot attempts that failed
    pub snapshots_failed: u64,

    /// Attachments written to disk
    pub assets_saved: u64,

    /// Attachments skipped by the exclusion policy
    pub assets_skipped: u64,

    /// Attachments that failed to download or write
    pub assets_failed: u64,

    /// Anchors seen across all rendered pages
    pub links_discovered: u64,

    /// Anchors accepted into the frontier
    pub links_enqueued: u64,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl CrawlStatistics {
    /// Creates empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts a page that reached a terminal state
    pub fn record_page(&mut self, state: PageState) {
        match state {
            PageState::Done => self.pages_done += 1,
            PageState::Failed => self.pages_failed += 1,
            PageState::Pending | PageState::Processing => {}
        }
    }

    /// Total pages that were dequeued and processed
    pub fn pages_visited(&self) -> u64 {
        self.pages_done + self.pages_failed
    }

    /// Returns the success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        let visited = self.pages_visited();
        if visited == 0 {
            return 0.0;
        }
        (self.pages_done as f64 / visited as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Pages:");
    println!("  Visited: {}", stats.pages_visited());
    println!("  Done: {}", stats.pages_done);
    println!("  Failed: {}", stats.pages_failed);
    println!();

    println!("Snapshots:");
    println!("  Saved: {}", stats.snapshots_saved);
    println!("  Failed: {}", stats.snapshots_failed);
    println!();

    println!("Attachments:");
    println!("  Saved: {}", stats.assets_saved);
    println!("  Skipped: {}", stats.assets_skipped);
    println!("  Failed: {}", stats.assets_failed);
    println!();

    println!("Links:");
    println!("  Discovered: {}", stats.links_discovered);
    println!("  Enqueued: {}", stats.links_enqueued);
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} pages) in {:.1}s",
        stats.success_rate(),
        stats.pages_done,
        stats.pages_visited(),
        stats.elapsed.as_secs_f64()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_statistics_are_empty() {
        let stats = CrawlStatistics::new();
        assert_eq!(stats.pages_visited(), 0);
        assert_eq!(stats.success_rate(), 0.0);
    }

    #[test]
    fn test_record_page() {
        let mut stats = CrawlStatistics::new();
        stats.record_page(PageState::Done);
        stats.record_page(PageState::Done);
        stats.record_page(PageState::Failed);
        stats.record_page(PageState::Processing);

        assert_eq!(stats.pages_done, 2);
        assert_eq!(stats.pages_failed, 1);
        assert_eq!(stats.pages_visited(), 3);
    }

    #[test]
    fn test_success_rate() {
        let mut stats = CrawlStatistics::new();
        stats.pages_done = 80;
        stats.pages_failed = 20;

        let rate = stats.success_rate();
        assert!((rate - 80.0).abs() < 0.01);
    }
}

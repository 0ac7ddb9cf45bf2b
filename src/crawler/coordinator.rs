//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates:
//! - Draining the frontier breadth-first, one page at a time
//! - Rendering, scrolling and snapshotting each page
//! - Resolving the page's archive directory
//! - Following origin links and downloading attachments

use crate::archive::{
    download_asset, AssetFetcher, AssetPolicy, Breadcrumb, DownloadOutcome, DownloadTask,
    PathResolver, SnapshotEngine,
};
use crate::config::Config;
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::{parse_page, PageSelectors};
use crate::output::{CrawlStatistics, RunLog};
use crate::render::scripts::AUTO_SCROLL;
use crate::render::{ContextOptions, RenderContext, Renderer};
use crate::state::PageState;
use crate::url::{classify_url, Origin, PageClassification};
use crate::{ArchiveError, Result};
use futures::future::join_all;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Main crawler coordinator structure
///
/// Owns the frontier and drives every page through the archive pipeline.
/// Page visits are strictly sequential; only the attachment downloads of a
/// single page run concurrently.
pub struct Coordinator {
    config: Config,
    frontier: Frontier,
    renderer: Arc<dyn Renderer>,
    fetcher: Arc<dyn AssetFetcher>,
    log: Arc<RunLog>,
    resolver: PathResolver,
    snapshots: SnapshotEngine,
    policy: AssetPolicy,
    selectors: PageSelectors,
    context_options: ContextOptions,
    page_states: HashMap<String, PageState>,
    stats: CrawlStatistics,
}

impl Coordinator {
    /// Creates a coordinator with the frontier seeded with the origin root
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `renderer` - Browser used to render every page
    /// * `fetcher` - Client used for attachments
    /// * `log` - Run log shared with the caller
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(ArchiveError)` - The origin or a selector is invalid
    pub fn new(
        config: Config,
        renderer: Arc<dyn Renderer>,
        fetcher: Arc<dyn AssetFetcher>,
        log: Arc<RunLog>,
    ) -> Result<Self> {
        let origin = Origin::parse(&config.site.origin)?;
        let selectors = PageSelectors::new(&config.selectors)?;
        let snapshots = SnapshotEngine::new(
            &config.snapshot,
            *log.clock(),
            config.archive.untitled_label.clone(),
        );

        Ok(Self {
            frontier: Frontier::seeded(origin),
            resolver: PathResolver::new(&config.archive),
            policy: AssetPolicy::new(&config.assets),
            context_options: ContextOptions::from(&config.browser),
            selectors,
            snapshots,
            renderer,
            fetcher,
            log,
            page_states: HashMap::new(),
            stats: CrawlStatistics::new(),
            config,
        })
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn frontier_mut(&mut self) -> &mut Frontier {
        &mut self.frontier
    }

    pub fn statistics(&self) -> &CrawlStatistics {
        &self.stats
    }

    /// Last recorded state of a page, if it was ever dequeued
    pub fn page_state(&self, url: &Url) -> Option<PageState> {
        self.page_states.get(url.as_str()).copied()
    }

    /// Runs the crawl loop until the frontier is empty
    ///
    /// Individual page failures are logged and never end the run.
    pub async fn run(&mut self) -> CrawlStatistics {
        let start_time = Instant::now();
        self.log
            .record(format!("Crawling {}", self.frontier.origin().root()));

        let mut pages_processed = 0u64;
        while self.process_next().await {
            pages_processed += 1;

            if pages_processed % 10 == 0 {
                tracing::info!(
                    "Progress: {} pages processed, {} in frontier, {:.1}s elapsed",
                    pages_processed,
                    self.frontier.len(),
                    start_time.elapsed().as_secs_f64()
                );
            }
        }

        self.stats.elapsed = start_time.elapsed();
        self.log.record(format!(
            "Crawl finished: {} pages visited",
            self.frontier.visited_count()
        ));

        self.stats.clone()
    }

    /// Dequeues and processes one URL
    ///
    /// # Returns
    ///
    /// `false` if the frontier was empty.
    pub async fn process_next(&mut self) -> bool {
        match self.frontier.dequeue_next() {
            Some(url) => {
                self.process_page(url).await;
                true
            }
            None => false,
        }
    }

    /// Processes one page
    ///
    /// # Returns
    ///
    /// * `Some(state)` - The terminal state the page reached
    /// * `None` - The page had already been visited and nothing happened
    pub async fn process_page(&mut self, url: Url) -> Option<PageState> {
        if !self.frontier.mark_visited(&url) {
            tracing::debug!("Skipping already visited {}", url);
            return None;
        }

        self.log.record(format!("Processing page: {}", url));
        self.transition(&url, PageState::Processing);

        let state = match self.visit(&url).await {
            Ok(()) => PageState::Done,
            Err(e) => {
                self.log
                    .error(format!("Failed to process page {}: {}", url, e));
                PageState::Failed
            }
        };

        self.transition(&url, state);
        self.stats.record_page(state);
        Some(state)
    }

    fn transition(&mut self, url: &Url, to: PageState) {
        let from = self
            .page_states
            .get(url.as_str())
            .copied()
            .unwrap_or(PageState::Pending);

        if from.can_transition_to(to) {
            self.page_states.insert(url.to_string(), to);
        } else {
            tracing::error!("{}", ArchiveError::InvalidTransition { from, to });
        }
    }

    /// Renders the page in a fresh context and closes the context afterwards,
    /// whether or not archiving succeeded
    async fn visit(&mut self, url: &Url) -> Result<()> {
        let classification = classify_url(url);
        tracing::debug!("{} classified as {}", url, classification);

        let mut context = self.renderer.new_context().await?;
        let result = self
            .archive_page(context.as_mut(), url, classification)
            .await;

        if let Err(e) = context.close().await {
            self.log
                .warn(format!("Failed to close page {}: {}", url, e));
        }

        result
    }

    async fn archive_page(
        &mut self,
        context: &mut dyn RenderContext,
        url: &Url,
        classification: PageClassification,
    ) -> Result<()> {
        context.configure(&self.context_options).await?;
        context
            .navigate(url, self.context_options.navigation_timeout)
            .await?;

        if classification.is_lazy_loading() {
            self.settle_lazy_content(&*context, url).await;
        }

        let html = context.content().await?;
        let page = parse_page(&html, &self.selectors, self.frontier.origin().root());

        let title = page.title.clone().unwrap_or_default();
        let breadcrumb = Breadcrumb::from_trail(
            page.breadcrumb.iter().map(String::as_str),
            &self.config.site.home_label,
            &self.config.archive.untitled_label,
        );
        let archive_path = self
            .resolver
            .resolve(&breadcrumb, &title, classification, url);
        archive_path.materialize().await?;

        match self
            .snapshots
            .capture(&*context, url, &title, archive_path.dir())
            .await
        {
            Ok(path) => {
                self.stats.snapshots_saved += 1;
                self.log
                    .record(format!("Saved snapshot: {}", path.display()));
            }
            Err(e) => {
                self.stats.snapshots_failed += 1;
                self.log.warn(e.to_string());
            }
        }

        let tasks = self.route_links(&page.links, archive_path.dir());
        self.download_all(tasks).await;

        Ok(())
    }

    /// Scrolls to the bottom in steps and waits for lazy content to load
    ///
    /// A failed scroll is logged; the page is still captured as rendered.
    async fn settle_lazy_content(&self, context: &dyn RenderContext, url: &Url) {
        let args = json!({
            "step": self.config.scroll.step_px,
            "interval": self.config.scroll.interval_ms,
        });

        match context.evaluate(AUTO_SCROLL, args).await {
            Ok(_) => {
                tokio::time::sleep(Duration::from_millis(self.config.scroll.settle_ms)).await;
            }
            Err(e) => {
                self.log
                    .warn(format!("Auto-scroll failed for {}: {}", url, e));
            }
        }
    }

    /// Sends attachment links to the downloader and origin links to the frontier
    fn route_links(&mut self, links: &[Url], dir: &Path) -> Vec<DownloadTask> {
        let mut seen = HashSet::new();
        let mut tasks = Vec::new();

        for link in links {
            self.stats.links_discovered += 1;

            if self.policy.is_asset(link) {
                if seen.insert(link.as_str()) {
                    tasks.push(DownloadTask::new(link.clone(), dir));
                }
            } else if self.frontier.enqueue_url(link) {
                self.stats.links_enqueued += 1;
            }
        }

        tasks
    }

    /// Downloads every task concurrently and waits for all of them
    async fn download_all(&mut self, tasks: Vec<DownloadTask>) {
        if tasks.is_empty() {
            return;
        }

        let outcomes = {
            let fetcher = self.fetcher.as_ref();
            let policy = &self.policy;
            join_all(tasks.iter().map(|task| async move {
                (task, download_asset(fetcher, policy, task).await)
            }))
            .await
        };

        for (task, outcome) in outcomes {
            match outcome {
                DownloadOutcome::Saved(path) => {
                    self.stats.assets_saved += 1;
                    self.log
                        .record(format!("Downloaded attachment: {}", path.display()));
                }
                DownloadOutcome::Skipped(name) => {
                    self.stats.assets_skipped += 1;
                    self.log.record(format!("Skipped attachment: {}", name));
                }
                DownloadOutcome::Failed(message) => {
                    self.stats.assets_failed += 1;
                    self.log
                        .warn(format!("Attachment download failed {}: {}", task.url, message));
                }
            }
        }
    }
}

/// Builds a coordinator and runs it to completion
///
/// # Arguments
///
/// * `config` - Validated configuration
/// * `renderer` - Browser used to render every page
/// * `fetcher` - Client used for attachments
/// * `log` - Run log opened at startup
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - The crawl ran until the frontier was empty
/// * `Err(ArchiveError)` - The coordinator could not be built
pub async fn run_crawl(
    config: Config,
    renderer: Arc<dyn Renderer>,
    fetcher: Arc<dyn AssetFetcher>,
    log: Arc<RunLog>,
) -> Result<CrawlStatistics> {
    let mut coordinator = Coordinator::new(config, renderer, fetcher, log)?;
    Ok(coordinator.run().await)
}

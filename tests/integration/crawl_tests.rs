//! Integration tests for the crawler
//!
//! These tests drive the coordinator with an in-memory browser and attachment
//! fetcher, plus a wiremock server for the real HTTP fetcher, and check the
//! crawl cycle end-to-end.

use async_trait::async_trait;
use serde_json::Value;
use site_archiver::archive::{AssetFetcher, HttpFetcher};
use site_archiver::config::Config;
use site_archiver::crawler::Coordinator;
use site_archiver::output::{RunLog, SiteClock};
use site_archiver::render::scripts::{AUTO_SCROLL, FORCE_BACKGROUNDS, INJECT_FOOTER};
use site_archiver::render::{ContextOptions, PdfOptions, RenderContext, Renderer};
use site_archiver::state::PageState;
use site_archiver::{ArchiveError, Result};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ORIGIN: &str = "https://am.ndhu.edu.tw/";

/// Everything the fake browser serves and observes
#[derive(Default)]
struct FakeSite {
    pages: HashMap<String, String>,
    fail_print: bool,
    navigations: Vec<String>,
    scripts: Vec<(String, String)>,
    opened: usize,
    closed: usize,
}

#[derive(Clone, Default)]
struct FakeRenderer {
    site: Arc<Mutex<FakeSite>>,
}

impl FakeRenderer {
    fn serve(&self, url: &str, html: String) {
        self.site.lock().unwrap().pages.insert(url.to_string(), html);
    }

    fn fail_print(&self) {
        self.site.lock().unwrap().fail_print = true;
    }

    fn navigations(&self) -> Vec<String> {
        self.site.lock().unwrap().navigations.clone()
    }

    fn scripts_for(&self, url: &str) -> Vec<String> {
        self.site
            .lock()
            .unwrap()
            .scripts
            .iter()
            .filter(|(page, _)| page == url)
            .map(|(_, script)| script.clone())
            .collect()
    }

    fn open_and_closed(&self) -> (usize, usize) {
        let site = self.site.lock().unwrap();
        (site.opened, site.closed)
    }
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        self.site.lock().unwrap().opened += 1;
        Ok(Box::new(FakeContext {
            site: self.site.clone(),
            current: None,
        }))
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}

struct FakeContext {
    site: Arc<Mutex<FakeSite>>,
    current: Option<String>,
}

#[async_trait]
impl RenderContext for FakeContext {
    async fn configure(&mut self, options: &ContextOptions) -> Result<()> {
        assert_eq!(options.viewport_width, 1920);
        Ok(())
    }

    async fn navigate(&mut self, url: &Url, _timeout: Duration) -> Result<()> {
        let mut site = self.site.lock().unwrap();
        site.navigations.push(url.to_string());
        if site.pages.contains_key(url.as_str()) {
            self.current = Some(url.to_string());
            Ok(())
        } else {
            Err(ArchiveError::Navigation {
                url: url.to_string(),
                message: "net::ERR_CONNECTION_REFUSED".to_string(),
            })
        }
    }

    async fn evaluate(&self, script: &str, _args: Value) -> Result<Value> {
        let page = self.current.clone().unwrap_or_default();
        self.site
            .lock()
            .unwrap()
            .scripts
            .push((page, script.to_string()));
        Ok(Value::Null)
    }

    async fn content(&self) -> Result<String> {
        let site = self.site.lock().unwrap();
        let current = self.current.as_deref().unwrap_or_default();
        Ok(site.pages.get(current).cloned().unwrap_or_default())
    }

    async fn print_to_pdf(&self, _options: &PdfOptions, path: &Path) -> Result<()> {
        if self.site.lock().unwrap().fail_print {
            return Err(ArchiveError::Render("printing disabled".to_string()));
        }
        std::fs::write(path, b"%PDF-1.4")?;
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.site.lock().unwrap().closed += 1;
        Ok(())
    }
}

/// Attachment fetcher that records every request
#[derive(Clone, Default)]
struct FakeFetcher {
    requests: Arc<Mutex<Vec<String>>>,
    missing: Arc<Mutex<HashSet<String>>>,
}

impl FakeFetcher {
    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn make_missing(&self, url: &str) {
        self.missing.lock().unwrap().insert(url.to_string());
    }
}

#[async_trait]
impl AssetFetcher for FakeFetcher {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        self.requests.lock().unwrap().push(url.to_string());
        if self.missing.lock().unwrap().contains(url.as_str()) {
            return Err(ArchiveError::Download {
                url: url.to_string(),
                message: "HTTP 404".to_string(),
            });
        }
        Ok(b"attachment".to_vec())
    }
}

/// Builds a page with a title, breadcrumb trail and anchors
fn page(title: &str, breadcrumb: &[&str], links: &[&str]) -> String {
    let crumbs: String = breadcrumb
        .iter()
        .map(|item| format!("<li><a href=\"#\">{}</a></li>", item))
        .collect();
    let anchors: String = links
        .iter()
        .map(|href| format!("<a href=\"{}\">link</a>", href))
        .collect();
    format!(
        "<html><head><title>{}</title></head><body><ol class=\"breadcrumb\">{}</ol>{}</body></html>",
        title, crumbs, anchors
    )
}

fn url(path: &str) -> String {
    Url::parse(ORIGIN).unwrap().join(path).unwrap().to_string()
}

struct Harness {
    dir: TempDir,
    renderer: FakeRenderer,
    fetcher: FakeFetcher,
}

impl Harness {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            renderer: FakeRenderer::default(),
            fetcher: FakeFetcher::default(),
        }
    }

    fn base_dir(&self) -> &Path {
        self.dir.path()
    }

    fn config(&self) -> Config {
        let mut config = Config::for_origin(ORIGIN);
        config.archive.base_dir = self.base_dir().to_string_lossy().into_owned();
        config.scroll.settle_ms = 0;
        config
    }

    fn coordinator(&self) -> Coordinator {
        self.coordinator_with_fetcher(Arc::new(self.fetcher.clone()))
    }

    fn coordinator_with_fetcher(&self, fetcher: Arc<dyn AssetFetcher>) -> Coordinator {
        let config = self.config();
        let log = RunLog::create(&config.log_path(), SiteClock::new(8)).unwrap();
        Coordinator::new(
            config,
            Arc::new(self.renderer.clone()),
            fetcher,
            Arc::new(log),
        )
        .unwrap()
    }

    fn log_contents(&self) -> String {
        std::fs::read_to_string(self.base_dir().join("crawler.log")).unwrap()
    }
}

#[tokio::test]
async fn test_single_pass_enqueues_links_and_schedules_one_download() {
    let harness = Harness::new();
    harness.renderer.serve(
        ORIGIN,
        page("Home", &[], &["/about", "/contact", "/files/report.pdf"]),
    );

    let mut coordinator = harness.coordinator();
    assert!(coordinator.process_next().await);

    let pending: Vec<String> = coordinator
        .frontier()
        .pending()
        .map(|u| u.to_string())
        .collect();
    assert_eq!(pending, vec![url("/about"), url("/contact")]);

    let root = Url::parse(ORIGIN).unwrap();
    assert!(coordinator.frontier().is_visited(&root));
    assert_eq!(coordinator.frontier().visited_count(), 1);
    assert_eq!(coordinator.page_state(&root), Some(PageState::Done));

    assert_eq!(harness.fetcher.requests(), vec![url("/files/report.pdf")]);
    let saved = harness.base_dir().join("Home__").join("report.pdf");
    assert_eq!(std::fs::read(saved).unwrap(), b"attachment");
}

#[tokio::test]
async fn test_revisit_is_noop() {
    let harness = Harness::new();
    harness
        .renderer
        .serve(ORIGIN, page("Home", &[], &["/about", "/a.pdf"]));

    let mut coordinator = harness.coordinator();
    let root = Url::parse(ORIGIN).unwrap();

    let first = coordinator.process_page(root.clone()).await;
    assert_eq!(first, Some(PageState::Done));
    let stats_after_first = coordinator.statistics().clone();
    let pending_after_first = coordinator.frontier().len();

    let second = coordinator.process_page(root.clone()).await;
    assert_eq!(second, None);
    assert_eq!(coordinator.statistics(), &stats_after_first);
    assert_eq!(coordinator.frontier().len(), pending_after_first);
    assert_eq!(harness.renderer.navigations(), vec![ORIGIN.to_string()]);
    assert_eq!(harness.fetcher.requests().len(), 1);
}

#[tokio::test]
async fn test_foreign_links_are_not_enqueued() {
    let harness = Harness::new();
    harness.renderer.serve(
        ORIGIN,
        page(
            "Home",
            &[],
            &[
                "https://www.ndhu.edu.tw/",
                "http://evil.example/p/16-1038-1.php?Lang=zh-tw",
                "mailto:office@ndhu.edu.tw",
                "/local",
            ],
        ),
    );

    let mut coordinator = harness.coordinator();
    coordinator.process_next().await;

    let pending: Vec<String> = coordinator
        .frontier()
        .pending()
        .map(|u| u.to_string())
        .collect();
    assert_eq!(pending, vec![url("/local")]);
    assert!(!coordinator.frontier_mut().enqueue("https://www.ndhu.edu.tw/other"));
}

#[tokio::test]
async fn test_navigation_failure_does_not_stop_crawl() {
    let harness = Harness::new();
    harness
        .renderer
        .serve(ORIGIN, page("Home", &[], &["/broken", "/fine"]));
    harness
        .renderer
        .serve(&url("/fine"), page("Fine", &["首頁", "系所簡介"], &[]));

    let mut coordinator = harness.coordinator();
    let stats = coordinator.run().await;

    assert_eq!(stats.pages_done, 2);
    assert_eq!(stats.pages_failed, 1);
    assert_eq!(
        coordinator.page_state(&Url::parse(&url("/broken")).unwrap()),
        Some(PageState::Failed)
    );
    assert!(coordinator.frontier().is_empty());

    let (opened, closed) = harness.renderer.open_and_closed();
    assert_eq!(opened, 3);
    assert_eq!(closed, 3);

    let log = harness.log_contents();
    assert!(log.contains(&format!("Failed to process page {}", url("/broken"))));
    assert!(harness
        .base_dir()
        .join("系所簡介")
        .join("Fine__fine")
        .join("Fine__fine.pdf")
        .is_file());
}

#[tokio::test]
async fn test_uppercase_extension_is_an_attachment() {
    let harness = Harness::new();
    harness.renderer.serve(
        ORIGIN,
        page("Home", &[], &["/files/LOWER.pdf", "/files/UPPER.PDF"]),
    );

    let mut coordinator = harness.coordinator();
    coordinator.process_next().await;

    let mut requests = harness.fetcher.requests();
    requests.sort();
    assert_eq!(
        requests,
        vec![url("/files/LOWER.pdf"), url("/files/UPPER.PDF")]
    );
    assert!(coordinator.frontier().is_empty());
}

#[tokio::test]
async fn test_attachment_failures_are_isolated() {
    let harness = Harness::new();
    harness.renderer.serve(
        ORIGIN,
        page(
            "Home",
            &[],
            &["/files/missing.doc", "/files/ok.xls", "/files/169376631.pdf"],
        ),
    );
    harness.fetcher.make_missing(&url("/files/missing.doc"));

    let mut coordinator = harness.coordinator();
    let state = coordinator
        .process_page(Url::parse(ORIGIN).unwrap())
        .await;
    assert_eq!(state, Some(PageState::Done));

    let stats = coordinator.statistics();
    assert_eq!(stats.assets_saved, 1);
    assert_eq!(stats.assets_failed, 1);
    assert_eq!(stats.assets_skipped, 1);

    assert!(!harness
        .fetcher
        .requests()
        .contains(&url("/files/169376631.pdf")));
    assert!(harness.base_dir().join("Home__").join("ok.xls").is_file());
}

#[tokio::test]
async fn test_snapshot_failure_keeps_page_done() {
    let harness = Harness::new();
    harness
        .renderer
        .serve(ORIGIN, page("Home", &[], &["/next"]));
    harness.renderer.fail_print();

    let mut coordinator = harness.coordinator();
    assert!(coordinator.process_next().await);

    let root = Url::parse(ORIGIN).unwrap();
    assert_eq!(coordinator.page_state(&root), Some(PageState::Done));
    assert_eq!(coordinator.statistics().snapshots_failed, 1);
    let pending: Vec<String> = coordinator
        .frontier()
        .pending()
        .map(|u| u.to_string())
        .collect();
    assert_eq!(pending, vec![url("/next")]);
    assert!(harness.log_contents().contains("Snapshot of"));
}

#[tokio::test]
async fn test_dot_breadcrumb_stays_inside_archive() {
    let harness = Harness::new();
    harness
        .renderer
        .serve(ORIGIN, page("Home", &["首頁", "..", ".."], &["/files/a.pdf"]));

    let mut coordinator = harness.coordinator();
    assert!(coordinator.process_next().await);

    let page_dir = harness
        .base_dir()
        .join("untitled")
        .join("untitled")
        .join("Home__");
    assert!(page_dir.join("Home__.pdf").is_file());
    assert!(page_dir.join("a.pdf").is_file());

    let parent = harness.base_dir().parent().unwrap();
    assert!(!parent.join("Home__").exists());
}

#[tokio::test]
async fn test_lazy_pages_are_scrolled_before_capture() {
    let harness = Harness::new();
    let gallery = url("/p/132-1038-2588.php?Lang=zh-tw");
    harness.renderer.serve(
        ORIGIN,
        page("Home", &[], &["/p/132-1038-2588.php?Lang=zh-tw"]),
    );
    harness
        .renderer
        .serve(&gallery, page("Album", &["首頁", "活動"], &[]));

    let mut coordinator = harness.coordinator();
    coordinator.run().await;

    assert!(!harness
        .renderer
        .scripts_for(ORIGIN)
        .contains(&AUTO_SCROLL.to_string()));
    assert_eq!(
        harness.renderer.scripts_for(&gallery),
        vec![
            AUTO_SCROLL.to_string(),
            INJECT_FOOTER.to_string(),
            FORCE_BACKGROUNDS.to_string()
        ]
    );

    let album_dir = harness
        .base_dir()
        .join("活動")
        .join("線上相簿")
        .join("Album__p_132-1038-2588.php_Lang=zh-tw");
    assert!(album_dir.is_dir());
}

#[tokio::test]
async fn test_full_run_builds_archive_tree() {
    let harness = Harness::new();
    let news = url("/p/406-1038-193282,r4551.php?Lang=zh-tw");
    let redirect = url("/p/16-1038-193282.php?Lang=zh-tw");
    harness.renderer.serve(
        ORIGIN,
        page(
            "Home",
            &[],
            &[
                "/p/406-1038-193282,r4551.php?Lang=zh-tw",
                "/p/16-1038-193282.php?Lang=zh-tw",
            ],
        ),
    );
    harness
        .renderer
        .serve(&news, page("Seminar", &["首頁", "公告"], &[ORIGIN]));
    harness
        .renderer
        .serve(&redirect, page("Redirect", &[], &[]));

    let mut coordinator = harness.coordinator();
    let stats = coordinator.run().await;

    assert_eq!(stats.pages_visited(), 3);
    assert_eq!(stats.pages_failed, 0);
    assert_eq!(coordinator.frontier().visited_count(), 3);

    let news_dir = harness
        .base_dir()
        .join("最新消息")
        .join("Seminar__p_406-1038-193282,r4551.php_Lang=zh-tw");
    assert!(news_dir
        .join("Seminar__p_406-1038-193282,r4551.php_Lang=zh-tw.pdf")
        .is_file());
    assert!(!harness.base_dir().join("公告").exists());

    // Redirect modules write into the directory of their breadcrumb
    assert!(harness
        .base_dir()
        .join("Redirect__p_16-1038-193282.php_Lang=zh-tw.pdf")
        .is_file());
    assert_eq!(stats.snapshots_saved, 3);

    let log = harness.log_contents();
    assert!(log.starts_with("Crawler started at "));
    assert!(log.contains(&format!("] Processing page: {}", ORIGIN)));
    assert!(log.contains("Crawl finished: 3 pages visited"));
}

#[tokio::test]
async fn test_http_fetcher_downloads_attachment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/plan.docx"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"docx-bytes".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let harness = Harness::new();
    let attachment = format!("{}/files/plan.docx", server.uri());
    harness
        .renderer
        .serve(ORIGIN, page("Home", &[], &[attachment.as_str()]));

    let fetcher = HttpFetcher::new(&harness.config().browser).unwrap();
    let mut coordinator = harness.coordinator_with_fetcher(Arc::new(fetcher));
    coordinator.run().await;

    let saved = harness.base_dir().join("Home__").join("plan.docx");
    assert_eq!(std::fs::read(saved).unwrap(), b"docx-bytes");
    assert_eq!(coordinator.statistics().assets_saved, 1);
}

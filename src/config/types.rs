use serde::Deserialize;

/// Main configuration structure for Site-Archiver
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub assets: AssetConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
}

/// The single origin being archived
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Root URL of the site; its host is the only host ever crawled
    pub origin: String,

    /// Offset of the site's timezone from UTC, used for every printed timestamp
    #[serde(rename = "utc-offset-hours", default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,

    /// Breadcrumb label of the site root, dropped from archive paths
    #[serde(rename = "home-label", default = "default_home_label")]
    pub home_label: String,
}

/// Archive tree layout
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveConfig {
    /// Root directory of the archive tree
    #[serde(rename = "base-dir", default = "default_base_dir")]
    pub base_dir: String,

    /// Run log file name, relative to `base-dir`
    #[serde(rename = "log-file", default = "default_log_file")]
    pub log_file: String,

    /// Directory used for every news article page
    #[serde(rename = "latest-news-label", default = "default_latest_news_label")]
    pub latest_news_label: String,

    /// Directory appended for gallery pages
    #[serde(rename = "gallery-label", default = "default_gallery_label")]
    pub gallery_label: String,

    /// Directory appended below the gallery directory for single images
    #[serde(rename = "single-image-label", default = "default_single_image_label")]
    pub single_image_label: String,

    /// Fallback for titles and breadcrumb segments that sanitize to nothing
    #[serde(rename = "untitled-label", default = "default_untitled_label")]
    pub untitled_label: String,
}

/// Browser context settings
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_locale")]
    pub locale: String,

    #[serde(rename = "accept-language", default = "default_accept_language")]
    pub accept_language: String,

    #[serde(rename = "viewport-width", default = "default_viewport_width")]
    pub viewport_width: u32,

    #[serde(rename = "viewport-height", default = "default_viewport_height")]
    pub viewport_height: u32,

    /// Upper bound for a single page load (milliseconds)
    #[serde(
        rename = "navigation-timeout-ms",
        default = "default_navigation_timeout_ms"
    )]
    pub navigation_timeout_ms: u64,

    /// Upper bound for any other browser command, such as a scroll script or
    /// a print (milliseconds)
    #[serde(rename = "command-timeout-ms", default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,

    #[serde(default = "default_true")]
    pub headless: bool,

    /// Chrome binary to launch instead of the auto-detected one
    #[serde(default)]
    pub executable: Option<String>,

    /// Keep Chrome's sandbox enabled
    #[serde(default)]
    pub sandbox: bool,
}

/// Print-to-PDF layout
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotConfig {
    #[serde(rename = "paper-width-in", default = "default_paper_width_in")]
    pub paper_width_in: f64,

    #[serde(rename = "paper-height-in", default = "default_paper_height_in")]
    pub paper_height_in: f64,

    /// Margin on every side, in CSS pixels
    #[serde(rename = "margin-px", default = "default_margin_px")]
    pub margin_px: u32,

    /// Bottom padding reserved on the page body so the footer hides nothing
    #[serde(rename = "footer-padding-px", default = "default_footer_padding_px")]
    pub footer_padding_px: u32,
}

/// Auto-scroll used on lazy-loading pages
#[derive(Debug, Clone, Deserialize)]
pub struct ScrollConfig {
    #[serde(rename = "step-px", default = "default_scroll_step_px")]
    pub step_px: u32,

    #[serde(rename = "interval-ms", default = "default_scroll_interval_ms")]
    pub interval_ms: u64,

    /// Pause after reaching the bottom, letting late content arrive
    #[serde(rename = "settle-ms", default = "default_scroll_settle_ms")]
    pub settle_ms: u64,
}

/// Attachment download policy
#[derive(Debug, Clone, Deserialize)]
pub struct AssetConfig {
    /// File extensions (without the dot) treated as downloadable documents
    #[serde(default = "default_asset_extensions")]
    pub extensions: Vec<String>,

    /// File names that are never downloaded
    #[serde(rename = "excluded-filenames", default = "default_excluded_filenames")]
    pub excluded_filenames: Vec<String>,
}

/// CSS selectors used against rendered markup
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorConfig {
    #[serde(default = "default_breadcrumb_selector")]
    pub breadcrumb: String,

    #[serde(default = "default_title_selector")]
    pub title: String,
}

fn default_utc_offset_hours() -> i32 {
    8
}

fn default_home_label() -> String {
    "首頁".to_string()
}

fn default_base_dir() -> String {
    "./ndhu_am_archive".to_string()
}

fn default_log_file() -> String {
    "crawler.log".to_string()
}

fn default_latest_news_label() -> String {
    "最新消息".to_string()
}

fn default_gallery_label() -> String {
    "線上相簿".to_string()
}

fn default_single_image_label() -> String {
    "單張圖片".to_string()
}

fn default_untitled_label() -> String {
    "untitled".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string()
}

fn default_locale() -> String {
    "zh-TW".to_string()
}

fn default_accept_language() -> String {
    "zh-TW,zh;q=0.9,en-US;q=0.8,en;q=0.7".to_string()
}

fn default_viewport_width() -> u32 {
    1920
}

fn default_viewport_height() -> u32 {
    1080
}

fn default_navigation_timeout_ms() -> u64 {
    30_000
}

fn default_command_timeout_ms() -> u64 {
    600_000
}

fn default_true() -> bool {
    true
}

fn default_paper_width_in() -> f64 {
    8.27
}

fn default_paper_height_in() -> f64 {
    11.69
}

fn default_margin_px() -> u32 {
    20
}

fn default_footer_padding_px() -> u32 {
    100
}

fn default_scroll_step_px() -> u32 {
    100
}

fn default_scroll_interval_ms() -> u64 {
    100
}

fn default_scroll_settle_ms() -> u64 {
    2000
}

fn default_asset_extensions() -> Vec<String> {
    ["pdf", "doc", "docx", "xls", "xlsx"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_excluded_filenames() -> Vec<String> {
    vec!["169376631.pdf".to_string()]
}

fn default_breadcrumb_selector() -> String {
    ".breadcrumb li".to_string()
}

fn default_title_selector() -> String {
    "title".to_string()
}

impl Config {
    /// Builds a configuration for `origin` with every other setting at its default
    pub fn for_origin(origin: impl Into<String>) -> Self {
        Self {
            site: SiteConfig {
                origin: origin.into(),
                utc_offset_hours: default_utc_offset_hours(),
                home_label: default_home_label(),
            },
            archive: ArchiveConfig::default(),
            browser: BrowserConfig::default(),
            snapshot: SnapshotConfig::default(),
            scroll: ScrollConfig::default(),
            assets: AssetConfig::default(),
            selectors: SelectorConfig::default(),
        }
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            log_file: default_log_file(),
            latest_news_label: default_latest_news_label(),
            gallery_label: default_gallery_label(),
            single_image_label: default_single_image_label(),
            untitled_label: default_untitled_label(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            locale: default_locale(),
            accept_language: default_accept_language(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            navigation_timeout_ms: default_navigation_timeout_ms(),
            command_timeout_ms: default_command_timeout_ms(),
            headless: true,
            executable: None,
            sandbox: false,
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            paper_width_in: default_paper_width_in(),
            paper_height_in: default_paper_height_in(),
            margin_px: default_margin_px(),
            footer_padding_px: default_footer_padding_px(),
        }
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            step_px: default_scroll_step_px(),
            interval_ms: default_scroll_interval_ms(),
            settle_ms: default_scroll_settle_ms(),
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            extensions: default_asset_extensions(),
            excluded_filenames: default_excluded_filenames(),
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            breadcrumb: default_breadcrumb_selector(),
            title: default_title_selector(),
        }
    }
}

impl Config {
    /// Replaces the origin and/or archive root with command-line values
    pub fn apply_overrides(&mut self, origin: Option<String>, base_dir: Option<String>) {
        if let Some(origin) = origin {
            self.site.origin = origin;
        }
        if let Some(base_dir) = base_dir {
            self.archive.base_dir = base_dir;
        }
    }

    /// Full path of the run log file
    pub fn log_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.archive.base_dir).join(&self.archive.log_file)
    }
}

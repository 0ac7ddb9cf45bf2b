//! Structural page classification from URL shape
//!
//! Every pattern is matched against the URL's path plus query (`/p/...php?Lang=..`),
//! never against the host; origin checks are the frontier's job.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use url::Url;

/// News article module: `/p/406-<site>-<article>,<token>.php?Lang=<lang>`
pub const NEWS_MODULE_PATTERN: &str = r"^/p/406-\d+-\d+,\w+\.php\?Lang=[\w-]+$";

/// Photo gallery index: `/p/132-<site>-<album>.php?Lang=<lang>`
pub const GALLERY_INDEX_PATTERN: &str = r"^/p/132-\d+-\d+\.php\?Lang=[\w-]+$";

/// A single gallery image file: `/var/file/<n>/<n>/gallery/...`
pub const SINGLE_IMAGE_PATTERN: &str = r"^/var/file/\d+/\d+/gallery/";

/// Pass-through module: `/p/16-<site>-<item>.php?Lang=<lang>`
pub const PASS_THROUGH_MODULE_PATTERN: &str = r"^/p/16-\d+-\d+\.php\?Lang=[\w-]+$";

/// Listing module: `/p/403-<site>-<list>-<page>.php?Lang=<lang>`
pub const LISTING_MODULE_PATTERN: &str = r"^/p/403-\d+-\d+-\d+\.php\?Lang=[\w-]+$";

/// Structural page type derived from a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageClassification {
    /// News article; archived under the fixed "latest news" directory
    NewsModule,
    /// Gallery index; archived under an extra gallery directory
    GalleryIndex,
    /// Single gallery image
    SingleImage,
    /// Pass-through or listing module; gets no directory of its own
    RedirectModule,
    /// Any other page on the origin
    Generic,
}

impl PageClassification {
    /// Returns true if the page only materializes its content after scrolling
    pub fn is_lazy_loading(&self) -> bool {
        matches!(
            self,
            Self::RedirectModule | Self::GalleryIndex | Self::SingleImage
        )
    }

    /// Returns true if the page gets its own leaf directory in the archive
    pub fn has_own_directory(&self) -> bool {
        !matches!(self, Self::RedirectModule)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewsModule => "news_module",
            Self::GalleryIndex => "gallery_index",
            Self::SingleImage => "single_image",
            Self::RedirectModule => "redirect_module",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for PageClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct Patterns {
    news: Regex,
    gallery: Regex,
    single_image: Regex,
    pass_through: Regex,
    listing: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let compile = |p: &str| Regex::new(p).expect("built-in URL pattern must compile");
        Patterns {
            news: compile(NEWS_MODULE_PATTERN),
            gallery: compile(GALLERY_INDEX_PATTERN),
            single_image: compile(SINGLE_IMAGE_PATTERN),
            pass_through: compile(PASS_THROUGH_MODULE_PATTERN),
            listing: compile(LISTING_MODULE_PATTERN),
        }
    })
}

/// Classifies a URL into its structural page type
///
/// The function is total: anything that matches none of the module shapes
/// is `Generic`. The shapes have disjoint prefixes, so at most one matches.
///
/// # Examples
///
/// ```
/// use site_archiver::url::{classify_url, PageClassification};
/// use url::Url;
///
/// let url = Url::parse("https://am.ndhu.edu.tw/p/132-1038-2588.php?Lang=zh-tw").unwrap();
/// assert_eq!(classify_url(&url), PageClassification::GalleryIndex);
/// ```
pub fn classify_url(url: &Url) -> PageClassification {
    let target = super::path_and_query(url);
    let p = patterns();

    if p.news.is_match(&target) {
        PageClassification::NewsModule
    } else if p.gallery.is_match(&target) {
        PageClassification::GalleryIndex
    } else if p.single_image.is_match(&target) {
        PageClassification::SingleImage
    } else if p.pass_through.is_match(&target) || p.listing.is_match(&target) {
        PageClassification::RedirectModule
    } else {
        PageClassification::Generic
    }
}

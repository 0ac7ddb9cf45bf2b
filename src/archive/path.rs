//! Archive directory derivation from breadcrumb, title and page class

use super::sanitize::{safe_url_component, sanitize_title};
use crate::config::ArchiveConfig;
use crate::url::PageClassification;
use crate::{ArchiveError, Result};
use std::path::{Path, PathBuf};
use url::Url;

/// Sanitized ancestor trail of a page, oldest ancestor first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Breadcrumb(Vec<String>);

impl Breadcrumb {
    /// Builds a breadcrumb from raw navigation item texts
    ///
    /// Items are trimmed; empty items and the site's home label are dropped,
    /// and the rest are sanitized for use as directory names. A segment is
    /// never `.` or `..`, so the trail cannot leave the archive root.
    pub fn from_trail<'a, I>(items: I, home_label: &str, fallback: &str) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let segments = items
            .into_iter()
            .map(str::trim)
            .filter(|text| !text.is_empty() && *text != home_label)
            .map(|text| sanitize_title(text, fallback))
            .collect();
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Resolved location of a page inside the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivePath {
    dir: PathBuf,
    owned: bool,
}

impl ArchivePath {
    /// Directory the page's snapshot and attachments are written into
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// True if the directory belongs to this page and is created for it
    pub fn is_owned(&self) -> bool {
        self.owned
    }

    /// Creates the page directory and any missing ancestors
    ///
    /// Does nothing for pages that write into a directory they do not own.
    pub async fn materialize(&self) -> Result<()> {
        if !self.owned {
            return Ok(());
        }
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| ArchiveError::DirectoryCreation {
                path: self.dir.clone(),
                source,
            })
    }
}

/// Maps page metadata to archive directories
#[derive(Debug, Clone)]
pub struct PathResolver {
    base_dir: PathBuf,
    latest_news_label: String,
    gallery_label: String,
    single_image_label: String,
    untitled_label: String,
}

impl PathResolver {
    pub fn new(config: &ArchiveConfig) -> Self {
        Self {
            base_dir: PathBuf::from(&config.base_dir),
            latest_news_label: config.latest_news_label.clone(),
            gallery_label: config.gallery_label.clone(),
            single_image_label: config.single_image_label.clone(),
            untitled_label: config.untitled_label.clone(),
        }
    }

    /// Root of the archive tree
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Label used for titles that sanitize to nothing
    pub fn untitled_label(&self) -> &str {
        &self.untitled_label
    }

    /// Derives the archive directory for a page
    ///
    /// News articles all live under the latest-news directory whatever their
    /// breadcrumb says. Other pages mirror the breadcrumb. Gallery indexes and
    /// single images get the gallery directories appended. Every page except
    /// a redirect module then gets a leaf named `<title>_<url path+query>`.
    ///
    /// This is pure; call [`ArchivePath::materialize`] to create the directory.
    pub fn resolve(
        &self,
        breadcrumb: &Breadcrumb,
        title: &str,
        classification: PageClassification,
        url: &Url,
    ) -> ArchivePath {
        let mut dir = self.base_dir.clone();

        if classification == PageClassification::NewsModule {
            dir.push(&self.latest_news_label);
        } else {
            dir.extend(breadcrumb.segments());
        }

        match classification {
            PageClassification::GalleryIndex => dir.push(&self.gallery_label),
            PageClassification::SingleImage => {
                dir.push(&self.gallery_label);
                dir.push(&self.single_image_label);
            }
            _ => {}
        }

        if !classification.has_own_directory() {
            return ArchivePath { dir, owned: false };
        }

        dir.push(self.leaf_name(title, url));
        ArchivePath { dir, owned: true }
    }

    /// `<sanitized title>_<sanitized path+query>`
    pub fn leaf_name(&self, title: &str, url: &Url) -> String {
        format!(
            "{}_{}",
            sanitize_title(title, &self.untitled_label),
            safe_url_component(url)
        )
    }
}

//! On-disk archive layout
//!
//! This module handles:
//! - Sanitizing titles, breadcrumb segments and attachment names
//! - Resolving the directory of each page from its breadcrumb and class
//! - Printing page snapshots
//! - Downloading document attachments

pub mod assets;
pub mod path;
mod sanitize;
pub mod snapshot;

pub use assets::{
    build_http_client, download_asset, AssetFetcher, AssetPolicy, DownloadOutcome, DownloadTask,
    HttpFetcher,
};
pub use path::{ArchivePath, Breadcrumb, PathResolver};
pub use sanitize::{replace_reserved, safe_file_name, safe_url_component, sanitize_title};
pub use snapshot::{SnapshotEngine, SNAPSHOT_EXTENSION};

//! Configuration module for Site-Archiver
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Only `[site] origin` is required; every other setting defaults to the
//! values the archive layout was designed around.
//!
//! # Example
//!
//! ```no_run
//! use site_archiver::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("archiver.toml")).unwrap();
//! println!("Archive root: {}", config.archive.base_dir);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ArchiveConfig, AssetConfig, BrowserConfig, Config, ScrollConfig, SelectorConfig, SiteConfig,
    SnapshotConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;

//! URL handling module for Site-Archiver
//!
//! This module provides origin validation, anchor resolution, attachment
//! detection, and the structural page classifier.

mod classify;
mod domain;
mod normalize;

// Re-export main types and functions
pub use classify::{
    classify_url, PageClassification, GALLERY_INDEX_PATTERN, LISTING_MODULE_PATTERN,
    NEWS_MODULE_PATTERN, PASS_THROUGH_MODULE_PATTERN, SINGLE_IMAGE_PATTERN,
};
pub use domain::Origin;
pub use normalize::{file_basename, has_document_extension, path_and_query, resolve_link};

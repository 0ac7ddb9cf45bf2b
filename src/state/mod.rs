//! State module for tracking crawl progress
//!
//! This module provides the per-page lifecycle used by the crawl orchestrator.

mod page_state;

pub use page_state::PageState;

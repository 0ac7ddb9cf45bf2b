//! Crawler module for page rendering and crawl orchestration
//!
//! This module contains the core crawling logic, including:
//! - The breadth-first frontier and visited set
//! - Breadcrumb, title and link extraction from rendered markup
//! - Overall crawl coordination

mod coordinator;
mod frontier;
mod parser;

pub use coordinator::{run_crawl, Coordinator};
pub use frontier::Frontier;
pub use parser::{parse_page, PageSelectors, ParsedPage};

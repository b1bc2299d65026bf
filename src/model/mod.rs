//! Data model for the scraper
//!
//! This module defines the raw API payload types (pre-normalization) and the
//! canonical snapshot row that gets persisted, plus the per-run context that
//! carries accumulated rows from the crawler to the persistence layer.

mod raw;
mod snapshot;

pub use raw::{CategoryEntry, CategoryPage, Link, ProjectPage, RawProject};
pub use snapshot::{CrawlMode, ProjectSnapshot, RunContext};

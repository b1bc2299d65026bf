//! Reporting module
//!
//! Read-only summaries over the persisted snapshot tables, built from the
//! same fixed queries the dashboard issues.

pub mod stats;

pub use stats::{load_statistics, print_statistics, ScrapeStatistics};

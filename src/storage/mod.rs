//! Storage module for persisting crawl data
//!
//! Append-only persistence of [`ProjectSnapshot`](crate::model::ProjectSnapshot)
//! rows into SQLite, plus the fixed read queries the dashboard issues against
//! the same store. The table is a time series: one row per (project id,
//! download time), never updated or deleted; deduplication to "latest per
//! project" happens at read time.

mod schema;
mod sqlite;
mod traits;

pub use schema::{create_table_sql, ensure_schema, insert_sql};
pub use sqlite::SqliteStore;
pub use traits::{PersistError, PersistResult, SnapshotStore};

use chrono::{DateTime, Utc};

/// Latest-per-download maximum donation for one open project
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDonationRow {
    pub id: i64,
    pub downloaded_at: DateTime<Utc>,
    pub donated_amount_in_cents: i64,
}

/// Summed donations for one (country, download time) pair over open projects
#[derive(Debug, Clone, PartialEq)]
pub struct CountryDonationRow {
    pub country: Option<String>,
    pub downloaded_at: DateTime<Utc>,
    pub donated_amount_in_cents: i64,
}

/// Count of projects first created in one calendar year
#[derive(Debug, Clone, PartialEq)]
pub struct YearCountRow {
    pub year: i64,
    pub projects: u64,
}

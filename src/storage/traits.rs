//! Storage traits and error types

use crate::model::ProjectSnapshot;
use crate::storage::{CountryDonationRow, ProjectDonationRow, YearCountRow};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during persistence operations
///
/// Neither variant is retried by this layer; retry policy, if any, belongs
/// to the caller.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Schema mismatch in table {table}: {detail}")]
    SchemaMismatch { table: String, detail: String },

    #[error("Database connection error: {0}")]
    Connection(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for persistence operations
pub type PersistResult<T> = Result<T, PersistError>;

/// Trait for snapshot storage backends
///
/// Table names come from validated configuration (identifier characters
/// only) and select between the full-rescan table and the incremental table.
pub trait SnapshotStore {
    // ===== Write Path =====

    /// Appends a batch of snapshot rows to the given table
    ///
    /// The target table is created on first use and verified against the
    /// expected column set afterwards. The whole batch is written in one
    /// transaction: a failed or cancelled run leaves no partial write.
    fn append_snapshots(&mut self, table: &str, rows: &[ProjectSnapshot]) -> PersistResult<()>;

    // ===== Read Path =====

    /// Reads every snapshot row of a table, in insertion order
    fn read_snapshots(&self, table: &str) -> PersistResult<Vec<ProjectSnapshot>>;

    /// Counts all snapshot rows in a table
    fn count_snapshots(&self, table: &str) -> PersistResult<u64>;

    /// Counts distinct project ids in a table
    fn count_distinct_projects(&self, table: &str) -> PersistResult<u64>;

    /// The most recent download timestamp in a table, if any rows exist
    fn latest_download_time(&self, table: &str) -> PersistResult<Option<DateTime<Utc>>>;

    // ===== Dashboard Queries =====

    /// Maximum donation amount per (open project, download time)
    ///
    /// Open means `closed_at IS NULL`.
    fn max_donations_per_open_project(
        &self,
        table: &str,
    ) -> PersistResult<Vec<ProjectDonationRow>>;

    /// Summed donations per (country, download time) over open projects
    fn donations_by_country(&self, table: &str) -> PersistResult<Vec<CountryDonationRow>>;

    /// Count of projects by creation year, deduplicated to one row per project
    fn projects_created_per_year(&self, table: &str) -> PersistResult<Vec<YearCountRow>>;

    /// The latest snapshot of every project (deduplicated by id)
    fn latest_snapshot_per_project(&self, table: &str) -> PersistResult<Vec<ProjectSnapshot>>;
}

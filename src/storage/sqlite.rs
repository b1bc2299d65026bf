//! SQLite storage implementation
//!
//! This module provides the SQLite-based implementation of the
//! [`SnapshotStore`] trait.

use crate::model::ProjectSnapshot;
use crate::storage::schema::{column_list, ensure_schema, insert_sql};
use crate::storage::traits::{PersistResult, SnapshotStore};
use crate::storage::{CountryDonationRow, ProjectDonationRow, YearCountRow};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the database file at the given path
    pub fn new(path: &Path) -> PersistResult<Self> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> PersistResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }
}

/// Maps one result row (in schema column order) back into a snapshot
fn row_to_snapshot(row: &Row<'_>) -> rusqlite::Result<ProjectSnapshot> {
    let tags_json: String = row.get(38)?;
    let tags: Vec<String> = serde_json::from_str(&tags_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(38, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(ProjectSnapshot {
        id: row.get(0)?,
        downloaded_at: row.get(1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
        content_updated_at: row.get(4)?,
        activated_at: row.get(5)?,
        completed_at: row.get(6)?,
        closed_at: row.get(7)?,
        donated_amount_in_cents: row.get(8)?,
        open_amount_in_cents: row.get(9)?,
        progress_percentage: row.get(10)?,
        donations_count: row.get(11)?,
        donor_count: row.get(12)?,
        positive_opinions_count: row.get(13)?,
        negative_opinions_count: row.get(14)?,
        comments_count: row.get(15)?,
        incomplete_need_count: row.get(16)?,
        completed_need_count: row.get(17)?,
        latitude: row.get(18)?,
        longitude: row.get(19)?,
        city: row.get(20)?,
        country: row.get(21)?,
        zip: row.get(22)?,
        title: row.get(23)?,
        description: row.get(24)?,
        summary: row.get(25)?,
        tax_deductible: row.get(26)?,
        donations_prohibited: row.get(27)?,
        carrier_id: row.get(28)?,
        carrier_name: row.get(29)?,
        carrier_city: row.get(30)?,
        contact_name: row.get(31)?,
        carrier: row.get(32)?,
        contact: row.get(33)?,
        profile_picture: row.get(34)?,
        active_matching_fund: row.get(35)?,
        closed_notice: row.get(36)?,
        links: row.get(37)?,
        tags,
    })
}

impl SnapshotStore for SqliteStore {
    fn append_snapshots(&mut self, table: &str, rows: &[ProjectSnapshot]) -> PersistResult<()> {
        ensure_schema(&self.conn, table)?;

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&insert_sql(table))?;
            for row in rows {
                let tags_json = serde_json::to_string(&row.tags)?;
                stmt.execute(params![
                    row.id,
                    row.downloaded_at,
                    row.created_at,
                    row.updated_at,
                    row.content_updated_at,
                    row.activated_at,
                    row.completed_at,
                    row.closed_at,
                    row.donated_amount_in_cents,
                    row.open_amount_in_cents,
                    row.progress_percentage,
                    row.donations_count,
                    row.donor_count,
                    row.positive_opinions_count,
                    row.negative_opinions_count,
                    row.comments_count,
                    row.incomplete_need_count,
                    row.completed_need_count,
                    row.latitude,
                    row.longitude,
                    row.city,
                    row.country,
                    row.zip,
                    row.title,
                    row.description,
                    row.summary,
                    row.tax_deductible,
                    row.donations_prohibited,
                    row.carrier_id,
                    row.carrier_name,
                    row.carrier_city,
                    row.contact_name,
                    row.carrier,
                    row.contact,
                    row.profile_picture,
                    row.active_matching_fund,
                    row.closed_notice,
                    row.links,
                    tags_json,
                ])?;
            }
        }
        tx.commit()?;

        tracing::debug!("Appended {} rows to {}", rows.len(), table);
        Ok(())
    }

    fn read_snapshots(&self, table: &str) -> PersistResult<Vec<ProjectSnapshot>> {
        let sql = format!("SELECT {} FROM {table} ORDER BY rowid", column_list());
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], row_to_snapshot)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn count_snapshots(&self, table: &str) -> PersistResult<u64> {
        let count: i64 =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get(0)
                })?;
        Ok(count as u64)
    }

    fn count_distinct_projects(&self, table: &str) -> PersistResult<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(DISTINCT id) FROM {table}"),
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn latest_download_time(&self, table: &str) -> PersistResult<Option<DateTime<Utc>>> {
        let latest: Option<DateTime<Utc>> = self.conn.query_row(
            &format!("SELECT MAX(downloaded_at) FROM {table}"),
            [],
            |row| row.get(0),
        )?;
        Ok(latest)
    }

    fn max_donations_per_open_project(
        &self,
        table: &str,
    ) -> PersistResult<Vec<ProjectDonationRow>> {
        let sql = format!(
            "SELECT id, downloaded_at, MAX(donated_amount_in_cents)
             FROM {table}
             WHERE closed_at IS NULL
             GROUP BY id, downloaded_at
             ORDER BY id, downloaded_at"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ProjectDonationRow {
                    id: row.get(0)?,
                    downloaded_at: row.get(1)?,
                    donated_amount_in_cents: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn donations_by_country(&self, table: &str) -> PersistResult<Vec<CountryDonationRow>> {
        let sql = format!(
            "SELECT country, downloaded_at, SUM(donated_amount_in_cents)
             FROM {table}
             WHERE closed_at IS NULL
             GROUP BY country, downloaded_at
             ORDER BY country, downloaded_at"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(CountryDonationRow {
                    country: row.get(0)?,
                    downloaded_at: row.get(1)?,
                    donated_amount_in_cents: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn projects_created_per_year(&self, table: &str) -> PersistResult<Vec<YearCountRow>> {
        // Dedup to the latest snapshot per project, then bucket by year
        let sql = format!(
            "SELECT CAST(strftime('%Y', created_at) AS INTEGER) AS year, COUNT(id)
             FROM (
                 SELECT id, created_at, MAX(downloaded_at) AS downloaded_at
                 FROM {table}
                 GROUP BY id
             )
             WHERE created_at IS NOT NULL
             GROUP BY year
             ORDER BY year"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(YearCountRow {
                    year: row.get(0)?,
                    projects: row.get::<_, i64>(1)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn latest_snapshot_per_project(&self, table: &str) -> PersistResult<Vec<ProjectSnapshot>> {
        let sql = format!(
            "SELECT {} FROM {table}
             WHERE (id, downloaded_at) IN (
                 SELECT id, MAX(downloaded_at) FROM {table} GROUP BY id
             )
             ORDER BY id",
            column_list()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], row_to_snapshot)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

//! Statistics generation from the snapshot database
//!
//! This module provides functionality for extracting and displaying summary
//! statistics from the storage layer.

use crate::storage::{CountryDonationRow, SnapshotStore, YearCountRow};
use crate::ScrapeError;
use chrono::{DateTime, Utc};

/// Scrape statistics summary for one table
#[derive(Debug, Clone)]
pub struct ScrapeStatistics {
    /// The table these statistics describe
    pub table: String,

    /// Total number of snapshot rows
    pub total_snapshots: u64,

    /// Number of distinct projects observed
    pub distinct_projects: u64,

    /// Timestamp of the most recent crawl run, if any
    pub latest_download: Option<DateTime<Utc>>,

    /// Summed donations per (country, download time) over open projects
    pub donations_by_country: Vec<CountryDonationRow>,

    /// Projects per creation year, deduplicated by project
    pub created_per_year: Vec<YearCountRow>,
}

/// Loads statistics for one snapshot table
pub fn load_statistics(
    store: &dyn SnapshotStore,
    table: &str,
) -> Result<ScrapeStatistics, ScrapeError> {
    let total_snapshots = store.count_snapshots(table)?;
    let distinct_projects = store.count_distinct_projects(table)?;
    let latest_download = store.latest_download_time(table)?;
    let donations_by_country = store.donations_by_country(table)?;
    let created_per_year = store.projects_created_per_year(table)?;

    Ok(ScrapeStatistics {
        table: table.to_string(),
        total_snapshots,
        distinct_projects,
        latest_download,
        donations_by_country,
        created_per_year,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &ScrapeStatistics) {
    println!("=== Statistics for {} ===\n", stats.table);

    println!("Overview:");
    println!("  Snapshot rows: {}", stats.total_snapshots);
    println!("  Distinct projects: {}", stats.distinct_projects);
    match &stats.latest_download {
        Some(latest) => println!("  Latest download: {}", latest.to_rfc3339()),
        None => println!("  Latest download: (none)"),
    }
    println!();

    if !stats.donations_by_country.is_empty() {
        println!("Donations by country (open projects):");

        // Largest sums first, trimmed for readability
        let mut rows: Vec<_> = stats.donations_by_country.iter().collect();
        rows.sort_by(|a, b| b.donated_amount_in_cents.cmp(&a.donated_amount_in_cents));

        for row in rows.iter().take(15) {
            let country = row.country.as_deref().unwrap_or("(unknown)");
            println!(
                "  {}: {:.2} EUR ({})",
                country,
                row.donated_amount_in_cents as f64 / 100.0,
                row.downloaded_at.format("%Y-%m-%d")
            );
        }
        println!();
    }

    if !stats.created_per_year.is_empty() {
        println!("Projects by creation year:");
        for row in &stats.created_per_year {
            println!("  {}: {}", row.year, row.projects);
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics_creation() {
        let stats = ScrapeStatistics {
            table: "projects_vf".to_string(),
            total_snapshots: 150,
            distinct_projects: 75,
            latest_download: None,
            donations_by_country: vec![],
            created_per_year: vec![YearCountRow {
                year: 2020,
                projects: 40,
            }],
        };

        assert_eq!(stats.total_snapshots, 150);
        assert_eq!(stats.distinct_projects, 75);
        assert_eq!(stats.created_per_year.len(), 1);
    }
}

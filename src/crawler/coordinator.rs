//! Pagination crawler - main crawl orchestration logic
//!
//! Drives page-by-page retrieval of the projects listing, resolves category
//! tags and normalizes every record on the page, and decides when to stop:
//! exhaustive runs walk every remote page, incremental runs stop once a page
//! ends on a record older than the recency window. Pages are strictly
//! sequential because each stopping decision depends on the page before it.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch, RetryPolicy};
use crate::crawler::normalize::{decode_record, normalize, NormalizationError};
use crate::crawler::tags::{resolve_tags, TagResolveError};
use crate::model::{CrawlMode, ProjectPage, ProjectSnapshot, RunContext};
use crate::storage::{SnapshotStore, SqliteStore};
use crate::ScrapeError;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

/// Failures scoped to a single record; logged and absorbed by the crawl loop
#[derive(Debug, Error)]
enum RecordError {
    #[error("tag resolution failed: {0}")]
    Tags(#[from] TagResolveError),

    #[error("normalization failed: {0}")]
    Normalize(#[from] NormalizationError),
}

/// Summary of one completed scrape-and-persist run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub mode: CrawlMode,
    pub table: String,
    pub rows_persisted: usize,
    pub total_projects: u64,
    pub elapsed: std::time::Duration,
}

/// The pagination crawler
pub struct Crawler {
    config: Config,
    client: Client,
    retry: RetryPolicy,
}

impl Crawler {
    pub fn new(config: Config) -> Result<Self, ScrapeError> {
        let client = build_http_client(&config.api)?;
        let retry = RetryPolicy::from_config(&config.api);
        Ok(Self {
            config,
            client,
            retry,
        })
    }

    /// Builds the listing URL for one page
    fn page_url(&self, mode: CrawlMode, page: u32) -> String {
        format!(
            "{}/projects.json?facets={}&order=updated_at:DESC&per_page={}&page={}",
            self.config.api.base_url.trim_end_matches('/'),
            mode.facet(),
            self.config.api.per_page,
            page
        )
    }

    /// Runs the crawl and returns the accumulated run context
    ///
    /// Per-record failures (undecodable record, unresolvable tags, failed
    /// normalization) are logged and skipped. A failed page fetch, a non-200
    /// page status, or an undecodable page body aborts the whole run.
    pub async fn run(&self, mode: CrawlMode) -> Result<RunContext, ScrapeError> {
        let mut ctx = RunContext::new(mode);
        let cutoff =
            ctx.download_time - chrono::Duration::days(self.config.crawl.recency_window_days);

        let mut page: u32 = 1;
        let mut max_pages: u32 = 1;
        // The recency reference: updated_at of the last successfully
        // processed record, in page order, carried across pages.
        let mut last_update: Option<DateTime<Utc>> = None;

        while page <= max_pages {
            let url = self.page_url(mode, page);
            tracing::debug!("Fetching page {}: {}", page, url);

            let response = fetch(&self.client, &url, &self.retry).await?;
            if response.status != 200 {
                return Err(ScrapeError::UnexpectedStatus {
                    url,
                    status: response.status,
                });
            }

            let parsed: ProjectPage = serde_json::from_str(&response.body)
                .map_err(|source| ScrapeError::PageDecode { url, source })?;
            ctx.total_projects = parsed.total_entries;

            for value in parsed.data {
                match self.process_record(value, ctx.download_time).await {
                    Ok(snapshot) => {
                        if let Some(updated) = snapshot.updated_at {
                            last_update = Some(updated);
                        }
                        ctx.rows.push(snapshot);
                    }
                    Err(e) => {
                        tracing::warn!("Dropping record on page {}: {}", page, e);
                    }
                }
            }

            max_pages = next_max_pages(mode, last_update, cutoff, page, parsed.total_pages);
            if let Some(ceiling) = self.config.crawl.max_pages {
                max_pages = max_pages.min(ceiling);
            }
            if mode == CrawlMode::Incremental && max_pages == page {
                tracing::info!("Stopping processing, update complete");
            }

            tracing::info!(
                "Progress {}|{} ({} rows buffered)",
                page,
                max_pages,
                ctx.rows.len()
            );
            page += 1;
        }

        Ok(ctx)
    }

    /// Decodes, tag-resolves, and normalizes one record
    async fn process_record(
        &self,
        value: Value,
        downloaded_at: DateTime<Utc>,
    ) -> Result<ProjectSnapshot, RecordError> {
        let raw = decode_record(&value)?;
        let tags = resolve_tags(&self.client, &raw.links, &self.retry).await?;
        Ok(normalize(raw, tags, downloaded_at)?)
    }
}

/// The stopping rule, applied after each processed page
///
/// Exhaustive mode always extends to the server-reported page count.
/// Incremental mode stops after the current page once the recency reference
/// falls behind the cutoff; an absent reference never triggers the stop.
fn next_max_pages(
    mode: CrawlMode,
    last_update: Option<DateTime<Utc>>,
    cutoff: DateTime<Utc>,
    current_page: u32,
    total_pages: u32,
) -> u32 {
    match mode {
        CrawlMode::Exhaustive => total_pages,
        CrawlMode::Incremental => match last_update {
            Some(updated) if updated < cutoff => current_page,
            _ => total_pages,
        },
    }
}

/// Runs a full scrape for the given mode and persists the result
///
/// This is the top-level pipeline: crawl every eligible page into a
/// [`RunContext`], then append its rows to the mode's target table in one
/// batch. Nothing is written when the crawl itself fails.
pub async fn scrape_and_store(config: &Config, mode: CrawlMode) -> crate::Result<RunSummary> {
    let started = std::time::Instant::now();
    tracing::info!("Starting {:?} run", mode);

    let crawler = Crawler::new(config.clone())?;
    let ctx = crawler.run(mode).await?;

    let table = config.table_for(mode).to_string();
    let mut store = SqliteStore::new(Path::new(&config.output.database_path))?;
    store.append_snapshots(&table, &ctx.rows)?;

    let summary = RunSummary {
        mode,
        table,
        rows_persisted: ctx.rows.len(),
        total_projects: ctx.total_projects,
        elapsed: started.elapsed(),
    };

    tracing::info!(
        "Saved {} rows to {} ({} projects reported remotely) in {:?}",
        summary.rows_persisted,
        summary.table,
        summary.total_projects,
        summary.elapsed
    );

    Ok(summary)
}

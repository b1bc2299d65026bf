//! Canonical snapshot row and per-run context

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Crawl mode selected per run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlMode {
    /// Walk every remote page regardless of recency (full backfill)
    Exhaustive,
    /// Stop once a page ends on a record older than the recency window
    Incremental,
}

impl CrawlMode {
    /// The `facets` query value selecting which projects the listing returns
    ///
    /// Full rescans walk the closed projects, incremental updates poll the
    /// still-open ones.
    pub fn facet(&self) -> &'static str {
        match self {
            Self::Exhaustive => "closed:true",
            Self::Incremental => "closed:false",
        }
    }
}

/// One normalized project observation: a row per (project id, download time)
///
/// The pair is intentionally not unique across runs; the table is an
/// append-only time series and deduplication to "latest per id" happens at
/// read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    // Identity
    pub id: i64,
    pub downloaded_at: DateTime<Utc>,

    // Temporal (absence encodes "not yet occurred")
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub content_updated_at: Option<DateTime<Utc>>,
    pub activated_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,

    // Financial
    pub donated_amount_in_cents: i64,
    pub open_amount_in_cents: i64,
    pub progress_percentage: i64,

    // Counts
    pub donations_count: i64,
    pub donor_count: i64,
    pub positive_opinions_count: i64,
    pub negative_opinions_count: i64,
    pub comments_count: i64,
    pub incomplete_need_count: i64,
    pub completed_need_count: i64,

    // Geo / descriptive
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub zip: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,

    // Flags
    pub tax_deductible: Option<bool>,
    pub donations_prohibited: Option<bool>,

    // Flattened convenience fields (null whenever the parent object is null)
    pub carrier_id: Option<i64>,
    pub carrier_name: Option<String>,
    pub carrier_city: Option<String>,
    pub contact_name: Option<String>,

    // Opaque structured passthroughs
    pub carrier: Option<Value>,
    pub contact: Option<Value>,
    pub profile_picture: Option<Value>,
    pub active_matching_fund: Option<Value>,
    pub closed_notice: Option<Value>,
    pub links: Option<Value>,

    /// Ordered category names, `[]`, or the sentinel `["error"]`
    pub tags: Vec<String>,
}

/// Ephemeral state for one crawl invocation
///
/// Created at run start, mutated only by the crawler, consumed exactly once
/// by the persistence layer. `download_time` is stamped on every row of the
/// run.
#[derive(Debug)]
pub struct RunContext {
    pub download_time: DateTime<Utc>,
    pub total_projects: u64,
    pub rows: Vec<ProjectSnapshot>,
    pub mode: CrawlMode,
}

impl RunContext {
    pub fn new(mode: CrawlMode) -> Self {
        Self {
            download_time: Utc::now(),
            total_projects: 0,
            rows: Vec::new(),
            mode,
        }
    }
}

//! Raw API payload types
//!
//! These mirror the shapes returned by the remote projects API. Page
//! envelopes keep their records as untyped JSON values so a single malformed
//! record can be decoded (and dropped) individually instead of failing the
//! whole page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One relation-tagged hyperlink from a record's `links` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,

    /// Additional link attributes, kept so the persisted `links` blob
    /// round-trips the remote payload
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Envelope of one page of the projects listing
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectPage {
    pub total_entries: u64,
    pub total_pages: u32,
    #[serde(default)]
    pub data: Vec<Value>,
}

/// Envelope of a categories sub-resource
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryPage {
    pub total_entries: u64,
    #[serde(default)]
    pub data: Vec<CategoryEntry>,
}

/// One category entry; only the name is kept
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryEntry {
    pub name: String,
}

/// One raw project record as decoded from a page's `data` array
///
/// Fields with a firm schema are typed; nested structures the pipeline only
/// passes through (`carrier`, `contact`, `profile_picture`,
/// `active_matching_fund`, `closed_notice`) stay opaque JSON values. Missing
/// optional fields decode to `None`; missing counts decode to zero.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProject {
    pub id: i64,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub content_updated_at: Option<DateTime<Utc>>,
    pub activated_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub donated_amount_in_cents: i64,
    #[serde(default)]
    pub open_amount_in_cents: i64,
    #[serde(default)]
    pub progress_percentage: i64,

    #[serde(default)]
    pub donations_count: i64,
    #[serde(default)]
    pub donor_count: i64,
    #[serde(default)]
    pub positive_opinions_count: i64,
    #[serde(default)]
    pub negative_opinions_count: i64,
    #[serde(default)]
    pub comments_count: i64,
    #[serde(default)]
    pub incomplete_need_count: i64,
    #[serde(default)]
    pub completed_need_count: i64,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub zip: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,

    pub tax_deductible: Option<bool>,
    pub donations_prohibited: Option<bool>,

    pub carrier: Option<Value>,
    pub contact: Option<Value>,
    pub profile_picture: Option<Value>,
    pub active_matching_fund: Option<Value>,
    pub closed_notice: Option<Value>,

    #[serde(default)]
    pub links: Vec<Link>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_envelope_decodes_with_untyped_records() {
        let body = r#"{
            "total_entries": 120,
            "total_pages": 3,
            "data": [{"id": 1}, {"unexpected": true}]
        }"#;

        let page: ProjectPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.total_entries, 120);
        assert_eq!(page.total_pages, 3);
        // Both records survive envelope decoding, even the malformed one
        assert_eq!(page.data.len(), 2);
    }

    #[test]
    fn test_raw_project_minimal_record() {
        let raw: RawProject = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        assert_eq!(raw.id, 42);
        assert_eq!(raw.donations_count, 0);
        assert!(raw.updated_at.is_none());
        assert!(raw.carrier.is_none());
        assert!(raw.links.is_empty());
    }

    #[test]
    fn test_raw_project_parses_offset_timestamps() {
        let raw: RawProject =
            serde_json::from_str(r#"{"id": 1, "updated_at": "2021-03-01T10:30:00+01:00"}"#)
                .unwrap();
        let updated = raw.updated_at.unwrap();
        assert_eq!(updated.to_rfc3339(), "2021-03-01T09:30:00+00:00");
    }

    #[test]
    fn test_category_page_decodes() {
        let body = r#"{"total_entries": 2, "data": [{"name": "education"}, {"name": "health"}]}"#;
        let page: CategoryPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.total_entries, 2);
        assert_eq!(page.data[0].name, "education");
        assert_eq!(page.data[1].name, "health");
    }
}

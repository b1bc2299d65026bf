//! Category tag resolution
//!
//! Each project record carries a relation-tagged link set; the `categories`
//! relation points at a sub-resource listing the project's category names.
//! An HTTP failure on that sub-fetch degrades to the [`TAG_FETCH_FAILED`]
//! sentinel instead of failing the record: the sentinel is ordinary data and
//! is persisted like genuine tags.

use crate::crawler::fetcher::{fetch, FetchError, RetryPolicy};
use crate::model::{CategoryPage, Link};
use reqwest::Client;
use thiserror::Error;

/// Sentinel tag stored when the categories sub-fetch returned an error status
pub const TAG_FETCH_FAILED: &str = "error";

/// Errors that make a record's tags unresolvable
///
/// These are record-level failures: the crawler drops the record and keeps
/// going.
#[derive(Debug, Error)]
pub enum TagResolveError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Failed to decode categories body from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },
}

/// Finds the `categories` link in a record's link set
///
/// When several links carry the `categories` relation, the last one wins.
pub fn find_categories_link(links: &[Link]) -> Option<&Link> {
    links.iter().filter(|l| l.rel == "categories").last()
}

/// Resolves the category tag list for one record
///
/// * Without a `categories` link the result is an empty list; an absent link
///   means the project has no categories.
/// * On HTTP 200 the result is the entry names in remote order, or an empty
///   list when `total_entries` is 0.
/// * Any other status yields the single-element sentinel list `["error"]`.
pub async fn resolve_tags(
    client: &Client,
    links: &[Link],
    retry: &RetryPolicy,
) -> Result<Vec<String>, TagResolveError> {
    let link = match find_categories_link(links) {
        Some(link) => link,
        None => return Ok(Vec::new()),
    };

    let response = fetch(client, &link.href, retry).await?;

    if response.status != 200 {
        tracing::warn!(
            "Categories fetch for {} returned HTTP {}, storing sentinel tag",
            link.href,
            response.status
        );
        return Ok(vec![TAG_FETCH_FAILED.to_string()]);
    }

    let page: CategoryPage =
        serde_json::from_str(&response.body).map_err(|source| TagResolveError::Decode {
            url: link.href.clone(),
            source,
        })?;

    if page.total_entries == 0 {
        return Ok(Vec::new());
    }

    Ok(page.data.into_iter().map(|entry| entry.name).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(rel: &str, href: &str) -> Link {
        serde_json::from_value(serde_json::json!({ "rel": rel, "href": href })).unwrap()
    }

    #[test]
    fn test_no_categories_link() {
        let links = vec![link("self", "https://x/p/1"), link("donations", "https://x/d")];
        assert!(find_categories_link(&links).is_none());
    }

    #[test]
    fn test_last_categories_link_wins() {
        let links = vec![
            link("categories", "https://x/cats/old"),
            link("self", "https://x/p/1"),
            link("categories", "https://x/cats/new"),
        ];
        let found = find_categories_link(&links).unwrap();
        assert_eq!(found.href, "https://x/cats/new");
    }

    #[test]
    fn test_empty_link_set() {
        assert!(find_categories_link(&[]).is_none());
    }
}

//! Crawler module
//!
//! The crawl pipeline, leaf-first: the HTTP fetcher with its retry budget,
//! the category tag resolver, the record normalizer, and the pagination
//! coordinator that drives them page by page.

mod coordinator;
mod fetcher;
mod normalize;
mod tags;

pub use coordinator::{scrape_and_store, Crawler, RunSummary};
pub use fetcher::{build_http_client, fetch, FetchError, RawResponse, RetryPolicy};
pub use normalize::{decode_record, normalize, NormalizationError};
pub use tags::{find_categories_link, resolve_tags, TagResolveError, TAG_FETCH_FAILED};

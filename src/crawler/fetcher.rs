//! HTTP fetcher implementation
//!
//! All network traffic goes through [`fetch`]: a GET with a bounded retry
//! budget for network-level failures. A received HTTP response is returned
//! to the caller as-is, whatever its status code; only timeouts and
//! connection failures are retried.

use crate::config::ApiConfig;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// A received HTTP response, regardless of status code
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Errors produced by the fetcher
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Connection to {url} failed: {message}")]
    ConnectionFailed { url: String, message: String },

    #[error("No response from {url} after {attempts} attempts")]
    NetworkExhausted { url: String, attempts: u32 },
}

/// Retry policy for network-level failures
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts before giving up
    pub attempts: u32,
    /// Sleep between attempts
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(api: &ApiConfig) -> Self {
        Self {
            attempts: api.retry_attempts,
            delay: api.retry_delay(),
        }
    }
}

/// Builds the shared HTTP client with the configured timeout
pub fn build_http_client(api: &ApiConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(concat!(
            "betterplace-scraper/",
            env!("CARGO_PKG_VERSION")
        ))
        .timeout(api.timeout())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL, retrying network-level failures
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | Any HTTP response received | Return it immediately, no retry |
/// | Timeout | Retry after `retry.delay`, up to `retry.attempts` tries |
/// | Connection failure | Retry after `retry.delay`, up to `retry.attempts` tries |
/// | Body read failure | Retry after `retry.delay`, up to `retry.attempts` tries |
///
/// `NetworkExhausted` is returned only when every attempt failed to produce
/// a response. Each failed attempt is logged with its attempt number.
pub async fn fetch(
    client: &Client,
    url: &str,
    retry: &RetryPolicy,
) -> Result<RawResponse, FetchError> {
    let mut last_failure = None;

    for attempt in 1..=retry.attempts {
        match client.get(url).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                match response.text().await {
                    Ok(body) => return Ok(RawResponse { status, body }),
                    Err(e) => {
                        // The connection dropped mid-body; treat like any
                        // other network failure.
                        let failure = classify_error(url, &e);
                        tracing::warn!(
                            "Attempt {}/{} reading body from {} failed: {}",
                            attempt,
                            retry.attempts,
                            url,
                            failure
                        );
                        last_failure = Some(failure);
                    }
                }
            }
            Err(e) => {
                let failure = classify_error(url, &e);
                tracing::warn!(
                    "Attempt {}/{} for {} failed: {}",
                    attempt,
                    retry.attempts,
                    url,
                    failure
                );
                last_failure = Some(failure);
            }
        }

        if attempt < retry.attempts {
            tokio::time::sleep(retry.delay).await;
        }
    }

    if let Some(failure) = last_failure {
        tracing::error!("Giving up on {} (last failure: {})", url, failure);
    }

    Err(FetchError::NetworkExhausted {
        url: url.to_string(),
        attempts: retry.attempts,
    })
}

/// Classifies a reqwest error into the fetch error taxonomy
fn classify_error(url: &str, err: &reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::ConnectionFailed {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_api_config() -> ApiConfig {
        ApiConfig {
            base_url: "https://api.example.org".to_string(),
            per_page: 50,
            timeout_secs: 5,
            retry_attempts: 3,
            retry_delay_secs: 0,
        }
    }

    fn no_delay_retry() -> RetryPolicy {
        RetryPolicy {
            attempts: 3,
            delay: Duration::from_secs(0),
        }
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&test_api_config());
        assert!(client.is_ok());
    }

    #[test]
    fn test_retry_policy_from_config() {
        let retry = RetryPolicy::from_config(&test_api_config());
        assert_eq!(retry.attempts, 3);
        assert_eq!(retry.delay, Duration::from_secs(0));
    }

    #[tokio::test]
    async fn test_fetch_returns_body_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&server)
            .await;

        let client = build_http_client(&test_api_config()).unwrap();
        let response = fetch(&client, &format!("{}/ok", server.uri()), &no_delay_retry())
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, "hello");
    }

    #[tokio::test]
    async fn test_fetch_does_not_retry_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1) // a received response is never retried
            .mount(&server)
            .await;

        let client = build_http_client(&test_api_config()).unwrap();
        let response = fetch(
            &client,
            &format!("{}/broken", server.uri()),
            &no_delay_retry(),
        )
        .await
        .unwrap();
        assert_eq!(response.status, 500);
        assert_eq!(response.body, "boom");
    }

    #[tokio::test]
    async fn test_fetch_exhausts_attempts_without_response() {
        // Port 1 refuses connections
        let client = build_http_client(&test_api_config()).unwrap();
        let result = fetch(&client, "http://127.0.0.1:1/unreachable", &no_delay_retry()).await;

        match result {
            Err(FetchError::NetworkExhausted { attempts, .. }) => assert_eq!(attempts, 3),
            other => panic!("expected NetworkExhausted, got {:?}", other),
        }
    }
}

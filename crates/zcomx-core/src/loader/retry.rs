//! Bounded retry for page image fetches
//!
//! A failing image is re-requested with a cache-busting query after a fixed
//! delay. Once the attempts run out the page is given up on; the failure is
//! logged and reported, never propagated as an error.

use std::time::Duration;

use bytes::Bytes;
use url::Url;

use super::fetch::ImageFetcher;
use crate::config::LoaderConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included
    pub max_attempts: u32,
    /// Fixed pause between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&LoaderConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &LoaderConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

/// All attempts failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exhausted {
    pub attempts: u32,
    pub last_error: String,
}

/// URL for attempt number `attempt` (1-based); retries get a unique query so
/// caches between here and the server cannot replay the failure
pub fn cache_bust(url: &Url, attempt: u32) -> Url {
    if attempt <= 1 {
        return url.clone();
    }
    let mut busted = url.clone();
    busted
        .query_pairs_mut()
        .append_pair("retry", &attempt.to_string())
        .append_pair("t", &chrono::Utc::now().timestamp_millis().to_string());
    busted
}

/// Fetch `url`, retrying per `policy`
pub async fn fetch_with_retry(
    fetcher: &dyn ImageFetcher,
    url: &Url,
    policy: &RetryPolicy,
) -> std::result::Result<Bytes, Exhausted> {
    let mut attempt = 1;
    loop {
        let request = cache_bust(url, attempt);
        match fetcher.fetch(&request).await {
            Ok(bytes) => return Ok(bytes),
            Err(e) if attempt < policy.max_attempts => {
                tracing::debug!(
                    error = %e,
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = policy.delay.as_millis(),
                    "Image fetch failed, retrying"
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(e) => {
                return Err(Exhausted {
                    attempts: attempt,
                    last_error: e.to_string(),
                })
            }
        }
    }
}

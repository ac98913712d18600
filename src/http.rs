//! Shared retry/backoff policy for hosted-API calls.
//!
//! Both the vendor docs API and the vector-store API get the same
//! treatment: HTTP 429 and 5xx retry with exponential backoff
//! (1s, 2s, 4s, ... capped at 32s), other 4xx fail immediately, network
//! errors retry.

use anyhow::{bail, Result};
use std::time::Duration;

/// Send a request built by `build`, retrying transient failures.
///
/// The builder closure is invoked once per attempt so that non-cloneable
/// request bodies (multipart forms) can be reconstructed.
pub async fn send_with_retry<F>(max_retries: u32, build: F) -> Result<reqwest::Response>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut last_err = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            let delay = Duration::from_secs(1 << (attempt - 1).min(5));
            tokio::time::sleep(delay).await;
        }

        match build().send().await {
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    return Ok(response);
                }

                if status.as_u16() == 429 || status.is_server_error() {
                    let body = response.text().await.unwrap_or_default();
                    last_err = Some(anyhow::anyhow!("API error {}: {}", status, body));
                    continue;
                }

                // Client error (not 429) — don't retry
                let body = response.text().await.unwrap_or_default();
                bail!("API error {}: {}", status, body);
            }
            Err(e) => {
                last_err = Some(e.into());
                continue;
            }
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow::anyhow!("Request failed after retries")))
}

//! Shared HTTP plumbing: a thin `reqwest::Client` wrapper with retry
//! classification (spec §4.6, §5 "every outbound I/O has an explicit,
//! finite timeout"). Used by both the Archive (C5) and REST (C6) clients.
//!
//! Internals are split into `retry` (backoff policy), the same way the
//! teacher splits `core::client` into `auth` and `constants`.

pub mod retry;

pub use retry::{Backoff, RetryConfig};

use std::time::Duration;

use reqwest::{RequestBuilder, Response};
use tracing::{debug, warn};

use crate::core::error::EngineError;

/// A request builder plus an explicit timeout and retry key, retried per
/// `RetryConfig` classification.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    default_timeout: Duration,
}

impl HttpClient {
    /// Construct a client. `timeout` MUST be finite: spec §4.6 "a missing
    /// timeout is a programmer error and must be detected at construction."
    ///
    /// # Panics
    /// Panics if `timeout` is zero.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        assert!(!timeout.is_zero(), "HttpClient requires a non-zero timeout");
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client builds with default TLS backend");
        Self {
            http,
            default_timeout: timeout,
        }
    }

    #[must_use]
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    #[must_use]
    pub fn get(&self, url: url::Url) -> RequestBuilder {
        self.http.get(url)
    }

    /// Send `req`, retrying transient failures per `retry`. `retry_key` is
    /// used only for the error message attached on final failure (spec §7:
    /// "User-visible failure always carries the kind and the offending
    /// key").
    ///
    /// Does not retry on 429 (handled by the caller's rate limiter) or any
    /// status outside `retry.retry_on_status`.
    pub async fn send_with_retry(
        &self,
        req: RequestBuilder,
        retry: &RetryConfig,
        retry_key: &str,
    ) -> Result<Response, EngineError> {
        let mut attempt: u32 = 0;
        loop {
            let Some(cloned) = req.try_clone() else {
                // Bodies that can't be cloned (streaming uploads) never
                // occur for the GET-only requests this engine issues; fall
                // back to a single attempt rather than panic.
                return req.send().await.map_err(EngineError::Http);
            };

            match cloned.send().await {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if resp.status().is_success() || !retry.should_retry_status(status) {
                        return Ok(resp);
                    }
                    if attempt >= retry.max_retries {
                        return Ok(resp);
                    }
                    warn!(retry_key, status, attempt, "retrying transient HTTP status");
                }
                Err(err) => {
                    let transient = (retry.retry_on_timeout && err.is_timeout())
                        || (retry.retry_on_connect && err.is_connect());
                    if !transient || attempt >= retry.max_retries {
                        return Err(EngineError::Transport {
                            key: retry_key.to_string(),
                            attempts: attempt + 1,
                            source: err,
                        });
                    }
                    debug!(retry_key, attempt, "retrying transport error");
                }
            }

            let delay = retry.backoff.delay_for(attempt);
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

use std::time::Duration;

/// Backoff schedule between retry attempts (copied from the teacher's
/// `core::client::retry::Backoff` shape verbatim).
#[derive(Clone, Debug)]
pub enum Backoff {
    Fixed(Duration),
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
        jitter: bool,
    },
}

impl Backoff {
    /// Compute the sleep duration for `attempt` (0-indexed).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self {
            Self::Fixed(d) => *d,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let scaled = base.as_secs_f64() * factor.powi(attempt as i32);
                let capped = scaled.min(max.as_secs_f64());
                let final_secs = if *jitter {
                    let j = rand::random::<f64>() * 0.5 + 0.75; // +/- 25% jitter
                    capped * j
                } else {
                    capped
                };
                Duration::from_secs_f64(final_secs.max(0.0))
            }
        }
    }
}

/// Retry policy for transient HTTP failures (spec §4.6, §7). Same shape as
/// the teacher's `RetryConfig`; `retry_on_status` additionally distinguishes
/// `429` (rate-limited, handled by the rate limiter, not blind retry) from
/// the truly transient 5xx/408 set, per spec §4.6's status classification.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    pub enabled: bool,
    pub max_retries: u32,
    pub backoff: Backoff,
    pub retry_on_status: Vec<u16>,
    pub retry_on_timeout: bool,
    pub retry_on_connect: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 4,
            backoff: Backoff::Exponential {
                base: Duration::from_millis(200),
                factor: 2.0,
                max: Duration::from_secs(3),
                jitter: true,
            },
            retry_on_status: vec![408, 500, 502, 503, 504],
            retry_on_timeout: true,
            retry_on_connect: true,
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn should_retry_status(&self, status: u16) -> bool {
        self.enabled && self.retry_on_status.contains(&status)
    }
}

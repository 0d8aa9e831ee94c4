use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::core::client::HttpClient;
use crate::core::config::{EngineConfig, LogLevel};

/// Process-wide state threaded explicitly through the façade and
/// components: HTTP client, cache root, rate budget, log level (spec §9
/// "Ambient/global state" design note — modeled as a value, not a hidden
/// singleton). Cheap to clone (`Arc` internally), mirroring the teacher's
/// `YfClient: Clone`.
#[derive(Clone)]
pub struct EngineContext {
    inner: Arc<Inner>,
}

struct Inner {
    config: EngineConfig,
    http: HttpClient,
    log_level: AtomicU8,
}

impl EngineContext {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let http = HttpClient::new(config.http_timeout);
        let log_level = AtomicU8::new(config.log_level as u8);
        Self {
            inner: Arc::new(Inner {
                config,
                http,
                log_level,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn http(&self) -> &HttpClient {
        &self.inner.http
    }

    /// Current log level. Runtime-reconfigurable via [`Self::set_log_level`]
    /// — a method on the context, not a global side effect (spec §9).
    #[must_use]
    pub fn log_level(&self) -> LogLevel {
        match self.inner.log_level.load(Ordering::Relaxed) {
            0 => LogLevel::Critical,
            1 => LogLevel::Error,
            2 => LogLevel::Warning,
            3 => LogLevel::Info,
            _ => LogLevel::Debug,
        }
    }

    pub fn set_log_level(&self, level: LogLevel) {
        self.inner.log_level.store(level as u8, Ordering::Relaxed);
    }
}

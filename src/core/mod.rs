//! Ambient stack: HTTP client + retry, error type, configuration, engine
//! context, and the concrete `Bar`/`BarSeries` data model.

pub mod client;
pub mod config;
pub mod context;
#[cfg(feature = "dataframe")]
pub mod dataframe;
pub mod error;
pub mod models;

pub use config::EngineConfig;
pub use context::EngineContext;
pub use error::EngineError;
pub use models::{Bar, BarSeries};

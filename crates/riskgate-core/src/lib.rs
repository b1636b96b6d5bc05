//! Core types, configuration, and error handling for riskgate.
//!
//! This crate provides the shared foundation used by the other riskgate crates:
//! - [`RiskgateError`] — unified error type using `thiserror` and `miette`
//! - [`RiskConfig`] — risk configuration loaded from `.riskgate.toml` (or YAML)
//! - Shared types: [`Commit`], [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{CriticalPath, HistoryBackend, HistoryConfig, RiskConfig};
pub use error::RiskgateError;
pub use types::{Commit, OutputFormat};

/// A convenience `Result` type for riskgate operations.
pub type Result<T> = std::result::Result<T, RiskgateError>;

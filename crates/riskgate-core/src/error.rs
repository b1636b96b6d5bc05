use std::path::PathBuf;

/// Errors that can occur while reading history or loading configuration.
///
/// Scoring itself is infallible; every variant here is fatal for a run.
///
/// # Examples
///
/// ```
/// use riskgate_core::RiskgateError;
///
/// let err = RiskgateError::SourceUnavailable("git not found".into());
/// assert!(err.to_string().contains("git not found"));
/// assert!(!err.is_config_error());
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum RiskgateError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    #[diagnostic(code(riskgate::io))]
    Io(#[from] std::io::Error),

    /// Invalid configuration values.
    #[error("configuration error: {0}")]
    #[diagnostic(
        code(riskgate::config),
        help("weights and criticalities must be finite, non-negative numbers")
    )]
    Config(String),

    /// The configuration resource does not exist.
    #[error("configuration file not found: {}", .0.display())]
    #[diagnostic(
        code(riskgate::config::not_found),
        help("run `riskgate init` to create one, or pass --config <path>")
    )]
    ConfigNotFound(PathBuf),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    #[diagnostic(code(riskgate::config::toml))]
    Toml(#[from] toml::de::Error),

    /// YAML deserialization failure.
    #[error("YAML parse error: {0}")]
    #[diagnostic(code(riskgate::config::yaml))]
    Yaml(#[from] serde_yaml::Error),

    /// The version-control history could not be read.
    #[error("history source unavailable: {0}")]
    #[diagnostic(
        code(riskgate::source_unavailable),
        help("run riskgate from inside a git repository, or pass --repo <path>")
    )]
    SourceUnavailable(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    #[diagnostic(code(riskgate::serialization))]
    Serialization(#[from] serde_json::Error),
}

impl RiskgateError {
    /// Returns `true` for failures to locate, parse, or validate the risk
    /// configuration.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            RiskgateError::Config(_)
                | RiskgateError::ConfigNotFound(_)
                | RiskgateError::Toml(_)
                | RiskgateError::Yaml(_)
        )
    }
}

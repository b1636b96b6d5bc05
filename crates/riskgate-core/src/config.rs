use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::RiskgateError;

/// Risk configuration loaded once per run from `.riskgate.toml` (or a YAML file).
///
/// Both top-level sections are optional and default to empty mappings. The
/// configuration is validated at load time and treated as read-only afterwards.
///
/// # Examples
///
/// ```
/// use riskgate_core::RiskConfig;
///
/// let config = RiskConfig::default();
/// assert!(config.semantic_weights.is_empty());
/// assert!(config.critical_paths.is_empty());
/// assert_eq!(config.history.timeout_secs, 30);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Weight in `[0, 1]` per conventional-commit type (`feat`, `fix`, `other`, ...).
    #[serde(default, deserialize_with = "null_as_default")]
    pub semantic_weights: BTreeMap<String, f64>,
    /// Business criticality and compliance tags per path prefix.
    #[serde(default, deserialize_with = "null_as_default")]
    pub critical_paths: BTreeMap<String, CriticalPath>,
    /// How commit history is read.
    #[serde(default)]
    pub history: HistoryConfig,
}

impl RiskConfig {
    /// Load configuration from `path`, choosing YAML for `.yaml`/`.yml`
    /// extensions and TOML otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`RiskgateError::ConfigNotFound`] if the file does not exist,
    /// [`RiskgateError::Io`] if it cannot be read, a parse error variant if the
    /// content is malformed, or [`RiskgateError::Config`] if validation fails.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use riskgate_core::RiskConfig;
    /// use std::path::Path;
    ///
    /// let config = RiskConfig::from_file(Path::new(".riskgate.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, RiskgateError> {
        if !path.exists() {
            return Err(RiskgateError::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml(&content),
            _ => Self::from_toml(&content),
        }
    }

    /// Parse and validate configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`RiskgateError::Toml`] if parsing fails, or
    /// [`RiskgateError::Config`] if validation fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use riskgate_core::RiskConfig;
    ///
    /// let toml = r#"
    /// [semantic_weights]
    /// fix = 0.3
    ///
    /// [critical_paths."services/payments"]
    /// business_criticality = 1.0
    /// compliance_domains = ["PCI"]
    /// "#;
    /// let config = RiskConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.semantic_weights["fix"], 0.3);
    /// assert_eq!(config.critical_paths["services/payments"].compliance_domains, vec!["PCI"]);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, RiskgateError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// An empty document yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RiskgateError::Yaml`] if parsing fails, or
    /// [`RiskgateError::Config`] if validation fails.
    pub fn from_yaml(content: &str) -> Result<Self, RiskgateError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every numeric value is usable for scoring.
    ///
    /// Values above `1.0` are accepted; the scorer clamps the final score.
    ///
    /// # Errors
    ///
    /// Returns [`RiskgateError::Config`] naming the first offending entry.
    pub fn validate(&self) -> Result<(), RiskgateError> {
        for (kind, weight) in &self.semantic_weights {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(RiskgateError::Config(format!(
                    "semantic weight for '{kind}' must be a non-negative number, got {weight}"
                )));
            }
        }
        for (prefix, meta) in &self.critical_paths {
            if prefix.is_empty() {
                return Err(RiskgateError::Config(
                    "critical path prefix must not be empty".into(),
                ));
            }
            let criticality = meta.business_criticality;
            if !criticality.is_finite() || criticality < 0.0 {
                return Err(RiskgateError::Config(format!(
                    "business criticality for '{prefix}' must be a non-negative number, got {criticality}"
                )));
            }
        }
        if self.history.timeout_secs == 0 {
            return Err(RiskgateError::Config(
                "history.timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Criticality metadata attached to a path prefix.
///
/// # Examples
///
/// ```
/// use riskgate_core::CriticalPath;
///
/// let meta = CriticalPath {
///     business_criticality: 0.9,
///     compliance_domains: vec!["HIPAA".into()],
/// };
/// assert_eq!(meta.compliance_domains.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CriticalPath {
    /// Business criticality in `[0, 1]` (default: 0.0).
    #[serde(default)]
    pub business_criticality: f64,
    /// Compliance domain tags such as `PCI` or `HIPAA`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub compliance_domains: Vec<String>,
}

/// History reader settings.
///
/// # Examples
///
/// ```
/// use riskgate_core::{HistoryBackend, HistoryConfig};
///
/// let config = HistoryConfig::default();
/// assert_eq!(config.backend, HistoryBackend::Cli);
/// assert_eq!(config.timeout_secs, 30);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Which reader to use (default: `cli`).
    #[serde(default)]
    pub backend: HistoryBackend,
    /// Upper bound on the external `git log` invocation, in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            backend: HistoryBackend::default(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Source of commit history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryBackend {
    /// Spawn the `git` executable and parse `git log` output.
    #[default]
    Cli,
    /// Walk history in-process through libgit2.
    Libgit2,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = RiskConfig::default();
        assert!(config.semantic_weights.is_empty());
        assert!(config.critical_paths.is_empty());
        assert_eq!(config.history.backend, HistoryBackend::Cli);
        assert_eq!(config.history.timeout_secs, 30);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = RiskConfig::from_toml("").unwrap();
        assert_eq!(config, RiskConfig::default());
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[semantic_weights]
feat = 0.6
fix = 0.3
other = 0.2

[critical_paths."services/payments"]
business_criticality = 1.0
compliance_domains = ["PCI", "SOX"]

[critical_paths."services/auth"]
business_criticality = 0.8

[history]
backend = "libgit2"
timeout_secs = 5
"#;
        let config = RiskConfig::from_toml(toml).unwrap();
        assert_eq!(config.semantic_weights.len(), 3);
        assert_eq!(config.semantic_weights["feat"], 0.6);

        let payments = &config.critical_paths["services/payments"];
        assert_eq!(payments.business_criticality, 1.0);
        assert_eq!(payments.compliance_domains, vec!["PCI", "SOX"]);

        let auth = &config.critical_paths["services/auth"];
        assert!(auth.compliance_domains.is_empty());

        assert_eq!(config.history.backend, HistoryBackend::Libgit2);
        assert_eq!(config.history.timeout_secs, 5);
    }

    #[test]
    fn parse_yaml() {
        let yaml = r#"
semantic_weights:
  feat: 0.6
  fix: 0.3
critical_paths:
  services/phi:
    business_criticality: 0.9
    compliance_domains: [HIPAA]
"#;
        let config = RiskConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.semantic_weights["fix"], 0.3);
        assert_eq!(
            config.critical_paths["services/phi"].compliance_domains,
            vec!["HIPAA"]
        );
        assert_eq!(config.history, HistoryConfig::default());
    }

    #[test]
    fn yaml_null_sections_are_empty() {
        let yaml = "semantic_weights:\ncritical_paths:\n";
        let config = RiskConfig::from_yaml(yaml).unwrap();
        assert!(config.semantic_weights.is_empty());
        assert!(config.critical_paths.is_empty());
    }

    #[test]
    fn empty_yaml_gives_defaults() {
        assert_eq!(RiskConfig::from_yaml("  \n").unwrap(), RiskConfig::default());
    }

    #[test]
    fn invalid_toml_returns_error() {
        let result = RiskConfig::from_toml("{{invalid}}");
        assert!(matches!(result, Err(RiskgateError::Toml(_))));
    }

    #[test]
    fn negative_weight_is_rejected() {
        let toml = "[semantic_weights]\nfeat = -0.5\n";
        let err = RiskConfig::from_toml(toml).unwrap_err();
        assert!(matches!(err, RiskgateError::Config(_)));
        assert!(err.to_string().contains("feat"));
    }

    #[test]
    fn negative_criticality_is_rejected() {
        let toml = "[critical_paths.\"db\"]\nbusiness_criticality = -1.0\n";
        let err = RiskConfig::from_toml(toml).unwrap_err();
        assert!(err.to_string().contains("db"));
    }

    #[test]
    fn empty_prefix_is_rejected() {
        let toml = "[critical_paths.\"\"]\nbusiness_criticality = 0.5\n";
        assert!(RiskConfig::from_toml(toml).is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let toml = "[history]\ntimeout_secs = 0\n";
        assert!(RiskConfig::from_toml(toml).is_err());
    }

    #[test]
    fn weights_above_one_are_accepted() {
        let toml = "[semantic_weights]\nfeat = 3.0\n";
        assert!(RiskConfig::from_toml(toml).is_ok());
    }

    #[test]
    fn missing_file_is_config_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = RiskConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, RiskgateError::ConfigNotFound(_)));
    }

    #[test]
    fn from_file_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let yaml_path = dir.path().join("risk.yml");
        std::fs::write(&yaml_path, "semantic_weights:\n  docs: 0.05\n").unwrap();
        let config = RiskConfig::from_file(&yaml_path).unwrap();
        assert_eq!(config.semantic_weights["docs"], 0.05);

        let toml_path = dir.path().join(".riskgate.toml");
        std::fs::write(&toml_path, "[semantic_weights]\ndocs = 0.05\n").unwrap();
        let config = RiskConfig::from_file(&toml_path).unwrap();
        assert_eq!(config.semantic_weights["docs"], 0.05);
    }
}

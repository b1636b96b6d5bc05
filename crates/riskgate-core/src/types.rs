use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One commit read from version-control history.
///
/// Constructed once by the history reader and never mutated afterwards.
///
/// # Examples
///
/// ```
/// use riskgate_core::Commit;
///
/// let commit = Commit {
///     sha: "0123456789abcdef".into(),
///     message: "fix(auth): expire stale tokens".into(),
///     files: vec!["services/auth/token.go".into()],
/// };
/// assert_eq!(commit.short_sha(), "01234567");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Full commit hash.
    pub sha: String,
    /// Subject line of the commit message.
    pub message: String,
    /// Repository-relative paths touched by the commit, in log order.
    pub files: Vec<String>,
}

impl Commit {
    /// The first eight characters of the hash, or the whole hash if shorter.
    pub fn short_sha(&self) -> &str {
        self.sha.get(..8).unwrap_or(&self.sha)
    }
}

/// Output format for the CLI report.
///
/// Implements [`FromStr`] so it can be used directly with `clap` argument parsing.
///
/// # Examples
///
/// ```
/// use riskgate_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One line per commit plus a summary.
    #[default]
    Text,
    /// The full report as pretty-printed JSON.
    Json,
    /// Markdown table.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

//! Commit history reading.
//!
//! Reads the most recent commits of a repository either by running
//! `git log` in a child process or by walking history in-process with
//! libgit2, and turns them into [`Commit`] records in the order the log
//! reports them.

pub mod git_cli;
pub mod libgit2;
pub mod parser;

use std::path::Path;
use std::time::Duration;

use riskgate_core::{Commit, HistoryBackend, HistoryConfig, RiskgateError};

/// Read up to `max_count` recent commits from `repo_path` using the backend
/// selected in `config`.
///
/// An empty vector means the repository has no commits; failures to reach the
/// history at all are errors.
///
/// # Errors
///
/// Returns [`RiskgateError::SourceUnavailable`] if git is missing, the path is
/// not a repository, or the log query fails or times out.
///
/// # Examples
///
/// ```no_run
/// # async fn run() -> riskgate_core::Result<()> {
/// use std::path::Path;
/// use riskgate_core::HistoryConfig;
///
/// let commits =
///     riskgate_history::read_recent_commits(Path::new("."), 50, &HistoryConfig::default()).await?;
/// println!("{} commits", commits.len());
/// # Ok(())
/// # }
/// ```
pub async fn read_recent_commits(
    repo_path: &Path,
    max_count: u32,
    config: &HistoryConfig,
) -> Result<Vec<Commit>, RiskgateError> {
    tracing::info!(backend = ?config.backend, max_count, "reading commit history");
    match config.backend {
        HistoryBackend::Cli => {
            git_cli::GitLog::new(repo_path)
                .with_timeout(Duration::from_secs(config.timeout_secs))
                .read_recent_commits(max_count)
                .await
        }
        HistoryBackend::Libgit2 => {
            let reader = libgit2::Libgit2Log::new(repo_path);
            tokio::task::spawn_blocking(move || reader.read_recent_commits(max_count))
                .await
                .map_err(|e| {
                    RiskgateError::SourceUnavailable(format!("history task failed: {e}"))
                })?
        }
    }
}

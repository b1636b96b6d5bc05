//! History reader backed by the `git` executable.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use riskgate_core::{Commit, RiskgateError};
use tokio::process::Command;

use crate::parser::{parse_log, PRETTY_FORMAT};

/// Default git binary name.
pub const GIT_COMMAND: &str = "git";

/// Stderr fragments git prints when HEAD has no commits.
const NO_COMMITS_YET: &[&str] = &["does not have any commits yet", "bad default revision 'HEAD'"];

/// Runs `git log` in a child process and parses its output.
///
/// # Examples
///
/// ```no_run
/// # async fn run() -> riskgate_core::Result<()> {
/// use std::time::Duration;
/// use riskgate_history::git_cli::GitLog;
///
/// let log = GitLog::new(".").with_timeout(Duration::from_secs(10));
/// for commit in log.read_recent_commits(20).await? {
///     println!("{} {}", commit.short_sha(), commit.message);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GitLog {
    repo_path: PathBuf,
    program: OsString,
    timeout: Duration,
}

impl GitLog {
    /// Create a reader for the repository at `repo_path` with a 30 second timeout.
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
            program: OsString::from(GIT_COMMAND),
            timeout: Duration::from_secs(30),
        }
    }

    /// Use a different git executable.
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    /// Bound the log invocation; the child is killed when it expires.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read the most recent `max_count` commits, newest first as git emits them.
    ///
    /// A repository without commits yields an empty vector.
    ///
    /// # Errors
    ///
    /// Returns [`RiskgateError::SourceUnavailable`] if git cannot be spawned,
    /// exits non-zero, or does not finish within the timeout.
    pub async fn read_recent_commits(&self, max_count: u32) -> Result<Vec<Commit>, RiskgateError> {
        if max_count == 0 {
            return Ok(Vec::new());
        }

        let mut cmd = Command::new(&self.program);
        cmd.arg("-C")
            .arg(&self.repo_path)
            .args(["-c", "core.quotepath=false", "log"])
            .arg(format!("--max-count={max_count}"))
            .arg(PRETTY_FORMAT)
            .arg("--name-only")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(
            program = ?self.program,
            repo = %self.repo_path.display(),
            max_count,
            "running git log"
        );

        let child = cmd.spawn().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                RiskgateError::SourceUnavailable(format!(
                    "`{}` executable not found",
                    self.program.to_string_lossy()
                ))
            } else {
                RiskgateError::SourceUnavailable(format!("failed to run git log: {e}"))
            }
        })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result
                .map_err(|e| RiskgateError::SourceUnavailable(format!("git log failed: {e}")))?,
            Err(_) => {
                tracing::warn!(timeout_secs = self.timeout.as_secs(), "git log timed out");
                return Err(RiskgateError::SourceUnavailable(format!(
                    "git log did not finish within {}s",
                    self.timeout.as_secs()
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if NO_COMMITS_YET.iter().any(|p| stderr.contains(p)) {
                tracing::debug!("repository has no commits yet");
                return Ok(Vec::new());
            }
            let exit_code = output.status.code().unwrap_or(-1);
            return Err(RiskgateError::SourceUnavailable(format!(
                "git log exited with code {exit_code}: {}",
                stderr.trim()
            )));
        }

        Ok(parse_log(&String::from_utf8_lossy(&output.stdout)))
    }
}

//! In-process history reader via libgit2.

use std::path::{Path, PathBuf};

use git2::{DiffFindOptions, DiffOptions, ErrorCode, Repository, Sort};
use riskgate_core::{Commit, RiskgateError};

/// Walks commit history in-process, producing the same records as
/// `git log --name-only`.
///
/// # Examples
///
/// ```no_run
/// use riskgate_history::libgit2::Libgit2Log;
///
/// let commits = Libgit2Log::new(".").read_recent_commits(50).unwrap();
/// for c in &commits {
///     println!("{}: {} ({} files)", c.short_sha(), c.message, c.files.len());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Libgit2Log {
    repo_path: PathBuf,
}

impl Libgit2Log {
    /// Create a reader for the repository at `repo_path`.
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
        }
    }

    /// Read the most recent `max_count` commits, newest first.
    ///
    /// Merge commits list no files, as with `git log --name-only`. A
    /// repository whose HEAD is unborn yields an empty vector.
    ///
    /// # Errors
    ///
    /// Returns [`RiskgateError::SourceUnavailable`] if the path is not a
    /// repository or history cannot be walked.
    pub fn read_recent_commits(&self, max_count: u32) -> Result<Vec<Commit>, RiskgateError> {
        if max_count == 0 {
            return Ok(Vec::new());
        }

        let repo = Repository::open(&self.repo_path)
            .map_err(|e| unavailable("failed to open repository", e))?;

        match repo.head() {
            Ok(_) => {}
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                tracing::debug!("repository has no commits yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(unavailable("failed to resolve HEAD", e)),
        }

        let mut revwalk = repo
            .revwalk()
            .map_err(|e| unavailable("failed to create revwalk", e))?;
        revwalk
            .set_sorting(Sort::TIME)
            .map_err(|e| unavailable("failed to sort revwalk", e))?;
        revwalk
            .push_head()
            .map_err(|e| unavailable("failed to push HEAD", e))?;

        let mut commits = Vec::new();
        for oid_result in revwalk.take(max_count as usize) {
            let oid = oid_result.map_err(|e| unavailable("revwalk error", e))?;
            let commit = repo
                .find_commit(oid)
                .map_err(|e| unavailable("failed to find commit", e))?;

            let files = if commit.parent_count() > 1 {
                Vec::new()
            } else {
                changed_paths(&repo, &commit)?
            };

            commits.push(Commit {
                sha: oid.to_string(),
                message: String::from_utf8_lossy(commit.summary_bytes().unwrap_or_default())
                    .trim()
                    .to_string(),
                files,
            });
        }

        tracing::debug!(commits = commits.len(), "walked history with libgit2");
        Ok(commits)
    }
}

fn changed_paths(repo: &Repository, commit: &git2::Commit) -> Result<Vec<String>, RiskgateError> {
    let commit_tree = commit
        .tree()
        .map_err(|e| unavailable("failed to get commit tree", e))?;

    let parent_tree = if commit.parent_count() > 0 {
        let parent = commit
            .parent(0)
            .map_err(|e| unavailable("failed to get parent", e))?;
        Some(
            parent
                .tree()
                .map_err(|e| unavailable("failed to get parent tree", e))?,
        )
    } else {
        None
    };

    let mut diff_opts = DiffOptions::new();
    let mut diff = repo
        .diff_tree_to_tree(parent_tree.as_ref(), Some(&commit_tree), Some(&mut diff_opts))
        .map_err(|e| unavailable("failed to compute diff", e))?;

    // git log reports a rename once, under the new path
    let mut find_opts = DiffFindOptions::new();
    find_opts.renames(true);
    diff.find_similar(Some(&mut find_opts))
        .map_err(|e| unavailable("failed to find renames", e))?;

    Ok(diff
        .deltas()
        .filter_map(|delta| {
            delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .map(Path::to_string_lossy)
                .map(|p| p.into_owned())
        })
        .filter(|p| !p.is_empty())
        .collect())
}

fn unavailable(context: &str, err: git2::Error) -> RiskgateError {
    RiskgateError::SourceUnavailable(format!("{context}: {err}"))
}

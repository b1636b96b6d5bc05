//! Parser for `git log --pretty=format:%H%x1f%s --name-only` output.
//!
//! Each commit starts with a header line `<hash>\x1f<subject>` followed by
//! the paths it touched, one per line. Blank lines separate commits.

use riskgate_core::Commit;

/// Unit separator between hash and subject in a header line.
pub const FIELD_SEPARATOR: char = '\x1f';

/// `--pretty` argument producing the header format [`parse_log`] expects.
pub const PRETTY_FORMAT: &str = "--pretty=format:%H%x1f%s";

enum ParseState {
    AwaitingHeader,
    AccumulatingFiles(Commit),
}

/// Parse raw log output into commits, preserving the order of the input.
///
/// A line containing [`FIELD_SEPARATOR`] starts a new commit; any other
/// non-blank line is a file path of the current commit. Paths that appear
/// before the first header are dropped.
///
/// # Examples
///
/// ```
/// use riskgate_history::parser::parse_log;
///
/// let raw = "aaa\x1ffeat: add api\nsrc/api.rs\nsrc/lib.rs\n\nbbb\x1fdocs: readme\nREADME.md\n";
/// let commits = parse_log(raw);
/// assert_eq!(commits.len(), 2);
/// assert_eq!(commits[0].files, vec!["src/api.rs", "src/lib.rs"]);
/// assert_eq!(commits[1].message, "docs: readme");
/// ```
pub fn parse_log(raw: &str) -> Vec<Commit> {
    let mut commits = Vec::new();
    let mut state = ParseState::AwaitingHeader;

    for line in raw.lines() {
        if line.trim().is_empty() {
            continue;
        }

        state = match (state, parse_header(line)) {
            (ParseState::AwaitingHeader, Some(next)) => ParseState::AccumulatingFiles(next),
            (ParseState::AccumulatingFiles(done), Some(next)) => {
                commits.push(done);
                ParseState::AccumulatingFiles(next)
            }
            (ParseState::AccumulatingFiles(mut current), None) => {
                current.files.push(line.trim().to_string());
                ParseState::AccumulatingFiles(current)
            }
            (ParseState::AwaitingHeader, None) => {
                tracing::warn!(line, "dropping file line without a commit header");
                ParseState::AwaitingHeader
            }
        };
    }

    if let ParseState::AccumulatingFiles(last) = state {
        commits.push(last);
    }

    tracing::debug!(commits = commits.len(), "parsed git log output");
    commits
}

fn parse_header(line: &str) -> Option<Commit> {
    let (sha, message) = line.split_once(FIELD_SEPARATOR)?;
    Some(Commit {
        sha: sha.trim().to_string(),
        message: message.trim().to_string(),
        files: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_commits() {
        assert!(parse_log("").is_empty());
        assert!(parse_log("\n\n  \n").is_empty());
    }

    #[test]
    fn single_commit_without_files() {
        let commits = parse_log("abc123\x1finitial commit");
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].sha, "abc123");
        assert_eq!(commits[0].message, "initial commit");
        assert!(commits[0].files.is_empty());
    }

    #[test]
    fn files_attach_to_preceding_header() {
        let raw = "\
c3\x1ffix(payments): round totals
services/payments/total.py
services/payments/tests/test_total.py

c2\x1fchore: bump deps
Cargo.lock

c1\x1finitial
";
        let commits = parse_log(raw);
        assert_eq!(commits.len(), 3);
        assert_eq!(commits[0].sha, "c3");
        assert_eq!(
            commits[0].files,
            vec![
                "services/payments/total.py",
                "services/payments/tests/test_total.py"
            ]
        );
        assert_eq!(commits[1].files, vec!["Cargo.lock"]);
        assert!(commits[2].files.is_empty());
    }

    #[test]
    fn order_is_preserved_as_emitted() {
        let raw = "old\x1fa\nnew\x1fb\nmid\x1fc\n";
        let shas: Vec<_> = parse_log(raw).into_iter().map(|c| c.sha).collect();
        assert_eq!(shas, vec!["old", "new", "mid"]);
    }

    #[test]
    fn headers_without_blank_separator_still_split() {
        let raw = "a\x1ffirst\nx.rs\nb\x1fsecond\ny.rs";
        let commits = parse_log(raw);
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].files, vec!["x.rs"]);
        assert_eq!(commits[1].files, vec!["y.rs"]);
    }

    #[test]
    fn leading_file_lines_are_dropped() {
        let raw = "stray.rs\na\x1ffirst\nx.rs\n";
        let commits = parse_log(raw);
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].files, vec!["x.rs"]);
    }

    #[test]
    fn message_and_paths_are_trimmed() {
        let raw = "a\x1f  feat: spaced  \r\n  src/x.rs \r\n";
        let commits = parse_log(raw);
        assert_eq!(commits[0].message, "feat: spaced");
        assert_eq!(commits[0].files, vec!["src/x.rs"]);
    }

    #[test]
    fn only_first_separator_splits_header() {
        let commits = parse_log("a\x1fsubject\x1fwith separator");
        assert_eq!(commits[0].sha, "a");
        assert_eq!(commits[0].message, "subject\x1fwith separator");
    }
}

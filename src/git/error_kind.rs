//! Classification of git failures from their stderr.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Broad category of a failed git invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GitErrorKind {
    AuthenticationFailed,
    RemoteUnreachable,
    MergeConflicts,
    LocalChangesOverwritten,
    NoTrackingInformation,
    RemoteRefNotFound,
    CannotFastForward,
    NotARepository,
    Unknown,
}

impl std::fmt::Display for GitErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            GitErrorKind::AuthenticationFailed => "authentication failed",
            GitErrorKind::RemoteUnreachable => "remote unreachable",
            GitErrorKind::MergeConflicts => "merge conflicts",
            GitErrorKind::LocalChangesOverwritten => "local changes would be overwritten",
            GitErrorKind::NoTrackingInformation => "no tracking information",
            GitErrorKind::RemoteRefNotFound => "remote ref not found",
            GitErrorKind::CannotFastForward => "cannot fast-forward",
            GitErrorKind::NotARepository => "not a git repository",
            GitErrorKind::Unknown => "unknown error",
        };
        write!(f, "{}", text)
    }
}

// Order matters: an auth failure over ssh is followed by the generic
// "Could not read from remote repository" line.
static ERROR_PATTERNS: LazyLock<Vec<(Regex, GitErrorKind)>> = LazyLock::new(|| {
    [
        (
            r"(?m)^fatal: Authentication failed|could not read Username|Permission denied \(publickey|remote: Invalid username or password",
            GitErrorKind::AuthenticationFailed,
        ),
        (
            r"(?m)^fatal: unable to access '.*?': |Could not resolve hostname|^fatal: Could not read from remote repository",
            GitErrorKind::RemoteUnreachable,
        ),
        (
            r"(?m)^CONFLICT \(|^Automatic merge failed|^error: could not apply",
            GitErrorKind::MergeConflicts,
        ),
        (
            r"Your local changes to the following files would be overwritten",
            GitErrorKind::LocalChangesOverwritten,
        ),
        (
            r"There is no tracking information for the current branch",
            GitErrorKind::NoTrackingInformation,
        ),
        (
            r"(?m)^fatal: couldn't find remote ref",
            GitErrorKind::RemoteRefNotFound,
        ),
        (
            r"Not possible to fast-forward|Need to specify how to reconcile divergent branches",
            GitErrorKind::CannotFastForward,
        ),
        (
            r"(?m)^fatal: not a git repository",
            GitErrorKind::NotARepository,
        ),
    ]
    .into_iter()
    .map(|(pattern, kind)| (Regex::new(pattern).unwrap(), kind))
    .collect()
});

/// Classify the stderr of a failed invocation.
pub fn classify_stderr(stderr: &str) -> GitErrorKind {
    ERROR_PATTERNS
        .iter()
        .find(|(regex, _)| regex.is_match(stderr))
        .map(|(_, kind)| *kind)
        .unwrap_or(GitErrorKind::Unknown)
}

/// Pick the most useful line of stderr to show a user.
///
/// Prefers the first `fatal:` or `error:` line, then the last non-empty line.
pub fn describe_failure(stderr: &str) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    lines
        .iter()
        .find(|line| line.starts_with("fatal:") || line.starts_with("error:"))
        .or_else(|| lines.last())
        .map(|line| line.to_string())
        .unwrap_or_else(|| "git pull failed".to_string())
}

//! Typed error hierarchy for gitdesk.
//!
//! Two top-level enums cover the two subsystems:
//! - `PullError`: invoking `git pull` and inspecting the repository
//! - `StoreError`: reading and writing persisted UI state

use crate::git::GitErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from a pull invocation.
///
/// A git process that runs and exits non-zero is reported as
/// [`PullError::GitFailed`], separate from any progress parsing.
#[derive(Debug, Error)]
pub enum PullError {
    #[error("Failed to spawn git process '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read git output: {0}")]
    Output(#[source] std::io::Error),

    #[error("git pull failed with exit code {exit_code} ({kind}): {description}")]
    GitFailed {
        exit_code: i32,
        kind: GitErrorKind,
        description: String,
    },

    #[error("Not a git repository: {path}")]
    NotARepository { path: PathBuf },

    #[error("No remote configured for repository at {path}")]
    NoRemote { path: PathBuf },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors from the key-value state store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read state file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write state file at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to lock state file at {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("State file at {path} is not a valid JSON object: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize state: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pull_error_spawn_carries_command() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "git not found");
        let err = PullError::Spawn {
            command: "git".to_string(),
            source: io_err,
        };
        match &err {
            PullError::Spawn { command, source } => {
                assert_eq!(command, "git");
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            _ => panic!("Expected Spawn variant"),
        }
        assert!(err.to_string().contains("'git'"));
    }

    #[test]
    fn pull_error_git_failed_mentions_code_and_kind() {
        let err = PullError::GitFailed {
            exit_code: 128,
            kind: GitErrorKind::AuthenticationFailed,
            description: "fatal: Authentication failed for 'https://example.com/repo.git/'"
                .to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("128"));
        assert!(msg.contains("authentication failed"));
        assert!(msg.contains("https://example.com/repo.git/"));
    }

    #[test]
    fn pull_error_converts_from_anyhow() {
        let err: PullError = anyhow::anyhow!("stdout pipe missing").into();
        assert!(matches!(err, PullError::Other(_)));
        assert_eq!(err.to_string(), "stdout pipe missing");
    }

    #[test]
    fn store_error_carries_path() {
        let path = PathBuf::from("/tmp/gitdesk/state.json");
        let err = StoreError::Write {
            path: path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        };
        match &err {
            StoreError::Write { path: p, source } => {
                assert_eq!(p, &path);
                assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied);
            }
            _ => panic!("Expected Write"),
        }
        assert!(err.to_string().contains("/tmp/gitdesk/state.json"));
    }

    #[test]
    fn all_error_types_implement_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        let pull_err = PullError::NoRemote {
            path: PathBuf::from("."),
        };
        assert_std_error(&pull_err);
        let corrupt = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let store_err = StoreError::Serialize(corrupt);
        assert_std_error(&store_err);
    }
}

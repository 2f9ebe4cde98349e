//! Git integration for gitdesk.
//!
//! This module wraps the external `git` binary for pulls and uses `git2` for
//! read-only repository inspection:
//!
//! - `progress` - turns one line of git stderr into a [`ProgressRecord`]
//! - `lines` - splits git's `\r`-redrawn stderr stream into lines
//! - `pull` - runs `git pull --progress` and emits [`PullProgress`] events
//! - `repo` - default remote, `pull.rebase` and branch lookups
//! - `error_kind` - classifies stderr of a failed invocation

mod error_kind;
mod lines;
mod progress;
mod pull;
mod repo;

pub use error_kind::{GitErrorKind, classify_stderr, describe_failure};
pub use gitdesk_common::{ProgressDetails, ProgressKind, ProgressRecord, PullProgress};
pub use lines::{LineSplitter, read_lines};
pub use progress::{PULL_STEPS, ProgressStep, StepTracker, parse};
pub use pull::{COUNTING_OBJECTS_PREFIX, GitPull, PullOptions, PullOutput, PullProgressAdapter};
pub use repo::Repo;

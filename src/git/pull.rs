//! `git pull` invocation with streamed progress.
//!
//! The pull is run with `--progress` so git writes phase updates to stderr
//! even though it is not attached to a terminal. Each stderr line is parsed
//! and, unless it is uninteresting context, forwarded to the caller as a
//! [`PullProgress`] event.

use super::error_kind::{classify_stderr, describe_failure};
use super::lines::read_lines;
use super::progress::{StepTracker, parse};
use crate::errors::PullError;
use anyhow::anyhow;
use gitdesk_common::{ProgressRecord, PullProgress};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Context lines starting with this prefix mark an interesting sub-phase and
/// are forwarded; every other context line is dropped.
pub const COUNTING_OBJECTS_PREFIX: &str = "remote: Counting objects";

/// What to pull and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullOptions {
    /// Remote name, e.g. `origin`
    pub remote: String,
    /// Branch to pull; `None` lets git use the configured upstream
    pub branch: Option<String>,
    /// `Some(true)` passes `--rebase`, `Some(false)` passes `--no-rebase`
    pub rebase: Option<bool>,
    pub recurse_submodules: bool,
    /// Ask git for progress output
    pub progress: bool,
}

impl PullOptions {
    pub fn new(remote: impl Into<String>) -> Self {
        Self {
            remote: remote.into(),
            branch: None,
            rebase: None,
            recurse_submodules: true,
            progress: true,
        }
    }

    /// Arguments passed to the git binary.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["pull".to_string()];
        match self.rebase {
            Some(true) => args.push("--rebase".to_string()),
            Some(false) => args.push("--no-rebase".to_string()),
            None => {}
        }
        if self.recurse_submodules {
            args.push("--recurse-submodules".to_string());
        }
        if self.progress {
            args.push("--progress".to_string());
        }
        args.push(self.remote.clone());
        if let Some(branch) = &self.branch {
            args.push(branch.clone());
        }
        args
    }
}

/// Maps git stderr lines to [`PullProgress`] events for one pull.
///
/// Holds no state beyond the overall-progress tracker: filtering and mapping
/// are decided line by line.
#[derive(Debug, Clone)]
pub struct PullProgressAdapter {
    remote: String,
    tracker: StepTracker,
}

impl PullProgressAdapter {
    pub fn new(remote: impl Into<String>) -> Self {
        Self {
            remote: remote.into(),
            tracker: StepTracker::pull(),
        }
    }

    /// The zero-progress event observers see before any git output.
    pub fn initial_event(&self) -> PullProgress {
        PullProgress::started(&self.remote)
    }

    /// Translate one stderr line, or `None` if it should be suppressed.
    ///
    /// Ref-update chatter such as `From github.com:org/repo` is dropped; only
    /// measured phases and `remote: Counting objects` context get through.
    pub fn handle_line(&mut self, line: &str) -> Option<PullProgress> {
        let record = parse(line);
        if let ProgressRecord::Context { text } = &record
            && !text.starts_with(COUNTING_OBJECTS_PREFIX)
        {
            return None;
        }

        let value = self.tracker.observe(&record);
        Some(PullProgress::update(&self.remote, record.text(), Some(value)))
    }
}

/// Output of a successful pull.
#[derive(Debug, Clone, Default)]
pub struct PullOutput {
    pub stdout: String,
    pub stderr: String,
}

impl PullOutput {
    /// Whether git reported there was nothing to pull.
    pub fn already_up_to_date(&self) -> bool {
        self.stdout.contains("Already up to date") || self.stdout.contains("Already up-to-date")
    }

    /// Last non-empty stdout line, typically git's merge summary.
    pub fn summary(&self) -> Option<&str> {
        self.stdout
            .lines()
            .map(str::trim)
            .rev()
            .find(|line| !line.is_empty())
    }
}

/// Runs `git pull` in one working directory.
pub struct GitPull {
    git_cmd: String,
    repo_dir: PathBuf,
}

impl GitPull {
    /// Create a runner using `git_cmd` as the git executable.
    pub fn new(git_cmd: impl Into<String>, repo_dir: impl AsRef<Path>) -> Self {
        Self {
            git_cmd: git_cmd.into(),
            repo_dir: repo_dir.as_ref().to_path_buf(),
        }
    }

    /// Pull, reporting progress to `progress` when one is supplied.
    ///
    /// With a sink, an initial `value = 0` event is delivered before git is
    /// spawned, then events follow in the order git writes the lines. A
    /// non-zero exit is returned as [`PullError::GitFailed`] and is not
    /// retried. Dropping the returned future kills the git process.
    pub async fn run<F>(
        &self,
        options: &PullOptions,
        mut progress: Option<F>,
    ) -> Result<PullOutput, PullError>
    where
        F: FnMut(PullProgress),
    {
        let mut adapter = progress
            .as_ref()
            .map(|_| PullProgressAdapter::new(options.remote.clone()));

        if let (Some(sink), Some(adapter)) = (progress.as_mut(), adapter.as_ref()) {
            sink(adapter.initial_event());
        }

        let args = options.args();
        info!(
            repo = %self.repo_dir.display(),
            command = %format!("{} {}", self.git_cmd, args.join(" ")),
            "Starting pull"
        );
        let start = Instant::now();

        let mut child = Command::new(&self.git_cmd)
            .args(&args)
            .current_dir(&self.repo_dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| PullError::Spawn {
                command: self.git_cmd.clone(),
                source,
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("Failed to capture git stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("Failed to capture git stderr"))?;

        let stdout_task = tokio::spawn(async move {
            let mut reader = stdout;
            let mut buf = Vec::new();
            reader.read_to_end(&mut buf).await.map(|_| buf)
        });

        let mut stderr_text = String::new();
        read_lines(stderr, |line| {
            stderr_text.push_str(&line);
            stderr_text.push('\n');

            if let (Some(sink), Some(adapter)) = (progress.as_mut(), adapter.as_mut())
                && let Some(event) = adapter.handle_line(&line)
            {
                debug!(description = ?event.description, value = ?event.value, "Pull progress");
                sink(event);
            }
        })
        .await
        .map_err(PullError::Output)?;

        let status = child.wait().await.map_err(PullError::Output)?;
        let stdout_bytes = stdout_task
            .await
            .map_err(|e| PullError::Other(e.into()))?
            .map_err(PullError::Output)?;
        let stdout = String::from_utf8_lossy(&stdout_bytes).into_owned();

        let exit_code = status.code().unwrap_or(-1);
        if !status.success() {
            // Merge conflicts are reported on stdout, everything else on stderr.
            let report = format!("{}\n{}", stderr_text, stdout);
            let kind = classify_stderr(&report);
            let description = describe_failure(&report);
            warn!(exit_code, %kind, %description, "Pull failed");
            return Err(PullError::GitFailed {
                exit_code,
                kind,
                description,
            });
        }

        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Pull completed"
        );
        Ok(PullOutput {
            stdout,
            stderr: stderr_text,
        })
    }
}

use crate::errors::PullError;
use anyhow::Context;
use git2::Repository;
use std::path::{Path, PathBuf};

/// Read-only view of a repository used to fill in pull defaults.
pub struct Repo {
    repo: Repository,
    workdir: PathBuf,
}

impl Repo {
    /// Open the repository containing `path`, searching parent directories.
    pub fn open(path: &Path) -> Result<Self, PullError> {
        let repo = Repository::discover(path).map_err(|_| PullError::NotARepository {
            path: path.to_path_buf(),
        })?;
        let workdir = repo
            .workdir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| repo.path().to_path_buf());
        Ok(Self { repo, workdir })
    }

    /// Working tree root (the git dir for bare repositories).
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Branch HEAD points at, including an unborn branch.
    ///
    /// Returns `None` for a detached HEAD.
    pub fn current_branch(&self) -> Option<String> {
        let head = self.repo.find_reference("HEAD").ok()?;
        head.symbolic_target()
            .and_then(|target| target.strip_prefix("refs/heads/"))
            .map(str::to_string)
    }

    /// Remote to pull from when none is given.
    ///
    /// The current branch's upstream remote wins, then `origin`, then the
    /// first configured remote.
    pub fn default_remote(&self) -> Result<String, PullError> {
        if let Some(branch) = self.current_branch()
            && let Ok(buf) = self
                .repo
                .branch_upstream_remote(&format!("refs/heads/{}", branch))
            && let Some(name) = buf.as_str()
        {
            return Ok(name.to_string());
        }

        let remotes = self
            .repo
            .remotes()
            .context("Failed to list remotes")?;
        let names: Vec<&str> = remotes.iter().flatten().collect();
        if names.contains(&"origin") {
            return Ok("origin".to_string());
        }
        names
            .first()
            .map(|name| name.to_string())
            .ok_or_else(|| PullError::NoRemote {
                path: self.workdir.clone(),
            })
    }

    /// The repository's `pull.rebase` setting, if any.
    ///
    /// `merges` and `interactive` both count as rebasing.
    pub fn pull_rebase(&self) -> Option<bool> {
        let config = self.repo.config().ok()?;
        let value = config.get_string("pull.rebase").ok()?;
        match value.trim().to_lowercase().as_str() {
            "" => None,
            "false" | "no" | "off" | "0" => Some(false),
            _ => Some(true),
        }
    }

    /// Current HEAD SHA (returns None for unborn branches)
    pub fn head_sha(&self) -> Option<String> {
        self.repo
            .head()
            .ok()
            .and_then(|head| head.peel_to_commit().ok())
            .map(|commit| commit.id().to_string())
    }
}

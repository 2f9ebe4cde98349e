//! Configuration for gitdesk.
//!
//! Settings are read from `gitdesk.toml` in the gitdesk config directory and
//! layered file → environment → CLI.
//!
//! # Configuration File Format
//!
//! ```toml
//! [git]
//! command = "git"
//!
//! [pull]
//! recurse_submodules = true
//! rebase = false
//!
//! [sidebar]
//! default_width = 250
//! min_width = 150
//! max_width = 350
//! persist_delay_ms = 500
//!
//! [storage]
//! state_file = "/home/me/.local/share/gitdesk/state.json"
//!
//! [logging]
//! log_dir = "/tmp/gitdesk-logs"
//! ```

use crate::sidebar::WidthBounds;
use crate::storage::FileStore;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "gitdesk.toml";

/// Git executable settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitSection {
    /// Git command (default: "git")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

/// Defaults for `git pull` invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullSection {
    #[serde(default = "default_recurse_submodules")]
    pub recurse_submodules: bool,
    /// Force rebase or merge; absent follows the repository's `pull.rebase`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rebase: Option<bool>,
}

fn default_recurse_submodules() -> bool {
    true
}

impl Default for PullSection {
    fn default() -> Self {
        Self {
            recurse_submodules: default_recurse_submodules(),
            rebase: None,
        }
    }
}

/// Sidebar width bounds and persistence delay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SidebarSection {
    #[serde(default = "default_width")]
    pub default_width: u32,
    #[serde(default = "default_min_width")]
    pub min_width: u32,
    #[serde(default = "default_max_width")]
    pub max_width: u32,
    /// Quiet period before a width change is written
    #[serde(default = "default_persist_delay_ms")]
    pub persist_delay_ms: u64,
}

fn default_width() -> u32 {
    250
}

fn default_min_width() -> u32 {
    150
}

fn default_max_width() -> u32 {
    350
}

fn default_persist_delay_ms() -> u64 {
    500
}

impl Default for SidebarSection {
    fn default() -> Self {
        Self {
            default_width: default_width(),
            min_width: default_min_width(),
            max_width: default_max_width(),
            persist_delay_ms: default_persist_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitdeskToml {
    #[serde(default)]
    pub git: GitSection,
    #[serde(default)]
    pub pull: PullSection,
    #[serde(default)]
    pub sidebar: SidebarSection,
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

impl GitdeskToml {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse gitdesk.toml")
    }

    pub fn load_or_default(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize gitdesk.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// `GITDESK_GIT` wins over the file, which wins over plain `git`.
    pub fn git_cmd(&self) -> String {
        std::env::var("GITDESK_GIT")
            .ok()
            .filter(|value| !value.is_empty())
            .or_else(|| self.git.command.clone())
            .unwrap_or_else(|| "git".to_string())
    }

    pub fn sidebar_bounds(&self) -> WidthBounds {
        WidthBounds {
            default: self.sidebar.default_width,
            min: self.sidebar.min_width,
            max: self.sidebar.max_width,
        }
    }

    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let sidebar = &self.sidebar;

        if sidebar.min_width > sidebar.max_width {
            warnings.push(format!(
                "sidebar.min_width ({}) is greater than sidebar.max_width ({})",
                sidebar.min_width, sidebar.max_width
            ));
        } else if !(sidebar.min_width..=sidebar.max_width).contains(&sidebar.default_width) {
            warnings.push(format!(
                "sidebar.default_width ({}) is outside {}..={}",
                sidebar.default_width, sidebar.min_width, sidebar.max_width
            ));
        }

        if sidebar.persist_delay_ms == 0 {
            warnings.push(
                "sidebar.persist_delay_ms is 0: every width change will be written".to_string(),
            );
        }

        if let Some(ref command) = self.git.command
            && command.trim().is_empty()
        {
            warnings.push("git.command is empty".to_string());
        }

        warnings
    }
}

/// Directory holding `gitdesk.toml`.
///
/// `GITDESK_CONFIG_DIR` overrides the platform config directory.
pub fn config_dir() -> PathBuf {
    if let Some(dir) = env_path("GITDESK_CONFIG_DIR") {
        return dir;
    }
    dirs::config_dir()
        .map(|dir| dir.join("gitdesk"))
        .unwrap_or_else(|| PathBuf::from(".gitdesk"))
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct GitdeskConfig {
    pub config_dir: PathBuf,
    pub toml: GitdeskToml,
    pub verbose: bool,
    pub repo_dir: PathBuf,
    cli_state_file: Option<PathBuf>,
}

impl GitdeskConfig {
    pub fn new(config_dir: PathBuf, repo_dir: PathBuf) -> Result<Self> {
        let toml = GitdeskToml::load_or_default(&config_dir)?;
        Ok(Self {
            config_dir,
            toml,
            verbose: false,
            repo_dir,
            cli_state_file: None,
        })
    }

    pub fn with_cli_args(
        verbose: bool,
        repo_dir: Option<PathBuf>,
        state_file: Option<PathBuf>,
    ) -> Result<Self> {
        let repo_dir = match repo_dir {
            Some(dir) => dir,
            None => std::env::current_dir().context("Failed to resolve current directory")?,
        };
        let mut config = Self::new(config_dir(), repo_dir)?;
        config.verbose = verbose;
        config.cli_state_file = state_file;
        Ok(config)
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    pub fn git_cmd(&self) -> String {
        self.toml.git_cmd()
    }

    /// CLI flag, then `GITDESK_STATE_FILE`, then the file, then the default.
    pub fn state_file(&self) -> PathBuf {
        self.cli_state_file
            .clone()
            .or_else(|| env_path("GITDESK_STATE_FILE"))
            .or_else(|| self.toml.storage.state_file.clone())
            .unwrap_or_else(FileStore::default_path)
    }

    /// `GITDESK_LOG_DIR`, then the file. `None` logs to stderr.
    pub fn log_dir(&self) -> Option<PathBuf> {
        env_path("GITDESK_LOG_DIR").or_else(|| self.toml.logging.log_dir.clone())
    }

    pub fn sidebar_bounds(&self) -> WidthBounds {
        self.toml.sidebar_bounds()
    }

    pub fn persist_delay(&self) -> Duration {
        Duration::from_millis(self.toml.sidebar.persist_delay_ms)
    }

    pub fn validate(&self) -> Vec<String> {
        self.toml.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_parse_empty_uses_defaults() {
        let toml = GitdeskToml::parse("").unwrap();
        assert!(toml.pull.recurse_submodules);
        assert_eq!(toml.pull.rebase, None);
        assert_eq!(toml.sidebar_bounds(), WidthBounds::default());
        assert_eq!(toml.sidebar.persist_delay_ms, 500);
        assert!(toml.validate().is_empty());
    }

    #[test]
    fn test_parse_sections() {
        let content = r#"
[git]
command = "/usr/local/bin/git"

[pull]
recurse_submodules = false
rebase = true

[sidebar]
default_width = 220
min_width = 180
max_width = 400
persist_delay_ms = 250

[storage]
state_file = "/tmp/gitdesk/state.json"
"#;
        let toml = GitdeskToml::parse(content).unwrap();
        assert_eq!(toml.git.command.as_deref(), Some("/usr/local/bin/git"));
        assert!(!toml.pull.recurse_submodules);
        assert_eq!(toml.pull.rebase, Some(true));
        assert_eq!(
            toml.sidebar_bounds(),
            WidthBounds {
                default: 220,
                min: 180,
                max: 400
            }
        );
        assert_eq!(toml.sidebar.persist_delay_ms, 250);
        assert_eq!(
            toml.storage.state_file,
            Some(PathBuf::from("/tmp/gitdesk/state.json"))
        );
    }

    #[test]
    fn test_parse_invalid_toml() {
        let err = GitdeskToml::parse("[sidebar\nmin_width = ").unwrap_err();
        assert!(err.to_string().contains("gitdesk.toml"));
    }

    #[test]
    fn test_validate_reports_problems() {
        let content = r#"
[sidebar]
min_width = 400
max_width = 300
persist_delay_ms = 0
"#;
        let warnings = GitdeskToml::parse(content).unwrap().validate();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("min_width"));
        assert!(warnings[1].contains("persist_delay_ms"));

        let content = r#"
[sidebar]
default_width = 100
"#;
        let warnings = GitdeskToml::parse(content).unwrap().validate();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("default_width"));
    }

    #[test]
    fn test_git_cmd_priority() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let saved = std::env::var("GITDESK_GIT").ok();
        unsafe { std::env::remove_var("GITDESK_GIT") };

        assert_eq!(GitdeskToml::default().git_cmd(), "git");

        let toml = GitdeskToml::parse("[git]\ncommand = \"file-git\"\n").unwrap();
        assert_eq!(toml.git_cmd(), "file-git");

        unsafe { std::env::set_var("GITDESK_GIT", "env-git") };
        assert_eq!(toml.git_cmd(), "env-git");

        match saved {
            Some(val) => unsafe { std::env::set_var("GITDESK_GIT", val) },
            None => unsafe { std::env::remove_var("GITDESK_GIT") },
        }
    }

    #[test]
    fn test_load_and_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let mut toml = GitdeskToml::default();
        toml.sidebar.max_width = 500;
        toml.pull.rebase = Some(false);
        toml.save(&path).unwrap();

        let loaded = GitdeskToml::load(&path).unwrap();
        assert_eq!(loaded.sidebar.max_width, 500);
        assert_eq!(loaded.pull.rebase, Some(false));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempdir().unwrap();
        let toml = GitdeskToml::load_or_default(dir.path()).unwrap();
        assert_eq!(toml.sidebar.default_width, 250);
    }

    #[test]
    fn test_state_file_priority() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let saved = std::env::var_os("GITDESK_STATE_FILE");
        unsafe { std::env::remove_var("GITDESK_STATE_FILE") };

        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[storage]\nstate_file = \"/from/file.json\"\n",
        )
        .unwrap();
        let mut config =
            GitdeskConfig::new(dir.path().to_path_buf(), dir.path().to_path_buf()).unwrap();
        assert_eq!(config.state_file(), PathBuf::from("/from/file.json"));

        unsafe { std::env::set_var("GITDESK_STATE_FILE", "/from/env.json") };
        assert_eq!(config.state_file(), PathBuf::from("/from/env.json"));

        config.cli_state_file = Some(PathBuf::from("/from/cli.json"));
        assert_eq!(config.state_file(), PathBuf::from("/from/cli.json"));

        match saved {
            Some(val) => unsafe { std::env::set_var("GITDESK_STATE_FILE", val) },
            None => unsafe { std::env::remove_var("GITDESK_STATE_FILE") },
        }
    }

    #[test]
    fn test_config_paths_and_delay() {
        let dir = tempdir().unwrap();
        let config =
            GitdeskConfig::new(dir.path().to_path_buf(), PathBuf::from("/src/project")).unwrap();
        assert!(config.config_file().ends_with(CONFIG_FILE_NAME));
        assert_eq!(config.persist_delay(), Duration::from_millis(500));
        assert_eq!(config.repo_dir, PathBuf::from("/src/project"));
    }
}

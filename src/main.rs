use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use gitdesk::config::GitdeskConfig;
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "gitdesk")]
#[command(version, about = "Desktop Git client core: pull with progress, persisted UI state")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Repository to operate on (defaults to the current directory)
    #[arg(long, global = true)]
    pub repo: Option<PathBuf>,

    /// State file for persisted UI settings. Overrides GITDESK_STATE_FILE and gitdesk.toml.
    #[arg(long, global = true)]
    pub state_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pull from a remote, showing progress
    Pull(PullArgs),
    /// Read or change the persisted sidebar width
    Sidebar {
        #[command(subcommand)]
        command: SidebarCommands,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Args, Clone, Debug)]
pub struct PullArgs {
    /// Remote to pull from (defaults to the branch upstream, then origin)
    #[arg(long)]
    pub remote: Option<String>,

    /// Remote branch to merge
    #[arg(long)]
    pub branch: Option<String>,

    /// Rebase onto the fetched branch
    #[arg(long, conflicts_with = "no_rebase")]
    pub rebase: bool,

    /// Merge the fetched branch
    #[arg(long)]
    pub no_rebase: bool,

    /// Do not update submodules
    #[arg(long)]
    pub no_recurse_submodules: bool,

    /// Print progress events as JSON lines on stdout
    #[arg(long, conflicts_with = "quiet")]
    pub json: bool,

    /// Print nothing unless the pull fails
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Subcommand, Clone, Debug)]
pub enum SidebarCommands {
    /// Print the current width in pixels
    Get,
    /// Set the width, clamped to the configured bounds
    Set { width: u32 },
    /// Grow or shrink the width by a number of pixels
    Resize {
        #[arg(allow_negative_numbers = true)]
        delta: i32,
    },
    /// Restore the default width
    Reset,
}

#[derive(Subcommand, Clone, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Print the configuration file path
    Path,
    /// Initialize a default gitdesk.toml file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = GitdeskConfig::with_cli_args(cli.verbose, cli.repo.clone(), cli.state_file.clone())
        .context("Failed to load configuration")?;
    let _log_guard = gitdesk::logging::init(cli.verbose, config.log_dir().as_deref())
        .context("Failed to setup logging")?;

    match &cli.command {
        Commands::Pull(args) => cmd::cmd_pull(&config, args).await?,
        Commands::Sidebar { command } => cmd::cmd_sidebar(&config, command).await?,
        Commands::Config { command } => cmd::cmd_config(&config, command.clone())?,
    }

    Ok(())
}

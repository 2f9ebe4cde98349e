//! `gitdesk config`: view, validate and initialize gitdesk.toml.

use anyhow::{Context, Result};
use console::style;
use gitdesk::config::{GitdeskConfig, GitdeskToml};
use gitdesk::ui::icons::{CHECK, GEAR, WARN};

use super::super::ConfigCommands;

pub fn cmd_config(config: &GitdeskConfig, command: Option<ConfigCommands>) -> Result<()> {
    let config_path = config.config_file();

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("{}{}", GEAR, style("gitdesk configuration").bold());
            println!();

            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No gitdesk.toml found at {}", config_path.display());
                println!("Using default configuration.");
            }
            println!();

            let rendered =
                toml::to_string_pretty(&config.toml).context("Failed to serialize gitdesk.toml")?;
            println!("{}", rendered.trim_end());
            println!();

            println!("Effective values (with env/CLI overrides):");
            println!("  git = \"{}\"", config.git_cmd());
            println!("  state_file = \"{}\"", config.state_file().display());
            match config.log_dir() {
                Some(dir) => println!("  log_dir = \"{}\"", dir.display()),
                None => println!("  log_dir = (stderr)"),
            }
            println!();
        }
        Some(ConfigCommands::Validate) => {
            let warnings = config.validate();
            if warnings.is_empty() {
                println!("{}Configuration is valid.", CHECK);
            } else {
                println!("{}Configuration warnings:", WARN);
                for warning in &warnings {
                    println!("  - {}", warning);
                }
            }
        }
        Some(ConfigCommands::Path) => {
            println!("{}", config_path.display());
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("gitdesk.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            GitdeskToml::default().save(&config_path)?;
            println!("{}Created gitdesk.toml at {}", CHECK, config_path.display());
        }
    }

    Ok(())
}

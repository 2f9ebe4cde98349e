//! `gitdesk sidebar`.

use anyhow::{Context, Result};
use console::style;
use gitdesk::config::GitdeskConfig;
use gitdesk::sidebar::SidebarWidth;
use gitdesk::storage::{FileStore, KeyValueStore};
use gitdesk::ui::icons::WARN;
use std::sync::Arc;

use super::super::SidebarCommands;

pub async fn cmd_sidebar(config: &GitdeskConfig, command: &SidebarCommands) -> Result<()> {
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.state_file()));
    let mut sidebar = SidebarWidth::load(store, config.sidebar_bounds(), config.persist_delay());

    let width = match command {
        SidebarCommands::Get => sidebar.width(),
        SidebarCommands::Set { width: requested } => {
            let applied = sidebar.set_width(*requested);
            if applied != *requested {
                let bounds = sidebar.bounds();
                eprintln!(
                    "{}{}",
                    WARN,
                    style(format!(
                        "Width {} is outside {}..={}, using {}",
                        requested, bounds.min, bounds.max, applied
                    ))
                    .yellow()
                );
            }
            applied
        }
        SidebarCommands::Resize { delta } => sidebar.resize_by(*delta),
        SidebarCommands::Reset => sidebar.reset(),
    };

    sidebar
        .flush()
        .await
        .with_context(|| format!("Failed to save state to {}", config.state_file().display()))?;
    println!("{}", width);
    Ok(())
}

//! `gitdesk pull`.

use anyhow::Result;
use gitdesk::config::GitdeskConfig;
use gitdesk::git::{GitPull, PullOptions, PullProgress, Repo};
use gitdesk::ui::PullUI;
use tracing::info;

use super::super::PullArgs;

/// Resolve the pull options from flags, gitdesk.toml and the repository.
///
/// Explicit flags win, then `[pull]` in gitdesk.toml, then the repository's
/// own `pull.rebase`.
fn pull_options(config: &GitdeskConfig, repo: &Repo, args: &PullArgs) -> Result<PullOptions> {
    let remote = match &args.remote {
        Some(remote) => remote.clone(),
        None => repo.default_remote()?,
    };

    let mut options = PullOptions::new(remote);
    options.branch = args.branch.clone();
    options.recurse_submodules =
        config.toml.pull.recurse_submodules && !args.no_recurse_submodules;
    options.rebase = if args.rebase {
        Some(true)
    } else if args.no_rebase {
        Some(false)
    } else {
        config.toml.pull.rebase.or_else(|| repo.pull_rebase())
    };
    Ok(options)
}

/// One JSON-lines record for `--json` output.
fn json_line(event: &PullProgress) -> String {
    serde_json::to_string(event).expect("PullProgress has only JSON-representable fields")
}

pub async fn cmd_pull(config: &GitdeskConfig, args: &PullArgs) -> Result<()> {
    let repo = Repo::open(&config.repo_dir)?;
    let options = pull_options(config, &repo, args)?;
    let runner = GitPull::new(config.git_cmd(), repo.workdir());
    let head_before = repo.head_sha();

    if args.quiet {
        runner.run(&options, None::<fn(PullProgress)>).await?;
        info!(updated = repo.head_sha() != head_before, "Pull finished");
        return Ok(());
    }

    if args.json {
        runner
            .run(
                &options,
                Some(|event: PullProgress| println!("{}", json_line(&event))),
            )
            .await?;
        info!(updated = repo.head_sha() != head_before, "Pull finished");
        return Ok(());
    }

    let ui = PullUI::new(&options.remote, config.verbose);
    match runner
        .run(&options, Some(|event: PullProgress| ui.handle(&event)))
        .await
    {
        Ok(output) => {
            let summary = if repo.head_sha() == head_before {
                "Already up to date."
            } else {
                output.summary().unwrap_or("Pull complete")
            };
            ui.finish_success(summary);
            Ok(())
        }
        Err(e) => {
            ui.finish_error(&e.to_string());
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_line_is_single_line_event() {
        let line = json_line(&PullProgress::update(
            "origin",
            "Receiving objects:  50% (5/10)",
            Some(0.45),
        ));
        assert!(!line.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["kind"], "pull");
        assert_eq!(value["description"], "Receiving objects:  50% (5/10)");
        assert_eq!(value["value"], 0.45);

        let started = json_line(&PullProgress::started("origin"));
        assert!(started.contains("\"value\":0.0"));
        assert!(!started.contains("description"));
    }
}

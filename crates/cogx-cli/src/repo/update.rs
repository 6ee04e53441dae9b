//! Repo update command - fetch new commits for git repos.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use cogx_pm::{Error, UpdateResult};
use console::style;

use crate::context::App;

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Repos to update; all repos when omitted
    #[arg(value_name = "REPOS")]
    pub repos: Vec<String>,
}

pub async fn execute(args: UpdateArgs, data_dir: Option<PathBuf>) -> Result<i32> {
    let mut app = App::load(data_dir).await?;

    let mut updated = Vec::new();
    let mut failures = 0;

    if args.repos.is_empty() {
        for (name, result) in app.manager.update_all().await {
            match result {
                Ok(result) => updated.push(result),
                Err(err) => {
                    eprintln!(
                        "{} Failed to update `{}`: {}",
                        style("Error:").red().bold(),
                        name,
                        err
                    );
                    failures += 1;
                }
            }
        }
    } else {
        for name in &args.repos {
            match app.manager.update_repo(name).await {
                Ok(Some(result)) => updated.push(result),
                Ok(None) => {}
                Err(Error::MissingRepo(name)) => {
                    eprintln!(
                        "{} There is no repo named `{}`.",
                        style("Error:").red().bold(),
                        name
                    );
                    failures += 1;
                }
                Err(Error::UpdateNotSupported(name)) => {
                    eprintln!(
                        "{} The repo `{}` is a local folder and cannot be updated.",
                        style("Error:").red().bold(),
                        name
                    );
                    failures += 1;
                }
                Err(err) => {
                    eprintln!(
                        "{} Failed to update `{}`: {}",
                        style("Error:").red().bold(),
                        name,
                        err
                    );
                    failures += 1;
                }
            }
        }
    }

    if updated.is_empty() {
        if failures == 0 {
            println!("All repos are already up to date.");
        }
        return Ok(if failures == 0 { 0 } else { 1 });
    }

    for result in &updated {
        print_result(result);
    }

    Ok(if failures == 0 { 0 } else { 1 })
}

fn print_result(result: &UpdateResult) {
    println!(
        "{} Repo `{}` updated{}.",
        style("✓").green().bold(),
        result.repo_name,
        match (&result.old_version, &result.new_version) {
            (Some(old), Some(new)) => format!(" ({} -> {})", short_hash(old), short_hash(new)),
            _ => String::new(),
        }
    );

    for (label, lists) in [
        ("New", &result.new),
        ("Updated", &result.updated),
        ("Removed", &result.removed),
    ] {
        if lists.is_empty() {
            continue;
        }

        let names: Vec<&str> = lists
            .cogs
            .iter()
            .chain(&lists.shared_libraries)
            .chain(&lists.others)
            .map(|m| m.name.as_str())
            .collect();
        println!("    {}: {}", style(label).bold(), names.join(", "));
    }
}

fn short_hash(hash: &str) -> &str {
    if hash.len() > 7 {
        &hash[..7]
    } else {
        hash
    }
}

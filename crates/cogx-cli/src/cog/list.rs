//! Cog list command.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use cogx_pm::Repo;
use console::style;

use crate::context::App;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only list cogs from this repo
    #[arg(value_name = "REPO")]
    pub repo: Option<String>,

    /// Include hidden cogs
    #[arg(long)]
    pub all: bool,
}

pub async fn execute(args: ListArgs, data_dir: Option<PathBuf>) -> Result<i32> {
    let app = App::load(data_dir).await?;

    let repos = match &args.repo {
        Some(name) => match app.manager.get_repo(name) {
            Some(repo) => vec![repo],
            None => {
                eprintln!(
                    "{} There is no repo named `{}`.",
                    style("Error:").red().bold(),
                    name
                );
                return Ok(1);
            }
        },
        None => app.manager.all_repos(),
    };

    let installed: Vec<_> = app.installed.modules().to_vec();
    let is_installed =
        |repo: &str, cog: &str| installed.iter().any(|m| m.repo_name == repo && m.cog_name == cog);

    let mut printed_any = false;

    for repo in repos {
        let mut available = Vec::new();
        let mut already_installed = Vec::new();

        for cog in repo.available_cogs() {
            if cog.info.hidden && !args.all {
                continue;
            }

            if is_installed(repo.name(), &cog.name) {
                already_installed.push(cog);
            } else {
                available.push(cog);
            }
        }

        if available.is_empty() && already_installed.is_empty() {
            continue;
        }

        printed_any = true;
        println!("{} {}", style("Repo:").bold(), repo.name());

        if !already_installed.is_empty() {
            println!("  {}", style("Installed Cogs:").bold());
            for cog in already_installed {
                let short = cog.info.short.as_deref().unwrap_or("(no description)");
                println!("    {} {}", style(&cog.name).cyan(), short);
            }
        }

        if !available.is_empty() {
            println!("  {}", style("Available Cogs:").bold());
            for cog in available {
                let short = cog.info.short.as_deref().unwrap_or("(no description)");
                println!("    {} {}", style(&cog.name).cyan(), short);
            }
        }
    }

    if !printed_any {
        println!("There are no cogs to list.");
    }

    Ok(0)
}

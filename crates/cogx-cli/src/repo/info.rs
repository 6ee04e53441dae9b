//! Repo info command.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use cogx_pm::Repo;
use console::style;

use crate::context::App;

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Name of the repo
    #[arg(value_name = "NAME")]
    pub name: String,
}

pub async fn execute(args: InfoArgs, data_dir: Option<PathBuf>) -> Result<i32> {
    let app = App::load(data_dir).await?;

    let Some(repo) = app.manager.get_repo(&args.name) else {
        eprintln!(
            "{} There is no repo named `{}`.",
            style("Error:").red().bold(),
            args.name
        );
        return Ok(1);
    };

    println!("{} {}", style("Repo:").bold(), repo.name());

    if let Some(url) = repo.url() {
        println!("{} {}", style("URL:").bold(), url);
    }

    let info = repo.repo_info();

    if !info.author.is_empty() {
        println!("{} {}", style("Authors:").bold(), info.author.join(", "));
    }

    if let Some(description) = info.description.as_deref().or(info.short.as_deref()) {
        println!("\n{description}");
    }

    let cogs = repo.available_cogs();
    let visible: Vec<_> = cogs.iter().filter(|c| !c.info.hidden).collect();

    if visible.is_empty() {
        println!("\nThere are no cogs in this repo.");
    } else {
        println!("\n{}", style("Available Cogs:").bold());
        for cog in visible {
            let short = cog.info.short.as_deref().unwrap_or("(no description)");
            println!("  {} {}", style(&cog.name).cyan(), short);
        }
    }

    Ok(0)
}

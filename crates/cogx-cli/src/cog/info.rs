//! Cog info command.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use cogx_pm::Repo;
use console::style;

use crate::context::App;

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Repo the cog lives in
    #[arg(value_name = "REPO")]
    pub repo: String,

    /// Name of the cog
    #[arg(value_name = "COG")]
    pub cog: String,
}

pub async fn execute(args: InfoArgs, data_dir: Option<PathBuf>) -> Result<i32> {
    let app = App::load(data_dir).await?;

    let Some(repo) = app.manager.get_repo(&args.repo) else {
        eprintln!(
            "{} There is no repo named `{}`.",
            style("Error:").red().bold(),
            args.repo
        );
        return Ok(1);
    };

    let Some(cog) = repo
        .available_modules()
        .iter()
        .find(|m| m.name == args.cog)
    else {
        eprintln!(
            "{} There is no cog by the name of `{}` in the `{}` repo.",
            style("Error:").red().bold(),
            args.cog,
            args.repo
        );
        return Ok(1);
    };

    let info = &cog.info;

    println!("{} {} (from `{}`)", style("Cog:").bold(), cog.name, args.repo);

    if !info.author.is_empty() {
        println!("{} {}", style("Authors:").bold(), info.author.join(", "));
    }

    println!(
        "{} {}",
        style("Min bot version:").bold(),
        info.bot_version
    );

    if !info.requirements.is_empty() {
        println!(
            "{} {}",
            style("Requirements:").bold(),
            info.requirements.join(", ")
        );
    }

    if !info.required_cogs.is_empty() {
        let required: Vec<&str> = info.required_cogs.keys().map(String::as_str).collect();
        println!("{} {}", style("Required cogs:").bold(), required.join(", "));
    }

    if !info.tags.is_empty() {
        println!("{} {}", style("Tags:").bold(), info.tags.join(", "));
    }

    if let Some(version) = app.installed.get(&cog.name).and_then(|m| m.cog_version.as_deref()) {
        println!("{} {}", style("Installed at:").bold(), version);
    }

    if let Some(description) = info.description.as_deref().or(info.short.as_deref()) {
        println!("\n{description}");
    }

    Ok(0)
}

//! Cog uninstall command.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use console::style;

use crate::context::App;

#[derive(Args, Debug)]
pub struct UninstallArgs {
    /// Cogs to uninstall
    #[arg(value_name = "COGS", required = true)]
    pub cogs: Vec<String>,
}

pub async fn execute(args: UninstallArgs, data_dir: Option<PathBuf>) -> Result<i32> {
    let mut app = App::load(data_dir).await?;

    let mut failures = 0;
    let mut removed_any = false;

    for name in &args.cogs {
        let Some(record) = app.installed.get(name).cloned() else {
            eprintln!(
                "{} `{}` is not an installed cog.",
                style("Error:").red().bold(),
                name
            );
            failures += 1;
            continue;
        };

        // The record outlives the files if they were removed by hand; keep
        // it so the situation stays visible instead of silently vanishing.
        if !app.settings.install_path.join(name).exists() {
            eprintln!(
                "{} The cog `{}` is installed but its files can no longer be located in {}.",
                style("Error:").red().bold(),
                name,
                app.settings.install_path.display()
            );
            failures += 1;
            continue;
        }

        app.delete_cog_files(name).await?;
        app.installed.remove(&record.cog_name, &record.repo_name);
        removed_any = true;

        println!(
            "{} Cog `{}` successfully uninstalled.",
            style("✓").green().bold(),
            name
        );
    }

    if removed_any {
        app.save_installed().await?;
    }

    Ok(if failures == 0 { 0 } else { 1 })
}

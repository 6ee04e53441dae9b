//! Cog install command.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use cogx_pm::{Installable, ModuleType, Repo};
use console::style;

use crate::context::App;

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Repo to install from
    #[arg(value_name = "REPO")]
    pub repo: String,

    /// Cogs to install
    #[arg(value_name = "COGS", required = true)]
    pub cogs: Vec<String>,

    /// Install even if the cog declares a newer minimum bot version
    #[arg(long)]
    pub force: bool,
}

pub async fn execute(args: InstallArgs, data_dir: Option<PathBuf>) -> Result<i32> {
    let mut app = App::load(data_dir).await?;

    let Some(repo) = app.manager.get_repo(&args.repo) else {
        eprintln!(
            "{} There is no repo named `{}`.",
            style("Error:").red().bold(),
            args.repo
        );
        return Ok(1);
    };

    // Resolve every requested name before touching anything.
    let mut to_install: Vec<Installable> = Vec::new();
    let mut failures = 0;

    for name in &args.cogs {
        let Some(cog) = repo
            .available_modules()
            .iter()
            .find(|m| m.name == *name && m.info.module_type == ModuleType::Cog)
        else {
            eprintln!(
                "{} There is no cog by the name of `{}` in the `{}` repo.",
                style("Error:").red().bold(),
                name,
                args.repo
            );
            failures += 1;
            continue;
        };

        if cog.info.disabled {
            eprintln!(
                "{} The cog `{}` is disabled and cannot be installed.",
                style("Error:").red().bold(),
                name
            );
            failures += 1;
            continue;
        }

        if cog.info.bot_version > app.settings.bot_version && !args.force {
            eprintln!(
                "{} The cog `{}` requires at least bot version {} (configured: {}). Pass --force to install anyway.",
                style("Error:").red().bold(),
                name,
                cog.info.bot_version,
                app.settings.bot_version
            );
            failures += 1;
            continue;
        }

        to_install.push(cog.clone());
    }

    if to_install.is_empty() {
        return Ok(1);
    }

    let ctx = app.install_context();
    let mut installed_any = false;

    for cog in &to_install {
        if !app.manager.install_requirements(cog, None).await? {
            eprintln!(
                "{} Failed to install the required libraries for `{}`: {}",
                style("Error:").red().bold(),
                cog.name,
                cog.info.requirements.join(", ")
            );
            failures += 1;
            continue;
        }

        if !repo.install_cog(&ctx, cog).await? {
            eprintln!(
                "{} Failed to copy `{}` into the install path.",
                style("Error:").red().bold(),
                cog.name
            );
            failures += 1;
            continue;
        }

        let version = repo.module_version(cog).await.unwrap_or_default();
        app.installed.add(cog.to_record(version));
        installed_any = true;

        println!(
            "{} Cog `{}` successfully installed.",
            style("✓").green().bold(),
            cog.name
        );

        if let Some(install_msg) = &cog.info.install_msg {
            println!("\n{}", app.settings.format_install_msg(install_msg));
        }

        if !cog.info.required_cogs.is_empty() {
            let required: Vec<&str> = cog.info.required_cogs.keys().map(String::as_str).collect();
            println!(
                "{} `{}` depends on other cogs that must be installed separately: {}",
                style("Note:").cyan(),
                cog.name,
                required.join(", ")
            );
        }
    }

    if installed_any {
        for failed in repo.install_libraries(&ctx, &[]).await? {
            eprintln!(
                "{} Failed to install the shared library `{}`.",
                style("Warning:").yellow().bold(),
                failed.name
            );
        }

        app.save_installed().await?;
    }

    Ok(if failures == 0 { 0 } else { 1 })
}

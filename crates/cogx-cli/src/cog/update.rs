//! Cog update command - update repos, then reinstall the installed cogs
//! that changed.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use cogx_pm::{Installable, Repo};
use console::style;

use crate::context::App;

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Cogs to update; all installed cogs when omitted
    #[arg(value_name = "COGS")]
    pub cogs: Vec<String>,
}

pub async fn execute(args: UpdateArgs, data_dir: Option<PathBuf>) -> Result<i32> {
    let mut app = App::load(data_dir).await?;

    let mut failures = 0;

    for (name, result) in app.manager.update_all().await {
        if let Err(err) = result {
            eprintln!(
                "{} Failed to update `{}`: {}",
                style("Error:").red().bold(),
                name,
                err
            );
            failures += 1;
        }
    }

    // Repos changed on disk; resolve installed records against the fresh
    // module lists.
    let installed = app.installed.resolve(&app.manager);

    let selected: Vec<&Installable> = if args.cogs.is_empty() {
        installed.iter().collect()
    } else {
        let mut selected = Vec::new();
        for name in &args.cogs {
            match installed.iter().find(|c| c.name == *name) {
                Some(cog) => selected.push(cog),
                None => {
                    eprintln!(
                        "{} `{}` is not an installed cog.",
                        style("Error:").red().bold(),
                        name
                    );
                    failures += 1;
                }
            }
        }
        selected
    };

    // A cog needs reinstalling when its recorded version no longer matches
    // the repo's version for it.
    let mut outdated: Vec<&Installable> = Vec::new();

    for cog in &selected {
        let record = match app.installed.get(&cog.name) {
            Some(record) => record,
            None => continue,
        };

        let repo = match app.manager.get_repo(&cog.repo_name) {
            Some(repo) => repo,
            None => continue,
        };

        let current = repo.module_version(cog).await.unwrap_or_default();

        if record.cog_version.is_none() || record.cog_version != current {
            outdated.push(cog);
        }
    }

    if outdated.is_empty() {
        if failures == 0 {
            println!("All installed cogs are already up to date.");
        }
        return Ok(if failures == 0 { 0 } else { 1 });
    }

    let failed_reqs = app.reinstall_requirements(&outdated).await?;
    let failed_names: HashSet<&str> = failed_reqs.iter().map(|c| c.name.as_str()).collect();

    for cog in &failed_reqs {
        eprintln!(
            "{} Failed to install the required libraries for `{}`: {}",
            style("Error:").red().bold(),
            cog.name,
            cog.info.requirements.join(", ")
        );
        failures += 1;
    }

    let to_reinstall: Vec<&Installable> = outdated
        .iter()
        .copied()
        .filter(|c| !failed_names.contains(c.name.as_str()))
        .collect();

    let failed_copies = app.reinstall_cogs(&to_reinstall).await?;
    for cog in &failed_copies {
        eprintln!(
            "{} Failed to copy `{}` into the install path.",
            style("Error:").red().bold(),
            cog.name
        );
        failures += 1;
    }

    for failed in app.reinstall_libraries().await? {
        eprintln!(
            "{} Failed to install the shared library `{}`.",
            style("Warning:").yellow().bold(),
            failed.name
        );
    }

    let failed_copy_names: HashSet<&str> =
        failed_copies.iter().map(|c| c.name.as_str()).collect();
    let mut updated_records = Vec::new();

    for cog in &to_reinstall {
        if failed_copy_names.contains(cog.name.as_str()) {
            continue;
        }

        let version = match app.manager.get_repo(&cog.repo_name) {
            Some(repo) => repo.module_version(cog).await.unwrap_or_default(),
            None => None,
        };
        updated_records.push(cog.to_record(version));
    }

    print_updated(&to_reinstall, &failed_copy_names);

    for record in updated_records {
        app.installed.add(record);
    }
    app.save_installed().await?;

    Ok(if failures == 0 { 0 } else { 1 })
}

fn print_updated(cogs: &[&Installable], failed: &HashSet<&str>) {
    let mut by_repo: Vec<(&str, Vec<&str>)> = Vec::new();

    for cog in cogs {
        if failed.contains(cog.name.as_str()) {
            continue;
        }

        match by_repo.iter_mut().find(|(repo, _)| *repo == cog.repo_name) {
            Some((_, names)) => names.push(&cog.name),
            None => by_repo.push((&cog.repo_name, vec![&cog.name])),
        }
    }

    if by_repo.is_empty() {
        return;
    }

    println!("{}", style("Updated cogs:").bold());
    for (repo, names) in by_repo {
        println!("  {}:", style(repo).cyan());
        for name in names {
            println!("    + {name}");
        }
    }
}

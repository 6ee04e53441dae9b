//! Repo add command - clone and register a git repo.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use cogx_pm::{Error, Repo};
use console::style;

use crate::context::App;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Name for the repo
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Git URL to clone. GitHub/GitLab `/tree/<branch>` URLs select the
    /// branch automatically
    #[arg(value_name = "URL")]
    pub url: String,

    /// Branch to track
    #[arg(value_name = "BRANCH")]
    pub branch: Option<String>,
}

pub async fn execute(args: AddArgs, data_dir: Option<PathBuf>) -> Result<i32> {
    let mut app = App::load(data_dir).await?;

    let repo = match app
        .manager
        .add_git_repo(&args.name, &args.url, args.branch.as_deref())
        .await
    {
        Ok(repo) => repo,
        Err(Error::InvalidRepoName(name)) => {
            eprintln!(
                "{} `{}` is not a valid repository name. Repo names can only contain letters, numbers and underscores, and cannot start with a number.",
                style("Error:").red().bold(),
                name
            );
            return Ok(1);
        }
        Err(Error::ExistingGitRepo(_)) => {
            eprintln!(
                "{} The repo name you provided is already in use. Please choose another name.",
                style("Error:").red().bold()
            );
            return Ok(1);
        }
        Err(Error::Cloning(stderr)) => {
            eprintln!(
                "{} Failed to clone the repo: {}",
                style("Error:").red().bold(),
                stderr
            );
            return Ok(1);
        }
        Err(err) => return Err(err.into()),
    };

    println!(
        "{} Repo `{}` successfully added.",
        style("✓").green().bold(),
        repo.name()
    );

    if let Some(install_msg) = &repo.repo_info().install_msg {
        println!("\n{}", app.settings.format_install_msg(install_msg));
    }

    Ok(0)
}

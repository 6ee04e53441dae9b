//! Repo list command.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use cogx_pm::Repo;
use console::style;

use crate::context::App;

#[derive(Args, Debug)]
pub struct ListArgs {}

pub async fn execute(_args: ListArgs, data_dir: Option<PathBuf>) -> Result<i32> {
    let app = App::load(data_dir).await?;

    let repos = app.manager.all_repos();

    if repos.is_empty() {
        println!("There are no repos installed.");
        return Ok(0);
    }

    println!("{}", style("Installed Repos:").bold());

    for repo in repos {
        println!("{}", repo_line(repo));
    }

    Ok(0)
}

fn repo_line(repo: &dyn Repo) -> String {
    let short = repo
        .repo_info()
        .short
        .as_deref()
        .unwrap_or("(no description)");
    format!("+ {}: {}", style(repo.name()).cyan(), short)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogx_pm::FolderRepo;

    #[test]
    fn test_repo_line_format() {
        let tmp = tempfile::tempdir().unwrap();
        let folder = tmp.path().join("testrepo");
        std::fs::create_dir_all(&folder).unwrap();
        std::fs::write(folder.join("info.json"), r#"{"short": "Test cogs"}"#).unwrap();

        console::set_colors_enabled(false);
        let repo = FolderRepo::from_folder(&folder).unwrap();
        assert_eq!(repo_line(&repo), "+ testrepo: Test cogs");
    }
}

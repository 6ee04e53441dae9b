//! Repo subcommands.

mod add;
mod delete;
mod info;
mod list;
mod update;

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;

pub use add::AddArgs;
pub use delete::DeleteArgs;
pub use info::InfoArgs;
pub use list::ListArgs;
pub use update::UpdateArgs;

#[derive(Subcommand, Debug)]
pub enum RepoCommands {
    /// Add a repo by cloning a git URL
    Add(AddArgs),

    /// Delete a repo and its files
    #[command(alias = "del")]
    Delete(DeleteArgs),

    /// List all repos
    List(ListArgs),

    /// Show information about a repo
    Info(InfoArgs),

    /// Update repos from their remotes
    Update(UpdateArgs),
}

pub async fn execute(command: RepoCommands, data_dir: Option<PathBuf>) -> Result<i32> {
    match command {
        RepoCommands::Add(args) => add::execute(args, data_dir).await,
        RepoCommands::Delete(args) => delete::execute(args, data_dir).await,
        RepoCommands::List(args) => list::execute(args, data_dir).await,
        RepoCommands::Info(args) => info::execute(args, data_dir).await,
        RepoCommands::Update(args) => update::execute(args, data_dir).await,
    }
}

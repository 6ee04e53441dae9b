//! Cog subcommands.

mod info;
mod install;
mod list;
mod uninstall;
mod update;

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;

pub use info::InfoArgs;
pub use install::InstallArgs;
pub use list::ListArgs;
pub use uninstall::UninstallArgs;
pub use update::UpdateArgs;

#[derive(Subcommand, Debug)]
pub enum CogCommands {
    /// Install cogs from a repo
    Install(InstallArgs),

    /// Uninstall cogs
    Uninstall(UninstallArgs),

    /// Update repos and reinstall changed cogs
    Update(UpdateArgs),

    /// List available and installed cogs
    List(ListArgs),

    /// Show information about a cog
    Info(InfoArgs),
}

pub async fn execute(command: CogCommands, data_dir: Option<PathBuf>) -> Result<i32> {
    match command {
        CogCommands::Install(args) => install::execute(args, data_dir).await,
        CogCommands::Uninstall(args) => uninstall::execute(args, data_dir).await,
        CogCommands::Update(args) => update::execute(args, data_dir).await,
        CogCommands::List(args) => list::execute(args, data_dir).await,
        CogCommands::Info(args) => info::execute(args, data_dir).await,
    }
}

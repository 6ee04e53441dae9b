//! cogx - cog repository manager.

mod cog;
mod config;
mod context;
mod pipinstall;
mod repo;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "cogx", about = "Manage cog repos and installed cogs", version)]
struct Cli {
    /// Data directory (repos, installed cogs, config.toml)
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage cog repos
    #[command(subcommand)]
    Repo(repo::RepoCommands),

    /// Manage installed cogs
    #[command(subcommand)]
    Cog(cog::CogCommands),

    /// Install Python packages with pip
    Pipinstall(pipinstall::PipinstallArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Repo(command) => repo::execute(command, cli.data_dir).await?,
        Commands::Cog(command) => cog::execute(command, cli.data_dir).await?,
        Commands::Pipinstall(args) => pipinstall::execute(args, cli.data_dir).await?,
    };

    std::process::exit(exit_code);
}

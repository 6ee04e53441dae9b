//! Repo delete command.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use cogx_pm::Error;
use console::style;

use crate::context::App;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Name of the repo to delete
    #[arg(value_name = "NAME")]
    pub name: String,
}

pub async fn execute(args: DeleteArgs, data_dir: Option<PathBuf>) -> Result<i32> {
    let mut app = App::load(data_dir).await?;

    match app.manager.delete_repo(&args.name).await {
        Ok(()) => {}
        Err(Error::MissingRepo(name)) => {
            eprintln!(
                "{} There is no repo named `{}`.",
                style("Error:").red().bold(),
                name
            );
            return Ok(1);
        }
        Err(err) => return Err(err.into()),
    }

    // Records for cogs from this repo are kept; they resolve again if the
    // repo is re-added under the same name.
    println!(
        "{} The repo `{}` has been deleted successfully.",
        style("✓").green().bold(),
        args.name
    );

    Ok(0)
}

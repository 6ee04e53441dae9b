//! Pipinstall command - install Python packages through the configured
//! interpreter's pip.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use console::style;

use crate::context::App;

#[derive(Args, Debug)]
pub struct PipinstallArgs {
    /// Packages to install
    #[arg(value_name = "PACKAGES", required = true)]
    pub packages: Vec<String>,

    /// Install into the shared library path instead of the default
    /// site-packages
    #[arg(long)]
    pub target_libs: bool,
}

pub async fn execute(args: PipinstallArgs, data_dir: Option<PathBuf>) -> Result<i32> {
    let app = App::load(data_dir).await?;

    let target_dir = args.target_libs.then(|| app.settings.lib_path.clone());

    if app
        .manager
        .pip_install(&args.packages, target_dir.as_deref())
        .await?
    {
        println!(
            "{} Successfully installed: {}",
            style("✓").green().bold(),
            args.packages.join(", ")
        );
        Ok(0)
    } else {
        eprintln!(
            "{} Failed to install the packages: {}",
            style("Error:").red().bold(),
            args.packages.join(", ")
        );
        Ok(1)
    }
}

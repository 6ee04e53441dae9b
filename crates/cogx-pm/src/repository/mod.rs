//! Repo implementations and the repo manager.

mod folder;
mod git;
mod manager;

pub use folder::FolderRepo;
pub use git::GitRepo;
pub use manager::RepoManager;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::info::{ModuleType, RepoInfo};
use crate::installable::Installable;
use crate::tracker::{UpdateResult, UpdateSnapshot};
use crate::Result;

/// Target paths for an installation, supplied by the caller.
#[derive(Debug, Clone)]
pub struct InstallContext {
    /// Where cogs are copied to.
    pub install_path: PathBuf,
    /// Where shared libraries are copied to.
    pub shared_lib_path: PathBuf,
}

/// A source of installable modules rooted at a folder on disk.
#[async_trait]
pub trait Repo: std::fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn folder_path(&self) -> &Path;

    /// Repo-level metadata from the root `info.json`.
    fn repo_info(&self) -> &RepoInfo;

    /// The remote URL, for repo kinds that have one.
    fn url(&self) -> Option<&str> {
        None
    }

    fn available_modules(&self) -> &[Installable];

    /// (Re)populate the repo's data from disk.
    fn populate(&mut self) -> Result<()>;

    /// Fetch new contents from the repo's source. Errors with
    /// `Error::UpdateNotSupported` for repo kinds without a source.
    async fn sync(&mut self) -> Result<()>;

    /// The overall version of the repo's contents (a commit hash for git
    /// repos), or `None` when the repo kind has no notion of a version.
    async fn repo_version(&self) -> Result<Option<String>>;

    /// The version of a single module, or `None` when unavailable.
    async fn module_version(&self, module: &Installable) -> Result<Option<String>>;

    /// Delete the repo's files.
    async fn delete(&self) -> Result<()>;

    /// Install a cog from this repo into `ctx.install_path`.
    ///
    /// The cog must belong to this repo and be available; the install target
    /// must be an existing directory. Returns whether the copy succeeded.
    async fn install_cog(&self, ctx: &InstallContext, cog: &Installable) -> Result<bool>;

    /// Install shared libraries into `ctx.shared_lib_path`. An empty
    /// `libraries` slice installs every available library. Returns the
    /// libraries that failed to install.
    async fn install_libraries(
        &self,
        ctx: &InstallContext,
        libraries: &[Installable],
    ) -> Result<Vec<Installable>>;

    /// All modules of type COG that are not disabled.
    ///
    /// Hidden cogs are included; hiding only affects listings.
    fn available_cogs(&self) -> Vec<&Installable> {
        self.available_modules()
            .iter()
            .filter(|m| m.info.module_type == ModuleType::Cog && !m.info.disabled)
            .collect()
    }

    /// All modules of type SHARED_LIBRARY.
    fn available_libraries(&self) -> Vec<&Installable> {
        self.available_modules()
            .iter()
            .filter(|m| m.info.module_type == ModuleType::SharedLibrary)
            .collect()
    }

    /// Sync the repo and report what changed, or `None` when already up to
    /// date.
    async fn update(&mut self) -> Result<Option<UpdateResult>> {
        let snapshot = UpdateSnapshot::capture(self).await?;
        self.sync().await?;
        snapshot.compare(self).await
    }
}

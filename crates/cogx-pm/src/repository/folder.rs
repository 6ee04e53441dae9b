//! Plain folder repos: a directory of module folders with no remote.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::errors::Error;
use crate::info::RepoInfo;
use crate::installable::Installable;
use crate::Result;

use super::{InstallContext, Repo};

/// A repo backed by nothing but a folder on disk. Cannot sync and has no
/// version information.
#[derive(Debug)]
pub struct FolderRepo {
    name: String,
    folder_path: PathBuf,
    info: RepoInfo,
    modules: Vec<Installable>,
}

impl FolderRepo {
    pub fn new(name: String, folder_path: PathBuf) -> Self {
        Self {
            name,
            folder_path,
            info: RepoInfo::default(),
            modules: Vec::new(),
        }
    }

    /// Build a repo from an existing folder, using the folder name as the
    /// repo name.
    pub fn from_folder(folder: &Path) -> Result<Self> {
        let name = folder
            .file_name()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .ok_or_else(|| Error::InvalidRepoName(folder.display().to_string()))?;

        let mut repo = Self::new(name, folder.to_path_buf());
        repo.read_info();
        repo.rescan_modules()?;
        Ok(repo)
    }

    pub(super) fn read_info(&mut self) {
        self.info = RepoInfo::load(&self.folder_path).unwrap_or_default();
    }

    /// Rescan the folder: every direct subdirectory that is not a dot-dir
    /// becomes a module.
    pub(super) fn rescan_modules(&mut self) -> Result<()> {
        let mut modules = Vec::new();

        for entry in std::fs::read_dir(&self.folder_path)? {
            let entry = entry?;
            let path = entry.path();

            if !path.is_dir() {
                continue;
            }

            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }

            modules.push(Installable::new(self.name.clone(), path));
        }

        modules.sort_by(|a, b| a.name.cmp(&b.name));
        self.modules = modules;
        Ok(())
    }
}

#[async_trait]
impl Repo for FolderRepo {
    fn name(&self) -> &str {
        &self.name
    }

    fn folder_path(&self) -> &Path {
        &self.folder_path
    }

    fn repo_info(&self) -> &RepoInfo {
        &self.info
    }

    fn available_modules(&self) -> &[Installable] {
        &self.modules
    }

    fn populate(&mut self) -> Result<()> {
        std::fs::create_dir_all(&self.folder_path)?;
        self.read_info();
        self.rescan_modules()
    }

    async fn sync(&mut self) -> Result<()> {
        Err(Error::UpdateNotSupported(self.name.clone()))
    }

    async fn repo_version(&self) -> Result<Option<String>> {
        Ok(None)
    }

    async fn module_version(&self, _module: &Installable) -> Result<Option<String>> {
        Ok(None)
    }

    async fn delete(&self) -> Result<()> {
        if self.folder_path.exists() {
            tokio::fs::remove_dir_all(&self.folder_path).await?;
        }
        Ok(())
    }

    async fn install_cog(&self, ctx: &InstallContext, cog: &Installable) -> Result<bool> {
        if cog.repo_name != self.name {
            return Err(Error::Installation(format!(
                "the {} cog does not belong to the {} repo",
                cog.name, self.name
            )));
        }

        if !self.available_cogs().iter().any(|c| *c == cog) {
            return Err(Error::MissingModule(format!(
                "the {} cog is not available in the {} repo",
                cog.name, self.name
            )));
        }

        let target_dir = &ctx.install_path;

        if !target_dir.exists() {
            return Err(Error::Installation(format!(
                "install target {} does not exist",
                target_dir.display()
            )));
        }

        if !target_dir.is_dir() {
            return Err(Error::Installation(format!(
                "install target {} is not a directory",
                target_dir.display()
            )));
        }

        Ok(cog.copy_to(target_dir).await)
    }

    async fn install_libraries(
        &self,
        ctx: &InstallContext,
        libraries: &[Installable],
    ) -> Result<Vec<Installable>> {
        let available = self.available_libraries();

        let selected: Vec<Installable> = if libraries.is_empty() {
            available.into_iter().cloned().collect()
        } else {
            if libraries.iter().any(|lib| lib.repo_name != self.name) {
                return Err(Error::Installation(format!(
                    "not all libraries belong to the {} repo",
                    self.name
                )));
            }

            if !libraries.iter().all(|lib| available.contains(&lib)) {
                return Err(Error::MissingModule(format!(
                    "not all libraries are available in the {} repo",
                    self.name
                )));
            }

            libraries.to_vec()
        };

        let mut failed = Vec::new();

        for library in selected {
            if !library.copy_to(&ctx.shared_lib_path).await {
                failed.push(library);
            }
        }

        Ok(failed)
    }
}

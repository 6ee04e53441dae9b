//! Shared command state.

use std::path::PathBuf;

use anyhow::{Context, Result};
use cogx_pm::{InstallContext, Installable, InstalledStore, Repo, RepoManager};

use crate::config::{ensure_dir, Settings};

/// Everything a command needs: settings, the repo registry and the
/// installed-state store, loaded from the data directory.
pub struct App {
    pub settings: Settings,
    pub manager: RepoManager,
    pub installed: InstalledStore,
}

impl App {
    pub async fn load(data_dir: Option<PathBuf>) -> Result<Self> {
        let settings = Settings::load(data_dir)?;

        ensure_dir(&settings.data_dir)?;
        ensure_dir(&settings.install_path)?;
        ensure_dir(&settings.lib_path)?;

        let mut manager =
            RepoManager::new(settings.repos_folder()).with_python(settings.python.clone());
        manager
            .load_repos()
            .await
            .context("Failed to load repos from the data directory")?;

        let installed = InstalledStore::load(settings.installed_file())
            .await
            .context("Failed to load the installed-cogs file")?;

        Ok(Self {
            settings,
            manager,
            installed,
        })
    }

    pub fn install_context(&self) -> InstallContext {
        InstallContext {
            install_path: self.settings.install_path.clone(),
            shared_lib_path: self.settings.lib_path.clone(),
        }
    }

    pub async fn save_installed(&self) -> Result<()> {
        self.installed
            .save()
            .await
            .context("Failed to save the installed-cogs file")
    }

    /// Remove an installed cog's files from the install path.
    pub async fn delete_cog_files(&self, cog_name: &str) -> Result<()> {
        let target = self.settings.install_path.join(cog_name);
        if target.exists() {
            tokio::fs::remove_dir_all(&target)
                .await
                .with_context(|| format!("Failed to delete {}", target.display()))?;
        }
        Ok(())
    }

    /// Reinstall the requirements of the given cogs. Returns the cogs whose
    /// requirements failed to install.
    pub async fn reinstall_requirements<'a>(
        &self,
        cogs: &[&'a Installable],
    ) -> Result<Vec<&'a Installable>> {
        let mut failed = Vec::new();

        for cog in cogs {
            if !self.manager.install_requirements(cog, None).await? {
                failed.push(*cog);
            }
        }

        Ok(failed)
    }

    /// Copy the given cogs into the install path again. Returns the cogs
    /// whose copy failed.
    pub async fn reinstall_cogs<'a>(&self, cogs: &[&'a Installable]) -> Result<Vec<&'a Installable>> {
        let ctx = self.install_context();
        let mut failed = Vec::new();

        for cog in cogs {
            let repo = self
                .manager
                .get_repo(&cog.repo_name)
                .with_context(|| format!("Repo `{}` disappeared during update", cog.repo_name))?;

            if !repo.install_cog(&ctx, cog).await? {
                failed.push(*cog);
            }
        }

        Ok(failed)
    }

    /// Reinstall every available shared library of every repo. Returns the
    /// libraries that failed.
    pub async fn reinstall_libraries(&self) -> Result<Vec<Installable>> {
        let ctx = self.install_context();
        let mut failed = Vec::new();

        for repo in self.manager.all_repos() {
            failed.extend(repo.install_libraries(&ctx, &[]).await?);
        }

        Ok(failed)
    }
}

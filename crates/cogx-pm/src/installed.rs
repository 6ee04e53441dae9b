//! Persistence for the set of installed modules.
//!
//! Records are kept in a single JSON file so installs survive restarts and
//! can be re-resolved against the repos they came from.

use std::path::{Path, PathBuf};

use crate::installable::{Installable, InstalledModule};
use crate::repository::RepoManager;
use crate::Result;

/// The on-disk record of everything installed, backed by a JSON file.
pub struct InstalledStore {
    path: PathBuf,
    modules: Vec<InstalledModule>,
}

impl InstalledStore {
    /// Load the store from `path`. A missing file is an empty store.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let modules = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };

        Ok(Self { path, modules })
    }

    pub async fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(&self.modules)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn modules(&self) -> &[InstalledModule] {
        &self.modules
    }

    pub fn get(&self, cog_name: &str) -> Option<&InstalledModule> {
        self.modules.iter().find(|m| m.cog_name == cog_name)
    }

    /// Record a module as installed. Returns whether the record was new;
    /// re-adding an existing module refreshes its stored version.
    pub fn add(&mut self, record: InstalledModule) -> bool {
        if let Some(existing) = self.modules.iter_mut().find(|m| **m == record) {
            existing.cog_version = record.cog_version;
            return false;
        }

        self.modules.push(record);
        true
    }

    /// Drop a record. Returns whether anything was removed.
    pub fn remove(&mut self, cog_name: &str, repo_name: &str) -> bool {
        let before = self.modules.len();
        self.modules
            .retain(|m| !(m.cog_name == cog_name && m.repo_name == repo_name));
        self.modules.len() != before
    }

    /// Resolve every record against the current repos. Records whose repo is
    /// gone are logged and skipped, not dropped from the store.
    pub fn resolve(&self, manager: &RepoManager) -> Vec<Installable> {
        let mut resolved = Vec::with_capacity(self.modules.len());

        for record in &self.modules {
            match Installable::from_record(record, manager) {
                Ok(module) => resolved.push(module),
                Err(err) => {
                    log::warn!(
                        "skipping installed module `{}` from repo `{}`: {}",
                        record.cog_name,
                        record.repo_name,
                        err
                    );
                }
            }
        }

        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installable::FOLDER_TYPE_NAME;

    fn record(cog: &str, repo: &str, version: Option<&str>) -> InstalledModule {
        InstalledModule {
            cog_name: cog.to_string(),
            repo_name: repo.to_string(),
            inst_type: FOLDER_TYPE_NAME.to_string(),
            cog_version: version.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = InstalledStore::load(tmp.path().join("installed.json"))
            .await
            .unwrap();
        assert!(store.modules().is_empty());
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("data/installed.json");

        let mut store = InstalledStore::load(&path).await.unwrap();
        assert!(store.add(record("mycog", "myrepo", Some("abc123"))));
        store.save().await.unwrap();

        let reloaded = InstalledStore::load(&path).await.unwrap();
        assert_eq!(reloaded.modules().len(), 1);
        assert_eq!(
            reloaded.get("mycog").unwrap().cog_version.as_deref(),
            Some("abc123")
        );
    }

    #[tokio::test]
    async fn test_add_refreshes_version() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = InstalledStore::load(tmp.path().join("installed.json"))
            .await
            .unwrap();

        assert!(store.add(record("mycog", "myrepo", Some("old"))));
        assert!(!store.add(record("mycog", "myrepo", Some("new"))));

        assert_eq!(store.modules().len(), 1);
        assert_eq!(store.get("mycog").unwrap().cog_version.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_remove() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = InstalledStore::load(tmp.path().join("installed.json"))
            .await
            .unwrap();

        store.add(record("mycog", "myrepo", None));
        assert!(store.remove("mycog", "myrepo"));
        assert!(!store.remove("mycog", "myrepo"));
        assert!(store.modules().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_skips_missing_repos() {
        let tmp = tempfile::tempdir().unwrap();
        let mut manager = RepoManager::new(tmp.path().join("repos"));
        manager.add_folder_repo("myrepo", None).await.unwrap();

        let mut store = InstalledStore::load(tmp.path().join("installed.json"))
            .await
            .unwrap();
        store.add(record("mycog", "myrepo", None));
        store.add(record("othercog", "gone_repo", None));

        let resolved = store.resolve(&manager);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].name, "mycog");
    }
}

//! Update tracking: snapshot a repo before a sync, compare afterwards.

use std::collections::{HashMap, HashSet};

use crate::info::ModuleType;
use crate::installable::Installable;
use crate::repository::Repo;
use crate::Result;

/// A repo's modules categorized by type.
#[derive(Debug, Clone, Default)]
pub struct ModuleLists {
    pub cogs: Vec<Installable>,
    pub shared_libraries: Vec<Installable>,
    pub others: Vec<Installable>,
}

impl ModuleLists {
    fn categorize(mut modules: Vec<Installable>) -> Self {
        modules.sort_by(|a, b| a.name.cmp(&b.name));

        let mut lists = ModuleLists::default();
        for module in modules {
            match module.info.module_type {
                ModuleType::Cog => lists.cogs.push(module),
                ModuleType::SharedLibrary => lists.shared_libraries.push(module),
                ModuleType::Unknown => lists.others.push(module),
            }
        }
        lists
    }

    pub fn is_empty(&self) -> bool {
        self.cogs.is_empty() && self.shared_libraries.is_empty() && self.others.is_empty()
    }
}

/// The outcome of a repo update.
///
/// `removed` holds the pre-update module objects; they no longer reflect
/// files on disk.
#[derive(Debug, Clone)]
pub struct UpdateResult {
    pub repo_name: String,
    pub old_version: Option<String>,
    pub new_version: Option<String>,
    pub new: ModuleLists,
    pub updated: ModuleLists,
    pub removed: ModuleLists,
}

/// Captures a repo's version and module state so it can be diffed after the
/// repo contents changed.
#[derive(Debug)]
pub struct UpdateSnapshot {
    version: Option<String>,
    modules: HashMap<String, Installable>,
    module_versions: HashMap<String, String>,
}

impl UpdateSnapshot {
    /// Record the repo's current version, modules and module versions.
    pub async fn capture<R>(repo: &R) -> Result<UpdateSnapshot>
    where
        R: Repo + ?Sized,
    {
        let version = repo.repo_version().await?;
        let (modules, module_versions) = collect_modules(repo).await?;

        Ok(UpdateSnapshot {
            version,
            modules,
            module_versions,
        })
    }

    /// Diff the repo's current state against this snapshot.
    ///
    /// Returns `None` when nothing changed. When the repo type reports no
    /// per-module versions, every module present on both sides counts as
    /// updated.
    pub async fn compare<R>(&self, repo: &R) -> Result<Option<UpdateResult>>
    where
        R: Repo + ?Sized,
    {
        let version = repo.repo_version().await?;
        let (modules, module_versions) = collect_modules(repo).await?;

        let old_names: HashSet<&str> = self.modules.keys().map(String::as_str).collect();
        let current_names: HashSet<&str> = modules.keys().map(String::as_str).collect();

        let new: HashSet<&str> = current_names.difference(&old_names).copied().collect();
        let removed: HashSet<&str> = old_names.difference(&current_names).copied().collect();
        let inter: HashSet<&str> = current_names.intersection(&old_names).copied().collect();

        let updated: HashSet<&str> = if module_versions.is_empty() {
            inter
        } else {
            inter
                .into_iter()
                .filter(|name| module_versions.get(*name) != self.module_versions.get(*name))
                .collect()
        };

        if version == self.version && new.is_empty() && updated.is_empty() && removed.is_empty() {
            return Ok(None);
        }

        let pick = |names: &HashSet<&str>, source: &HashMap<String, Installable>| {
            names
                .iter()
                .filter_map(|name| source.get(*name).cloned())
                .collect::<Vec<_>>()
        };

        Ok(Some(UpdateResult {
            repo_name: repo.name().to_string(),
            old_version: self.version.clone(),
            new_version: version,
            new: ModuleLists::categorize(pick(&new, &modules)),
            updated: ModuleLists::categorize(pick(&updated, &modules)),
            removed: ModuleLists::categorize(pick(&removed, &self.modules)),
        }))
    }
}

async fn collect_modules<R>(
    repo: &R,
) -> Result<(HashMap<String, Installable>, HashMap<String, String>)>
where
    R: Repo + ?Sized,
{
    let mut modules = HashMap::new();
    let mut versions = HashMap::new();

    for module in repo.available_modules() {
        if let Some(version) = repo.module_version(module).await? {
            versions.insert(module.name.clone(), version);
        }
        modules.insert(module.name.clone(), module.clone());
    }

    Ok((modules, versions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::FolderRepo;
    use std::path::Path;

    fn add_module(repo_path: &Path, name: &str, info_json: &str) {
        let dir = repo_path.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(crate::info::INFO_FILE), info_json).unwrap();
    }

    #[test]
    fn test_categorize() {
        let tmp = tempfile::tempdir().unwrap();
        add_module(tmp.path(), "a_cog", r#"{"type": "COG"}"#);
        add_module(tmp.path(), "a_lib", r#"{"type": "SHARED_LIBRARY"}"#);
        add_module(tmp.path(), "strange", r#"{"type": "WAT"}"#);

        let modules = vec![
            Installable::new("r", tmp.path().join("a_cog")),
            Installable::new("r", tmp.path().join("a_lib")),
            Installable::new("r", tmp.path().join("strange")),
        ];

        let lists = ModuleLists::categorize(modules);
        assert_eq!(lists.cogs.len(), 1);
        assert_eq!(lists.shared_libraries.len(), 1);
        assert_eq!(lists.others.len(), 1);
        assert!(!lists.is_empty());
        assert!(ModuleLists::default().is_empty());
    }

    #[tokio::test]
    async fn test_empty_repo_compares_as_no_change() {
        let tmp = tempfile::tempdir().unwrap();

        let mut repo = FolderRepo::new("test_repo".to_string(), tmp.path().to_path_buf());
        repo.populate().unwrap();

        let snapshot = UpdateSnapshot::capture(&repo).await.unwrap();
        assert!(snapshot.compare(&repo).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_versionless_repo_counts_survivors_as_updated() {
        let tmp = tempfile::tempdir().unwrap();
        add_module(tmp.path(), "steady", "{}");

        let mut repo = FolderRepo::new("test_repo".to_string(), tmp.path().to_path_buf());
        repo.populate().unwrap();

        let snapshot = UpdateSnapshot::capture(&repo).await.unwrap();

        // Folder repos report no module versions, so the surviving module is
        // assumed updated and a result is produced.
        let result = snapshot.compare(&repo).await.unwrap().unwrap();
        assert_eq!(result.updated.cogs.len(), 1);
        assert!(result.new.is_empty());
        assert!(result.removed.is_empty());
    }

    #[tokio::test]
    async fn test_new_updated_removed() {
        let tmp = tempfile::tempdir().unwrap();
        add_module(tmp.path(), "kept", "{}");
        add_module(tmp.path(), "dropped", "{}");

        let mut repo = FolderRepo::new("test_repo".to_string(), tmp.path().to_path_buf());
        repo.populate().unwrap();

        let snapshot = UpdateSnapshot::capture(&repo).await.unwrap();

        std::fs::remove_dir_all(tmp.path().join("dropped")).unwrap();
        add_module(tmp.path(), "added", "{}");
        repo.populate().unwrap();

        let result = snapshot.compare(&repo).await.unwrap().unwrap();
        assert_eq!(result.repo_name, "test_repo");
        assert_eq!(result.new.cogs.len(), 1);
        assert_eq!(result.new.cogs[0].name, "added");
        assert_eq!(result.removed.cogs.len(), 1);
        assert_eq!(result.removed.cogs[0].name, "dropped");
        // No module versions available, so surviving modules count as updated.
        assert_eq!(result.updated.cogs.len(), 1);
        assert_eq!(result.updated.cogs[0].name, "kept");
    }

    mod versioned {
        use super::*;
        use crate::info::RepoInfo;
        use crate::repository::InstallContext;
        use async_trait::async_trait;
        use std::path::PathBuf;

        /// Minimal repo double with controllable versions.
        #[derive(Debug)]
        struct VersionedRepo {
            folder: PathBuf,
            info: RepoInfo,
            version: String,
            modules: Vec<Installable>,
            module_versions: HashMap<String, String>,
        }

        #[async_trait]
        impl Repo for VersionedRepo {
            fn name(&self) -> &str {
                "versioned"
            }

            fn folder_path(&self) -> &Path {
                &self.folder
            }

            fn repo_info(&self) -> &RepoInfo {
                &self.info
            }

            fn available_modules(&self) -> &[Installable] {
                &self.modules
            }

            fn populate(&mut self) -> Result<()> {
                Ok(())
            }

            async fn sync(&mut self) -> Result<()> {
                Ok(())
            }

            async fn repo_version(&self) -> Result<Option<String>> {
                Ok(Some(self.version.clone()))
            }

            async fn module_version(&self, module: &Installable) -> Result<Option<String>> {
                Ok(self.module_versions.get(&module.name).cloned())
            }

            async fn delete(&self) -> Result<()> {
                Ok(())
            }

            async fn install_cog(&self, _: &InstallContext, _: &Installable) -> Result<bool> {
                Ok(true)
            }

            async fn install_libraries(
                &self,
                _: &InstallContext,
                _: &[Installable],
            ) -> Result<Vec<Installable>> {
                Ok(Vec::new())
            }
        }

        fn versioned_repo(tmp: &Path) -> VersionedRepo {
            add_module(tmp, "alpha", "{}");
            add_module(tmp, "beta", "{}");

            let modules = vec![
                Installable::new("versioned", tmp.join("alpha")),
                Installable::new("versioned", tmp.join("beta")),
            ];
            let module_versions = modules
                .iter()
                .map(|m| (m.name.clone(), "v1".to_string()))
                .collect();

            VersionedRepo {
                folder: tmp.to_path_buf(),
                info: RepoInfo::default(),
                version: "aaa111".to_string(),
                modules,
                module_versions,
            }
        }

        #[tokio::test]
        async fn test_unchanged_versions_return_none() {
            let tmp = tempfile::tempdir().unwrap();
            let repo = versioned_repo(tmp.path());

            let snapshot = UpdateSnapshot::capture(&repo).await.unwrap();
            assert!(snapshot.compare(&repo).await.unwrap().is_none());
        }

        #[tokio::test]
        async fn test_only_changed_modules_are_updated() {
            let tmp = tempfile::tempdir().unwrap();
            let mut repo = versioned_repo(tmp.path());

            let snapshot = UpdateSnapshot::capture(&repo).await.unwrap();

            repo.version = "bbb222".to_string();
            repo.module_versions
                .insert("beta".to_string(), "v2".to_string());

            let result = snapshot.compare(&repo).await.unwrap().unwrap();
            assert_eq!(result.old_version.as_deref(), Some("aaa111"));
            assert_eq!(result.new_version.as_deref(), Some("bbb222"));
            assert_eq!(result.updated.cogs.len(), 1);
            assert_eq!(result.updated.cogs[0].name, "beta");
            assert!(result.new.is_empty());
            assert!(result.removed.is_empty());
        }

        #[tokio::test]
        async fn test_repo_version_bump_alone_yields_result() {
            let tmp = tempfile::tempdir().unwrap();
            let mut repo = versioned_repo(tmp.path());

            let snapshot = UpdateSnapshot::capture(&repo).await.unwrap();
            repo.version = "ccc333".to_string();

            let result = snapshot.compare(&repo).await.unwrap().unwrap();
            assert!(result.updated.is_empty());
            assert!(result.new.is_empty());
            assert!(result.removed.is_empty());
        }
    }
}

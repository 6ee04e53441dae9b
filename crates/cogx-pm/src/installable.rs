//! Installable modules discovered inside repos.

use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::info::ModuleInfo;
use crate::repository::{Repo, RepoManager};
use crate::Result;

/// Type tag stored in installed-state records.
pub const FOLDER_TYPE_NAME: &str = "FOLDER";

/// One unit the downloader can install: a cog or a shared library living in
/// a folder of a repo.
///
/// The folder's stem is the module name; the module's `info.json` (if any)
/// supplies the rest of the metadata.
#[derive(Debug, Clone)]
pub struct Installable {
    /// Name of the repo this module belongs to.
    pub repo_name: String,
    /// Name of the module, taken from the last path element.
    pub name: String,
    /// On-disk location of the module folder (or file).
    pub location: PathBuf,
    pub info: ModuleInfo,
}

impl Installable {
    pub fn new(repo_name: impl Into<String>, location: PathBuf) -> Self {
        let name = location
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let info = ModuleInfo::load(&location).unwrap_or_default();

        Self {
            repo_name: repo_name.into(),
            name,
            location,
            info,
        }
    }

    /// Copy this module into `target_dir/<name>`, overwriting any existing
    /// files there. Failures are logged rather than propagated.
    pub async fn copy_to(&self, target_dir: &Path) -> bool {
        let src = self.location.clone();
        let dst = target_dir.join(&self.name);

        let result = tokio::task::spawn_blocking(move || copy_path(&src, &dst)).await;

        match result {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                log::error!(
                    "error occurred when copying path {}: {}",
                    self.location.display(),
                    err
                );
                false
            }
            Err(err) => {
                log::error!(
                    "copy task for path {} failed: {}",
                    self.location.display(),
                    err
                );
                false
            }
        }
    }

    /// Build the record stored in the installed-state file.
    pub fn to_record(&self, version: Option<String>) -> InstalledModule {
        InstalledModule {
            cog_name: self.name.clone(),
            repo_name: self.repo_name.clone(),
            inst_type: FOLDER_TYPE_NAME.to_string(),
            cog_version: version,
        }
    }

    /// Resolve an installed-state record back into an `Installable` through
    /// the repo manager.
    pub fn from_record(record: &InstalledModule, manager: &RepoManager) -> Result<Installable> {
        if record.inst_type != FOLDER_TYPE_NAME {
            return Err(Error::UnknownInstallableType(record.inst_type.clone()));
        }

        let repo = manager
            .get_repo(&record.repo_name)
            .ok_or_else(|| Error::MissingRepo(record.repo_name.clone()))?;

        let location = repo.folder_path().join(&record.cog_name);
        Ok(Installable::new(repo.name(), location))
    }
}

// Identity is (repo, location), matching how modules are tracked across
// rescans of the same repo.
impl PartialEq for Installable {
    fn eq(&self, other: &Self) -> bool {
        self.repo_name == other.repo_name && self.location == other.location
    }
}

impl Eq for Installable {}

impl Hash for Installable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.repo_name.hash(state);
        self.location.hash(state);
    }
}

/// Serialized form of an installed module, persisted by `InstalledStore`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstalledModule {
    pub cog_name: String,
    pub repo_name: String,
    pub inst_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cog_version: Option<String>,
}

impl PartialEq for InstalledModule {
    // The recorded version is bookkeeping, not identity.
    fn eq(&self, other: &Self) -> bool {
        self.cog_name == other.cog_name
            && self.repo_name == other.repo_name
            && self.inst_type == other.inst_type
    }
}

impl Eq for InstalledModule {}

fn copy_path(src: &Path, dst: &Path) -> std::io::Result<()> {
    if src.is_file() {
        if let Some(parent) = dst.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(src, dst)?;
        return Ok(());
    }

    std::fs::create_dir_all(dst)?;

    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());

        if entry.file_type()?.is_dir() {
            copy_path(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::ModuleType;

    fn make_module(dir: &Path, name: &str, info_json: &str) -> Installable {
        let location = dir.join(name);
        std::fs::create_dir_all(&location).unwrap();
        std::fs::write(location.join(crate::info::INFO_FILE), info_json).unwrap();
        Installable::new("test_repo", location)
    }

    #[test]
    fn test_name_from_location() {
        let tmp = tempfile::tempdir().unwrap();
        let module = make_module(tmp.path(), "test_cog", "{}");
        assert_eq!(module.name, "test_cog");
        assert_eq!(module.repo_name, "test_repo");
    }

    #[test]
    fn test_missing_info_defaults_to_cog() {
        let tmp = tempfile::tempdir().unwrap();
        let location = tmp.path().join("bare_cog");
        std::fs::create_dir_all(&location).unwrap();

        let module = Installable::new("test_repo", location);
        assert_eq!(module.info.module_type, ModuleType::Cog);
        assert!(!module.info.hidden);
    }

    #[test]
    fn test_record_roundtrip_fields() {
        let tmp = tempfile::tempdir().unwrap();
        let module = make_module(tmp.path(), "test_cog", "{}");

        let record = module.to_record(Some("abc123".to_string()));
        assert_eq!(record.cog_name, "test_cog");
        assert_eq!(record.repo_name, "test_repo");
        assert_eq!(record.inst_type, FOLDER_TYPE_NAME);
        assert_eq!(record.cog_version.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_record_equality_ignores_version() {
        let a = InstalledModule {
            cog_name: "c".into(),
            repo_name: "r".into(),
            inst_type: FOLDER_TYPE_NAME.into(),
            cog_version: Some("abc".into()),
        };
        let b = InstalledModule {
            cog_version: None,
            ..a.clone()
        };
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_copy_to_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let module = make_module(tmp.path(), "test_cog", "{}");
        std::fs::write(module.location.join("main.rs"), "fn main() {}").unwrap();
        std::fs::create_dir_all(module.location.join("data")).unwrap();
        std::fs::write(module.location.join("data/words.txt"), "hello").unwrap();

        let target = tmp.path().join("install");
        std::fs::create_dir_all(&target).unwrap();

        assert!(module.copy_to(&target).await);
        assert!(target.join("test_cog/main.rs").is_file());
        assert!(target.join("test_cog/data/words.txt").is_file());
    }

    #[tokio::test]
    async fn test_copy_to_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let module = make_module(tmp.path(), "test_cog", "{}");
        std::fs::write(module.location.join("main.rs"), "new contents").unwrap();

        let target = tmp.path().join("install");
        std::fs::create_dir_all(target.join("test_cog")).unwrap();
        std::fs::write(target.join("test_cog/main.rs"), "old contents").unwrap();

        assert!(module.copy_to(&target).await);
        let contents = std::fs::read_to_string(target.join("test_cog/main.rs")).unwrap();
        assert_eq!(contents, "new contents");
    }
}

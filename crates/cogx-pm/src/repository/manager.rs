//! The repo registry plus requirements installation.

use std::collections::{BTreeSet, HashMap};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use tokio::sync::Mutex;

use crate::errors::Error;
use crate::installable::Installable;
use crate::process::{self, is_path_git_repo};
use crate::tracker::UpdateResult;
use crate::Result;

use super::{FolderRepo, GitRepo, Repo};

lazy_static! {
    static ref GITHUB_OR_GITLAB_RE: Regex = Regex::new(r"^https?://git(?:hub|lab)\.com/").unwrap();
    static ref TREE_URL_RE: Regex = Regex::new(r"(?P<tree>/tree)/(?P<branch>\S+)$").unwrap();
    static ref REPO_NAME_RE: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// Owns every configured repo, keyed by normalized name, and runs the
/// external package installer for module requirements.
pub struct RepoManager {
    repos_folder: PathBuf,
    repos: IndexMap<String, Box<dyn Repo>>,
    /// Interpreter used to invoke the package installer (`<python> -m pip`).
    python: String,
    /// Requirement installs are serialized; concurrent pip runs corrupt
    /// shared target directories.
    pip_lock: Mutex<()>,
}

impl RepoManager {
    pub fn new(repos_folder: PathBuf) -> Self {
        Self {
            repos_folder,
            repos: IndexMap::new(),
            python: "python3".to_string(),
            pip_lock: Mutex::new(()),
        }
    }

    pub fn with_python(mut self, python: impl Into<String>) -> Self {
        self.python = python.into();
        self
    }

    pub fn repos_folder(&self) -> &Path {
        &self.repos_folder
    }

    pub fn does_repo_exist(&self, name: &str) -> bool {
        self.repos.contains_key(name)
    }

    /// Repo names must be identifier-like; they are stored lowercased.
    pub fn validate_and_normalize_repo_name(name: &str) -> Result<String> {
        if !REPO_NAME_RE.is_match(name) {
            return Err(Error::InvalidRepoName(name.to_string()));
        }

        Ok(name.to_lowercase())
    }

    /// Register a plain folder repo, creating its folder if needed.
    pub async fn add_folder_repo(
        &mut self,
        name: &str,
        path: Option<PathBuf>,
    ) -> Result<&dyn Repo> {
        let name = Self::validate_and_normalize_repo_name(name)?;

        if self.does_repo_exist(&name) {
            return Err(Error::ExistingRepo(name));
        }

        let folder = path.unwrap_or_else(|| self.repos_folder.join(&name));
        let mut repo = FolderRepo::new(name.clone(), folder);
        repo.populate()?;

        let repo = self.repos.entry(name).or_insert_with(|| Box::new(repo));
        Ok(&**repo)
    }

    /// Register and clone a git repo.
    pub async fn add_git_repo(
        &mut self,
        name: &str,
        url: &str,
        branch: Option<&str>,
    ) -> Result<&dyn Repo> {
        let name = Self::validate_and_normalize_repo_name(name)?;

        if self.does_repo_exist(&name) {
            return Err(Error::ExistingGitRepo(self.repos_folder.join(&name)));
        }

        let (url, branch) = Self::parse_url(url, branch);

        let mut repo = GitRepo::new(name.clone(), self.repos_folder.join(&name), url, branch);
        repo.clone_repo().await?;

        let repo = self.repos.entry(name).or_insert_with(|| Box::new(repo));
        Ok(&**repo)
    }

    pub fn get_repo(&self, name: &str) -> Option<&dyn Repo> {
        self.repos.get(name).map(|repo| repo.as_ref())
    }

    pub fn get_repo_mut(&mut self, name: &str) -> Option<&mut (dyn Repo + 'static)> {
        self.repos.get_mut(name).map(|repo| repo.as_mut())
    }

    pub fn repo_names(&self) -> Vec<&str> {
        self.repos.keys().map(String::as_str).collect()
    }

    pub fn all_repos(&self) -> Vec<&dyn Repo> {
        self.repos.values().map(|repo| repo.as_ref()).collect()
    }

    /// Delete a repo's files and drop it from the registry.
    pub async fn delete_repo(&mut self, name: &str) -> Result<()> {
        let repo = self
            .get_repo(name)
            .ok_or_else(|| Error::MissingRepo(name.to_string()))?;

        repo.delete().await?;
        self.repos.shift_remove(name);
        Ok(())
    }

    /// Update a single repo.
    pub async fn update_repo(&mut self, name: &str) -> Result<Option<UpdateResult>> {
        let repo = self
            .get_repo_mut(name)
            .ok_or_else(|| Error::MissingRepo(name.to_string()))?;

        repo.update().await
    }

    /// Update every repo, collecting results and failures per repo name.
    /// Repos that don't support updates are skipped; a failing repo does not
    /// abort the sweep.
    pub async fn update_all(&mut self) -> IndexMap<String, Result<UpdateResult>> {
        let mut results = IndexMap::new();

        for (name, repo) in self.repos.iter_mut() {
            match repo.update().await {
                Ok(Some(result)) => {
                    results.insert(name.clone(), Ok(result));
                }
                Ok(None) => {}
                Err(Error::UpdateNotSupported(_)) => {}
                Err(err) => {
                    results.insert(
                        name.clone(),
                        Err(Error::Update {
                            repo: name.clone(),
                            source: Box::new(err),
                        }),
                    );
                }
            }
        }

        results
    }

    /// Rebuild the registry from the repos folder. A `.git` directory makes
    /// a folder load as a git repo; anything else loads as a folder repo.
    /// Folders that fail to load are logged and skipped.
    pub async fn load_repos(&mut self) -> Result<()> {
        tokio::fs::create_dir_all(&self.repos_folder).await?;

        let mut repos: IndexMap<String, Box<dyn Repo>> = IndexMap::new();
        let mut entries = tokio::fs::read_dir(&self.repos_folder).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();

            if !path.is_dir() {
                continue;
            }

            let loaded: Result<Box<dyn Repo>> = if is_path_git_repo(&path) {
                GitRepo::from_folder(&path)
                    .await
                    .map(|repo| Box::new(repo) as Box<dyn Repo>)
            } else {
                FolderRepo::from_folder(&path).map(|repo| Box::new(repo) as Box<dyn Repo>)
            };

            match loaded {
                Ok(repo) => {
                    repos.insert(repo.name().to_string(), repo);
                }
                Err(err) => {
                    log::error!("failed to load repo from {}: {}", path.display(), err);
                }
            }
        }

        // Directory iteration order is filesystem dependent.
        repos.sort_keys();
        self.repos = repos;
        Ok(())
    }

    /// Split GitHub/GitLab `/tree/<branch>` URLs into base URL and branch.
    /// An explicitly passed branch wins over the one in the URL.
    pub fn parse_url(url: &str, branch: Option<&str>) -> (String, Option<String>) {
        if GITHUB_OR_GITLAB_RE.is_match(url) {
            if let Some(caps) = TREE_URL_RE.captures(url) {
                let tree_start = caps.name("tree").unwrap().start();
                let base = url[..tree_start].to_string();
                let branch = branch
                    .map(str::to_string)
                    .or_else(|| caps.name("branch").map(|m| m.as_str().to_string()));

                return (base, branch);
            }
        }

        (url.to_string(), branch.map(str::to_string))
    }

    /// Install requirements with `<python> -m pip install -U`, optionally
    /// targeted at a library directory. Returns whether the install
    /// succeeded; failures are logged.
    pub async fn pip_install(
        &self,
        requirements: &[String],
        target_dir: Option<&Path>,
    ) -> Result<bool> {
        if requirements.is_empty() {
            return Ok(true);
        }

        let mut args: Vec<OsString> = vec![
            "-m".into(),
            "pip".into(),
            "--disable-pip-version-check".into(),
            "install".into(),
            "-U".into(),
        ];

        if let Some(dir) = target_dir {
            args.push("-t".into());
            args.push(dir.as_os_str().to_owned());
        }

        for requirement in requirements {
            args.push(requirement.clone().into());
        }

        let _guard = self.pip_lock.lock().await;
        let output = process::run_command(&self.python, args, &[]).await?;

        if output.status.success() {
            return Ok(true);
        }

        log::error!(
            "error while installing requirements: {}",
            requirements.join(", ")
        );
        Ok(false)
    }

    /// Look up which versions of `packages` are installed via `pip show`.
    /// Missing packages map to `None`.
    pub async fn pip_show(&self, packages: &[String]) -> Result<HashMap<String, Option<String>>> {
        if packages.is_empty() {
            return Ok(HashMap::new());
        }

        let unique: BTreeSet<&str> = packages.iter().map(String::as_str).collect();

        let mut args: Vec<OsString> = vec![
            "-m".into(),
            "pip".into(),
            "--disable-pip-version-check".into(),
            "show".into(),
        ];
        args.extend(unique.iter().map(|p| OsString::from(*p)));

        let _guard = self.pip_lock.lock().await;
        let output = process::run_command(&self.python, args, &[]).await?;
        drop(_guard);

        if !output.status.success() {
            return Err(Error::Pip(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let versions = parse_pip_show(&String::from_utf8_lossy(&output.stdout));

        Ok(unique
            .into_iter()
            .map(|name| (name.to_string(), versions.get(&name.to_lowercase()).cloned()))
            .collect())
    }

    /// Install a module's declared requirements.
    pub async fn install_requirements(
        &self,
        module: &Installable,
        target_dir: Option<&Path>,
    ) -> Result<bool> {
        self.pip_install(&module.info.requirements, target_dir).await
    }
}

/// Parse `pip show` output: header blocks separated by `---` lines, with
/// `Name:` and `Version:` fields. Names are lowercased.
fn parse_pip_show(stdout: &str) -> HashMap<String, String> {
    let mut versions = HashMap::new();

    for block in stdout.split("\n---\n") {
        let mut name = None;
        let mut version = None;

        for line in block.lines() {
            if let Some(value) = line.strip_prefix("Name: ") {
                name = Some(value.trim().to_string());
            } else if let Some(value) = line.strip_prefix("Version: ") {
                version = Some(value.trim().to_string());
            }
        }

        if let (Some(name), Some(version)) = (name, version) {
            versions.insert(name.to_lowercase(), version);
        }
    }

    versions
}

//! Git-backed repos: a folder repo kept in sync with a remote.
//!
//! All git operations shell out to the system `git` binary with terminal
//! prompts disabled, so a repo that needs credentials fails instead of
//! hanging.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::Path;
use std::process::Output;

use async_trait::async_trait;

use crate::errors::Error;
use crate::info::RepoInfo;
use crate::installable::Installable;
use crate::process::{self, is_path_git_repo};
use crate::Result;

use super::{FolderRepo, InstallContext, Repo};

/// A folder repo cloned from a git remote. The repo version is the current
/// commit hash; module versions are the latest commit touching each module
/// path.
#[derive(Debug)]
pub struct GitRepo {
    folder: FolderRepo,
    url: Option<String>,
    branch: Option<String>,
}

impl GitRepo {
    pub fn new(
        name: String,
        folder_path: std::path::PathBuf,
        url: String,
        branch: Option<String>,
    ) -> Self {
        Self {
            folder: FolderRepo::new(name, folder_path),
            url: Some(url),
            branch,
        }
    }

    /// Rebuild a `GitRepo` from an existing clone, detecting the branch and
    /// remote URL from the repo itself.
    pub async fn from_folder(folder: &Path) -> Result<Self> {
        let base = FolderRepo::from_folder(folder)?;

        let mut repo = Self {
            folder: base,
            url: None,
            branch: None,
        };

        repo.branch = Some(repo.current_branch().await?);
        repo.url = Some(repo.current_url().await?);

        Ok(repo)
    }

    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    pub fn is_git_repo(&self) -> bool {
        is_path_git_repo(self.folder.folder_path())
    }

    fn ensure_git_repo(&self) -> Result<()> {
        if !self.is_git_repo() {
            return Err(Error::MissingGitRepo(self.folder.folder_path().to_path_buf()));
        }
        Ok(())
    }

    async fn run_git(&self, args: Vec<OsString>) -> Result<Output> {
        process::run_command("git", args, &[("GIT_TERMINAL_PROMPT", "0")]).await
    }

    /// Clone the repo from its remote and populate it.
    ///
    /// When no branch was requested, the clone's default branch is adopted.
    pub async fn clone_repo(&mut self) -> Result<()> {
        if self.is_git_repo() {
            return Err(Error::ExistingGitRepo(self.folder.folder_path().to_path_buf()));
        }

        let url = self
            .url
            .clone()
            .ok_or_else(|| Error::Cloning("no remote URL configured".to_string()))?;

        let args = cmd::clone_args(&url, self.branch.as_deref(), self.folder.folder_path());
        let output = self.run_git(args).await?;

        if !output.status.success() {
            return Err(Error::Cloning(stderr_line(&output)));
        }

        if self.branch.is_none() {
            self.branch = Some(self.current_branch().await?);
        }

        self.folder.populate()
    }

    /// The currently checked out branch name.
    pub async fn current_branch(&self) -> Result<String> {
        self.ensure_git_repo()?;

        let path = self.folder.folder_path();
        let output = self.run_git(cmd::current_branch_args(path)).await?;

        if !output.status.success() {
            return Err(Error::Git {
                command: "rev-parse".to_string(),
                path: path.to_path_buf(),
            });
        }

        Ok(stdout_str(&output))
    }

    /// The latest commit hash of the repo's branch, optionally limited to
    /// commits touching `relative_path`. `None` when the path is untracked.
    pub async fn current_commit(&self, relative_path: Option<&str>) -> Result<Option<String>> {
        self.ensure_git_repo()?;

        let path = self.folder.folder_path();
        let branch = self
            .branch
            .as_deref()
            .ok_or_else(|| Error::CurrentHash(path.to_path_buf()))?;

        let args = cmd::latest_commit_args(path, branch, relative_path.unwrap_or("."));
        let output = self.run_git(args).await?;

        if !output.status.success() {
            return Err(Error::CurrentHash(path.to_path_buf()));
        }

        let sha = stdout_str(&output);
        Ok(if sha.is_empty() { None } else { Some(sha) })
    }

    /// The fetch URL of the `origin` remote.
    pub async fn current_url(&self) -> Result<String> {
        self.ensure_git_repo()?;

        let path = self.folder.folder_path();
        let output = self.run_git(cmd::remote_url_args(path)).await?;

        if !output.status.success() {
            return Err(Error::Git {
                command: "config --get remote.origin.url".to_string(),
                path: path.to_path_buf(),
            });
        }

        Ok(stdout_str(&output))
    }

    /// Reset the working tree hard to `origin/<branch>`.
    pub async fn hard_reset(&self, branch: Option<&str>) -> Result<()> {
        self.ensure_git_repo()?;

        let path = self.folder.folder_path();
        let branch = branch
            .or(self.branch.as_deref())
            .ok_or_else(|| Error::HardReset(path.to_path_buf()))?;

        let output = self.run_git(cmd::hard_reset_args(path, branch)).await?;

        if !output.status.success() {
            return Err(Error::HardReset(path.to_path_buf()));
        }

        Ok(())
    }

    /// Map of changed file path -> git status letter between two refs.
    pub async fn file_update_statuses(
        &self,
        old_ref: &str,
        new_ref: &str,
    ) -> Result<HashMap<String, String>> {
        self.ensure_git_repo()?;

        let path = self.folder.folder_path();
        let output = self
            .run_git(cmd::diff_status_args(path, old_ref, new_ref))
            .await?;

        if !output.status.success() {
            return Err(Error::GitDiff(path.to_path_buf()));
        }

        let mut statuses = HashMap::new();

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            if let Some((status, filepath)) = line.split_once('\t') {
                statuses.insert(filepath.to_string(), status.to_string());
            }
        }

        Ok(statuses)
    }

    /// Commit messages for `relative_path` since `old_commit`, oldest first.
    pub async fn commit_notes(&self, old_commit: &str, relative_path: &str) -> Result<String> {
        self.ensure_git_repo()?;

        let path = self.folder.folder_path();
        let output = self
            .run_git(cmd::log_args(path, old_commit, relative_path))
            .await?;

        if !output.status.success() {
            return Err(Error::Git {
                command: "log".to_string(),
                path: path.to_path_buf(),
            });
        }

        Ok(stdout_str(&output))
    }
}

#[async_trait]
impl Repo for GitRepo {
    fn name(&self) -> &str {
        self.folder.name()
    }

    fn folder_path(&self) -> &Path {
        self.folder.folder_path()
    }

    fn repo_info(&self) -> &RepoInfo {
        self.folder.repo_info()
    }

    fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    fn available_modules(&self) -> &[Installable] {
        self.folder.available_modules()
    }

    fn populate(&mut self) -> Result<()> {
        self.folder.populate()
    }

    async fn sync(&mut self) -> Result<()> {
        let branch = self.current_branch().await?;
        self.hard_reset(Some(&branch)).await?;

        let path = self.folder.folder_path().to_path_buf();
        let output = self.run_git(cmd::pull_args(&path)).await?;

        if !output.status.success() {
            return Err(Error::GitUpdate(path));
        }

        self.folder.read_info();
        self.folder.rescan_modules()
    }

    async fn repo_version(&self) -> Result<Option<String>> {
        self.current_commit(None).await
    }

    async fn module_version(&self, module: &Installable) -> Result<Option<String>> {
        let relative = module
            .location
            .strip_prefix(self.folder.folder_path())
            .unwrap_or(&module.location);

        self.current_commit(Some(&relative.to_string_lossy())).await
    }

    async fn delete(&self) -> Result<()> {
        Repo::delete(&self.folder).await
    }

    async fn install_cog(&self, ctx: &InstallContext, cog: &Installable) -> Result<bool> {
        self.folder.install_cog(ctx, cog).await
    }

    async fn install_libraries(
        &self,
        ctx: &InstallContext,
        libraries: &[Installable],
    ) -> Result<Vec<Installable>> {
        self.folder.install_libraries(ctx, libraries).await
    }
}

/// Argument builders for the git subprocesses.
mod cmd {
    use std::ffi::OsString;
    use std::path::Path;

    fn base(path: &Path) -> Vec<OsString> {
        vec!["-C".into(), path.as_os_str().to_owned()]
    }

    pub fn clone_args(url: &str, branch: Option<&str>, folder: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["clone".into()];

        if let Some(branch) = branch {
            args.push("-b".into());
            args.push(branch.into());
        }

        args.push(url.into());
        args.push(folder.as_os_str().to_owned());
        args
    }

    pub fn current_branch_args(path: &Path) -> Vec<OsString> {
        let mut args = base(path);
        args.extend(["rev-parse".into(), "--abbrev-ref".into(), "HEAD".into()]);
        args
    }

    pub fn latest_commit_args(path: &Path, branch: &str, relative_path: &str) -> Vec<OsString> {
        let mut args = base(path);
        args.extend([
            "rev-list".into(),
            "-1".into(),
            branch.into(),
            "--".into(),
            relative_path.into(),
        ]);
        args
    }

    pub fn hard_reset_args(path: &Path, branch: &str) -> Vec<OsString> {
        let mut args = base(path);
        args.extend([
            "reset".into(),
            "--hard".into(),
            format!("origin/{branch}").into(),
            "-q".into(),
        ]);
        args
    }

    pub fn pull_args(path: &Path) -> Vec<OsString> {
        let mut args = base(path);
        args.extend(["pull".into(), "-q".into(), "--ff-only".into()]);
        args
    }

    pub fn diff_status_args(path: &Path, old_ref: &str, new_ref: &str) -> Vec<OsString> {
        let mut args = base(path);
        args.extend([
            "diff".into(),
            "--no-commit-id".into(),
            "--name-status".into(),
            format!("{old_ref}..{new_ref}").into(),
        ]);
        args
    }

    pub fn log_args(path: &Path, old_ref: &str, relative_path: &str) -> Vec<OsString> {
        let mut args = base(path);
        args.extend([
            "log".into(),
            "--relative-date".into(),
            "--reverse".into(),
            format!("{old_ref}..").into(),
            relative_path.into(),
        ]);
        args
    }

    pub fn remote_url_args(path: &Path) -> Vec<OsString> {
        let mut args = base(path);
        args.extend([
            "config".into(),
            "--get".into(),
            "remote.origin.url".into(),
        ]);
        args
    }
}

fn stdout_str(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn stderr_line(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr)
        .lines()
        .last()
        .unwrap_or("unknown error")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn to_strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_clone_args_with_branch() {
        let args = to_strings(cmd::clone_args(
            "https://github.com/tekulvw/Squid-Plugins",
            Some("rewrite_cogs"),
            Path::new("/tmp/repos/squid"),
        ));
        assert_eq!(
            args,
            vec![
                "clone",
                "-b",
                "rewrite_cogs",
                "https://github.com/tekulvw/Squid-Plugins",
                "/tmp/repos/squid",
            ]
        );
    }

    #[test]
    fn test_clone_args_without_branch() {
        let args = to_strings(cmd::clone_args(
            "https://example.com/repo.git",
            None,
            Path::new("/tmp/repos/example"),
        ));
        assert_eq!(
            args,
            vec!["clone", "https://example.com/repo.git", "/tmp/repos/example"]
        );
    }

    #[test]
    fn test_introspection_args() {
        let path = Path::new("/r");

        assert_eq!(
            to_strings(cmd::current_branch_args(path)),
            vec!["-C", "/r", "rev-parse", "--abbrev-ref", "HEAD"]
        );
        assert_eq!(
            to_strings(cmd::latest_commit_args(path, "main", "mycog")),
            vec!["-C", "/r", "rev-list", "-1", "main", "--", "mycog"]
        );
        assert_eq!(
            to_strings(cmd::remote_url_args(path)),
            vec!["-C", "/r", "config", "--get", "remote.origin.url"]
        );
    }

    #[test]
    fn test_mutation_args() {
        let path = Path::new("/r");

        assert_eq!(
            to_strings(cmd::hard_reset_args(path, "main")),
            vec!["-C", "/r", "reset", "--hard", "origin/main", "-q"]
        );
        assert_eq!(
            to_strings(cmd::pull_args(path)),
            vec!["-C", "/r", "pull", "-q", "--ff-only"]
        );
        assert_eq!(
            to_strings(cmd::diff_status_args(path, "abc", "def")),
            vec!["-C", "/r", "diff", "--no-commit-id", "--name-status", "abc..def"]
        );
        assert_eq!(
            to_strings(cmd::log_args(path, "abc", "mycog")),
            vec!["-C", "/r", "log", "--relative-date", "--reverse", "abc..", "mycog"]
        );
    }

    #[test]
    fn test_is_git_repo_detection() {
        let tmp = tempfile::tempdir().unwrap();
        let folder = tmp.path().join("squid");
        std::fs::create_dir_all(folder.join(".git")).unwrap();

        let repo = GitRepo::new(
            "squid".to_string(),
            folder,
            "https://github.com/tekulvw/Squid-Plugins".to_string(),
            Some("rewrite_cogs".to_string()),
        );
        assert!(repo.is_git_repo());
        assert_eq!(repo.branch(), Some("rewrite_cogs"));
    }

    #[tokio::test]
    async fn test_git_helpers_require_git_repo() {
        let tmp = tempfile::tempdir().unwrap();
        let folder: PathBuf = tmp.path().join("plain");
        std::fs::create_dir_all(&folder).unwrap();

        let repo = GitRepo::new(
            "plain".to_string(),
            folder,
            "https://example.com/repo.git".to_string(),
            None,
        );

        assert!(matches!(
            repo.current_branch().await.unwrap_err(),
            Error::MissingGitRepo(_)
        ));
        assert!(matches!(
            repo.current_commit(None).await.unwrap_err(),
            Error::MissingGitRepo(_)
        ));
        assert!(matches!(
            repo.hard_reset(None).await.unwrap_err(),
            Error::MissingGitRepo(_)
        ));
    }

    #[tokio::test]
    async fn test_clone_into_existing_git_repo_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let folder = tmp.path().join("squid");
        std::fs::create_dir_all(folder.join(".git")).unwrap();

        let mut repo = GitRepo::new(
            "squid".to_string(),
            folder,
            "https://example.com/repo.git".to_string(),
            None,
        );

        assert!(matches!(
            repo.clone_repo().await.unwrap_err(),
            Error::ExistingGitRepo(_)
        ));
    }
}

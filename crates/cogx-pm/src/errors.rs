//! Error types for the downloader.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("`{0}` is not a valid repository name")]
    InvalidRepoName(String),

    #[error("a repo named `{0}` already exists")]
    ExistingRepo(String),

    #[error("a git repo already exists at path: {0}")]
    ExistingGitRepo(PathBuf),

    #[error("there is no repo with the name `{0}`")]
    MissingRepo(String),

    #[error("a git repo does not exist at path: {0}")]
    MissingGitRepo(PathBuf),

    #[error("{0}")]
    MissingModule(String),

    #[error("error when running git clone: {0}")]
    Cloning(String),

    #[error("unable to determine commit hash for the repo at path: {0}")]
    CurrentHash(PathBuf),

    #[error("hard reset failed for the repo at path: {0}")]
    HardReset(PathBuf),

    #[error("git pull returned a non-zero exit code for the repo at path: {0}")]
    GitUpdate(PathBuf),

    #[error("git diff failed for the repo at path: {0}")]
    GitDiff(PathBuf),

    #[error("git {command} failed for the repo at path: {path}")]
    Git { command: String, path: PathBuf },

    #[error("package installer exited with a non-zero status: {0}")]
    Pip(String),

    #[error("{0}")]
    Installation(String),

    #[error("unknown installable type `{0}`")]
    UnknownInstallableType(String),

    #[error("updates are not supported for the `{0}` repo")]
    UpdateNotSupported(String),

    #[error("update of the `{repo}` repo failed")]
    Update {
        repo: String,
        #[source]
        source: Box<Error>,
    },

    #[error("invalid version string: {0}")]
    InvalidVersion(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

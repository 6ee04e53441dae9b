//! Cog repository management for the cogx downloader.
//!
//! A "cog" is an installable plugin unit for a chat-bot framework. Cogs are
//! distributed through repos, either plain folders on disk or clones of git
//! remotes, each described by an `info.json` metadata file. This crate holds
//! the metadata schema, the repo implementations, the repo manager, update
//! tracking and the installed-state store. The `cogx` binary in the sibling
//! crate exposes all of it as a command line tool.

pub mod errors;
pub mod info;
pub mod installable;
pub mod installed;
pub mod process;
pub mod repository;
pub mod tracker;

pub use errors::Error;
pub use info::{BotVersion, ModuleInfo, ModuleType, RepoInfo};
pub use installable::{Installable, InstalledModule};
pub use installed::InstalledStore;
pub use repository::{FolderRepo, GitRepo, InstallContext, Repo, RepoManager};
pub use tracker::{ModuleLists, UpdateResult, UpdateSnapshot};

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

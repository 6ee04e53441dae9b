//! The `info.json` metadata schema.
//!
//! An `info.json` file can sit at a repo root (repo-level metadata) and
//! inside each module folder (module-level metadata). Parsing is lenient:
//! a missing or unreadable file is logged and treated as absent, leaving
//! every field at its default.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// File name looked up in repo roots and module folders.
pub const INFO_FILE: &str = "info.json";

/// The kind of module an `info.json` describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleType {
    #[serde(rename = "COG")]
    Cog,
    #[serde(rename = "SHARED_LIBRARY")]
    SharedLibrary,
    /// Any unrecognized `type` value maps here instead of failing the parse.
    #[serde(other, rename = "UNKNOWN")]
    Unknown,
}

impl Default for ModuleType {
    fn default() -> Self {
        ModuleType::Cog
    }
}

/// A MAJOR.MINOR.PATCH bot version requirement.
///
/// Accepts both the `"3.0.0"` string form and the legacy `[3, 0, 0]` array
/// form when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BotVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl BotVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Default for BotVersion {
    fn default() -> Self {
        BotVersion::new(3, 0, 0)
    }
}

impl fmt::Display for BotVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for BotVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('.');
        let mut next = |missing_ok: bool| -> Result<u64, Error> {
            match parts.next() {
                Some(part) => part
                    .parse::<u64>()
                    .map_err(|_| Error::InvalidVersion(s.to_string())),
                None if missing_ok => Ok(0),
                None => Err(Error::InvalidVersion(s.to_string())),
            }
        };

        let major = next(false)?;
        let minor = next(true)?;
        let patch = next(true)?;

        if parts.next().is_some() {
            return Err(Error::InvalidVersion(s.to_string()));
        }

        Ok(BotVersion::new(major, minor, patch))
    }
}

impl Serialize for BotVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for BotVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BotVersionVisitor;

        impl<'de> Visitor<'de> for BotVersionVisitor {
            type Value = BotVersion;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a \"MAJOR.MINOR.PATCH\" string or [major, minor, patch] array")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                value.parse().map_err(|_| {
                    de::Error::invalid_value(de::Unexpected::Str(value), &self)
                })
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let major = seq.next_element::<u64>()?.unwrap_or(0);
                let minor = seq.next_element::<u64>()?.unwrap_or(0);
                let patch = seq.next_element::<u64>()?.unwrap_or(0);

                // Drain any trailing elements so the sequence is fully consumed.
                while seq.next_element::<serde_json::Value>()?.is_some() {}

                Ok(BotVersion::new(major, minor, patch))
            }
        }

        deserializer.deserialize_any(BotVersionVisitor)
    }
}

/// Repo-level metadata, read from the `info.json` at a repo root.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoInfo {
    pub author: Vec<String>,
    pub description: Option<String>,
    /// Shown after the repo is added. May contain the `[p]` placeholder,
    /// which is substituted with the active command prefix at display time.
    pub install_msg: Option<String>,
    pub short: Option<String>,
}

impl RepoInfo {
    /// Read repo metadata from `dir/info.json`, if present and valid.
    pub fn load(dir: &Path) -> Option<RepoInfo> {
        read_info_file(dir)
    }
}

/// Module-level metadata, read from the `info.json` inside a module folder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleInfo {
    pub author: Vec<String>,
    pub description: Option<String>,
    pub install_msg: Option<String>,
    pub short: Option<String>,
    /// Minimum bot version this module works with.
    pub bot_version: BotVersion,
    /// Hidden modules are omitted from listings.
    pub hidden: bool,
    /// Disabled modules cannot be installed.
    pub disabled: bool,
    /// Other cogs this module needs, as module name -> repo URL.
    pub required_cogs: IndexMap<String, String>,
    /// Names handed to the external package installer before installation.
    pub requirements: Vec<String>,
    /// Search tags, lowercased on load.
    pub tags: Vec<String>,
    #[serde(rename = "type")]
    pub module_type: ModuleType,
}

impl ModuleInfo {
    /// Read module metadata from `dir/info.json`, if present and valid.
    pub fn load(dir: &Path) -> Option<ModuleInfo> {
        read_info_file::<ModuleInfo>(dir).map(|mut info| {
            info.normalize();
            info
        })
    }

    /// Apply the load-time rules: tags are lowercased and shared libraries
    /// are always hidden.
    fn normalize(&mut self) {
        for tag in &mut self.tags {
            *tag = tag.to_lowercase();
        }

        if self.module_type == ModuleType::SharedLibrary {
            self.hidden = true;
        }
    }
}

fn read_info_file<T: serde::de::DeserializeOwned>(dir: &Path) -> Option<T> {
    let path = dir.join(INFO_FILE);

    if !path.is_file() {
        return None;
    }

    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) => {
            log::error!("failed to read info file at {}: {}", path.display(), err);
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(info) => Some(info),
        Err(err) => {
            log::error!("invalid JSON information file at {}: {}", path.display(), err);
            None
        }
    }
}

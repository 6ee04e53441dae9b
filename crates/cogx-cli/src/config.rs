//! CLI configuration.
//!
//! Settings come from `config.toml` inside the data directory, with every
//! field optional. The data directory itself defaults to the platform
//! location and can be overridden with `--data-dir`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cogx_pm::BotVersion;
use directories::ProjectDirs;
use serde::Deserialize;

const CONFIG_FILE: &str = "config.toml";

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    /// Where installed cogs are copied to.
    install_path: Option<PathBuf>,
    /// Where shared libraries are copied to.
    lib_path: Option<PathBuf>,
    /// Python interpreter used for requirement installs.
    python: Option<String>,
    /// Command prefix substituted for `[p]` in install messages.
    prefix: Option<String>,
    /// Bot version cogs are checked against.
    bot_version: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub install_path: PathBuf,
    pub lib_path: PathBuf,
    pub python: String,
    pub prefix: String,
    pub bot_version: BotVersion,
}

impl Settings {
    /// Load settings, with `data_dir` overriding the platform default.
    pub fn load(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };

        let config_path = data_dir.join(CONFIG_FILE);
        let file = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", config_path.display()))?
        } else {
            FileConfig::default()
        };

        let bot_version = match file.bot_version {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("Invalid bot_version `{raw}` in config.toml"))?,
            None => BotVersion::default(),
        };

        Ok(Self {
            install_path: file.install_path.unwrap_or_else(|| data_dir.join("cogs")),
            lib_path: file.lib_path.unwrap_or_else(|| data_dir.join("cog_shared")),
            python: file.python.unwrap_or_else(|| "python3".to_string()),
            prefix: file.prefix.unwrap_or_else(|| "!".to_string()),
            bot_version,
            data_dir,
        })
    }

    pub fn repos_folder(&self) -> PathBuf {
        self.data_dir.join("repos")
    }

    pub fn installed_file(&self) -> PathBuf {
        self.data_dir.join("installed.json")
    }

    /// Replace the `[p]` placeholder in cog install messages with the
    /// configured prefix.
    pub fn format_install_msg(&self, msg: &str) -> String {
        msg.replace("[p]", &self.prefix)
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "cogx")
        .context("Could not determine a data directory; pass --data-dir")?;
    Ok(dirs.data_dir().to_path_buf())
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_config_file() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = Settings::load(Some(tmp.path().to_path_buf())).unwrap();

        assert_eq!(settings.install_path, tmp.path().join("cogs"));
        assert_eq!(settings.lib_path, tmp.path().join("cog_shared"));
        assert_eq!(settings.python, "python3");
        assert_eq!(settings.prefix, "!");
        assert_eq!(settings.bot_version.to_string(), "3.0.0");
        assert_eq!(settings.repos_folder(), tmp.path().join("repos"));
    }

    #[test]
    fn test_config_file_overrides() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("config.toml"),
            "python = \"python3.12\"\nprefix = \"?\"\nbot_version = \"3.5.1\"\n",
        )
        .unwrap();

        let settings = Settings::load(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(settings.python, "python3.12");
        assert_eq!(settings.format_install_msg("Load with [p]load foo"), "Load with ?load foo");
        assert_eq!(settings.bot_version.to_string(), "3.5.1");
    }

    #[test]
    fn test_unknown_config_key_fails() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("config.toml"), "no_such_key = 1\n").unwrap();

        assert!(Settings::load(Some(tmp.path().to_path_buf())).is_err());
    }
}

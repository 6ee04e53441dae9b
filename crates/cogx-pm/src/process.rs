//! Subprocess helpers shared by the git and package-installer plumbing.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Output;

use tokio::process::Command;

use crate::Result;

/// Run a command asynchronously, capturing stdout and stderr.
pub async fn run_command<I, S>(program: &str, args: I, envs: &[(&str, &str)]) -> Result<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(program);
    cmd.args(args);

    for (key, value) in envs {
        cmd.env(key, value);
    }

    log::debug!("running command: {:?}", cmd.as_std());

    Ok(cmd.output().await?)
}

/// Whether `folder_path` contains a `.git` directory.
pub fn is_path_git_repo(folder_path: &Path) -> bool {
    folder_path.join(".git").is_dir()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_git_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let testdir = tmp.path().join("testgitdir");
        std::fs::create_dir_all(testdir.join(".git")).unwrap();
        assert!(is_path_git_repo(&testdir));
    }

    #[test]
    fn test_is_not_git_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let testdir = tmp.path().join("testnotgitdir");
        assert!(!is_path_git_repo(&testdir));

        std::fs::create_dir_all(&testdir).unwrap();
        assert!(!is_path_git_repo(&testdir));

        // A .git *file* does not make it a git repo.
        std::fs::write(testdir.join(".git"), b"").unwrap();
        assert!(!is_path_git_repo(&testdir));
    }

    #[tokio::test]
    async fn test_run_command_captures_output() {
        let output = run_command("git", ["--version"], &[]).await;

        // git is present in CI and on dev machines; if not, skip silently.
        if let Ok(output) = output {
            assert!(String::from_utf8_lossy(&output.stdout).contains("git"));
        }
    }
}

//! Repository metadata from the git command line

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::VersionControl;
use crate::error::{FinderError, FinderResult};

/// [`VersionControl`] backed by the `git` executable
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl GitCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run a git command in `repo` and return its trimmed output
    async fn query(&self, repo: &Path, args: &[&str]) -> FinderResult<String> {
        let description = format!("{} {}", self.program, args.join(" "));
        debug!("Executing {} in {}", description, repo.display());

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(repo)
            .output()
            .await
            .map_err(|e| FinderError::spawn(&self.program, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FinderError::process_failed(
                format!("{} (in {}): {}", description, repo.display(), stderr.trim()),
                output.status,
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git")
    }
}

#[async_trait]
impl VersionControl for GitCli {
    async fn latest_commit(&self, repo: &Path) -> FinderResult<String> {
        self.query(repo, &["rev-parse", "HEAD"]).await
    }

    async fn last_updated(&self, repo: &Path) -> FinderResult<String> {
        self.query(repo, &["log", "-1", "--date=short", "--pretty=format:%cd"])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_not_a_repository_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let git = GitCli::default();

        match git.latest_commit(temp_dir.path()).await {
            // git missing from this machine
            Err(FinderError::Spawn { .. }) => {}
            Err(FinderError::ProcessFailed { command, .. }) => {
                assert!(command.contains("rev-parse HEAD"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_program() {
        let git = GitCli::new("definitely-not-git-7f3a");
        let err = git.last_updated(Path::new("/")).await.unwrap_err();
        assert!(matches!(err, FinderError::Spawn { .. }));
    }
}

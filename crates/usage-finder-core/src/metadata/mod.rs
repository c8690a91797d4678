//! Repository metadata cache
//!
//! Every usage needs its repository's latest commit and last-updated date.
//! Both are looked up at most once per repository per run.

pub mod git;
pub mod memo;

pub use git::GitCli;
pub use memo::MemoCache;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::FinderResult;

/// Source of per-repository metadata
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Identifier of the checked out commit
    async fn latest_commit(&self, repo: &Path) -> FinderResult<String>;

    /// Date of the latest commit, `YYYY-MM-DD`
    async fn last_updated(&self, repo: &Path) -> FinderResult<String>;
}

/// Memoizing front for a [`VersionControl`], keyed by repository path
pub struct RepoMetadataCache {
    vcs: Arc<dyn VersionControl>,
    commits: MemoCache<String>,
    last_updated: MemoCache<String>,
}

impl RepoMetadataCache {
    pub fn new(vcs: Arc<dyn VersionControl>) -> Self {
        Self {
            vcs,
            commits: MemoCache::new(),
            last_updated: MemoCache::new(),
        }
    }

    pub async fn latest_commit(&self, repo: &Path) -> FinderResult<String> {
        self.commits
            .get_or_try_init(repo, || self.vcs.latest_commit(repo))
            .await
    }

    pub async fn last_updated(&self, repo: &Path) -> FinderResult<String> {
        self.last_updated
            .get_or_try_init(repo, || self.vcs.last_updated(repo))
            .await
    }

    /// Number of repositories seen so far
    #[cfg(test)]
    fn repositories(&self) -> usize {
        self.commits.len().max(self.last_updated.len())
    }
}

impl std::fmt::Debug for RepoMetadataCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepoMetadataCache")
            .field("commits", &self.commits)
            .field("last_updated", &self.last_updated)
            .finish()
    }
}

//! Single-flight memoization keyed by path

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;

use crate::error::FinderResult;

/// Append-only cache where each key is computed at most once.
///
/// Concurrent first requests for the same key wait on the one in-flight
/// computation instead of starting their own. A failed computation is not
/// stored, the next request tries again.
#[derive(Debug)]
pub struct MemoCache<V> {
    entries: DashMap<PathBuf, Arc<OnceCell<V>>>,
}

impl<V> Default for MemoCache<V> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<V: Clone> MemoCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_try_init<F, Fut>(&self, key: &Path, init: F) -> FinderResult<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = FinderResult<V>>,
    {
        // clone the cell out so no map shard lock is held across the await
        let cell = self
            .entries
            .entry(key.to_path_buf())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        cell.get_or_try_init(init).await.cloned()
    }

    /// Value for `key` if it has been computed
    #[cfg(test)]
    fn get(&self, key: &Path) -> Option<V> {
        self.entries
            .get(key)
            .and_then(|cell| cell.get().cloned())
    }

    /// Number of keys seen, including ones still being computed
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FinderError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_value_computed_once() {
        let cache = MemoCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_try_init(Path::new("/repos/a"), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok("abc123".to_string())
                })
                .await
                .unwrap();
            assert_eq!(value, "abc123");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.get(Path::new("/repos/a")), Some("abc123".to_string()));
    }

    #[tokio::test]
    async fn test_concurrent_first_requests_share_one_computation() {
        let cache = Arc::new(MemoCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let lookups = (0..10).map(|_| {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            tokio::spawn(async move {
                cache
                    .get_or_try_init(Path::new("/repos/shared"), || async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok("2024-01-01".to_string())
                    })
                    .await
            })
        });

        for result in futures::future::join_all(lookups).await {
            assert_eq!(result.unwrap().unwrap(), "2024-01-01");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let cache = MemoCache::new();
        let a = cache
            .get_or_try_init(Path::new("/repos/a"), || async { Ok(1) })
            .await
            .unwrap();
        let b = cache
            .get_or_try_init(Path::new("/repos/b"), || async { Ok(2) })
            .await
            .unwrap();

        assert_eq!((a, b), (1, 2));
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let cache = MemoCache::new();
        let failed = cache
            .get_or_try_init(Path::new("/repos/a"), || async {
                Err(FinderError::process_failed("git rev-parse HEAD", "exit status: 128"))
            })
            .await;
        assert!(failed.is_err());
        assert_eq!(cache.get(Path::new("/repos/a")), None);

        let retried = cache
            .get_or_try_init(Path::new("/repos/a"), || async { Ok("abc".to_string()) })
            .await;
        assert_eq!(retried.unwrap(), "abc");
    }
}

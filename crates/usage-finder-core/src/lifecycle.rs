//! Subprocess lifecycle guard
//!
//! Every search process is spawned into its own process group and registered
//! here for as long as it runs. When a failure surfaces anywhere in a merge
//! tree, [`terminate_on_error`] signals every registered group so no
//! `xargs`/`rg` descendants are left behind.

use std::sync::Arc;

use dashmap::DashMap;
use futures::{StreamExt, stream};
use once_cell::sync::Lazy;
use tracing::{debug, error, info};

use crate::merge::BoxedStream;

/// Registry of running search processes, keyed by pid
#[derive(Debug, Default)]
pub struct ProcessRegistry {
    processes: DashMap<u32, String>,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a spawned process. The registration lasts as long as the
    /// returned guard.
    pub fn register(self: &Arc<Self>, pid: u32, command: impl Into<String>) -> TrackedProcess {
        let command = command.into();
        debug!("Registered process {}: {}", pid, command);
        self.processes.insert(pid, command);

        TrackedProcess {
            pid,
            registry: Arc::clone(self),
            exited: false,
        }
    }

    fn deregister(&self, pid: u32) {
        self.processes.remove(&pid);
    }

    /// Number of registered processes
    pub fn count(&self) -> usize {
        self.processes.len()
    }

    #[cfg(test)]
    fn contains(&self, pid: u32) -> bool {
        self.processes.contains_key(&pid)
    }

    /// Send SIGTERM to the process group of every registered process.
    ///
    /// Failures, usually because a group has already gone, are logged and
    /// ignored. Returns the number of groups targeted.
    pub fn terminate_all(&self) -> usize {
        let targets: Vec<(u32, String)> = self
            .processes
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        info!("Process groups to try terminating: {}", targets.len());

        for (pid, command) in &targets {
            match terminate_group(*pid) {
                Ok(()) => debug!("Process group terminated: {} ({})", pid, command),
                Err(e) => debug!("Process group {} already terminated ({}): {}", pid, command, e),
            }
        }

        targets.len()
    }
}

static GLOBAL_REGISTRY: Lazy<Arc<ProcessRegistry>> =
    Lazy::new(|| Arc::new(ProcessRegistry::new()));

/// The process-wide registry
pub fn global_registry() -> Arc<ProcessRegistry> {
    Arc::clone(&GLOBAL_REGISTRY)
}

/// Registration of one running process
///
/// Dropping the guard deregisters the process. If it is dropped before the
/// process was seen to exit, because the consumer stopped pulling, the
/// process group is terminated first.
#[derive(Debug)]
pub struct TrackedProcess {
    pid: u32,
    registry: Arc<ProcessRegistry>,
    exited: bool,
}

impl TrackedProcess {
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Record that the process has been waited on
    pub fn mark_exited(&mut self) {
        self.exited = true;
    }
}

impl Drop for TrackedProcess {
    fn drop(&mut self) {
        if !self.exited {
            if let Err(e) = terminate_group(self.pid) {
                debug!("Abandoned process group {} already gone: {}", self.pid, e);
            }
        }
        self.registry.deregister(self.pid);
    }
}

#[cfg(unix)]
fn terminate_group(pid: u32) -> Result<(), String> {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::{Pid, getpgid, getpgrp};

    let pgid = getpgid(Some(Pid::from_raw(pid as i32))).map_err(|e| e.to_string())?;
    if pgid == getpgrp() {
        return Err(format!("process {} shares our own process group", pid));
    }

    killpg(pgid, Signal::SIGTERM).map_err(|e| e.to_string())
}

#[cfg(not(unix))]
fn terminate_group(pid: u32) -> Result<(), String> {
    Err(format!("cannot terminate process group of {} on this platform", pid))
}

/// Wrap a stream so that the first error terminates every registered
/// process group before being passed on. The stream ends after the error.
pub fn terminate_on_error<T>(source: BoxedStream<T>, registry: Arc<ProcessRegistry>) -> BoxedStream<T>
where
    T: Send + 'static,
{
    Box::pin(stream::unfold(Some((source, registry)), |state| async move {
        let (mut source, registry) = state?;

        match source.next().await? {
            Ok(item) => Some((Ok(item), Some((source, registry)))),
            Err(e) => {
                error!("Search failed: {}", e);
                registry.terminate_all();
                Some((Err(e), None))
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FinderError, FinderResult};

    #[test]
    fn test_guard_deregisters_on_drop() {
        let registry = Arc::new(ProcessRegistry::new());
        let mut tracked = registry.register(4_194_400, "rg --json");
        tracked.mark_exited();

        assert_eq!(registry.count(), 1);
        assert!(registry.contains(4_194_400));

        drop(tracked);
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_terminate_all_tolerates_missing_processes() {
        let registry = Arc::new(ProcessRegistry::new());
        let mut gone = registry.register(4_194_401, "rg --json");
        gone.mark_exited();

        assert_eq!(registry.terminate_all(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_terminate_all_signals_process_group() {
        use std::os::unix::process::ExitStatusExt;

        let registry = Arc::new(ProcessRegistry::new());
        let mut child = tokio::process::Command::new("sleep")
            .arg("30")
            .process_group(0)
            .spawn()
            .unwrap();
        let mut tracked = registry.register(child.id().unwrap(), "sleep 30");

        assert_eq!(registry.terminate_all(), 1);

        let status = child.wait().await.unwrap();
        tracked.mark_exited();
        assert_eq!(status.signal(), Some(15));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dropping_unfinished_guard_terminates_group() {
        use std::os::unix::process::ExitStatusExt;

        let registry = Arc::new(ProcessRegistry::new());
        let mut child = tokio::process::Command::new("sleep")
            .arg("30")
            .process_group(0)
            .spawn()
            .unwrap();
        let tracked = registry.register(child.id().unwrap(), "sleep 30");

        drop(tracked);

        let status = child.wait().await.unwrap();
        assert_eq!(status.signal(), Some(15));
        assert_eq!(registry.count(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_terminate_on_error_stops_after_first_error() {
        use std::os::unix::process::ExitStatusExt;

        let registry = Arc::new(ProcessRegistry::new());
        let mut child = tokio::process::Command::new("sleep")
            .arg("30")
            .process_group(0)
            .spawn()
            .unwrap();
        let mut tracked = registry.register(child.id().unwrap(), "sleep 30");

        let source: BoxedStream<u32> = Box::pin(stream::iter(vec![
            Ok(1),
            Err(FinderError::malformed("no repository segment")),
            Ok(3),
        ]));

        let items: Vec<FinderResult<u32>> =
            terminate_on_error(source, Arc::clone(&registry)).collect().await;

        assert_eq!(
            items,
            vec![Ok(1), Err(FinderError::malformed("no repository segment"))]
        );

        let status = child.wait().await.unwrap();
        tracked.mark_exited();
        assert_eq!(status.signal(), Some(15));
    }

    #[tokio::test]
    async fn test_terminate_on_error_passes_clean_streams_through() {
        let registry = Arc::new(ProcessRegistry::new());
        let source: BoxedStream<u32> = Box::pin(stream::iter(vec![Ok(1), Ok(2)]));

        let items: Vec<FinderResult<u32>> = terminate_on_error(source, registry).collect().await;
        assert_eq!(items, vec![Ok(1), Ok(2)]);
    }
}

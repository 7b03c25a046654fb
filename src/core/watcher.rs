//! Single-path filesystem watcher with a multi-subscriber callback registry.
//!
//! [`FsWatcher`] watches exactly one path, normally a repository's index file. Git
//! rewrites the index by renaming `index.lock` over it, which invalidates a watch
//! bound to the old file, so after every dispatched change the watch is re-armed
//! on whatever file now lives at the path.
//!
//! Notifications arrive on `notify`'s own thread and are forwarded over a tokio
//! channel to a dispatch task; callbacks always run on that task.

use crate::core::error::{Result, StatusCacheError};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub type WatchCallback = Arc<dyn Fn(&Path) + Send + Sync>;

type CallbackRegistry = Arc<Mutex<HashMap<CallbackHandle, WatchCallback>>>;

/// Opaque handle returned by [`FsWatcher::register_callback`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackHandle(u64);

/// How hard to try re-arming when the path is momentarily missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RearmPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RearmPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_millis(50),
        }
    }
}

struct ActiveWatch {
    watcher: Arc<Mutex<RecommendedWatcher>>,
    task: JoinHandle<()>,
    /// Cleared by the dispatch task once re-arming gives up
    armed: Arc<AtomicBool>,
}

pub struct FsWatcher {
    path: PathBuf,
    callbacks: CallbackRegistry,
    next_handle: AtomicU64,
    rearm: RearmPolicy,
    runtime: Handle,
    active: Option<ActiveWatch>,
}

impl FsWatcher {
    pub fn new(path: impl Into<PathBuf>, rearm: RearmPolicy, runtime: Handle) -> Self {
        Self {
            path: path.into(),
            callbacks: Arc::new(Mutex::new(HashMap::new())),
            next_handle: AtomicU64::new(0),
            rearm,
            runtime,
            active: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Started, not stopped, and the last re-arm succeeded
    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.armed.load(Ordering::Acquire))
    }

    /// Add a subscriber. Subscribers run in no particular order.
    pub fn register_callback<F>(&self, callback: F) -> CallbackHandle
    where
        F: Fn(&Path) + Send + Sync + 'static,
    {
        let handle = CallbackHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        self.callbacks.lock().insert(handle, Arc::new(callback));
        handle
    }

    /// Remove a subscriber; returns whether it was registered
    pub fn deregister_callback(&self, handle: CallbackHandle) -> bool {
        self.callbacks.lock().remove(&handle).is_some()
    }

    /// Begin watching. Starting a running watcher is a no-op; a watcher that
    /// gave up re-arming is started afresh.
    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Ok(());
        }
        if let Some(lapsed) = self.active.take() {
            lapsed.task.abort();
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.send(res);
        })
        .map_err(|e| StatusCacheError::watch_failed(&self.path, e))?;

        watcher
            .watch(&self.path, RecursiveMode::NonRecursive)
            .map_err(|e| StatusCacheError::watch_failed(&self.path, e))?;

        let watcher = Arc::new(Mutex::new(watcher));
        let armed = Arc::new(AtomicBool::new(true));
        let task = self.runtime.spawn(dispatch_loop(
            self.path.clone(),
            Arc::clone(&self.callbacks),
            Arc::clone(&watcher),
            self.rearm,
            Arc::clone(&armed),
            rx,
        ));

        log::debug!("Watching {}", self.path.display());
        self.active = Some(ActiveWatch {
            watcher,
            task,
            armed,
        });
        Ok(())
    }

    /// Cancel the watch. Stopping a stopped watcher is a no-op.
    pub fn stop(&mut self) -> Result<()> {
        let Some(active) = self.active.take() else {
            return Ok(());
        };

        active.task.abort();
        let result = active.watcher.lock().unwatch(&self.path);

        match result {
            Ok(()) => {}
            // The kernel drops the watch itself once the watched file is replaced.
            Err(e) if matches!(e.kind, notify::ErrorKind::WatchNotFound) => {}
            Err(e) => return Err(StatusCacheError::watch_failed(&self.path, e)),
        }

        log::debug!("Stopped watching {}", self.path.display());
        Ok(())
    }
}

impl Drop for FsWatcher {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.task.abort();
        }
    }
}

async fn dispatch_loop(
    path: PathBuf,
    callbacks: CallbackRegistry,
    watcher: Arc<Mutex<RecommendedWatcher>>,
    rearm: RearmPolicy,
    armed: Arc<AtomicBool>,
    mut rx: mpsc::UnboundedReceiver<notify::Result<Event>>,
) {
    while let Some(result) = rx.recv().await {
        match result {
            Ok(event) if matches!(event.kind, EventKind::Access(_)) => {}
            Ok(event) => {
                log::trace!("Change on {}: {:?}", path.display(), event.kind);
                dispatch(&path, &callbacks);
                if !rearm_watch(&path, &watcher, rearm).await {
                    armed.store(false, Ordering::Release);
                    return;
                }
            }
            Err(e) => log::warn!("Watch error on {}: {e}", path.display()),
        }
    }
}

fn dispatch(path: &Path, callbacks: &CallbackRegistry) {
    let subscribers: Vec<WatchCallback> = callbacks.lock().values().cloned().collect();

    for callback in subscribers {
        if catch_unwind(AssertUnwindSafe(|| callback(path))).is_err() {
            log::error!("Watch callback for {} panicked", path.display());
        }
    }
}

/// Returns `false` once every attempt failed
async fn rearm_watch(
    path: &Path,
    watcher: &Mutex<RecommendedWatcher>,
    policy: RearmPolicy,
) -> bool {
    for attempt in 1..=policy.attempts.max(1) {
        let result = {
            let mut watcher = watcher.lock();
            let _ = watcher.unwatch(path);
            watcher.watch(path, RecursiveMode::NonRecursive)
        };

        match result {
            Ok(()) => return true,
            Err(e) => {
                log::debug!(
                    "Re-arming watch on {} failed (attempt {attempt}): {e}",
                    path.display()
                );
                tokio::time::sleep(policy.delay).await;
            }
        }
    }

    log::error!("Giving up re-arming watch on {}", path.display());
    false
}

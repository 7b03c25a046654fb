//! Process-wide repository tracking: attachments, watchers, cached snapshots and
//! the coalesced refresh protocol.
//!
//! A [`RepositoryRegistry`] owns, per repository root, the attachment counts, the
//! index watcher, the latest [`RepoStatus`] and the "query in flight" flag. All of
//! them live in one map guarded by a single lock, so attach, detach, refresh and
//! query completion are serialised against each other.
//!
//! # Refresh protocol
//! - **Idle -> Querying**: a refresh for an attached root with no query in flight
//!   sets the flag and spawns `git status`.
//! - **Querying -> Querying**: further refreshes are dropped ([`RefreshOutcome::Coalesced`]).
//! - **Querying -> Idle**: the completion stores the snapshot, clears the flag and
//!   pokes the root's debounced notifier, which publishes a [`StatusEvent`].
//!
//! A completion whose root was fully detached in the meantime (or detached and
//! attached again, which starts a new epoch) is discarded.
//!
//! # Example
//! ```no_run
//! use git_status_cache::{ConsumerId, RepositoryRegistry, StatusConfig};
//!
//! # async fn demo() -> git_status_cache::Result<()> {
//! let registry = RepositoryRegistry::new(StatusConfig::default())?;
//! let mut events = registry.subscribe();
//! let root = registry.attach(ConsumerId(1), std::path::Path::new("."))?;
//!
//! while let Ok(event) = events.recv().await {
//!     if let Some(status) = registry.get_status(&event.root) {
//!         println!("{} changed paths", status.status.len());
//!     }
//! }
//! registry.detach(ConsumerId(1), &root);
//! # Ok(())
//! # }
//! ```

use crate::core::{
    config::StatusConfig,
    debounce::Debouncer,
    error::{Result, StatusCacheError},
    git::{index_file, resolve_repo_root, GitCli, GitRunner},
    state::RepoStatus,
    watcher::FsWatcher,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 64;

/// Identifies one consumer (e.g. one directory listing) of the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConsumerId(pub u64);

impl fmt::Display for ConsumerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Published (debounced) after a repository's snapshot was replaced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub root: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new `git status` query was spawned
    Started,
    /// A query is already in flight for this root; the request was dropped
    Coalesced,
    /// Nobody is attached to this root
    NotAttached,
}

struct RepoEntry {
    epoch: u64,
    consumers: HashMap<ConsumerId, usize>,
    /// Index watcher; started lazily when the index file cannot be watched yet
    watcher: FsWatcher,
    status: Option<Arc<RepoStatus>>,
    querying: bool,
    notifier: Arc<Debouncer<PathBuf>>,
}

impl RepoEntry {
    fn attached(&self) -> usize {
        self.consumers.values().sum()
    }
}

#[derive(Default)]
struct RegistryState {
    repos: HashMap<PathBuf, RepoEntry>,
    next_epoch: u64,
}

struct Shared<G> {
    git: G,
    config: StatusConfig,
    runtime: Handle,
    events: broadcast::Sender<StatusEvent>,
    state: Mutex<RegistryState>,
}

pub struct RepositoryRegistry<G: GitRunner = GitCli> {
    shared: Arc<Shared<G>>,
}

impl<G: GitRunner> Clone for RepositoryRegistry<G> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl RepositoryRegistry<GitCli> {
    /// Registry running the configured `git` binary on the current tokio runtime
    pub fn new(config: StatusConfig) -> Result<Self> {
        let git = GitCli::new(config.git_binary.clone());
        Self::with_runner(config, git)
    }
}

impl<G: GitRunner> RepositoryRegistry<G> {
    pub fn with_runner(config: StatusConfig, git: G) -> Result<Self> {
        Ok(Self::with_runtime(config, git, Handle::try_current()?))
    }

    /// Registry scheduling its queries and timers on `runtime`; its methods may
    /// then be called from any thread.
    pub fn with_runtime(config: StatusConfig, git: G, runtime: Handle) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                git,
                config,
                runtime,
                events,
                state: Mutex::new(RegistryState::default()),
            }),
        }
    }

    pub fn config(&self) -> &StatusConfig {
        &self.shared.config
    }

    /// Receive a [`StatusEvent`] after each completed refresh of any root
    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.shared.events.subscribe()
    }

    /// Join the repository containing `path` and request a refresh.
    ///
    /// The first attachment to a root starts its index watcher; later ones
    /// restart it if it is not running. Returns the
    /// repository root, which is the key for every other call.
    pub fn attach(&self, consumer: ConsumerId, path: &Path) -> Result<PathBuf> {
        let root =
            resolve_repo_root(path)?.ok_or_else(|| StatusCacheError::not_a_repository(path))?;
        self.shared.attach_root(consumer, &root);
        self.shared.refresh(&root);
        Ok(root)
    }

    /// Leave a repository. Returns `true` when this released the last attachment
    /// and the root's watcher and cache were torn down.
    pub fn detach(&self, consumer: ConsumerId, root: &Path) -> bool {
        self.shared.detach(consumer, root)
    }

    /// Latest snapshot for `root`; never triggers a query
    pub fn get_status(&self, root: &Path) -> Option<Arc<RepoStatus>> {
        self.shared
            .state
            .lock()
            .repos
            .get(root)
            .and_then(|entry| entry.status.clone())
    }

    pub fn refresh(&self, root: &Path) -> RefreshOutcome {
        self.shared.refresh(root)
    }

    /// Report a filesystem mutation performed by a consumer. Every attached root
    /// containing `path` is refreshed; returns how many queries were started.
    pub fn mutation_observed(&self, path: &Path) -> usize {
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let roots: Vec<PathBuf> = self
            .shared
            .state
            .lock()
            .repos
            .keys()
            .filter(|root| path.starts_with(root))
            .cloned()
            .collect();

        roots
            .iter()
            .filter(|root| self.shared.refresh(root) == RefreshOutcome::Started)
            .count()
    }

    /// Stage `paths`, then refresh `root`. Failures carry git's stderr.
    pub async fn stage(&self, root: &Path, paths: &[PathBuf]) -> Result<()> {
        self.shared.git.stage(root, paths).await?;
        self.shared.refresh(root);
        Ok(())
    }

    /// Unstage `paths`, then refresh `root`. Failures carry git's stderr.
    pub async fn unstage(&self, root: &Path, paths: &[PathBuf]) -> Result<()> {
        self.shared.git.unstage(root, paths).await?;
        self.shared.refresh(root);
        Ok(())
    }

    pub fn attached_count(&self, root: &Path) -> usize {
        self.shared
            .state
            .lock()
            .repos
            .get(root)
            .map_or(0, RepoEntry::attached)
    }

    pub fn is_querying(&self, root: &Path) -> bool {
        self.shared
            .state
            .lock()
            .repos
            .get(root)
            .is_some_and(|entry| entry.querying)
    }

    pub fn is_watching(&self, root: &Path) -> bool {
        self.shared
            .state
            .lock()
            .repos
            .get(root)
            .is_some_and(|entry| entry.watcher.is_running())
    }

    pub fn attached_roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<_> = self.shared.state.lock().repos.keys().cloned().collect();
        roots.sort();
        roots
    }
}

impl<G: GitRunner> Shared<G> {
    fn attach_root(self: &Arc<Self>, consumer: ConsumerId, root: &Path) {
        let mut state = self.state.lock();
        let RegistryState { repos, next_epoch } = &mut *state;
        let mut created = false;

        let entry = repos.entry(root.to_path_buf()).or_insert_with(|| {
            created = true;
            let epoch = *next_epoch;
            *next_epoch += 1;
            log::info!("Tracking repository {}", root.display());

            RepoEntry {
                epoch,
                consumers: HashMap::new(),
                watcher: self.start_watcher(root),
                status: None,
                querying: false,
                notifier: Arc::new(self.notifier(root)),
            }
        });

        if !created {
            ensure_watching(root, &mut entry.watcher);
        }
        *entry.consumers.entry(consumer).or_insert(0) += 1;
        log::debug!(
            "Consumer {consumer} attached to {} ({} attachments)",
            root.display(),
            entry.attached()
        );
    }

    fn detach(&self, consumer: ConsumerId, root: &Path) -> bool {
        let released = {
            let mut state = self.state.lock();

            let Some(entry) = state.repos.get_mut(root) else {
                log::debug!(
                    "Consumer {consumer} detached from untracked {}",
                    root.display()
                );
                return false;
            };

            let Some(count) = entry.consumers.get_mut(&consumer) else {
                log::debug!(
                    "Consumer {consumer} was not attached to {}",
                    root.display()
                );
                return false;
            };

            *count -= 1;
            if *count == 0 {
                entry.consumers.remove(&consumer);
            }
            log::debug!(
                "Consumer {consumer} detached from {} ({} attachments left)",
                root.display(),
                entry.attached()
            );

            if !entry.consumers.is_empty() {
                return false;
            }
            state.repos.remove(root)
        };

        let Some(mut entry) = released else {
            return false;
        };

        entry.notifier.cancel();
        if let Err(e) = entry.watcher.stop() {
            log::warn!("Failed to stop watcher for {}: {e}", root.display());
        }

        log::info!("Stopped tracking repository {}", root.display());
        true
    }

    fn refresh(self: &Arc<Self>, root: &Path) -> RefreshOutcome {
        let epoch = {
            let mut state = self.state.lock();

            let Some(entry) = state.repos.get_mut(root) else {
                log::debug!("Ignoring refresh for untracked {}", root.display());
                return RefreshOutcome::NotAttached;
            };

            if entry.querying {
                log::trace!(
                    "Status query already running for {}, dropping refresh",
                    root.display()
                );
                return RefreshOutcome::Coalesced;
            }

            entry.querying = true;
            entry.epoch
        };

        let shared = Arc::clone(self);
        let root = root.to_path_buf();
        self.runtime.spawn(async move {
            let result = shared
                .git
                .query_status(&root, shared.config.include_ignored)
                .await;
            shared.complete_query(&root, epoch, result);
        });

        RefreshOutcome::Started
    }

    fn complete_query(&self, root: &Path, epoch: u64, result: Result<String>) {
        let snapshot = match result {
            Ok(output) => RepoStatus::from_output(
                root,
                &output,
                &self.config.priorities,
                &self.config.classification,
            ),
            Err(e) => {
                log::warn!("git status failed for {}: {e}", root.display());
                RepoStatus::unavailable(root, e.to_string())
            }
        };

        let notifier = {
            let mut state = self.state.lock();

            match state.repos.get_mut(root) {
                Some(entry) if entry.epoch == epoch => {
                    entry.status = Some(Arc::new(snapshot));
                    entry.querying = false;
                    ensure_watching(root, &mut entry.watcher);
                    Arc::clone(&entry.notifier)
                }
                _ => {
                    log::debug!(
                        "Discarding status for {}: repository was detached while querying",
                        root.display()
                    );
                    return;
                }
            }
        };

        notifier.call(root.to_path_buf());
    }

    fn start_watcher(self: &Arc<Self>, root: &Path) -> FsWatcher {
        let index = index_file(root);
        let mut watcher = FsWatcher::new(
            index.clone(),
            self.config.rearm_policy(),
            self.runtime.clone(),
        );

        let shared = Arc::downgrade(self);
        let watched_root = root.to_path_buf();
        watcher.register_callback(move |_| {
            if let Some(shared) = shared.upgrade() {
                shared.refresh(&watched_root);
            }
        });

        if let Err(e) = watcher.start() {
            log::warn!(
                "Not watching {} yet ({e}); retrying after each refresh",
                index.display()
            );
        }
        watcher
    }

    fn notifier(&self, root: &Path) -> Debouncer<PathBuf> {
        let events = self.events.clone();
        let root = root.to_path_buf();

        Debouncer::new(
            self.config.debounce_interval(),
            self.runtime.clone(),
            move |changed: PathBuf| {
                log::trace!("Publishing status update for {}", root.display());
                // No subscribers is fine
                let _ = events.send(StatusEvent { root: changed });
            },
        )
    }
}

/// Restart a watcher that never started or gave up re-arming, e.g. once the
/// first `git add` has created the index file.
fn ensure_watching(root: &Path, watcher: &mut FsWatcher) {
    if watcher.is_running() {
        return;
    }
    match watcher.start() {
        Ok(()) => log::info!("Resumed watching {}", watcher.path().display()),
        Err(e) => log::debug!("Still not watching the index of {}: {e}", root.display()),
    }
}

//! Git Status Cache - a watched, coalesced `git status` cache for file-manager front ends.
//!
//! Consumers (typically directory listings) attach to the repository containing a
//! path, read per-path statuses with directory rollups from an in-memory snapshot,
//! and get a debounced notification whenever that snapshot is replaced. Snapshots
//! are refreshed when the repository's index file changes, when a consumer reports
//! a filesystem mutation, or on request, with at most one `git status` in flight
//! per repository.
//!
//! # Public API
//! The main public interface is re-exported from the [`core`] module, which provides:
//! - The repository registry (attach, detach, refresh, stage, unstage)
//! - Status parsing, conflict resolution and summaries
//! - The index watcher and the debouncer
//! - Error handling and result types

pub mod commands;
pub mod core;

// Re-export the core public API for external users
pub use core::{
    // Status parsing and aggregation
    resolve,
    ChangeCounts,
    Classification,
    ClassificationTable,
    // Repository lifecycle
    ConsumerId,
    // Change notification
    Debouncer,
    EntryStatus,
    Freshness,
    FsWatcher,
    // Git process boundary
    GitCli,
    GitRunner,
    GitStatusCode,
    PriorityTable,
    RearmPolicy,
    RefreshOutcome,
    RepoStatus,
    RepositoryRegistry,
    // Error handling
    Result,
    // Configuration
    StatusConfig,
    StatusCacheError,
    StatusEvent,
    StatusLine,
    StatusParser,
    StatusSummary,
};

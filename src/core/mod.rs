//! Core functionality for the git status cache.
//!
//! This module provides the building blocks: status parsing and rollup, git process
//! invocation, filesystem watching, debounced notification and the repository
//! registry tying them together.

pub mod config;
pub mod debounce;
pub mod dirs;
pub mod error;
pub mod git;
pub mod git_status;
pub mod output;
pub mod parser;
pub mod registry;
pub mod resolver;
pub mod state;
pub mod summary;
pub mod watcher;

// === Error handling ===
pub use error::{Result, StatusCacheError};

// === Status types ===
// Single-character status codes and the per-path index/working-tree pair
pub use git_status::{EntryStatus, GitStatusCode};

// === Parsing and aggregation ===
pub use parser::{StatusLine, StatusParser};
pub use resolver::{resolve, PriorityTable};
pub use state::{Freshness, RepoStatus};
pub use summary::{ChangeCounts, Classification, ClassificationTable, StatusSummary};

// === Git process boundary ===
pub use git::{index_file, resolve_repo_root, GitCli, GitRunner};

// === Change notification ===
pub use debounce::Debouncer;
pub use watcher::{CallbackHandle, FsWatcher, RearmPolicy};

// === Repository lifecycle ===
pub use registry::{ConsumerId, RefreshOutcome, RepositoryRegistry, StatusEvent};

// === Configuration ===
pub use config::StatusConfig;

// === Output formatting ===
pub use output::{print_error, print_info, print_success};

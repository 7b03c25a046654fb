//! Repository status snapshots.
//!
//! This module defines [`RepoStatus`], the immutable result of one completed
//! `git status` query: a path-indexed status map covering every changed path and
//! all of its ancestor directories, plus an aggregate [`StatusSummary`].
//!
//! # Public API
//! - [`RepoStatus`]: Snapshot for one repository root
//! - [`Freshness`]: Whether the snapshot reflects a successful query
//!
//! # Rollup Strategy
//! - **Leaves**: every parsed line becomes an entry at `root.join(path)`
//! - **Ancestors**: every directory between a leaf and the root (root excluded)
//!   receives the [`resolve`]d maximum of its descendants' statuses
//! - **Summary**: counted over leaves only, never over directory rollups

use crate::core::{
    git_status::EntryStatus,
    parser::{StatusLine, StatusParser},
    resolver::{resolve, PriorityTable},
    summary::{ClassificationTable, StatusSummary},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Freshness {
    /// Built from a successful `git status`
    Current,
    /// `git status` failed; the map is empty but the repository is not known to be clean
    Unavailable { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoStatus {
    pub root: PathBuf,
    pub summary: StatusSummary,
    pub status: BTreeMap<PathBuf, EntryStatus>,
    pub freshness: Freshness,
    pub updated_at: DateTime<Utc>,
}

impl RepoStatus {
    /// Snapshot with no changes, e.g. for a root that vanished from disk
    pub fn empty(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            summary: StatusSummary::default(),
            status: BTreeMap::new(),
            freshness: Freshness::Current,
            updated_at: Utc::now(),
        }
    }

    /// Snapshot standing in for a failed query
    pub fn unavailable(root: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            freshness: Freshness::Unavailable {
                reason: reason.into(),
            },
            ..Self::empty(root)
        }
    }

    /// Parse raw `git status --short` output and build the snapshot
    pub fn from_output(
        root: &Path,
        output: &str,
        priorities: &PriorityTable,
        classification: &ClassificationTable,
    ) -> Self {
        let lines = StatusParser::parse_output(output);
        Self::from_lines(root, &lines, priorities, classification)
    }

    pub fn from_lines(
        root: &Path,
        lines: &[StatusLine],
        priorities: &PriorityTable,
        classification: &ClassificationTable,
    ) -> Self {
        let mut status: BTreeMap<PathBuf, EntryStatus> = BTreeMap::new();

        for line in lines {
            let leaf = root.join(&line.path);
            let merged = resolve(status.get(&leaf), &line.status, priorities);
            status.insert(leaf.clone(), merged);

            for ancestor in leaf.ancestors().skip(1) {
                if ancestor == root || !ancestor.starts_with(root) {
                    break;
                }
                let merged = resolve(status.get(ancestor), &line.status, priorities);
                status.insert(ancestor.to_path_buf(), merged);
            }
        }

        let summary = StatusSummary::from_entries(lines.iter().map(|l| &l.status), classification);

        Self {
            root: root.to_path_buf(),
            summary,
            status,
            freshness: Freshness::Current,
            updated_at: Utc::now(),
        }
    }

    pub fn is_current(&self) -> bool {
        self.freshness == Freshness::Current
    }

    /// Status of one absolute path, file or directory
    pub fn status_of(&self, path: &Path) -> Option<&EntryStatus> {
        self.status.get(path)
    }

    /// Immediate children of `dir` that have a status, keyed by file name
    pub fn entries_in(&self, dir: &Path) -> BTreeMap<String, EntryStatus> {
        self.status
            .range::<Path, _>((std::ops::Bound::Excluded(dir), std::ops::Bound::Unbounded))
            .take_while(|(path, _)| path.starts_with(dir))
            .filter(|(path, _)| path.parent() == Some(dir))
            .filter_map(|(path, status)| {
                path.file_name()
                    .map(|name| (name.to_string_lossy().into_owned(), *status))
            })
            .collect()
    }
}

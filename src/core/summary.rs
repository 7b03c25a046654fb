//! Aggregate change counts for a repository.
//!
//! Every status code is classified as added, removed, modified or nothing through a
//! [`ClassificationTable`]; [`StatusSummary`] counts the classified codes separately
//! for the index and the working tree.

use crate::core::git_status::{EntryStatus, GitStatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Added,
    Removed,
    Modified,
}

/// Maps status codes to a [`Classification`]; unmapped codes are not counted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassificationTable(HashMap<GitStatusCode, Option<Classification>>);

impl ClassificationTable {
    pub fn classify(&self, code: GitStatusCode) -> Option<Classification> {
        self.0.get(&code).copied().flatten()
    }

    pub fn set(&mut self, code: GitStatusCode, classification: Option<Classification>) {
        self.0.insert(code, classification);
    }
}

impl Default for ClassificationTable {
    fn default() -> Self {
        use Classification::*;
        Self(HashMap::from([
            (GitStatusCode::Unmodified, None),
            (GitStatusCode::Modified, Some(Modified)),
            (GitStatusCode::TypeChanged, Some(Modified)),
            (GitStatusCode::Added, Some(Added)),
            (GitStatusCode::Deleted, Some(Removed)),
            (GitStatusCode::Renamed, Some(Modified)),
            (GitStatusCode::Copied, Some(Added)),
            (GitStatusCode::Unmerged, Some(Modified)),
            (GitStatusCode::Untracked, Some(Added)),
            (GitStatusCode::Ignored, None),
            (GitStatusCode::SubmoduleModified, Some(Modified)),
        ]))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeCounts {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
}

impl ChangeCounts {
    pub fn total(&self) -> usize {
        self.added + self.removed + self.modified
    }

    fn record(&mut self, classification: Option<Classification>) {
        match classification {
            Some(Classification::Added) => self.added += 1,
            Some(Classification::Removed) => self.removed += 1,
            Some(Classification::Modified) => self.modified += 1,
            None => {}
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub index: ChangeCounts,
    pub working_tree: ChangeCounts,
}

impl StatusSummary {
    /// Count every entry's two codes
    pub fn from_entries<'a>(
        entries: impl IntoIterator<Item = &'a EntryStatus>,
        table: &ClassificationTable,
    ) -> Self {
        let mut summary = Self::default();
        for entry in entries {
            summary.index.record(table.classify(entry.index));
            summary.working_tree.record(table.classify(entry.working_tree));
        }
        summary
    }

    pub fn is_clean(&self) -> bool {
        self.index.total() == 0 && self.working_tree.total() == 0
    }
}

//! Priority-based combination of statuses for directory rollups.
//!
//! When a changed file's status is propagated to its ancestor directories, every
//! directory keeps the most important code seen so far, chosen independently for
//! the index column and the working-tree column. "Most important" is decided by a
//! [`PriorityTable`]; because [`resolve`] only ever keeps the maximum, applying it
//! in any order over the same statuses converges to the same result.

use crate::core::git_status::{EntryStatus, GitStatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Priority score per status code. Higher wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriorityTable(HashMap<GitStatusCode, u8>);

impl PriorityTable {
    /// Score for `code`; codes missing from a user-supplied table score 0
    pub fn priority(&self, code: GitStatusCode) -> u8 {
        self.0.get(&code).copied().unwrap_or(0)
    }

    pub fn set(&mut self, code: GitStatusCode, priority: u8) {
        self.0.insert(code, priority);
    }
}

impl Default for PriorityTable {
    fn default() -> Self {
        Self(HashMap::from([
            (GitStatusCode::Unmerged, 10),
            (GitStatusCode::Modified, 9),
            (GitStatusCode::SubmoduleModified, 8),
            (GitStatusCode::Added, 7),
            (GitStatusCode::Deleted, 6),
            (GitStatusCode::Renamed, 5),
            (GitStatusCode::Copied, 4),
            (GitStatusCode::TypeChanged, 3),
            (GitStatusCode::Untracked, 2),
            (GitStatusCode::Ignored, 1),
            (GitStatusCode::Unmodified, 0),
        ]))
    }
}

/// Combine an accumulated status with an incoming one.
///
/// Each column keeps the existing code unless the incoming code's priority is
/// strictly higher.
pub fn resolve(
    existing: Option<&EntryStatus>,
    incoming: &EntryStatus,
    priorities: &PriorityTable,
) -> EntryStatus {
    let Some(existing) = existing else {
        return *incoming;
    };

    EntryStatus::new(
        pick(existing.index, incoming.index, priorities),
        pick(existing.working_tree, incoming.working_tree, priorities),
    )
}

fn pick(existing: GitStatusCode, incoming: GitStatusCode, priorities: &PriorityTable) -> GitStatusCode {
    if priorities.priority(incoming) > priorities.priority(existing) {
        incoming
    } else {
        existing
    }
}

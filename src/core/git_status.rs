//! Type-safe git status codes for short-format status output.
//!
//! This module defines [`GitStatusCode`], one column of the two-character code that
//! `git status --short` prints in front of every path, and [`EntryStatus`], the
//! pair of codes (index, working tree) describing one path.
//!
//! # Public API
//! - [`GitStatusCode`]: Enumeration of every single-character status tag
//! - [`EntryStatus`]: Immutable index/working-tree pair for one path
//!
//! # Key Features
//! - **Character mapping**: Lossless conversion from and to the status characters
//! - **Display formatting**: Two-letter rendering identical to git's own output
//! - **Serialization**: snake_case names, usable as keys in configuration tables

use serde::{Deserialize, Serialize};
use std::fmt;

/// One column of a short-format status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GitStatusCode {
    /// No change (' ')
    Unmodified,
    /// Modified (M)
    Modified,
    /// File type changed (T)
    TypeChanged,
    /// Added to the index (A)
    Added,
    /// Deleted (D)
    Deleted,
    /// Renamed (R)
    Renamed,
    /// Copied (C)
    Copied,
    /// Unmerged, conflict pending (U)
    Unmerged,
    /// Untracked (?)
    Untracked,
    /// Ignored (!)
    Ignored,
    /// Submodule with modified content (m)
    SubmoduleModified,
}

impl GitStatusCode {
    /// Every status code, in declaration order
    pub const ALL: [GitStatusCode; 11] = [
        GitStatusCode::Unmodified,
        GitStatusCode::Modified,
        GitStatusCode::TypeChanged,
        GitStatusCode::Added,
        GitStatusCode::Deleted,
        GitStatusCode::Renamed,
        GitStatusCode::Copied,
        GitStatusCode::Unmerged,
        GitStatusCode::Untracked,
        GitStatusCode::Ignored,
        GitStatusCode::SubmoduleModified,
    ];

    /// Parse a single status character
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            ' ' => Some(GitStatusCode::Unmodified),
            'M' => Some(GitStatusCode::Modified),
            'T' => Some(GitStatusCode::TypeChanged),
            'A' => Some(GitStatusCode::Added),
            'D' => Some(GitStatusCode::Deleted),
            'R' => Some(GitStatusCode::Renamed),
            'C' => Some(GitStatusCode::Copied),
            'U' => Some(GitStatusCode::Unmerged),
            '?' => Some(GitStatusCode::Untracked),
            '!' => Some(GitStatusCode::Ignored),
            'm' => Some(GitStatusCode::SubmoduleModified),
            _ => None,
        }
    }

    /// The character git prints for this code
    pub fn as_char(&self) -> char {
        match self {
            GitStatusCode::Unmodified => ' ',
            GitStatusCode::Modified => 'M',
            GitStatusCode::TypeChanged => 'T',
            GitStatusCode::Added => 'A',
            GitStatusCode::Deleted => 'D',
            GitStatusCode::Renamed => 'R',
            GitStatusCode::Copied => 'C',
            GitStatusCode::Unmerged => 'U',
            GitStatusCode::Untracked => '?',
            GitStatusCode::Ignored => '!',
            GitStatusCode::SubmoduleModified => 'm',
        }
    }

    /// Get human-readable description for status
    pub fn description(&self) -> &'static str {
        match self {
            GitStatusCode::Unmodified => "unmodified",
            GitStatusCode::Modified => "modified",
            GitStatusCode::TypeChanged => "type changed",
            GitStatusCode::Added => "added",
            GitStatusCode::Deleted => "deleted",
            GitStatusCode::Renamed => "renamed",
            GitStatusCode::Copied => "copied",
            GitStatusCode::Unmerged => "unmerged",
            GitStatusCode::Untracked => "untracked",
            GitStatusCode::Ignored => "ignored",
            GitStatusCode::SubmoduleModified => "submodule modified",
        }
    }

    /// Renames and copies are printed with an `old -> new` path
    pub fn has_source_path(&self) -> bool {
        matches!(self, GitStatusCode::Renamed | GitStatusCode::Copied)
    }
}

impl fmt::Display for GitStatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Status of exactly one path: index column and working-tree column.
///
/// Values are never mutated in place; a newer query replaces them wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryStatus {
    pub index: GitStatusCode,
    pub working_tree: GitStatusCode,
}

impl EntryStatus {
    pub const fn new(index: GitStatusCode, working_tree: GitStatusCode) -> Self {
        Self {
            index,
            working_tree,
        }
    }

    /// Something is staged for this path
    pub fn is_staged(&self) -> bool {
        !matches!(
            self.index,
            GitStatusCode::Unmodified | GitStatusCode::Untracked | GitStatusCode::Ignored
        )
    }

    pub fn is_untracked(&self) -> bool {
        self.index == GitStatusCode::Untracked && self.working_tree == GitStatusCode::Untracked
    }

    pub fn is_ignored(&self) -> bool {
        self.index == GitStatusCode::Ignored && self.working_tree == GitStatusCode::Ignored
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.index, self.working_tree)
    }
}

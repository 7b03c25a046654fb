//! Domain-specific error types and error handling utilities.
//!
//! This module defines [`StatusCacheError`] which covers every failure mode of the
//! status cache. It uses `thiserror` for ergonomic error definitions and includes
//! named constructors for the common failure scenarios.
//!
//! # Public API
//! - [`StatusCacheError`]: Main error enum covering all failure modes
//! - [`Result<T>`]: Type alias for `std::result::Result<T, StatusCacheError>`
//!
//! # Error Categories
//! - **Parsing**: A `git status --short` line that does not match the grammar
//! - **Process**: `git` exiting non-zero or missing from the path
//! - **Repository**: No repository found for a path, git2 discovery errors
//! - **Watching**: Filesystem notification setup failures
//! - **Configuration**: Unreadable or malformed configuration files

use std::path::PathBuf;
use thiserror::Error;

/// Domain-specific error types for the status cache
#[derive(Error, Debug)]
pub enum StatusCacheError {
    // Parse errors
    #[error("Invalid status line '{line}': {reason}")]
    Parse { line: String, reason: &'static str },

    // Process errors
    #[error("{command} failed{}: {}", exit_suffix(.code), stderr_or_placeholder(.stderr))]
    GitCommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Git executable '{binary}' was not found on the path")]
    GitNotFound { binary: String },

    // Repository errors
    #[error("Not in a git repository: {path}")]
    NotARepository { path: PathBuf },

    #[error("Git repository error: {0}")]
    Git2(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timed out waiting for the status of {root}")]
    StatusTimeout { root: PathBuf },

    #[error("Status of {root} is unavailable: {reason}")]
    StatusUnavailable { root: PathBuf, reason: String },

    // Watcher errors
    #[error("Failed to watch '{path}': {source}")]
    Watch {
        path: PathBuf,
        source: notify::Error,
    },

    // Configuration errors
    #[error("Could not find configuration directory")]
    ConfigDirectoryNotFound,

    #[error("Failed to read config file '{path}': {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Runtime errors
    #[error("No async runtime available: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

fn exit_suffix(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!(" with exit code {code}"),
        None => " (terminated by signal)".to_string(),
    }
}

fn stderr_or_placeholder(stderr: &str) -> &str {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        "<no stderr>"
    } else {
        trimmed
    }
}

/// Convenience type alias for Results using StatusCacheError
pub type Result<T> = std::result::Result<T, StatusCacheError>;

impl StatusCacheError {
    /// Create a parse error for a single status line
    pub fn parse_error(line: impl Into<String>, reason: &'static str) -> Self {
        Self::Parse {
            line: line.into(),
            reason,
        }
    }

    /// Create a git command failure carrying the captured stderr
    pub fn git_command_failed(
        command: impl Into<String>,
        code: Option<i32>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::GitCommandFailed {
            command: command.into(),
            code,
            stderr: stderr.into(),
        }
    }

    /// Create a git-not-found error
    pub fn git_not_found(binary: impl Into<String>) -> Self {
        Self::GitNotFound {
            binary: binary.into(),
        }
    }

    /// Create a not-a-repository error
    pub fn not_a_repository(path: impl Into<PathBuf>) -> Self {
        Self::NotARepository { path: path.into() }
    }

    /// Create a status-unavailable error
    pub fn status_unavailable(root: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::StatusUnavailable {
            root: root.into(),
            reason: reason.into(),
        }
    }

    /// Create a watch error for a path
    pub fn watch_failed(path: impl Into<PathBuf>, source: notify::Error) -> Self {
        Self::Watch {
            path: path.into(),
            source,
        }
    }

    /// Create a config read error
    pub fn config_read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigRead {
            path: path.into(),
            source,
        }
    }

    /// Create a config parse error
    pub fn config_parse_failed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::ConfigParse {
            path: path.into(),
            source,
        }
    }

    /// Captured stderr of a failed git command, if this is one
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::GitCommandFailed { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = StatusCacheError::parse_error("X", "line too short");
        assert_eq!(err.to_string(), "Invalid status line 'X': line too short");
    }

    #[test]
    fn test_git_command_failed_display() {
        let err = StatusCacheError::git_command_failed(
            "git add",
            Some(128),
            "fatal: pathspec 'nope' did not match any files\n",
        );
        assert_eq!(
            err.to_string(),
            "git add failed with exit code 128: fatal: pathspec 'nope' did not match any files"
        );
        assert_eq!(
            err.stderr(),
            Some("fatal: pathspec 'nope' did not match any files\n")
        );
    }

    #[test]
    fn test_git_command_failed_without_stderr() {
        let err = StatusCacheError::git_command_failed("git status", None, "");
        assert_eq!(
            err.to_string(),
            "git status failed (terminated by signal): <no stderr>"
        );
    }

    #[test]
    fn test_not_a_repository_error() {
        let err = StatusCacheError::not_a_repository("/tmp/nowhere");
        assert_eq!(err.to_string(), "Not in a git repository: /tmp/nowhere");
        assert!(err.stderr().is_none());
    }

    #[test]
    fn test_git_not_found_error() {
        let err = StatusCacheError::git_not_found("git-does-not-exist");
        assert!(err.to_string().contains("git-does-not-exist"));
    }

    #[test]
    fn test_config_parse_failed() {
        let path = std::path::PathBuf::from("/test/config.json");
        let json_err = serde_json::from_str::<serde_json::Value>("{ invalid json").unwrap_err();
        let err = StatusCacheError::config_parse_failed(&path, json_err);
        assert!(err.to_string().contains("/test/config.json"));
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_config_read_failed() {
        let path = std::path::PathBuf::from("/test/config.json");
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = StatusCacheError::config_read_failed(&path, io_err);
        assert!(err.to_string().contains("/test/config.json"));
        assert!(err.to_string().contains("access denied"));
    }
}

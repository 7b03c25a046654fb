//! Git process invocation and repository discovery.
//!
//! This module wraps the `git` binary behind the [`GitRunner`] trait. The
//! production implementation, [`GitCli`], spawns `git` through `tokio::process` so
//! that no caller ever blocks on a subprocess. Repository discovery goes through
//! `git2`.
//!
//! # Public API
//! - [`GitRunner`]: Async status/stage/unstage operations on one repository
//! - [`GitCli`]: `GitRunner` backed by the `git` executable
//! - [`resolve_repo_root`]: Find the working-tree root containing a path
//! - [`index_file`]: Location of a repository's index file

use crate::core::error::{Result, StatusCacheError};
use git2::{ErrorCode, Repository};
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;

/// Asynchronous git operations used by the registry.
///
/// Non-zero exits are reported as [`StatusCacheError::GitCommandFailed`] carrying the
/// captured stderr; nothing is retried.
pub trait GitRunner: Send + Sync + 'static {
    /// Raw `git status --short` output for `repo_root`, paths relative to the root
    fn query_status(
        &self,
        repo_root: &Path,
        include_ignored: bool,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Add `paths` to the index
    fn stage(&self, repo_root: &Path, paths: &[PathBuf]) -> impl Future<Output = Result<()>> + Send;

    /// Remove `paths` from the index, keeping working-tree changes
    fn unstage(
        &self,
        repo_root: &Path,
        paths: &[PathBuf],
    ) -> impl Future<Output = Result<()>> + Send;
}

#[derive(Debug, Clone)]
pub struct GitCli {
    binary: String,
}

impl GitCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn command(&self, repo_root: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.current_dir(repo_root).kill_on_drop(true);
        cmd
    }

    /// Execute a git command and fail on non-zero exit
    async fn execute_git_command(&self, mut cmd: Command, label: &str) -> Result<Output> {
        log::debug!("Running {label}");

        let output = cmd.output().await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                StatusCacheError::git_not_found(&self.binary)
            } else {
                StatusCacheError::Io(e)
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            return Err(StatusCacheError::git_command_failed(
                label,
                output.status.code(),
                stderr,
            ));
        }

        Ok(output)
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitRunner for GitCli {
    async fn query_status(&self, repo_root: &Path, include_ignored: bool) -> Result<String> {
        // A root deleted between the request and now is simply clean.
        if let Err(e) = tokio::fs::metadata(repo_root).await {
            if e.kind() == ErrorKind::NotFound {
                log::debug!(
                    "Repository root {} no longer exists, reporting no changes",
                    repo_root.display()
                );
                return Ok(String::new());
            }
        }

        let mut cmd = self.command(repo_root);
        cmd.args([
            "-c",
            "status.relativePaths=false",
            "-c",
            "core.quotePath=false",
            "-c",
            "color.status=false",
            "status",
            "--short",
        ]);
        if include_ignored {
            cmd.arg("--ignored");
        }
        cmd.arg(repo_root);

        let output = self.execute_git_command(cmd, "git status").await?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn stage(&self, repo_root: &Path, paths: &[PathBuf]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }

        let mut cmd = self.command(repo_root);
        cmd.arg("add").arg("--").args(paths);

        self.execute_git_command(cmd, "git add").await?;
        Ok(())
    }

    async fn unstage(&self, repo_root: &Path, paths: &[PathBuf]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }

        let mut cmd = self.command(repo_root);
        cmd.arg("reset").arg("--quiet").arg("--").args(paths);

        self.execute_git_command(cmd, "git reset").await?;
        Ok(())
    }
}

/// Locate the working-tree root of the repository containing `path`.
///
/// Returns `None` for paths outside any repository and for bare repositories;
/// a repository that is found but cannot be opened is an error.
pub fn resolve_repo_root(path: &Path) -> Result<Option<PathBuf>> {
    let Some(repo) = discovered(Repository::discover(path))? else {
        return Ok(None);
    };
    let Some(workdir) = repo.workdir() else {
        return Ok(None);
    };
    let root = workdir.canonicalize().unwrap_or_else(|_| workdir.to_path_buf());
    // Drops the trailing separator git2 leaves on workdir paths
    Ok(Some(root.components().collect()))
}

fn discovered(result: std::result::Result<Repository, git2::Error>) -> Result<Option<Repository>> {
    match result {
        Ok(repo) => Ok(Some(repo)),
        Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Index file of the repository rooted at `repo_root`.
///
/// Follows `.git` files (worktrees, submodules) through git2; falls back to
/// `<root>/.git/index`.
pub fn index_file(repo_root: &Path) -> PathBuf {
    match Repository::open(repo_root) {
        Ok(repo) => repo.path().join("index"),
        Err(_) => repo_root.join(".git").join("index"),
    }
}

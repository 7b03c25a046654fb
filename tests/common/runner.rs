//! Scripted [`GitRunner`] whose status queries block until the test releases them

#![allow(dead_code)]

use git_status_cache::core::error::{Result, StatusCacheError};
use git_status_cache::GitRunner;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

#[derive(Clone)]
pub struct GatedRunner {
    gate: Arc<Semaphore>,
    calls: Arc<AtomicUsize>,
    /// Output for the n-th query; the last entry repeats
    outputs: Arc<Vec<std::result::Result<String, String>>>,
    staged: Arc<Mutex<Vec<PathBuf>>>,
}

impl GatedRunner {
    /// Every query waits for [`GatedRunner::release`]
    pub fn gated(outputs: &[&str]) -> Self {
        Self::build(0, outputs.iter().map(|o| Ok(o.to_string())).collect())
    }

    /// Queries answer immediately
    pub fn open(output: &str) -> Self {
        Self::build(Semaphore::MAX_PERMITS, vec![Ok(output.to_string())])
    }

    /// Queries answer immediately with a failed `git status`
    pub fn failing(stderr: &str) -> Self {
        Self::build(Semaphore::MAX_PERMITS, vec![Err(stderr.to_string())])
    }

    fn build(permits: usize, outputs: Vec<std::result::Result<String, String>>) -> Self {
        Self {
            gate: Arc::new(Semaphore::new(permits)),
            calls: Arc::new(AtomicUsize::new(0)),
            outputs: Arc::new(outputs),
            staged: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Let `n` waiting (or future) queries finish, oldest first
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    /// Number of queries started so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn staged(&self) -> Vec<PathBuf> {
        self.staged.lock().clone()
    }
}

impl GitRunner for GatedRunner {
    async fn query_status(&self, _repo_root: &Path, _include_ignored: bool) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self
            .outputs
            .get(call)
            .or_else(|| self.outputs.last())
            .cloned()
            .unwrap_or_else(|| Ok(String::new()));

        let permit = self.gate.acquire().await.expect("gate closed");
        permit.forget();

        scripted.map_err(|stderr| StatusCacheError::git_command_failed("git status", Some(128), stderr))
    }

    async fn stage(&self, _repo_root: &Path, paths: &[PathBuf]) -> Result<()> {
        self.staged.lock().extend_from_slice(paths);
        Ok(())
    }

    async fn unstage(&self, _repo_root: &Path, paths: &[PathBuf]) -> Result<()> {
        self.staged.lock().retain(|p| !paths.contains(p));
        Ok(())
    }
}

//! Common assertion helpers for test output validation

#![allow(dead_code)]

use predicates::prelude::*;
use std::time::Duration;

/// Creates a predicate that checks for the not-a-repository error message
pub fn not_in_git_repo() -> impl Predicate<str> {
    predicates::str::contains("Not in a git repository")
}

/// Creates a predicate that checks for one `XY path` status line
pub fn has_entry(status: &str, path: &str) -> impl Predicate<str> {
    predicates::str::contains(format!("{status} {path}"))
}

/// Creates a predicate that checks for the summary line
pub fn has_summary() -> impl Predicate<str> {
    predicates::str::contains("index +").and(predicates::str::contains("| worktree +"))
}

/// Poll `condition` until it holds, failing the test after five seconds
pub async fn wait_until(description: &str, condition: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !condition() {
        if tokio::time::Instant::now() > deadline {
            panic!("timed out waiting until {description}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

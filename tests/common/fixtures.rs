//! Predefined repository scenarios

#![allow(dead_code)]

use super::repository::*;
use git_status_cache::core::error::Result;

/// Scenario: one file of every common kind of change
///
/// ```text
/// A  staged.txt
///  M initial.txt
/// ?? src/new.rs
/// D  gone.txt
/// ```
pub fn create_mixed_change_repo() -> Result<TestRepo> {
    let repo = setup_test_repo()?;

    create_file(&repo.path, "initial.txt", "initial content\n")?;
    create_file(&repo.path, "gone.txt", "soon removed\n")?;
    git_add(&repo.path, ".")?;
    git_commit(&repo.path, "Initial commit")?;

    create_file(&repo.path, "staged.txt", "staged\n")?;
    git_add(&repo.path, "staged.txt")?;
    create_file(&repo.path, "initial.txt", "modified content\n")?;
    create_file(&repo.path, "src/new.rs", "fn main() {}\n")?;
    git(&repo.path, &["rm", "--quiet", "gone.txt"])?;

    Ok(repo)
}

use crate::core::{
    config::StatusConfig,
    error::{Result, StatusCacheError},
    git::resolve_repo_root,
    output::print_success,
    registry::RepositoryRegistry,
};
use std::env;
use std::path::PathBuf;

pub async fn execute_stage(config: StatusConfig, paths: Vec<PathBuf>) -> Result<()> {
    let (registry, root, paths) = prepare(config, paths)?;
    registry.stage(&root, &paths).await?;
    print_success(&format!("Staged {} path(s)", paths.len()));
    Ok(())
}

pub async fn execute_unstage(config: StatusConfig, paths: Vec<PathBuf>) -> Result<()> {
    let (registry, root, paths) = prepare(config, paths)?;
    registry.unstage(&root, &paths).await?;
    print_success(&format!("Unstaged {} path(s)", paths.len()));
    Ok(())
}

/// Paths are given relative to the current directory but git runs in the root
fn prepare(
    config: StatusConfig,
    paths: Vec<PathBuf>,
) -> Result<(RepositoryRegistry, PathBuf, Vec<PathBuf>)> {
    let current_dir = env::current_dir()?.canonicalize()?;
    let root = resolve_repo_root(&current_dir)?
        .ok_or_else(|| StatusCacheError::not_a_repository(&current_dir))?;
    let absolute = paths.iter().map(|p| current_dir.join(p)).collect();

    Ok((RepositoryRegistry::new(config)?, root, absolute))
}

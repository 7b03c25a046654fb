use crate::commands::CLI_CONSUMER;
use crate::core::{
    config::StatusConfig,
    error::{Result, StatusCacheError},
    git::GitRunner,
    output::{format_entry, format_summary, print_info},
    registry::{RepositoryRegistry, StatusEvent},
    state::{Freshness, RepoStatus},
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::Instant;

const SNAPSHOT_TIMEOUT: Duration = Duration::from_secs(30);

pub async fn execute_status(config: StatusConfig, path: &Path, json: bool) -> Result<()> {
    let registry = RepositoryRegistry::new(config)?;
    let mut events = registry.subscribe();
    let root = registry.attach(CLI_CONSUMER, path)?;

    let snapshot = wait_for_snapshot(&registry, &mut events, &root, SNAPSHOT_TIMEOUT).await;
    registry.detach(CLI_CONSUMER, &root);
    let snapshot = snapshot?;

    if let Freshness::Unavailable { reason } = &snapshot.freshness {
        return Err(StatusCacheError::status_unavailable(&root, reason.clone()));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&*snapshot)?);
    } else {
        print_snapshot(&snapshot);
    }

    Ok(())
}

/// Wait until `root` publishes a snapshot
pub async fn wait_for_snapshot<G: GitRunner>(
    registry: &RepositoryRegistry<G>,
    events: &mut broadcast::Receiver<StatusEvent>,
    root: &Path,
    timeout: Duration,
) -> Result<Arc<RepoStatus>> {
    let deadline = Instant::now() + timeout;

    loop {
        let event = tokio::time::timeout_at(deadline, events.recv())
            .await
            .map_err(|_| StatusCacheError::StatusTimeout {
                root: root.to_path_buf(),
            })?;

        match event {
            Ok(event) if event.root == root => {
                if let Some(snapshot) = registry.get_status(root) {
                    return Ok(snapshot);
                }
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                log::debug!("Skipped {skipped} status events");
                if let Some(snapshot) = registry.get_status(root) {
                    return Ok(snapshot);
                }
            }
            Err(RecvError::Closed) => {
                return Err(StatusCacheError::StatusTimeout {
                    root: root.to_path_buf(),
                })
            }
        }
    }
}

fn print_snapshot(snapshot: &RepoStatus) {
    println!("{}", snapshot.root.display());

    for (path, status) in &snapshot.status {
        let Ok(relative) = path.strip_prefix(&snapshot.root) else {
            continue;
        };
        let mut line = format_entry(status, relative);
        if path.is_dir() {
            line.push('/');
        }
        println!("{line}");
    }

    print_info(&format_summary(&snapshot.summary));
}

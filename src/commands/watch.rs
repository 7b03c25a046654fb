use crate::commands::CLI_CONSUMER;
use crate::core::{
    config::StatusConfig,
    error::Result,
    output::{format_freshness, format_summary, print_error, print_info},
    registry::RepositoryRegistry,
    state::RepoStatus,
};
use std::path::Path;
use tokio::sync::broadcast::error::RecvError;

/// Print one summary line per debounced update until Ctrl-C
pub async fn execute_watch(config: StatusConfig, path: &Path) -> Result<()> {
    let registry = RepositoryRegistry::new(config)?;
    let mut events = registry.subscribe();
    let root = registry.attach(CLI_CONSUMER, path)?;

    print_info(&format!("Watching {} (Ctrl-C to stop)", root.display()));
    if !registry.is_watching(&root) {
        print_info("Index file not watchable yet; watching starts after the next refresh");
    }

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) if event.root == root => {
                    if let Some(snapshot) = registry.get_status(&root) {
                        print_update(&snapshot);
                    }
                }
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    registry.detach(CLI_CONSUMER, &root);
    Ok(())
}

fn print_update(snapshot: &RepoStatus) {
    let time = snapshot
        .updated_at
        .with_timezone(&chrono::Local)
        .format("%H:%M:%S");

    match format_freshness(&snapshot.freshness) {
        Some(problem) => print_error(&format!("[{time}] {problem}")),
        None => println!("[{time}] {}", format_summary(&snapshot.summary)),
    }
}

//! Debounced watch loop over the source file.
//!
//! Raw notify events are bridged onto a tokio channel and collapsed by a
//! quiet-window debounce. Each settled change closes the subscription, runs
//! the sync pipeline, and re-subscribes: editors like vim rename the file to
//! a backup on save, which silently ends the life of the original watch
//! handle.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::sync;

/// Watch the configured file forever, syncing on each settled change.
///
/// Pipeline errors are logged and swallowed; only a failure of the watch
/// subscription itself ends the loop. At most one pipeline runs at a time
/// because the subscription is closed before the pipeline starts and not
/// reopened until it finishes.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let org_path = orgdocs_core::resolve_home(&config.org_file);
    let quiet = Duration::from_millis(config.debounce_ms);

    info!("watching {} for changes", org_path.display());

    loop {
        let (tx, mut rx) = mpsc::channel(64);
        let watcher = subscribe(&org_path, tx)?;

        wait_for_settled_change(&mut rx, quiet).await?;

        // Closed before the pipeline runs so a new subscription can bind to
        // whatever file identity the editor left behind.
        drop(watcher);

        if let Err(e) = sync::run_cycle(&config).await {
            error!("sync failed: {e:#}");
        }

        debug!("re-arming watch on {}", org_path.display());
    }
}

/// Subscribe to raw change notifications for one path.
fn subscribe(path: &Path, tx: mpsc::Sender<Event>) -> anyhow::Result<RecommendedWatcher> {
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        if let Ok(event) = res {
            let _ = tx.blocking_send(event);
        }
    })?;

    watcher
        .watch(path, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch {}", path.display()))?;

    Ok(watcher)
}

/// Block until a change happens and the file has been quiet for `quiet`.
///
/// A burst of raw events within the window collapses into this single
/// return; the caller runs exactly one pipeline per settled change.
async fn wait_for_settled_change(
    rx: &mut mpsc::Receiver<Event>,
    quiet: Duration,
) -> anyhow::Result<()> {
    rx.recv().await.context("watch event channel closed")?;

    loop {
        match tokio::time::timeout(quiet, rx.recv()).await {
            // More events inside the window: keep waiting for quiet.
            Ok(Some(_)) => continue,
            Ok(None) => anyhow::bail!("watch event channel closed"),
            // Window elapsed with no further events: settled.
            Err(_) => return Ok(()),
        }
    }
}

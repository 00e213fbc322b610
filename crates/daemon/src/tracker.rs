// SPDX-License-Identifier: MIT

//! Node change tracker (C2): polls child revisions under a root path and
//! emits the paths whose revision advanced, appeared, or vanished.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use va_core::TreePath;

use va_adapters::{TreeClient, TreeClientError};

const EVENT_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug)]
pub enum TrackerEvent {
    Paths(Vec<String>),
    Error(TreeClientError),
}

/// `TrackChildren(ctx, root, period, client)`: a lazy, single-producer
/// sequence of [`TrackerEvent`]s, realized here as a spawned task feeding a
/// bounded channel. The channel is bounded rather than unbounded to give the
/// "drop missed ticks rather than queue" back-pressure policy of §4.1 a
/// concrete meaning: a slow consumer sees the tracker skip ahead rather than
/// build up a backlog of stale snapshots.
pub struct NodeChangeTracker<T: TreeClient> {
    client: Arc<T>,
    root: TreePath,
    period: std::time::Duration,
}

impl<T: TreeClient + 'static> NodeChangeTracker<T> {
    pub fn new(client: Arc<T>, root: TreePath, period: std::time::Duration) -> Self {
        Self { client, root, period }
    }

    pub fn spawn(self, cancel: CancellationToken) -> mpsc::Receiver<TrackerEvent> {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        tokio::spawn(self.run(tx, cancel));
        rx
    }

    async fn run(self, tx: mpsc::Sender<TrackerEvent>, cancel: CancellationToken) {
        let mut last: HashMap<String, u64> = HashMap::new();
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = ticker.tick() => {}
            }

            match self.client.snapshot_revisions(&self.root).await {
                Ok(snapshot) => {
                    let changed = diff_snapshot(&last, &snapshot);
                    last = snapshot.into_iter().map(|nr| (nr.path, nr.revision)).collect();
                    if changed.is_empty() {
                        continue;
                    }
                    if tx.try_send(TrackerEvent::Paths(changed)).is_err() {
                        warn!("node change tracker dropped a tick: consumer channel full or closed");
                    }
                }
                Err(err) => {
                    if tx.try_send(TrackerEvent::Error(err)).is_err() {
                        warn!("node change tracker dropped an error event: consumer channel full or closed");
                    }
                }
            }
        }
    }
}

fn diff_snapshot(
    last: &HashMap<String, u64>,
    snapshot: &[va_adapters::NodeRevision],
) -> Vec<String> {
    let mut changed = Vec::new();
    let mut seen = std::collections::HashSet::with_capacity(snapshot.len());

    for node in snapshot {
        seen.insert(node.path.as_str());
        match last.get(&node.path) {
            None => changed.push(node.path.clone()),
            Some(prev) if *prev < node.revision => changed.push(node.path.clone()),
            _ => {}
        }
    }

    for path in last.keys() {
        if !seen.contains(path.as_str()) {
            changed.push(path.clone());
        }
    }

    changed
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT

//! Operation census (C3): periodically lists running operations filtered by
//! namespace and emits snapshots.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use va_core::OperationStatus;

use va_adapters::{ClusterClient, ClusterClientError};

const EVENT_CHANNEL_CAPACITY: usize = 4;

#[derive(Debug)]
pub enum CensusEvent {
    Operations(Vec<OperationStatus>),
    Error(ClusterClientError),
}

/// `CollectOperations(ctx, client, period, namespace) -> lazy sequence`,
/// realized as a spawned task feeding a bounded channel. One snapshot is
/// emitted per tick; errors are reported but do not advance the snapshot
/// (the dispatcher simply waits for the next tick).
pub struct OperationCensus<C: ClusterClient> {
    client: Arc<C>,
    namespace: String,
    period: std::time::Duration,
}

impl<C: ClusterClient + 'static> OperationCensus<C> {
    pub fn new(client: Arc<C>, namespace: String, period: std::time::Duration) -> Self {
        Self { client, namespace, period }
    }

    pub fn spawn(self, cancel: CancellationToken) -> mpsc::Receiver<CensusEvent> {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        tokio::spawn(self.run(tx, cancel));
        rx
    }

    async fn run(self, tx: mpsc::Sender<CensusEvent>, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = ticker.tick() => {}
            }

            let event = match self.client.list_operations(&self.namespace).await {
                Ok(operations) => CensusEvent::Operations(operations),
                Err(err) => CensusEvent::Error(err),
            };
            if tx.try_send(event).is_err() {
                warn!("operation census dropped a tick: consumer channel full or closed");
            }
        }
    }
}

#[cfg(test)]
#[path = "census_tests.rs"]
mod tests;

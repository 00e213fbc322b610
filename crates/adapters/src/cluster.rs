// SPDX-License-Identifier: MIT

//! Cluster client contract (C8): the narrow surface the reconciliation
//! core needs from the cluster orchestration system. The wire protocol of
//! a concrete cluster is out of scope; see `kube::KubeClusterClient` for
//! an illustrative production-shaped binding.

use async_trait::async_trait;
use thiserror::Error;

use va_core::{OperationId, OperationStatus};

#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// All currently running vanilla operations tagged with `namespace`.
    /// Alias-level filtering (dangling vs. owned) is the caller's job.
    async fn list_operations(
        &self,
        namespace: &str,
    ) -> Result<Vec<OperationStatus>, ClusterClientError>;

    /// Abort a running operation. Failures are logged and ignored by the
    /// caller — a dangling operation reappears in the next census and the
    /// attempt is simply repeated.
    async fn abort_operation(&self, id: &OperationId) -> Result<(), ClusterClientError>;
}

#[derive(Debug, Error)]
pub enum ClusterClientError {
    #[error("operation listing failed: {0}")]
    Listing(String),
    #[error("operation abort failed: {0}")]
    Abort(String),
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use std::sync::atomic::{AtomicBool, Ordering};

    use parking_lot::Mutex;

    use super::*;

    /// Fully scriptable in-memory [`ClusterClient`].
    #[derive(Default)]
    pub struct FakeClusterClient {
        operations: Mutex<Vec<OperationStatus>>,
        aborted: Mutex<Vec<OperationId>>,
        fail_listing_next: AtomicBool,
        fail_abort_next: AtomicBool,
    }

    impl FakeClusterClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_operations(&self, operations: Vec<OperationStatus>) {
            *self.operations.lock() = operations;
        }

        pub fn fail_next_listing(&self) {
            self.fail_listing_next.store(true, Ordering::SeqCst);
        }

        pub fn fail_next_abort(&self) {
            self.fail_abort_next.store(true, Ordering::SeqCst);
        }

        /// Operation IDs passed to `abort_operation`, in call order.
        pub fn aborted(&self) -> Vec<OperationId> {
            self.aborted.lock().clone()
        }
    }

    #[async_trait]
    impl ClusterClient for FakeClusterClient {
        async fn list_operations(
            &self,
            _namespace: &str,
        ) -> Result<Vec<OperationStatus>, ClusterClientError> {
            if self.fail_listing_next.swap(false, Ordering::SeqCst) {
                return Err(ClusterClientError::Listing("fake transient failure".to_string()));
            }
            Ok(self.operations.lock().clone())
        }

        async fn abort_operation(&self, id: &OperationId) -> Result<(), ClusterClientError> {
            self.aborted.lock().push(id.clone());
            if self.fail_abort_next.swap(false, Ordering::SeqCst) {
                return Err(ClusterClientError::Abort("fake abort failure".to_string()));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "cluster_tests.rs"]
mod tests;

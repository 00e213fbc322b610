// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::ace::Ace;
use crate::alias::Alias;
use crate::operation::{OperationId, OperationState, OperationStatus};

/// Black-box contract the reconciliation core relies on.
///
/// The per-oplet state machine's internal decision logic (how to build
/// an operation spec, when to restart, what "inappropriate" means for a
/// particular application) is a separate concern, supplied by a
/// controller plug-in that this crate never sees. This trait is the
/// entire surface the core touches.
#[async_trait]
pub trait Oplet: Send + Sync {
    /// Stable identity. Must never change for the lifetime of the oplet.
    fn alias(&self) -> &Alias;

    /// Record the latest access-control list observed for this alias.
    fn set_acl(&self, acl: Vec<Ace>);

    /// Mark the oplet for restart on its next `pass`.
    fn set_pending_restart(&self, reason: &str);

    /// Notify that the oplet's own tree subtree (itself, `speclet`, or
    /// `secrets`) advanced to a new revision.
    fn on_cypress_node_changed(&self);

    /// Last known operation, if the oplet believes it owns one.
    fn operation_info(&self) -> Option<(OperationId, OperationState)>;

    /// True once the oplet has ingested the latest tree revision for its
    /// own subtree. Oplets that are not yet up to date are excluded from
    /// abort/liveness decisions in the running-operations pass.
    fn up_to_date_with_cypress(&self) -> bool;

    /// True when the oplet believes it owns a live operation.
    fn has_yt_operation(&self) -> bool;

    /// Ingest a newly observed status for the operation the oplet owns.
    fn update_op_status(&self, status: OperationStatus);

    /// Explicit liveness probe, used when an expected operation was
    /// absent from the census snapshot.
    async fn check_operation_liveness(&self);

    /// Perform the oplet's own per-pass work. `check_op_liveness` is
    /// `false` when called from the full pass (liveness is handled
    /// separately via the operation census) and reserved for callers
    /// that drive the oplet outside of that pipeline.
    async fn pass(&self, check_op_liveness: bool);

    /// Termination predicate: something has gone wrong and the oplet
    /// should be dropped from the registry.
    fn broken(&self) -> bool;

    /// Human-readable reason for `broken() == true`. Unspecified (may
    /// panic or return an empty string) when `broken()` is `false`.
    fn broken_reason(&self) -> String;

    /// Termination predicate: the oplet no longer has any reason to
    /// exist (e.g. its desired state is permanently "stopped and
    /// cleaned up"), distinct from an error condition.
    fn inappropriate(&self) -> bool;
}

#[cfg(feature = "test-support")]
pub mod test_support {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use super::*;

    /// Fully scriptable in-memory [`Oplet`] for exercising the
    /// reconciliation core without a real per-oplet state machine.
    ///
    /// Every observable method call increments a counter so tests can
    /// assert on call counts (e.g. "`on_cypress_node_changed` fired
    /// exactly once").
    pub struct FakeOplet {
        alias: Alias,
        operation: Mutex<Option<(OperationId, OperationState)>>,
        up_to_date: AtomicBool,
        broken: AtomicBool,
        broken_reason: Mutex<String>,
        inappropriate: AtomicBool,
        acl: Mutex<Vec<Ace>>,
        pending_restart_reason: Mutex<Option<String>>,

        pub on_node_changed_calls: AtomicUsize,
        pub update_op_status_calls: AtomicUsize,
        pub check_liveness_calls: AtomicUsize,
        pub pass_calls: AtomicUsize,
    }

    impl FakeOplet {
        pub fn new(alias: Alias) -> Self {
            Self {
                alias,
                operation: Mutex::new(None),
                up_to_date: AtomicBool::new(true),
                broken: AtomicBool::new(false),
                broken_reason: Mutex::new(String::new()),
                inappropriate: AtomicBool::new(false),
                acl: Mutex::new(Vec::new()),
                pending_restart_reason: Mutex::new(None),
                on_node_changed_calls: AtomicUsize::new(0),
                update_op_status_calls: AtomicUsize::new(0),
                check_liveness_calls: AtomicUsize::new(0),
                pass_calls: AtomicUsize::new(0),
            }
        }

        pub fn with_operation(self, id: OperationId, state: OperationState) -> Self {
            *self.operation.lock() = Some((id, state));
            self
        }

        pub fn with_up_to_date(self, up_to_date: bool) -> Self {
            self.up_to_date.store(up_to_date, Ordering::SeqCst);
            self
        }

        pub fn mark_broken(&self, reason: impl Into<String>) {
            self.broken.store(true, Ordering::SeqCst);
            *self.broken_reason.lock() = reason.into();
        }

        pub fn mark_inappropriate(&self) {
            self.inappropriate.store(true, Ordering::SeqCst);
        }

        pub fn pending_restart_reason(&self) -> Option<String> {
            self.pending_restart_reason.lock().clone()
        }

        pub fn acl(&self) -> Vec<Ace> {
            self.acl.lock().clone()
        }
    }

    #[async_trait]
    impl Oplet for FakeOplet {
        fn alias(&self) -> &Alias {
            &self.alias
        }

        fn set_acl(&self, acl: Vec<Ace>) {
            *self.acl.lock() = acl;
        }

        fn set_pending_restart(&self, reason: &str) {
            *self.pending_restart_reason.lock() = Some(reason.to_string());
        }

        fn on_cypress_node_changed(&self) {
            self.on_node_changed_calls.fetch_add(1, Ordering::SeqCst);
        }

        fn operation_info(&self) -> Option<(OperationId, OperationState)> {
            self.operation.lock().clone()
        }

        fn up_to_date_with_cypress(&self) -> bool {
            self.up_to_date.load(Ordering::SeqCst)
        }

        fn has_yt_operation(&self) -> bool {
            self.operation.lock().is_some()
        }

        fn update_op_status(&self, status: OperationStatus) {
            self.update_op_status_calls.fetch_add(1, Ordering::SeqCst);
            *self.operation.lock() = Some((status.id, status.state));
        }

        async fn check_operation_liveness(&self) {
            self.check_liveness_calls.fetch_add(1, Ordering::SeqCst);
        }

        async fn pass(&self, _check_op_liveness: bool) {
            self.pass_calls.fetch_add(1, Ordering::SeqCst);
        }

        fn broken(&self) -> bool {
            self.broken.load(Ordering::SeqCst)
        }

        fn broken_reason(&self) -> String {
            self.broken_reason.lock().clone()
        }

        fn inappropriate(&self) -> bool {
            self.inappropriate.load(Ordering::SeqCst)
        }
    }
}

// SPDX-License-Identifier: MIT

//! A minimal [`Oplet`] implementation so `vanillad` links and runs without
//! a real controller plug-in wired in. It tracks exactly the bookkeeping
//! the reconciliation core itself relies on (alias, ACL, operation info,
//! up-to-date/broken/inappropriate flags) and nothing else — no spec
//! preparation, no restart logic. A production deployment supplies its own
//! `Oplet` (and `OpletFactory`) carrying the controller's actual decision
//! logic; this type exists purely so the binary has something concrete to
//! construct.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;
use va_core::{Ace, Alias, AgentInfo, OperationId, OperationState, OperationStatus, Oplet};

pub struct DefaultOplet {
    alias: Alias,
    agent_info: Arc<AgentInfo>,
    acl: Mutex<Vec<Ace>>,
    operation: Mutex<Option<(OperationId, OperationState)>>,
    up_to_date: Mutex<bool>,
}

impl DefaultOplet {
    pub fn new(alias: Alias, agent_info: Arc<AgentInfo>) -> Self {
        Self {
            alias,
            agent_info,
            acl: Mutex::new(Vec::new()),
            operation: Mutex::new(None),
            up_to_date: Mutex::new(true),
        }
    }
}

#[async_trait]
impl Oplet for DefaultOplet {
    fn alias(&self) -> &Alias {
        &self.alias
    }

    fn set_acl(&self, acl: Vec<Ace>) {
        *self.acl.lock() = acl;
    }

    fn set_pending_restart(&self, reason: &str) {
        debug!(alias = %self.alias, %reason, "pending restart noted (no-op placeholder oplet)");
    }

    fn on_cypress_node_changed(&self) {
        *self.up_to_date.lock() = true;
    }

    fn operation_info(&self) -> Option<(OperationId, OperationState)> {
        self.operation.lock().clone()
    }

    fn up_to_date_with_cypress(&self) -> bool {
        *self.up_to_date.lock()
    }

    fn has_yt_operation(&self) -> bool {
        self.operation.lock().is_some()
    }

    fn update_op_status(&self, status: OperationStatus) {
        *self.operation.lock() = Some((status.id, status.state));
    }

    async fn check_operation_liveness(&self) {
        debug!(alias = %self.alias, "liveness probe is a no-op on the placeholder oplet");
    }

    async fn pass(&self, _check_op_liveness: bool) {
        debug!(
            alias = %self.alias,
            family = %self.agent_info.family,
            "placeholder oplet pass: nothing to reconcile"
        );
    }

    fn broken(&self) -> bool {
        false
    }

    fn broken_reason(&self) -> String {
        String::new()
    }

    fn inappropriate(&self) -> bool {
        false
    }
}

#[cfg(test)]
#[path = "default_oplet_tests.rs"]
mod tests;

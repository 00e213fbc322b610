// SPDX-License-Identifier: MIT

//! Controller adapter contract (C6): a thin pass-through to the external
//! controller plug-in that knows how to build a particular application's
//! operation spec. That business logic (spec preparation, speclet
//! parsing) is opaque to the core; only `family`, `root`, and
//! `update_state` are consumed here.

use async_trait::async_trait;
use thiserror::Error;

use va_core::TreePath;

#[async_trait]
pub trait ControllerAdapter: Send + Sync {
    /// Identifier for the class of applications this controller manages.
    fn family(&self) -> &str;

    /// Root path of the alias directory this controller owns.
    fn root(&self) -> &TreePath;

    /// Refresh the controller's internal state. Returns `true` when the
    /// state changed, in which case every registered oplet is marked for
    /// restart by the caller — this is the only bulk trigger for
    /// coordinated oplet restart.
    async fn update_state(&self) -> Result<bool, ControllerError>;
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("controller state refresh failed: {0}")]
    UpdateState(String),
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use super::*;

    /// Fully scriptable in-memory [`ControllerAdapter`].
    pub struct FakeControllerAdapter {
        family: String,
        root: TreePath,
        changed_next: AtomicBool,
        fail_next: AtomicBool,
        pub update_state_calls: AtomicUsize,
    }

    impl FakeControllerAdapter {
        pub fn new(family: impl Into<String>, root: TreePath) -> Self {
            Self {
                family: family.into(),
                root,
                changed_next: AtomicBool::new(false),
                fail_next: AtomicBool::new(false),
                update_state_calls: AtomicUsize::new(0),
            }
        }

        /// The next `update_state` call reports `changed = true`.
        pub fn set_changed_next(&self, changed: bool) {
            self.changed_next.store(changed, Ordering::SeqCst);
        }

        /// The next `update_state` call returns an error.
        pub fn fail_next_update(&self) {
            self.fail_next.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl ControllerAdapter for FakeControllerAdapter {
        fn family(&self) -> &str {
            &self.family
        }

        fn root(&self) -> &TreePath {
            &self.root
        }

        async fn update_state(&self) -> Result<bool, ControllerError> {
            self.update_state_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(ControllerError::UpdateState("fake refresh failure".to_string()));
            }
            Ok(self.changed_next.swap(false, Ordering::SeqCst))
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;

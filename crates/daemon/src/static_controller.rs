// SPDX-License-Identifier: MIT

//! A minimal [`ControllerAdapter`] so `vanillad` links and runs without a
//! real controller plug-in wired in. It reports `family`/`root` verbatim
//! and never signals a state change. A production deployment supplies its
//! own adapter that actually polls its controller's state; this type
//! exists purely so the binary has something concrete to construct, the
//! same role [`crate::DefaultOplet`] plays for the oplet seam.

use async_trait::async_trait;
use va_adapters::{ControllerAdapter, ControllerError};
use va_core::TreePath;

pub struct StaticControllerAdapter {
    family: String,
    root: TreePath,
}

impl StaticControllerAdapter {
    pub fn new(family: impl Into<String>, root: TreePath) -> Self {
        Self { family: family.into(), root }
    }
}

#[async_trait]
impl ControllerAdapter for StaticControllerAdapter {
    fn family(&self) -> &str {
        &self.family
    }

    fn root(&self) -> &TreePath {
        &self.root
    }

    async fn update_state(&self) -> Result<bool, ControllerError> {
        Ok(false)
    }
}

#[cfg(test)]
#[path = "static_controller_tests.rs"]
mod tests;

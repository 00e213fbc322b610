// SPDX-License-Identifier: MIT

//! Construction seam for new oplets.
//!
//! Per the cyclic-lifetime design note (§9): an oplet needs only its own
//! identity, an immutable [`AgentInfo`] snapshot, and whatever cluster
//! handle its concrete implementation closes over — never a back-reference
//! to the registry that holds it. This trait is how the engine asks for a
//! freshly constructed oplet without knowing its concrete type.

use std::sync::Arc;

use va_core::{Alias, AgentInfo, Oplet};

pub trait OpletFactory<O: Oplet>: Send + Sync {
    fn create(&self, alias: Alias, agent_info: Arc<AgentInfo>) -> Arc<O>;
}

/// An [`OpletFactory`] backed by a plain closure, for callers that don't
/// need a dedicated type.
pub struct FnOpletFactory<F> {
    f: F,
}

impl<F> FnOpletFactory<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<O, F> OpletFactory<O> for FnOpletFactory<F>
where
    O: Oplet,
    F: Fn(Alias, Arc<AgentInfo>) -> Arc<O> + Send + Sync,
{
    fn create(&self, alias: Alias, agent_info: Arc<AgentInfo>) -> Arc<O> {
        (self.f)(alias, agent_info)
    }
}

// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapter layer (C8): trait contracts for the tree and cluster clients
//! and the controller plug-in, their in-memory test doubles, and one
//! production-shaped Kubernetes binding per trait.
//!
//! Nothing in `va-core` depends on this crate — the reconciliation engine
//! in `va-daemon` is generic over these traits, so it is testable with
//! the fakes here and deployable with the `kube` adapters.

mod cluster;
mod controller;
mod kube;
mod tree;

pub use cluster::{ClusterClient, ClusterClientError};
pub use controller::{ControllerAdapter, ControllerError};
pub use kube::{KubeClusterClient, KubeTreeClient};
pub use tree::{NodeRevision, TreeClient, TreeClientError};

#[cfg(feature = "test-support")]
pub use cluster::test_support::FakeClusterClient;
#[cfg(feature = "test-support")]
pub use controller::test_support::FakeControllerAdapter;
#[cfg(feature = "test-support")]
pub use tree::test_support::FakeTreeClient;

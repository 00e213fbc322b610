// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Reconciliation daemon: wires the tree/cluster/controller adapters of
//! `va-adapters` to the oplet registry and reconciliation engine that
//! implement the core control loop.

mod census;
mod default_oplet;
mod engine;
mod lifecycle;
mod oplet_factory;
mod registry;
mod static_controller;
mod tracker;

pub use census::{CensusEvent, OperationCensus};
pub use default_oplet::DefaultOplet;
pub use lifecycle::{Agent, AgentError};
pub use oplet_factory::{FnOpletFactory, OpletFactory};
pub use registry::{OpletRegistry, RegistryError};
pub use static_controller::StaticControllerAdapter;
pub use tracker::{NodeChangeTracker, TrackerEvent};

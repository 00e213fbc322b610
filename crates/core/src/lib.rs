// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Shared data model for the vanilla-operation reconciliation agent.
//!
//! This crate defines the types and contracts the reconciliation core
//! depends on: the [`Alias`] and [`TreePath`] identifiers, the
//! [`Oplet`] black-box contract, the [`HealthAggregator`], agent
//! configuration, and the observability surface ([`AgentInfo`]).
//! Nothing here talks to a cluster or a tree directly — see `va-adapters`.

mod ace;
mod agent_info;
mod alias;
mod clock;
mod config;
mod health;
mod oplet;
mod operation;
mod path;
mod template;

pub use ace::{Ace, AceAction};
pub use agent_info::AgentInfo;
pub use alias::{Alias, AliasError};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{AgentConfig, ConfigError, RawConfig};
pub use health::{HealthAggregator, HealthError, HealthPeriods, Subsystem};
pub use oplet::Oplet;
pub use operation::{BriefSpec, OperationId, OperationState, OperationStatus};
pub use path::TreePath;
pub use template::{ClusterUrlTemplate, TemplateError};

#[cfg(feature = "test-support")]
pub use oplet::test_support::FakeOplet;

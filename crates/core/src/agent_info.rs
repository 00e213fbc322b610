// SPDX-License-Identifier: MIT

//! Observability surface (C10): the read-only snapshot returned by
//! `Agent::agent_info()`.

use crate::path::TreePath;

/// Snapshot built once at `Start()` time; cheap to call repeatedly.
///
/// Exposing this over a network transport (HTTP, gRPC, a CLI) is out of
/// scope for the core — this is a plain value a yet-unwritten surface
/// could serialize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentInfo {
    pub hostname: String,
    pub stage: String,
    pub proxy: String,
    pub family: String,
    pub namespace: String,
    pub robot_username: String,
    pub default_network_project: Option<String>,
    pub cluster_url: String,
    pub root: TreePath,
}

impl AgentInfo {
    /// Operation namespace: `family:stage`, used verbatim by the census.
    pub fn namespace_for(family: &str, stage: &str) -> String {
        format!("{family}:{stage}")
    }
}

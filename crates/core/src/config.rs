// SPDX-License-Identifier: MIT

//! Configuration loader (C9): TOML file plus defaults -> validated
//! [`AgentConfig`].
//!
//! Loading is two-staged: [`RawConfig`] deserializes with every field
//! `Option<T>` so `toml` can distinguish "absent" from "default", then
//! [`AgentConfig::from_raw`] resolves defaults and validates the
//! `cluster_url_template` once, up front, per the fatal-at-construction
//! policy for malformed templates. Unknown keys are rejected so a typo in
//! an operator's config file surfaces immediately.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::health::HealthPeriods;
use crate::path::TreePath;
use crate::template::{ClusterUrlTemplate, TemplateError};

const DEFAULT_PASS_PERIOD_SECS: u64 = 5;
const DEFAULT_COLLECT_OPERATIONS_PERIOD_SECS: u64 = 60;
const DEFAULT_REVISION_COLLECT_PERIOD_SECS: u64 = 5;
const DEFAULT_HEALTH_CHECKER_TOLERANCE_FACTOR: f64 = 2.0;
const DEFAULT_PASS_WORKER_NUMBER: usize = 1;
const DEFAULT_ASSIGN_ADMINISTER_TO_CREATOR: bool = true;

/// Deserialized shape of the TOML config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    pub root: Option<String>,
    pub stage: Option<String>,
    pub robot_username: Option<String>,
    pub pass_period_secs: Option<u64>,
    pub collect_operations_period_secs: Option<u64>,
    pub revision_collect_period_secs: Option<u64>,
    pub health_checker_tolerance_factor: Option<f64>,
    pub pass_worker_number: Option<usize>,
    pub default_network_project: Option<String>,
    pub cluster_url_template: Option<String>,
    /// Proxy alias interpolated into `cluster_url_template` and surfaced
    /// verbatim via `AgentInfo::proxy`. Not named in the distilled option
    /// table but required for the `{{.Proxy}}` placeholder to mean
    /// anything; see DESIGN.md for this resolution.
    pub cluster_proxy: Option<String>,
    pub assign_administer_to_creator: Option<bool>,
}

impl RawConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Parse)
    }

    pub fn resolve(self) -> Result<AgentConfig, ConfigError> {
        AgentConfig::from_raw(self)
    }
}

/// Fully-defaulted, validated configuration driving a single agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub root: TreePath,
    pub stage: String,
    pub robot_username: String,
    pub pass_period: Duration,
    pub collect_operations_period: Duration,
    pub revision_collect_period: Duration,
    pub health_checker_tolerance_factor: f64,
    pub pass_worker_number: usize,
    pub default_network_project: Option<String>,
    pub cluster_url_template: Option<ClusterUrlTemplate>,
    pub cluster_proxy: Option<String>,
    pub assign_administer_to_creator: bool,
}

impl AgentConfig {
    pub fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let root = raw.root.ok_or(ConfigError::MissingField("root"))?;
        let stage = raw.stage.ok_or(ConfigError::MissingField("stage"))?;
        let robot_username =
            raw.robot_username.ok_or(ConfigError::MissingField("robot_username"))?;

        let cluster_url_template =
            raw.cluster_url_template.as_deref().map(ClusterUrlTemplate::parse).transpose()?;

        Ok(Self {
            root: TreePath::new(root),
            stage,
            robot_username,
            pass_period: Duration::from_secs(
                raw.pass_period_secs.unwrap_or(DEFAULT_PASS_PERIOD_SECS),
            ),
            collect_operations_period: Duration::from_secs(
                raw.collect_operations_period_secs
                    .unwrap_or(DEFAULT_COLLECT_OPERATIONS_PERIOD_SECS),
            ),
            revision_collect_period: Duration::from_secs(
                raw.revision_collect_period_secs.unwrap_or(DEFAULT_REVISION_COLLECT_PERIOD_SECS),
            ),
            health_checker_tolerance_factor: raw
                .health_checker_tolerance_factor
                .unwrap_or(DEFAULT_HEALTH_CHECKER_TOLERANCE_FACTOR),
            pass_worker_number: raw
                .pass_worker_number
                .unwrap_or(DEFAULT_PASS_WORKER_NUMBER)
                .max(1),
            default_network_project: raw.default_network_project,
            cluster_url_template,
            cluster_proxy: raw.cluster_proxy,
            assign_administer_to_creator: raw
                .assign_administer_to_creator
                .unwrap_or(DEFAULT_ASSIGN_ADMINISTER_TO_CREATOR),
        })
    }

    /// Derive the staleness thresholds the health aggregator checks
    /// against from this config's periods and tolerance factor.
    pub fn health_periods(&self) -> HealthPeriods {
        HealthPeriods {
            tolerance_factor: self.health_checker_tolerance_factor,
            pass_period: self.pass_period,
            node_tracking_period: self.revision_collect_period,
            operation_census_period: self.collect_operations_period,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("missing required config field: {0}")]
    MissingField(&'static str),
    #[error("invalid cluster_url_template: {0}")]
    Template(#[from] TemplateError),
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

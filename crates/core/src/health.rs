// SPDX-License-Identifier: MIT

//! Health aggregator (C1): tracks freshness of each subsystem and reports
//! a single verdict.
//!
//! One lock protects all four slots, per the shared-resource policy: the
//! aggregator is mutated from the dispatcher (pass outcomes) and from the
//! C2/C3 producer tasks (their own slots), so it must be thread-safe, but
//! contention is low enough that a single `parking_lot::Mutex` over a
//! small struct is sufficient — no per-slot locking.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::clock::{Clock, SystemClock};

/// The four subsystems whose freshness the aggregator tracks.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subsystem {
    /// `initializeFromCypress` at agent startup.
    Init,
    /// The full reconciliation pass.
    Pass,
    /// The node change tracker (C2).
    NodeTracking,
    /// The operation census (C3).
    OperationCensus,
}

impl Subsystem {
    const ALL: [Subsystem; 4] =
        [Subsystem::Init, Subsystem::Pass, Subsystem::NodeTracking, Subsystem::OperationCensus];
}

impl std::fmt::Display for Subsystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Subsystem::Init => "initialization",
            Subsystem::Pass => "pass",
            Subsystem::NodeTracking => "node-tracking",
            Subsystem::OperationCensus => "operation-census",
        };
        f.write_str(s)
    }
}

/// Nominal periods used to compute each subsystem's staleness threshold,
/// plus the shared tolerance factor `T`.
///
/// `init` has no periodic cadence of its own (it runs once at startup),
/// so it is checked against the pass period: if the agent has been
/// running for `T · pass_period` without a successful or failed
/// `initializeFromCypress`, something is stuck in the startup retry loop.
#[derive(Debug, Clone, Copy)]
pub struct HealthPeriods {
    pub tolerance_factor: f64,
    pub pass_period: Duration,
    pub node_tracking_period: Duration,
    pub operation_census_period: Duration,
}

impl HealthPeriods {
    fn nominal(&self, subsystem: Subsystem) -> Duration {
        match subsystem {
            Subsystem::Init | Subsystem::Pass => self.pass_period,
            Subsystem::NodeTracking => self.node_tracking_period,
            Subsystem::OperationCensus => self.operation_census_period,
        }
    }

    fn threshold(&self, subsystem: Subsystem) -> Duration {
        self.nominal(subsystem).mul_f64(self.tolerance_factor)
    }
}

#[derive(Debug, Clone)]
struct Slot {
    last_error: Option<String>,
    last_report: Option<Instant>,
}

impl Default for Slot {
    fn default() -> Self {
        Self { last_error: None, last_report: None }
    }
}

/// Tracks the last reported error and timestamp for each of the four
/// subsystems and aggregates them into a single verdict.
pub struct HealthAggregator<C: Clock = SystemClock> {
    clock: C,
    slots: parking_lot::Mutex<HashMap<Subsystem, Slot>>,
}

impl HealthAggregator<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for HealthAggregator<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> HealthAggregator<C> {
    pub fn with_clock(clock: C) -> Self {
        let mut slots = HashMap::with_capacity(Subsystem::ALL.len());
        for subsystem in Subsystem::ALL {
            slots.insert(subsystem, Slot::default());
        }
        Self { clock, slots: parking_lot::Mutex::new(slots) }
    }

    /// Record a successful report for `subsystem`: clears its error and
    /// bumps its freshness timestamp.
    pub fn report_ok(&self, subsystem: Subsystem) {
        let now = self.clock.now();
        let mut slots = self.slots.lock();
        let slot = slots.entry(subsystem).or_default();
        slot.last_error = None;
        slot.last_report = Some(now);
    }

    /// Record a failed report for `subsystem`: the error is retained until
    /// the next `report_ok`, but freshness is still bumped since a report
    /// (even a failing one) proves the subsystem is alive.
    pub fn report_error(&self, subsystem: Subsystem, error: impl Into<String>) {
        let now = self.clock.now();
        let mut slots = self.slots.lock();
        let slot = slots.entry(subsystem).or_default();
        slot.last_error = Some(error.into());
        slot.last_report = Some(now);
    }

    /// Aggregate verdict: expired → `Stalled`; else last error → `Reported`;
    /// else healthy.
    pub fn check(&self, periods: &HealthPeriods) -> Result<(), HealthError> {
        let now = self.clock.now();
        let slots = self.slots.lock();
        let missing = Slot::default();

        for subsystem in Subsystem::ALL {
            let slot = slots.get(&subsystem).unwrap_or(&missing);
            let expired = match slot.last_report {
                None => true,
                Some(last) => now.saturating_duration_since(last) > periods.threshold(subsystem),
            };
            if expired {
                return Err(HealthError::Stalled(subsystem));
            }
        }

        for subsystem in Subsystem::ALL {
            let slot = slots.get(&subsystem).unwrap_or(&missing);
            if let Some(message) = &slot.last_error {
                return Err(HealthError::Reported { subsystem, message: message.clone() });
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HealthError {
    #[error("subsystem stalled: {0}")]
    Stalled(Subsystem),
    #[error("subsystem {subsystem} reported: {message}")]
    Reported { subsystem: Subsystem, message: String },
}

impl std::fmt::Debug for Subsystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;

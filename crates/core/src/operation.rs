// SPDX-License-Identifier: MIT

use std::fmt;

use serde_json::{Map, Value};

/// Opaque identifier minted by the cluster; equality comparable, stringifiable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationId(String);

impl OperationId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OperationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for OperationId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Observed state of a running (or recently run) operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    Starting,
    Running,
    Completing,
    Completed,
    Aborting,
    Aborted,
    Failing,
    Failed,
}

/// The subset of an operation's spec the agent cares about: the alias
/// that claims ownership of the operation, when present.
///
/// `BriefSpec` may be absent for operations in very early lifetime;
/// such records are ignored by the running-operations pass. The raw
/// map is kept around (not just the alias) because a future controller
/// may want other brief-spec fields; the core itself only reads `alias`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BriefSpec(Map<String, Value>);

impl BriefSpec {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// `BriefSpec["alias"]`, when present, is a string whose first
    /// character is a sigil and whose tail is the alias. Returns `None`
    /// if the key is missing or not a sigil-prefixed string.
    pub fn alias_tail(&self) -> Option<&str> {
        let raw = self.0.get("alias")?.as_str()?;
        if raw.is_empty() {
            return None;
        }
        // First byte is the sigil; the rest is the alias. `char_indices`
        // gives us the byte offset of the second character regardless
        // of whether the sigil itself is multi-byte.
        let mut chars = raw.char_indices();
        chars.next()?;
        let tail_start = chars.next().map(|(i, _)| i).unwrap_or(raw.len());
        Some(&raw[tail_start..])
    }
}

/// `{ID, State, BriefSpec}` as consumed from the operation census.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationStatus {
    pub id: OperationId,
    pub state: OperationState,
    pub brief_spec: Option<BriefSpec>,
}

impl OperationStatus {
    pub fn new(id: OperationId, state: OperationState, brief_spec: Option<BriefSpec>) -> Self {
        Self { id, state, brief_spec }
    }
}

#[cfg(test)]
#[path = "operation_tests.rs"]
mod tests;

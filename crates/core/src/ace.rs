// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

/// Access control entry carried verbatim from the tree's ACL listing to
/// `Oplet::SetACL`. The core never interprets an ACE's semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ace {
    pub action: AceAction,
    pub subjects: Vec<String>,
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AceAction {
    Allow,
    Deny,
}

// SPDX-License-Identifier: MIT

use std::fmt;

/// A slash-separated path in the hierarchical metadata tree.
///
/// Opaque beyond concatenation: the core never parses path segments
/// except when tokenizing a reported path relative to the root (done
/// by the node change tracker's caller, not by this type).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TreePath(String);

impl TreePath {
    pub fn new(s: impl Into<String>) -> Self {
        let mut s = s.into();
        while s.ends_with('/') && s.len() > 1 {
            s.pop();
        }
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn child(&self, name: &str) -> Self {
        if self.0.ends_with('/') {
            Self(format!("{}{}", self.0, name))
        } else {
            Self(format!("{}/{}", self.0, name))
        }
    }

    /// Tokenize `path` relative to this root, e.g. `root.relative("/root/foo/speclet")
    /// == Some(["foo", "speclet"])`. Returns `None` if `path` is not under this root.
    pub fn relative<'a>(&self, path: &'a str) -> Option<Vec<&'a str>> {
        let prefix = self.0.as_str();
        let stripped = path.strip_prefix(prefix)?;
        let stripped = stripped.strip_prefix('/').unwrap_or(stripped);
        if stripped.is_empty() {
            return Some(Vec::new());
        }
        Some(stripped.split('/').filter(|s| !s.is_empty()).collect())
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TreePath {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TreePath {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
#[path = "path_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT

//! Tree client contract (C8): the narrow surface the reconciliation core
//! needs from the hierarchical metadata tree. The wire protocol of a
//! concrete tree service is out of scope; see `kube::KubeTreeClient` for
//! an illustrative production-shaped binding.

use async_trait::async_trait;
use thiserror::Error;

use va_core::{Ace, Alias, TreePath};

/// One child's observed revision, keyed by its full path under the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRevision {
    pub path: String,
    pub revision: u64,
}

#[async_trait]
pub trait TreeClient: Send + Sync {
    /// One-shot listing of direct children of `root`, used once at agent
    /// startup to seed the oplet registry.
    async fn list_root_aliases(&self, root: &TreePath) -> Result<Vec<Alias>, TreeClientError>;

    /// One batch listing over `root`, fetching the revisions of all
    /// children and their `speclet`/`secrets` grandchildren in a single
    /// round-trip. The contract is just "one snapshot per call" — how
    /// the revisions are packed into that round-trip is an implementation
    /// choice of the concrete client.
    async fn snapshot_revisions(
        &self,
        root: &TreePath,
    ) -> Result<Vec<NodeRevision>, TreeClientError>;

    /// List children of the ACL namespace with their `principal_acl`
    /// attribute, one entry per alias.
    async fn list_acl(
        &self,
        acl_root: &TreePath,
    ) -> Result<Vec<(Alias, Vec<Ace>)>, TreeClientError>;
}

#[derive(Debug, Error)]
pub enum TreeClientError {
    #[error("tree listing failed: {0}")]
    Listing(String),
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use std::sync::atomic::{AtomicBool, Ordering};

    use parking_lot::Mutex;

    use super::*;

    /// Fully scriptable in-memory [`TreeClient`].
    #[derive(Default)]
    pub struct FakeTreeClient {
        root_aliases: Mutex<Vec<Alias>>,
        revisions: Mutex<Vec<NodeRevision>>,
        acl: Mutex<Vec<(Alias, Vec<Ace>)>>,
        fail_listing_next: AtomicBool,
        fail_acl_next: AtomicBool,
    }

    impl FakeTreeClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_root_aliases(&self, aliases: Vec<Alias>) {
            *self.root_aliases.lock() = aliases;
        }

        pub fn set_revisions(&self, revisions: Vec<NodeRevision>) {
            *self.revisions.lock() = revisions;
        }

        pub fn set_acl(&self, acl: Vec<(Alias, Vec<Ace>)>) {
            *self.acl.lock() = acl;
        }

        /// The next `snapshot_revisions` call returns an error.
        pub fn fail_next_listing(&self) {
            self.fail_listing_next.store(true, Ordering::SeqCst);
        }

        /// The next `list_acl` call returns an error.
        pub fn fail_next_acl(&self) {
            self.fail_acl_next.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl TreeClient for FakeTreeClient {
        async fn list_root_aliases(&self, _root: &TreePath) -> Result<Vec<Alias>, TreeClientError> {
            Ok(self.root_aliases.lock().clone())
        }

        async fn snapshot_revisions(
            &self,
            _root: &TreePath,
        ) -> Result<Vec<NodeRevision>, TreeClientError> {
            if self.fail_listing_next.swap(false, Ordering::SeqCst) {
                return Err(TreeClientError::Listing("fake transient failure".to_string()));
            }
            Ok(self.revisions.lock().clone())
        }

        async fn list_acl(
            &self,
            _acl_root: &TreePath,
        ) -> Result<Vec<(Alias, Vec<Ace>)>, TreeClientError> {
            if self.fail_acl_next.swap(false, Ordering::SeqCst) {
                return Err(TreeClientError::Listing("fake ACL listing failure".to_string()));
            }
            Ok(self.acl.lock().clone())
        }
    }
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tests;

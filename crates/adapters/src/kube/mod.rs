// SPDX-License-Identifier: MIT

//! Production-shaped `TreeClient`/`ClusterClient` bindings backed by a
//! real Kubernetes cluster, reusing its native listing/label-selector and
//! delete APIs as the tree/cluster substrate.
//!
//! These adapters are illustrative: they show the shape (no pagination,
//! cancellation-aware via `kube`'s own client, structured errors) a real
//! binding should have. The wire protocol of a specific orchestration
//! system's vanilla-operation API is deliberately not modeled here.
//!
//! ConfigMaps stand in for tree nodes (one per alias, labeled
//! `va.io/kind=alias` or `va.io/kind=acl`) and batch `Job`s stand in for
//! vanilla operations (labeled `va.io/namespace=<family>:<stage>`).

mod cluster;
mod tree;

pub use cluster::KubeClusterClient;
pub use tree::KubeTreeClient;

const LABEL_KIND: &str = "va.io/kind";
const LABEL_NAMESPACE: &str = "va.io/namespace";
const ANNOTATION_PRINCIPAL_ACL: &str = "va.io/principal-acl";
const ANNOTATION_BRIEF_SPEC: &str = "va.io/brief-spec";
const DATA_KEY_SPECLET: &str = "speclet";
const DATA_KEY_SECRETS: &str = "secrets";

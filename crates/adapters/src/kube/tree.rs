// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::{Api, ListParams};
use kube::Client;

use va_core::{Ace, Alias, TreePath};

use super::{ANNOTATION_PRINCIPAL_ACL, DATA_KEY_SECRETS, DATA_KEY_SPECLET, LABEL_KIND};
use crate::tree::{NodeRevision, TreeClient, TreeClientError};

/// Tree client backed by Kubernetes ConfigMaps: one ConfigMap per alias,
/// named by the alias, labeled `va.io/kind=alias`. The ConfigMap's
/// `resourceVersion` stands in for the tree's per-node revision; since a
/// single object carries the alias's own data plus its `speclet`/`secrets`
/// keys, one `list` call is naturally "one snapshot per round-trip".
#[derive(Clone)]
pub struct KubeTreeClient {
    client: Client,
}

impl KubeTreeClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn configmaps(&self, root: &TreePath) -> Api<ConfigMap> {
        Api::namespaced(self.client.clone(), root.as_str())
    }
}

fn parse_revision(resource_version: Option<&str>) -> u64 {
    resource_version.and_then(|rv| rv.parse().ok()).unwrap_or(0)
}

#[async_trait]
impl TreeClient for KubeTreeClient {
    async fn list_root_aliases(&self, root: &TreePath) -> Result<Vec<Alias>, TreeClientError> {
        let api = self.configmaps(root);
        let lp = ListParams::default().labels(&format!("{LABEL_KIND}=alias"));
        let list = api.list(&lp).await.map_err(|e| TreeClientError::Listing(e.to_string()))?;

        let mut aliases = Vec::with_capacity(list.items.len());
        for item in list.items {
            let Some(name) = item.metadata.name else { continue };
            match Alias::new(name) {
                Ok(alias) => aliases.push(alias),
                Err(err) => {
                    tracing::warn!(error = %err, "skipping configmap with invalid alias name")
                }
            }
        }
        Ok(aliases)
    }

    async fn snapshot_revisions(
        &self,
        root: &TreePath,
    ) -> Result<Vec<NodeRevision>, TreeClientError> {
        let api = self.configmaps(root);
        let lp = ListParams::default().labels(&format!("{LABEL_KIND}=alias"));
        let list = api.list(&lp).await.map_err(|e| TreeClientError::Listing(e.to_string()))?;

        let mut revisions = Vec::new();
        for item in list.items {
            let Some(name) = item.metadata.name else { continue };
            let revision = parse_revision(item.metadata.resource_version.as_deref());
            revisions.push(NodeRevision { path: name.clone(), revision });

            let data = item.data.unwrap_or_default();
            if data.contains_key(DATA_KEY_SPECLET) {
                revisions.push(NodeRevision { path: format!("{name}/speclet"), revision });
            }
            if data.contains_key(DATA_KEY_SECRETS) {
                revisions.push(NodeRevision { path: format!("{name}/secrets"), revision });
            }
        }
        Ok(revisions)
    }

    async fn list_acl(
        &self,
        acl_root: &TreePath,
    ) -> Result<Vec<(Alias, Vec<Ace>)>, TreeClientError> {
        let api = self.configmaps(acl_root);
        let lp = ListParams::default().labels(&format!("{LABEL_KIND}=acl"));
        let list = api.list(&lp).await.map_err(|e| TreeClientError::Listing(e.to_string()))?;

        let mut acls = Vec::with_capacity(list.items.len());
        for item in list.items {
            let Some(name) = item.metadata.name else { continue };
            let alias = match Alias::new(name) {
                Ok(alias) => alias,
                Err(err) => {
                    tracing::warn!(error = %err, "skipping acl configmap with invalid alias name");
                    continue;
                }
            };
            let raw = item
                .metadata
                .annotations
                .as_ref()
                .and_then(|a| a.get(ANNOTATION_PRINCIPAL_ACL))
                .cloned()
                .unwrap_or_else(|| "[]".to_string());
            let aces: Vec<Ace> = serde_json::from_str(&raw)
                .map_err(|e| TreeClientError::Listing(format!("invalid principal_acl: {e}")))?;
            acls.push((alias, aces));
        }
        Ok(acls)
    }
}

// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use k8s_openapi::api::batch::v1::Job;
use kube::api::{Api, DeleteParams, ListParams};
use kube::Client;

use va_core::{BriefSpec, OperationId, OperationState, OperationStatus};

use super::{ANNOTATION_BRIEF_SPEC, LABEL_NAMESPACE};
use crate::cluster::{ClusterClient, ClusterClientError};

/// Cluster client backed by Kubernetes batch `Job`s: one Job per vanilla
/// operation, labeled `va.io/namespace=<family>:<stage>` so the census
/// can list exactly the operations in this agent's namespace.
#[derive(Clone)]
pub struct KubeClusterClient {
    client: Client,
    k8s_namespace: String,
}

impl KubeClusterClient {
    /// `k8s_namespace` is the Kubernetes namespace the family's operations
    /// are scheduled into — distinct from the `family:stage` operation
    /// namespace used for label-selector filtering.
    pub fn new(client: Client, k8s_namespace: impl Into<String>) -> Self {
        Self { client, k8s_namespace: k8s_namespace.into() }
    }

    fn jobs(&self) -> Api<Job> {
        Api::namespaced(self.client.clone(), &self.k8s_namespace)
    }
}

fn operation_state(job: &Job) -> OperationState {
    if job.metadata.deletion_timestamp.is_some() {
        return OperationState::Aborting;
    }
    let Some(status) = &job.status else { return OperationState::Starting };
    if status.failed.unwrap_or(0) > 0 {
        OperationState::Failed
    } else if status.succeeded.unwrap_or(0) > 0 {
        OperationState::Completed
    } else if status.active.unwrap_or(0) > 0 {
        OperationState::Running
    } else {
        OperationState::Starting
    }
}

fn brief_spec(job: &Job) -> Option<BriefSpec> {
    let raw = job.metadata.annotations.as_ref()?.get(ANNOTATION_BRIEF_SPEC)?;
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    let map = value.as_object()?.clone();
    Some(BriefSpec::new(map))
}

#[async_trait]
impl ClusterClient for KubeClusterClient {
    async fn list_operations(
        &self,
        namespace: &str,
    ) -> Result<Vec<OperationStatus>, ClusterClientError> {
        let lp = ListParams::default().labels(&format!("{LABEL_NAMESPACE}={namespace}"));
        let list =
            self.jobs().list(&lp).await.map_err(|e| ClusterClientError::Listing(e.to_string()))?;

        let mut statuses = Vec::with_capacity(list.items.len());
        for job in &list.items {
            let Some(name) = &job.metadata.name else { continue };
            statuses.push(OperationStatus::new(
                OperationId::new(name.clone()),
                operation_state(job),
                brief_spec(job),
            ));
        }
        Ok(statuses)
    }

    async fn abort_operation(&self, id: &OperationId) -> Result<(), ClusterClientError> {
        self.jobs()
            .delete(id.as_str(), &DeleteParams::foreground())
            .await
            .map_err(|e| ClusterClientError::Abort(e.to_string()))?;
        Ok(())
    }
}

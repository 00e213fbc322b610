// SPDX-License-Identifier: MIT

//! Agent lifecycle (C7): `Start()`/`Stop()`, initial tree enumeration, and
//! the background event-dispatcher task that drives the reconciliation
//! engine of [`crate::engine`].

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use va_adapters::{ClusterClient, ControllerAdapter, TreeClient};
use va_core::{AgentConfig, AgentInfo, HealthAggregator, HealthError, Oplet, Subsystem, TreePath};

use crate::census::{CensusEvent, OperationCensus};
use crate::engine::{full_pass, handle_tree_path, running_operations_pass};
use crate::oplet_factory::OpletFactory;
use crate::registry::OpletRegistry;
use crate::tracker::{NodeChangeTracker, TrackerEvent};

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent is already started")]
    AlreadyStarted,
}

struct RunningState {
    cancel: CancellationToken,
    join_handle: JoinHandle<()>,
    agent_info: Arc<AgentInfo>,
}

/// One `Start()`..`Stop()` cycle's worth of wiring between the adapters
/// (§9/C8), the configuration (§10/C9), and the reconciliation engine.
///
/// Generic over the three external collaborators and the oplet's concrete
/// type so the same code path runs against the in-memory fakes in tests
/// and the `kube`-backed adapters in production.
pub struct Agent<T, Cl, Ctl, O, F>
where
    T: TreeClient + 'static,
    Cl: ClusterClient + 'static,
    Ctl: ControllerAdapter + 'static,
    O: Oplet + 'static,
    F: OpletFactory<O> + 'static,
{
    config: AgentConfig,
    hostname: String,
    tree: Arc<T>,
    cluster: Arc<Cl>,
    controller: Arc<Ctl>,
    oplet_factory: Arc<F>,
    health: Arc<HealthAggregator>,
    state: Mutex<Option<RunningState>>,
}

impl<T, Cl, Ctl, O, F> Agent<T, Cl, Ctl, O, F>
where
    T: TreeClient + 'static,
    Cl: ClusterClient + 'static,
    Ctl: ControllerAdapter + 'static,
    O: Oplet + 'static,
    F: OpletFactory<O> + 'static,
{
    pub fn new(
        config: AgentConfig,
        hostname: impl Into<String>,
        tree: Arc<T>,
        cluster: Arc<Cl>,
        controller: Arc<Ctl>,
        oplet_factory: Arc<F>,
    ) -> Self {
        Self {
            config,
            hostname: hostname.into(),
            tree,
            cluster,
            controller,
            oplet_factory,
            health: Arc::new(HealthAggregator::new()),
            state: Mutex::new(None),
        }
    }

    /// Idempotent: a second call while already started is a no-op.
    pub fn start(self: &Arc<Self>) -> Result<(), AgentError> {
        let mut state = self.state.lock();
        if state.is_some() {
            return Ok(());
        }

        let family = self.controller.family().to_string();
        let namespace = AgentInfo::namespace_for(&family, &self.config.stage);
        let proxy = self.config.cluster_proxy.clone().unwrap_or_else(|| self.hostname.clone());
        let cluster_url =
            self.config.cluster_url_template.as_ref().map(|t| t.render(&proxy)).unwrap_or_default();

        let agent_info = Arc::new(AgentInfo {
            hostname: self.hostname.clone(),
            stage: self.config.stage.clone(),
            proxy,
            family,
            namespace,
            robot_username: self.config.robot_username.clone(),
            default_network_project: self.config.default_network_project.clone(),
            cluster_url,
            root: self.config.root.clone(),
        });

        let cancel = CancellationToken::new();
        let join_handle =
            tokio::spawn(run(Arc::clone(self), Arc::clone(&agent_info), cancel.clone()));

        *state = Some(RunningState { cancel, join_handle, agent_info });
        Ok(())
    }

    /// Idempotent: cancels the background loop and waits for it to exit.
    /// A second call (or a call before `start()`) is a no-op.
    pub async fn stop(self: &Arc<Self>) {
        let running = self.state.lock().take();
        if let Some(running) = running {
            running.cancel.cancel();
            if let Err(err) = running.join_handle.await {
                warn!(error = %err, "agent background task panicked during shutdown");
            }
        }
    }

    pub fn agent_info(&self) -> Option<Arc<AgentInfo>> {
        self.state.lock().as_ref().map(|s| Arc::clone(&s.agent_info))
    }

    pub fn check_health(&self) -> Result<(), HealthError> {
        self.health.check(&self.config.health_periods())
    }
}

async fn run<T, Cl, Ctl, O, F>(
    agent: Arc<Agent<T, Cl, Ctl, O, F>>,
    agent_info: Arc<AgentInfo>,
    cancel: CancellationToken,
) where
    T: TreeClient + 'static,
    Cl: ClusterClient + 'static,
    Ctl: ControllerAdapter + 'static,
    O: Oplet + 'static,
    F: OpletFactory<O> + 'static,
{
    let mut registry = OpletRegistry::new();

    if !initialize_from_tree(&agent, &agent_info, &mut registry, &cancel).await {
        return; // cancelled before initialization succeeded
    }

    let acl_root = TreePath::new(format!("acl/{}", agent_info.family));

    let mut tracker_rx = NodeChangeTracker::new(
        Arc::clone(&agent.tree),
        agent_info.root.clone(),
        agent.config.revision_collect_period,
    )
    .spawn(cancel.clone());
    let mut census_rx = OperationCensus::new(
        Arc::clone(&agent.cluster),
        agent_info.namespace.clone(),
        agent.config.collect_operations_period,
    )
    .spawn(cancel.clone());

    let mut ticker = tokio::time::interval(agent.config.pass_period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            event = tracker_rx.recv() => {
                match event {
                    Some(TrackerEvent::Paths(paths)) => {
                        for path in paths {
                            handle_tree_path(
                                &agent_info.root,
                                &mut registry,
                                agent.oplet_factory.as_ref(),
                                &agent_info,
                                &path,
                            );
                        }
                    }
                    Some(TrackerEvent::Error(err)) => {
                        agent.health.report_error(Subsystem::NodeTracking, err.to_string());
                    }
                    None => break,
                }
            }
            event = census_rx.recv() => {
                match event {
                    Some(CensusEvent::Operations(operations)) => {
                        running_operations_pass(
                            &agent.cluster,
                            &registry,
                            operations,
                            agent.config.pass_worker_number,
                            &agent.health,
                        )
                        .await;
                    }
                    Some(CensusEvent::Error(err)) => {
                        agent.health.report_error(Subsystem::OperationCensus, err.to_string());
                    }
                    None => break,
                }
            }
            _ = ticker.tick() => {
                full_pass(
                    agent.controller.as_ref(),
                    &agent.tree,
                    &acl_root,
                    &mut registry,
                    agent.config.pass_worker_number,
                    &agent.health,
                )
                .await;
            }
        }
    }
}

/// `initializeFromCypress`: one tree listing under `root`, registering one
/// oplet per child alias, retried with back-off equal to `pass_period`
/// until it succeeds or the context is cancelled. Returns `false` if
/// cancelled before success.
// The registry is freshly constructed and each alias listed only once per
// round-trip (§3 invariant ii); a violation here is a programmer error
// per §7.
#[allow(clippy::panic)]
async fn initialize_from_tree<T, Cl, Ctl, O, F>(
    agent: &Arc<Agent<T, Cl, Ctl, O, F>>,
    agent_info: &Arc<AgentInfo>,
    registry: &mut OpletRegistry<O>,
    cancel: &CancellationToken,
) -> bool
where
    T: TreeClient + 'static,
    Cl: ClusterClient + 'static,
    Ctl: ControllerAdapter + 'static,
    O: Oplet + 'static,
    F: OpletFactory<O> + 'static,
{
    loop {
        match agent.tree.list_root_aliases(&agent_info.root).await {
            Ok(aliases) => {
                for alias in aliases {
                    let oplet = agent.oplet_factory.create(alias.clone(), Arc::clone(agent_info));
                    if let Err(err) = registry.register(oplet) {
                        panic!("registry invariant violation during initialization: {err}");
                    }
                }
                agent.health.report_ok(Subsystem::Init);
                info!(count = registry.len(), "initialized oplet registry from tree");
                return true;
            }
            Err(err) => {
                agent.health.report_error(Subsystem::Init, err.to_string());
                warn!(error = %err, "initializeFromCypress failed, retrying");
                tokio::select! {
                    _ = cancel.cancelled() => return false,
                    _ = tokio::time::sleep(agent.config.pass_period) => {}
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;

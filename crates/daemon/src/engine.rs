// SPDX-License-Identifier: MIT

//! Reconciliation engine (C5): the running-operations pass and the full
//! pass. The event-loop dispatcher that multiplexes C2/C3/the ticker lives
//! in [`crate::lifecycle`]; this module holds the two pass algorithms so
//! they can be unit tested against the in-memory adapters without a
//! running dispatcher.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use va_core::{Alias, HealthAggregator, OperationStatus, Oplet, Subsystem, TreePath};

use va_adapters::{ClusterClient, ControllerAdapter, TreeClient};

use crate::oplet_factory::OpletFactory;
use crate::registry::OpletRegistry;

/// For a path reported by the node change tracker, decide whether it
/// addresses an alias's own subtree, `speclet`, or `secrets` (relevant) or
/// something deeper (ignored), and dispatch accordingly.
// Registering a freshly created oplet under its own fresh alias can never
// collide (§3 invariant ii); a violation here is a programmer error per §7.
#[allow(clippy::panic)]
pub fn handle_tree_path<O, F>(
    root: &TreePath,
    registry: &mut OpletRegistry<O>,
    factory: &F,
    agent_info: &Arc<va_core::AgentInfo>,
    path: &str,
) where
    O: Oplet,
    F: OpletFactory<O>,
{
    let Some(tokens) = root.relative(path) else {
        return;
    };
    if tokens.is_empty() {
        return;
    }

    let tail = &tokens[1..];
    let relevant = matches!(tail, [] | ["speclet"] | ["secrets"]);
    if !relevant {
        return;
    }

    let Ok(alias) = Alias::new(tokens[0]) else {
        warn!(path, "ignoring tree event for an invalid alias");
        return;
    };

    if let Some(oplet) = registry.get(&alias) {
        oplet.on_cypress_node_changed();
    } else {
        let oplet = factory.create(alias.clone(), Arc::clone(agent_info));
        match registry.register(oplet) {
            Ok(()) => info!(%alias, "registered new oplet"),
            Err(err) => panic!("registry invariant violation registering {alias}: {err}"),
        }
    }
}

/// The running-operations pass: reconciles one census snapshot against the
/// registry, computing which observed operations to abort and which
/// registered oplets need an explicit liveness probe.
pub async fn running_operations_pass<C, O>(
    cluster: &Arc<C>,
    registry: &OpletRegistry<O>,
    snapshot: Vec<OperationStatus>,
    worker_number: usize,
    health: &HealthAggregator,
) where
    C: ClusterClient + 'static,
    O: Oplet + 'static,
{
    let mut found_aliases: HashSet<Alias> = HashSet::new();
    let mut to_abort = Vec::new();

    for status in snapshot {
        let Some(brief_spec) = &status.brief_spec else {
            continue; // rule 1: too young, affects neither toAbort nor foundAliases
        };
        let Some(alias_tail) = brief_spec.alias_tail() else {
            to_abort.push(status.id.clone()); // rule 2
            continue;
        };
        let Ok(alias) = va_core::Alias::new(alias_tail) else {
            to_abort.push(status.id.clone()); // malformed alias, treated like "not in registry"
            continue;
        };
        let Some(oplet) = registry.get(&alias) else {
            to_abort.push(status.id.clone()); // rule 3
            continue;
        };
        if !oplet.up_to_date_with_cypress() {
            continue; // rule 4: neither found nor aborted
        }

        match oplet.operation_info() {
            None => {
                // Up-to-date but owns no operation: the observed id can
                // never match the oplet's (there is none), so this is an
                // id mismatch per rule 5 and the dangling op is aborted.
                to_abort.push(status.id.clone());
            }
            Some((known_id, _)) if known_id != status.id => {
                to_abort.push(status.id.clone()); // rule 5
            }
            Some((_, known_state)) if known_state != status.state => {
                found_aliases.insert(alias);
                oplet.update_op_status(status); // rule 6
            }
            Some(_) => {
                found_aliases.insert(alias); // rule 7
            }
        }
    }

    let check_list: Vec<_> = registry
        .iter()
        .filter(|(alias, oplet)| {
            oplet.up_to_date_with_cypress()
                && oplet.has_yt_operation()
                && !found_aliases.contains(*alias)
        })
        .map(|(_, oplet)| Arc::clone(oplet))
        .collect();

    abort_and_check(Arc::clone(cluster), to_abort, check_list, worker_number).await;

    health.report_ok(Subsystem::OperationCensus);
}

/// Fixed-size worker pool draining two phases in order: abort everything in
/// `to_abort` (bounded concurrency), then probe liveness on everything in
/// `check_list`. Implemented literally as channels, per §4.3's description,
/// rather than via a futures combinator (the workspace doesn't depend on
/// the `futures` crate).
async fn abort_and_check<C, O>(
    cluster: Arc<C>,
    to_abort: Vec<va_core::OperationId>,
    check_list: Vec<Arc<O>>,
    worker_number: usize,
) where
    C: ClusterClient + 'static,
    O: Oplet + 'static,
{
    let (abort_tx, abort_rx) = mpsc::channel(to_abort.len().max(1));
    for id in to_abort {
        let _ = abort_tx.send(id).await;
    }
    drop(abort_tx);
    let abort_rx = Arc::new(tokio::sync::Mutex::new(abort_rx));

    let (check_tx, check_rx) = mpsc::channel(check_list.len().max(1));
    for oplet in check_list {
        let _ = check_tx.send(oplet).await;
    }
    drop(check_tx);
    let check_rx = Arc::new(tokio::sync::Mutex::new(check_rx));

    let mut workers = JoinSet::new();
    for _ in 0..worker_number.max(1) {
        let cluster = Arc::clone(&cluster);
        let abort_rx = Arc::clone(&abort_rx);
        let check_rx = Arc::clone(&check_rx);
        workers.spawn(async move {
            loop {
                let next = abort_rx.lock().await.recv().await;
                let Some(id) = next else { break };
                match cluster.abort_operation(&id).await {
                    Ok(()) => info!(operation = %id, "aborted dangling operation"),
                    Err(err) => {
                        warn!(operation = %id, error = %err, "abort failed, will retry next census")
                    }
                }
            }
            loop {
                let next = check_rx.lock().await.recv().await;
                let Some(oplet) = next else { break };
                oplet.check_operation_liveness().await;
            }
        });
    }
    while workers.join_next().await.is_some() {}
}

/// The full pass: controller state refresh, ACL reconciliation, per-oplet
/// work, and the post-sweep broken/inappropriate cleanup.
pub async fn full_pass<Ctl, T, O>(
    controller: &Ctl,
    tree: &Arc<T>,
    acl_root: &TreePath,
    registry: &mut OpletRegistry<O>,
    worker_number: usize,
    health: &HealthAggregator,
) where
    Ctl: ControllerAdapter,
    T: TreeClient + 'static,
    O: Oplet + 'static,
{
    match controller.update_state().await {
        Ok(true) => {
            for (_, oplet) in registry.iter() {
                oplet.set_pending_restart("controller's state changed");
            }
        }
        Ok(false) => {}
        Err(err) => {
            health.report_error(Subsystem::Pass, err.to_string());
            return;
        }
    }

    match tree.list_acl(acl_root).await {
        Ok(entries) => {
            let mut seen = HashSet::with_capacity(entries.len());
            for (alias, acl) in entries {
                seen.insert(alias.clone());
                if let Some(oplet) = registry.get(&alias) {
                    oplet.set_acl(acl);
                }
            }
            let missing: Vec<Alias> =
                registry.aliases().into_iter().filter(|a| !seen.contains(a)).collect();
            for alias in missing {
                info!(%alias, reason = "missing acl node", "unregistering oplet");
                registry.unregister(&alias);
            }
        }
        Err(err) => {
            health.report_error(Subsystem::Pass, err.to_string());
            return;
        }
    }

    process_oplets(registry.oplets(), worker_number).await;

    let to_drop: Vec<(Alias, String)> = registry
        .iter()
        .filter_map(|(alias, oplet)| {
            if oplet.broken() {
                Some((alias.clone(), format!("broken: {}", oplet.broken_reason())))
            } else if oplet.inappropriate() {
                Some((alias.clone(), "inappropriate".to_string()))
            } else {
                None
            }
        })
        .collect();
    for (alias, reason) in to_drop {
        info!(%alias, %reason, "unregistering oplet");
        registry.unregister(&alias);
    }

    registry.assert_invariants();

    health.report_ok(Subsystem::Pass);
}

async fn process_oplets<O: Oplet + 'static>(oplets: Vec<Arc<O>>, worker_number: usize) {
    let (tx, rx) = mpsc::channel(oplets.len().max(1));
    for oplet in oplets {
        let _ = tx.send(oplet).await;
    }
    drop(tx);
    let rx = Arc::new(tokio::sync::Mutex::new(rx));

    let mut workers = JoinSet::new();
    for worker_id in 0..worker_number.max(1) {
        let rx = Arc::clone(&rx);
        workers.spawn(async move {
            let mut total = Duration::ZERO;
            let mut max = Duration::ZERO;
            loop {
                let next = rx.lock().await.recv().await;
                let Some(oplet) = next else { break };
                let start = Instant::now();
                oplet.pass(false).await;
                let elapsed = start.elapsed();
                total += elapsed;
                max = max.max(elapsed);
            }
            debug!(worker_id, ?total, ?max, "pass worker finished");
        });
    }
    while workers.join_next().await.is_some() {}
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;

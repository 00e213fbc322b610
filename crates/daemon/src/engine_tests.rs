use serde_json::json;
use va_adapters::{FakeClusterClient, FakeControllerAdapter, FakeTreeClient};
use va_core::{
    Ace, AceAction, AgentInfo, BriefSpec, FakeOplet, HealthAggregator, OperationId, OperationState,
    OperationStatus,
};

use crate::oplet_factory::FnOpletFactory;

use super::*;

fn alias(s: &str) -> Alias {
    Alias::new(s).unwrap()
}

fn status_with_alias(id: &str, state: OperationState, alias: &str) -> OperationStatus {
    let mut map = serde_json::Map::new();
    map.insert("alias".to_string(), json!(format!("*{alias}")));
    OperationStatus::new(OperationId::new(id), state, Some(BriefSpec::new(map)))
}

fn agent_info() -> Arc<AgentInfo> {
    Arc::new(AgentInfo {
        hostname: "host".to_string(),
        stage: "prod".to_string(),
        proxy: "proxy".to_string(),
        family: "fam".to_string(),
        namespace: "fam:prod".to_string(),
        robot_username: "robot".to_string(),
        default_network_project: None,
        cluster_url: String::new(),
        root: TreePath::new("root"),
    })
}

// Scenario 1: unknown running operation.
#[tokio::test]
async fn unknown_operation_is_aborted() {
    let cluster = Arc::new(FakeClusterClient::new());
    let registry: OpletRegistry<FakeOplet> = OpletRegistry::new();
    let health = HealthAggregator::new();

    let snapshot = vec![status_with_alias("op-1", OperationState::Running, "foo")];
    running_operations_pass(&cluster, &registry, snapshot, 2, &health).await;

    assert_eq!(cluster.aborted(), vec![OperationId::new("op-1")]);
    assert!(registry.is_empty());
}

// Scenario 2: alias-less operation.
#[tokio::test]
async fn alias_less_operation_is_aborted() {
    let cluster = Arc::new(FakeClusterClient::new());
    let registry: OpletRegistry<FakeOplet> = OpletRegistry::new();
    let health = HealthAggregator::new();

    let status = OperationStatus::new(
        OperationId::new("op-1"),
        OperationState::Running,
        Some(BriefSpec::new(serde_json::Map::new())),
    );
    running_operations_pass(&cluster, &registry, vec![status], 1, &health).await;

    assert_eq!(cluster.aborted(), vec![OperationId::new("op-1")]);
}

#[tokio::test]
async fn brief_spec_less_operation_is_ignored() {
    let cluster = Arc::new(FakeClusterClient::new());
    let registry: OpletRegistry<FakeOplet> = OpletRegistry::new();
    let health = HealthAggregator::new();

    let status = OperationStatus::new(OperationId::new("op-1"), OperationState::Running, None);
    running_operations_pass(&cluster, &registry, vec![status], 1, &health).await;

    assert!(cluster.aborted().is_empty());
}

// Scenario 3: stale operation id.
#[tokio::test]
async fn stale_operation_id_is_aborted() {
    let cluster = Arc::new(FakeClusterClient::new());
    let mut registry: OpletRegistry<FakeOplet> = OpletRegistry::new();
    let oplet = Arc::new(
        FakeOplet::new(alias("bar"))
            .with_operation(OperationId::new("A"), OperationState::Running)
            .with_up_to_date(true),
    );
    registry.register(Arc::clone(&oplet)).unwrap();
    let health = HealthAggregator::new();

    let snapshot = vec![status_with_alias("B", OperationState::Running, "bar")];
    running_operations_pass(&cluster, &registry, snapshot, 1, &health).await;

    assert_eq!(cluster.aborted(), vec![OperationId::new("B")]);
    assert_eq!(oplet.update_op_status_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

// Up-to-date oplet with no known operation yet: the observed op can only
// be a dangling leftover, so it is treated as an id mismatch and aborted
// rather than assumed to be a legitimately starting operation.
#[tokio::test]
async fn up_to_date_oplet_with_no_operation_is_aborted() {
    let cluster = Arc::new(FakeClusterClient::new());
    let mut registry: OpletRegistry<FakeOplet> = OpletRegistry::new();
    let oplet = Arc::new(FakeOplet::new(alias("bar")).with_up_to_date(true));
    registry.register(Arc::clone(&oplet)).unwrap();
    let health = HealthAggregator::new();

    let snapshot = vec![status_with_alias("A", OperationState::Running, "bar")];
    running_operations_pass(&cluster, &registry, snapshot, 1, &health).await;

    assert_eq!(cluster.aborted(), vec![OperationId::new("A")]);
    assert_eq!(oplet.update_op_status_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

// Scenario 4: status drift.
#[tokio::test]
async fn status_drift_updates_without_aborting() {
    let cluster = Arc::new(FakeClusterClient::new());
    let mut registry: OpletRegistry<FakeOplet> = OpletRegistry::new();
    let oplet = Arc::new(
        FakeOplet::new(alias("bar"))
            .with_operation(OperationId::new("A"), OperationState::Running)
            .with_up_to_date(true),
    );
    registry.register(Arc::clone(&oplet)).unwrap();
    let health = HealthAggregator::new();

    let snapshot = vec![status_with_alias("A", OperationState::Completed, "bar")];
    running_operations_pass(&cluster, &registry, snapshot, 1, &health).await;

    assert!(cluster.aborted().is_empty());
    assert_eq!(oplet.update_op_status_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert_eq!(oplet.operation_info().unwrap().1, OperationState::Completed);
}

#[tokio::test]
async fn not_up_to_date_oplet_is_neither_found_nor_aborted() {
    let cluster = Arc::new(FakeClusterClient::new());
    let mut registry: OpletRegistry<FakeOplet> = OpletRegistry::new();
    let oplet = Arc::new(
        FakeOplet::new(alias("bar"))
            .with_operation(OperationId::new("A"), OperationState::Running)
            .with_up_to_date(false),
    );
    registry.register(Arc::clone(&oplet)).unwrap();
    let health = HealthAggregator::new();

    let snapshot = vec![status_with_alias("A", OperationState::Running, "bar")];
    running_operations_pass(&cluster, &registry, snapshot, 1, &health).await;

    assert!(cluster.aborted().is_empty());
    assert_eq!(oplet.update_op_status_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn oplet_missing_from_census_is_liveness_checked() {
    let cluster = Arc::new(FakeClusterClient::new());
    let mut registry: OpletRegistry<FakeOplet> = OpletRegistry::new();
    let oplet = Arc::new(
        FakeOplet::new(alias("bar"))
            .with_operation(OperationId::new("A"), OperationState::Running)
            .with_up_to_date(true),
    );
    registry.register(Arc::clone(&oplet)).unwrap();
    let health = HealthAggregator::new();

    running_operations_pass(&cluster, &registry, vec![], 1, &health).await;

    assert_eq!(oplet.check_liveness_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}

// Scenario 6: controller state change.
#[tokio::test]
async fn controller_state_change_marks_every_oplet_pending_restart() {
    let tree = Arc::new(FakeTreeClient::new());
    tree.set_acl(vec![(alias("baz"), vec![])]);
    let controller = FakeControllerAdapter::new("fam", TreePath::new("root"));
    controller.set_changed_next(true);

    let mut registry: OpletRegistry<FakeOplet> = OpletRegistry::new();
    let oplet = Arc::new(FakeOplet::new(alias("baz")));
    registry.register(Arc::clone(&oplet)).unwrap();
    let health = HealthAggregator::new();

    full_pass(&controller, &tree, &TreePath::new("acl/fam"), &mut registry, 1, &health).await;

    assert_eq!(
        oplet.pending_restart_reason(),
        Some("controller's state changed".to_string())
    );
}

// Scenario 5: missing ACL.
#[tokio::test]
async fn missing_acl_unregisters_the_oplet() {
    let tree = Arc::new(FakeTreeClient::new());
    tree.set_acl(vec![]);
    let controller = FakeControllerAdapter::new("fam", TreePath::new("root"));

    let mut registry: OpletRegistry<FakeOplet> = OpletRegistry::new();
    registry.register(Arc::new(FakeOplet::new(alias("baz")))).unwrap();
    let health = HealthAggregator::new();

    full_pass(&controller, &tree, &TreePath::new("acl/fam"), &mut registry, 1, &health).await;

    assert!(!registry.contains(&alias("baz")));
}

#[tokio::test]
async fn present_acl_is_forwarded_to_its_oplet() {
    let tree = Arc::new(FakeTreeClient::new());
    let ace = Ace { action: AceAction::Allow, subjects: vec!["robot".to_string()], permissions: vec!["use".to_string()] };
    tree.set_acl(vec![(alias("baz"), vec![ace.clone()])]);
    let controller = FakeControllerAdapter::new("fam", TreePath::new("root"));

    let mut registry: OpletRegistry<FakeOplet> = OpletRegistry::new();
    let oplet = Arc::new(FakeOplet::new(alias("baz")));
    registry.register(Arc::clone(&oplet)).unwrap();
    let health = HealthAggregator::new();

    full_pass(&controller, &tree, &TreePath::new("acl/fam"), &mut registry, 1, &health).await;

    assert_eq!(oplet.acl(), vec![ace]);
}

#[tokio::test]
async fn broken_and_inappropriate_oplets_are_unregistered_post_sweep() {
    let tree = Arc::new(FakeTreeClient::new());
    tree.set_acl(vec![(alias("broken"), vec![]), (alias("done"), vec![])]);
    let controller = FakeControllerAdapter::new("fam", TreePath::new("root"));

    let mut registry: OpletRegistry<FakeOplet> = OpletRegistry::new();
    let broken = Arc::new(FakeOplet::new(alias("broken")));
    broken.mark_broken("disk full");
    let inappropriate = Arc::new(FakeOplet::new(alias("done")));
    inappropriate.mark_inappropriate();
    registry.register(broken).unwrap();
    registry.register(inappropriate).unwrap();
    let health = HealthAggregator::new();

    full_pass(&controller, &tree, &TreePath::new("acl/fam"), &mut registry, 2, &health).await;

    assert!(registry.is_empty());
}

#[tokio::test]
async fn controller_failure_aborts_the_pass_before_acl_reconciliation() {
    let tree = Arc::new(FakeTreeClient::new());
    tree.set_acl(vec![]);
    let controller = FakeControllerAdapter::new("fam", TreePath::new("root"));
    controller.fail_next_update();

    let mut registry: OpletRegistry<FakeOplet> = OpletRegistry::new();
    registry.register(Arc::new(FakeOplet::new(alias("baz")))).unwrap();
    let health = HealthAggregator::new();

    full_pass(&controller, &tree, &TreePath::new("acl/fam"), &mut registry, 1, &health).await;

    // ACL step never ran, so the oplet survives despite the empty ACL listing.
    assert!(registry.contains(&alias("baz")));
}

#[test]
fn handle_tree_path_registers_unknown_alias() {
    let root = TreePath::new("root");
    let mut registry: OpletRegistry<FakeOplet> = OpletRegistry::new();
    let factory = FnOpletFactory::new(|alias, _info| Arc::new(FakeOplet::new(alias)));

    handle_tree_path(&root, &mut registry, &factory, &agent_info(), "root/foo");

    assert!(registry.contains(&alias("foo")));
}

#[test]
fn handle_tree_path_notifies_known_alias_for_speclet() {
    let root = TreePath::new("root");
    let mut registry: OpletRegistry<FakeOplet> = OpletRegistry::new();
    let oplet = Arc::new(FakeOplet::new(alias("foo")));
    registry.register(Arc::clone(&oplet)).unwrap();
    let factory = FnOpletFactory::new(|alias, _info| Arc::new(FakeOplet::new(alias)));

    handle_tree_path(&root, &mut registry, &factory, &agent_info(), "root/foo/speclet");

    assert_eq!(oplet.on_node_changed_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert_eq!(registry.len(), 1);
}

// The four running-operations-pass abort/skip scenarios share a shape:
// one registered oplet (or none), one observed status, and an expectation
// about whether an abort fires. Parameterized per the adopted codebase's
// convention for same-shape scenarios.
#[yare::parameterized(
    unknown_alias_is_aborted = { None, status_with_alias("op-1", OperationState::Running, "foo"), true },
    missing_alias_field_is_aborted = { None, OperationStatus::new(OperationId::new("op-1"), OperationState::Running, Some(BriefSpec::new(serde_json::Map::new()))), true },
    stale_operation_id_is_aborted = {
        Some((OperationId::new("A"), OperationState::Running)),
        status_with_alias("B", OperationState::Running, "bar"),
        true
    },
    matching_operation_id_is_not_aborted = {
        Some((OperationId::new("A"), OperationState::Running)),
        status_with_alias("A", OperationState::Completed, "bar"),
        false
    },
)]
#[tokio::test]
async fn abort_decision(
    known_operation: Option<(OperationId, OperationState)>,
    status: OperationStatus,
    expect_abort: bool,
) {
    let cluster = Arc::new(FakeClusterClient::new());
    let mut registry: OpletRegistry<FakeOplet> = OpletRegistry::new();
    if let Some((id, state)) = known_operation {
        let oplet = Arc::new(FakeOplet::new(alias("bar")).with_operation(id, state).with_up_to_date(true));
        registry.register(oplet).unwrap();
    }
    let health = HealthAggregator::new();

    running_operations_pass(&cluster, &registry, vec![status], 1, &health).await;

    assert_eq!(!cluster.aborted().is_empty(), expect_abort);
}

#[test]
fn handle_tree_path_ignores_deeper_subpaths() {
    let root = TreePath::new("root");
    let mut registry: OpletRegistry<FakeOplet> = OpletRegistry::new();
    let factory = FnOpletFactory::new(|alias, _info| Arc::new(FakeOplet::new(alias)));

    handle_tree_path(&root, &mut registry, &factory, &agent_info(), "root/foo/speclet/nested");

    assert!(registry.is_empty());
}

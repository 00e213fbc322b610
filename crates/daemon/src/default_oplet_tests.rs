use va_core::{AceAction, TreePath};

use super::*;

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

#[test]
fn starts_with_no_operation_and_up_to_date() {
    let oplet = DefaultOplet::new(Alias::new("foo").unwrap(), agent_info());
    assert!(oplet.up_to_date_with_cypress());
    assert!(!oplet.has_yt_operation());
    assert!(oplet.operation_info().is_none());
    assert!(!oplet.broken());
    assert!(!oplet.inappropriate());
}

#[test]
fn update_op_status_is_reflected_in_operation_info() {
    let oplet = DefaultOplet::new(Alias::new("foo").unwrap(), agent_info());
    oplet.update_op_status(OperationStatus::new(
        OperationId::new("op-1"),
        OperationState::Running,
        None,
    ));

    assert!(oplet.has_yt_operation());
    assert_eq!(
        oplet.operation_info(),
        Some((OperationId::new("op-1"), OperationState::Running))
    );
}

#[test]
fn set_acl_round_trips() {
    let oplet = DefaultOplet::new(Alias::new("foo").unwrap(), agent_info());
    let ace = Ace { action: AceAction::Allow, subjects: vec!["robot".to_string()], permissions: vec![] };
    oplet.set_acl(vec![ace.clone()]);
    assert_eq!(*oplet.acl.lock(), vec![ace]);
}

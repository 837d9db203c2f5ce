// Template-migration workflow tests over the in-memory control plane.

#![allow(clippy::unwrap_used)]

mod common;

use std::collections::BTreeMap;

use common::{Call, MockPlane, State, assignment};
use netrefit_core::{
    CoreError, DEFAULT_VLAN_IDS, MacAddress, ModelRules, NoWait, Orchestrator, VlanConfig,
};

const NET: &str = "N_200";
const TEMPLATE: &str = "N_TPL_9";

fn vlan(id: u16, subnet: &str) -> VlanConfig {
    VlanConfig {
        id,
        name: Some(format!("VLAN {id}")),
        subnet: Some(subnet.into()),
        appliance_ip: None,
        group_policy_id: None,
        fixed_ip_assignments: BTreeMap::new(),
        reserved_ranges: Vec::new(),
    }
}

/// Source network with VLANs 1, 4, and 5; the template's own VLANs are
/// added per test.
fn source_state() -> State {
    let mut state = State::default();

    let mut v1 = vlan(1, "10.1.1.0/27");
    v1.appliance_ip = Some("10.1.1.1".into());
    v1.fixed_ip_assignments.insert(
        MacAddress::new("00:18:0a:00:00:02"),
        assignment("10.1.1.93", Some("SW1")),
    );
    v1.fixed_ip_assignments.insert(
        MacAddress::new("00:18:0a:00:00:03"),
        assignment("10.1.1.89", Some("SW2")),
    );
    state.vlans.insert((NET.into(), 1), v1);

    let mut v4 = vlan(4, "10.1.1.32/27");
    v4.fixed_ip_assignments.insert(
        MacAddress::new("00:18:0a:00:00:09"),
        assignment("10.1.1.40", Some("Register")),
    );
    state.vlans.insert((NET.into(), 4), v4);

    state.vlans.insert((NET.into(), 5), vlan(5, "10.1.5.0/24"));

    state
}

fn orchestrator(state: State) -> Orchestrator<MockPlane> {
    Orchestrator::new(MockPlane::new(state), ModelRules::default()).with_settle(NoWait)
}

#[tokio::test]
async fn template_without_vlan4_gets_merged_subnet() {
    let mut state = source_state();
    state.vlans.insert((TEMPLATE.into(), 1), vlan(1, "172.16.0.0/26"));
    let orch = orchestrator(state);

    let result = orch
        .run_template_migration(NET, TEMPLATE, &DEFAULT_VLAN_IDS)
        .await
        .unwrap();

    assert!(result.is_clean(), "unexpected errors: {:?}", result.errors);

    let v1 = orch.plane().vlan(NET, 1);
    assert_eq!(v1.subnet.as_deref(), Some("10.1.1.0/26"));
    // VLAN 1's reservations came back; VLAN 4 was absorbed, not restored.
    assert_eq!(v1.fixed_ip_assignments.len(), 2);
    let restored_vlans: Vec<u16> = orch
        .plane()
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::UpdateVlan { network, vlan } if network == NET => Some(vlan),
            _ => None,
        })
        .collect();
    assert!(restored_vlans.contains(&1));
    assert!(restored_vlans.contains(&5));
    assert!(!restored_vlans.contains(&4));
}

#[tokio::test]
async fn template_with_both_vlans_preserves_subnets() {
    let mut state = source_state();
    state.vlans.insert((TEMPLATE.into(), 1), vlan(1, "172.16.0.0/27"));
    state.vlans.insert((TEMPLATE.into(), 4), vlan(4, "172.16.0.32/27"));
    let orch = orchestrator(state);

    let result = orch
        .run_template_migration(NET, TEMPLATE, &DEFAULT_VLAN_IDS)
        .await
        .unwrap();

    assert!(result.is_clean());
    let v1 = orch.plane().vlan(NET, 1);
    assert_eq!(v1.subnet.as_deref(), Some("10.1.1.0/27"));
    let v4 = orch.plane().vlan(NET, 4);
    assert_eq!(v4.subnet.as_deref(), Some("10.1.1.32/27"));
    // Only VLAN 1's fixed assignments are restored; VLAN 4's are discarded.
    assert!(v4.fixed_ip_assignments.is_empty());
    assert_eq!(orch.plane().vlan(NET, 1).fixed_ip_assignments.len(), 2);
}

#[tokio::test]
async fn exactly_one_unbind_then_one_bind_with_no_writes_between() {
    let mut state = source_state();
    state.vlans.insert((TEMPLATE.into(), 1), vlan(1, "172.16.0.0/26"));
    let orch = orchestrator(state);

    orch.run_template_migration(NET, TEMPLATE, &DEFAULT_VLAN_IDS)
        .await
        .unwrap();

    let calls = orch.plane().calls();
    let unbind_positions: Vec<_> = calls
        .iter()
        .enumerate()
        .filter(|(_, c)| matches!(c, Call::Unbind { .. }))
        .map(|(i, _)| i)
        .collect();
    let bind_positions: Vec<_> = calls
        .iter()
        .enumerate()
        .filter(|(_, c)| matches!(c, Call::Bind { .. }))
        .map(|(i, _)| i)
        .collect();

    assert_eq!(unbind_positions.len(), 1);
    assert_eq!(bind_positions.len(), 1);
    assert!(unbind_positions[0] < bind_positions[0]);

    // Nothing mutates the source network in the unbind..bind window.
    for call in &calls[unbind_positions[0] + 1..bind_positions[0]] {
        assert!(
            !matches!(call, Call::UpdateVlan { network, .. } if network == NET),
            "source VLAN mutated between unbind and bind: {call:?}"
        );
    }
}

#[tokio::test]
async fn unbind_failure_aborts_immediately() {
    let mut state = source_state();
    state.fail_unbind = true;
    let orch = orchestrator(state);

    let result = orch
        .run_template_migration(NET, TEMPLATE, &DEFAULT_VLAN_IDS)
        .await;

    match result {
        Err(CoreError::ConnectivityFatal { stage, .. }) => assert_eq!(stage, "unbind"),
        other => panic!("expected ConnectivityFatal, got: {other:?}"),
    }
    // The unbind attempt is the only mutating call ever issued.
    assert_eq!(orch.plane().mutating_call_count(), 1);
}

#[tokio::test]
async fn bind_failure_aborts_before_any_restore() {
    let mut state = source_state();
    state.vlans.insert((TEMPLATE.into(), 1), vlan(1, "172.16.0.0/26"));
    state.fail_bind = true;
    let orch = orchestrator(state);

    let result = orch
        .run_template_migration(NET, TEMPLATE, &DEFAULT_VLAN_IDS)
        .await;

    match result {
        Err(CoreError::ConnectivityFatal { stage, .. }) => assert_eq!(stage, "bind"),
        other => panic!("expected ConnectivityFatal, got: {other:?}"),
    }
    let calls = orch.plane().calls();
    assert!(
        calls
            .iter()
            .all(|c| !matches!(c, Call::UpdateVlan { .. })),
        "restore ran despite bind failure: {calls:?}"
    );
}

#[tokio::test]
async fn template_without_vlan1_skips_subnet_restore_but_finishes() {
    // Template defines neither VLAN: restoration of 1 and 4 is skipped,
    // other VLANs still come back, and the run is not fatal.
    let orch = orchestrator(source_state());

    let result = orch
        .run_template_migration(NET, TEMPLATE, &DEFAULT_VLAN_IDS)
        .await
        .unwrap();

    assert!(result.errors.iter().any(|e| e.contains("subnet restoration skipped")));
    let restored_vlans: Vec<u16> = orch
        .plane()
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::UpdateVlan { network, vlan } if network == NET => Some(vlan),
            _ => None,
        })
        .collect();
    assert_eq!(restored_vlans, vec![5]);
}

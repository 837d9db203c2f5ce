// ── Template-migration workflow ──
//
// Moves a network onto a different configuration template while keeping
// its addressing: snapshot VLANs, unbind, probe the target template's
// VLAN structure, decide the VLAN 1 subnet, bind, restore.
//
// Exactly one unbind and one bind happen per run, strictly ordered, and
// they are the only fatal operations in the whole system. Between them
// the source network is never mutated -- the subnet decision is pure
// computation over the snapshot plus reads of the template.

use tracing::{debug, info, warn};

use crate::controlplane::{ControlPlane, VlanUpdate};
use crate::error::CoreError;
use crate::model::vlan::{ABSORBED_VLAN_ID, MGMT_VLAN_ID};
use crate::model::{MigrationPlan, Phase, PhaseResult, VlanConfig, WorkflowResult};
use crate::subnet::{SubnetDecision, plan_vlan1_subnet};
use crate::workflow::Orchestrator;
use crate::workflow::context::WorkflowContext;

/// VLAN ids snapshotted from the source network by default.
pub const DEFAULT_VLAN_IDS: [u16; 7] = [1, 2, 3, 4, 5, 7, 999];

impl<C: ControlPlane> Orchestrator<C> {
    /// Migrate one network to a new configuration template.
    ///
    /// Returns `Err` only for [`CoreError::ConnectivityFatal`] -- a failed
    /// unbind or bind, after which nothing further executes. Every other
    /// failure is recorded in the result and the run continues.
    pub async fn run_template_migration(
        &self,
        network_id: &str,
        template_id: &str,
        vlan_ids: &[u16],
    ) -> Result<WorkflowResult, CoreError> {
        let mut ctx = WorkflowContext::new(network_id);
        info!(network_id, template_id, "starting template migration");

        // 1. Snapshot the source VLANs before any mutation.
        let (plan, snapshot_result) = self.snapshot_vlans(network_id, template_id, vlan_ids).await;
        ctx.record(snapshot_result);

        // 2. Unbind from the current template, retaining configs.
        self.plane
            .unbind_network(network_id, true)
            .await
            .map_err(|e| CoreError::ConnectivityFatal {
                stage: "unbind",
                network_id: network_id.to_owned(),
                message: e.to_string(),
            })?;
        ctx.record(PhaseResult {
            phase: Phase::UnbindNetwork,
            affected: 1,
            errors: Vec::new(),
        });
        self.settle.settle(Phase::UnbindNetwork).await;

        // 3. Probe the target template's own VLAN structure.
        let has_v1 = self.template_has_vlan(template_id, MGMT_VLAN_ID).await;
        let has_v4 = self.template_has_vlan(template_id, ABSORBED_VLAN_ID).await;
        debug!(has_v1, has_v4, "probed template VLAN structure");

        // 4. Decide what VLAN 1's subnet should become; apply to the
        //    snapshot only (the network is not touched until restore).
        let mut restore_set = plan.vlan_snapshot.clone();
        let v1 = restore_set.iter().find(|v| v.id == MGMT_VLAN_ID).cloned();
        let v4 = restore_set.iter().find(|v| v.id == ABSORBED_VLAN_ID).cloned();
        let mut subnet_errors = Vec::new();

        match plan_vlan1_subnet(has_v1, has_v4, v1.as_ref(), v4.as_ref()) {
            SubnetDecision::PreserveOriginal => {
                debug!("template keeps both VLANs; preserving original VLAN 1 subnet");
            }
            SubnetDecision::Merged(merged) => {
                info!(%merged, "applying merged VLAN 1 subnet");
                if let Some(vlan1) = restore_set.iter_mut().find(|v| v.id == MGMT_VLAN_ID) {
                    vlan1.subnet = Some(merged.to_string());
                }
                // VLAN 4's range is absorbed; it is not restored separately.
                restore_set.retain(|v| v.id != ABSORBED_VLAN_ID);
            }
            SubnetDecision::NotDeterminable(reason) => {
                warn!(reason, "VLAN 1 subnet not determinable; skipping subnet restoration");
                subnet_errors.push(format!("subnet restoration skipped: {reason}"));
                restore_set.retain(|v| v.id != MGMT_VLAN_ID && v.id != ABSORBED_VLAN_ID);
            }
        }

        // 5. Bind to the new template.
        self.plane
            .bind_network(network_id, template_id)
            .await
            .map_err(|e| CoreError::ConnectivityFatal {
                stage: "bind",
                network_id: network_id.to_owned(),
                message: e.to_string(),
            })?;
        ctx.record(PhaseResult {
            phase: Phase::BindNetwork,
            affected: 1,
            errors: subnet_errors,
        });
        self.settle.settle(Phase::BindNetwork).await;

        // 6. Restore VLANs. Only VLAN 1 gets its fixed assignments back;
        //    assignments from other VLANs are discarded.
        let restore_result = self.restore_vlans(network_id, &restore_set).await;
        ctx.record(restore_result);

        info!(network_id, template_id, "template migration complete");
        Ok(ctx.finish())
    }

    async fn snapshot_vlans(
        &self,
        network_id: &str,
        template_id: &str,
        vlan_ids: &[u16],
    ) -> (MigrationPlan, PhaseResult) {
        let mut result = PhaseResult::new(Phase::SnapshotVlans);
        let mut snapshot = Vec::new();

        for &vid in vlan_ids {
            match self.plane.get_vlan(network_id, vid).await {
                Ok(vlan) => {
                    debug!(
                        vlan = vid,
                        subnet = ?vlan.subnet,
                        assignments = vlan.fixed_ip_assignments.len(),
                        "snapshotted VLAN"
                    );
                    snapshot.push(vlan);
                }
                // Absent VLANs are expected; only some ids exist per site.
                Err(e) => debug!(vlan = vid, error = %e, "VLAN not present in source; skipping"),
            }
        }

        result.affected = snapshot.len();
        let plan = MigrationPlan {
            network_id: network_id.to_owned(),
            template_id: template_id.to_owned(),
            vlan_snapshot: snapshot,
        };
        (plan, result)
    }

    async fn template_has_vlan(&self, template_id: &str, vlan_id: u16) -> bool {
        self.plane.get_vlan(template_id, vlan_id).await.is_ok()
    }

    async fn restore_vlans(&self, network_id: &str, restore_set: &[VlanConfig]) -> PhaseResult {
        let mut result = PhaseResult::new(Phase::RestoreVlans);

        for vlan in restore_set {
            let mut update = VlanUpdate {
                name: vlan.name.clone(),
                subnet: vlan.subnet.clone(),
                appliance_ip: vlan.appliance_ip.clone(),
                group_policy_id: vlan.group_policy_id.clone(),
                fixed_ip_assignments: None,
                reserved_ranges: None,
            };
            if vlan.id == MGMT_VLAN_ID && !vlan.fixed_ip_assignments.is_empty() {
                update.fixed_ip_assignments = Some(vlan.fixed_ip_assignments.clone());
            }

            match self.plane.update_vlan(network_id, vlan.id, update).await {
                Ok(()) => {
                    result.affected += 1;
                    if vlan.id == MGMT_VLAN_ID {
                        info!(
                            vlan = vlan.id,
                            assignments = vlan.fixed_ip_assignments.len(),
                            "restored VLAN with fixed assignments"
                        );
                    } else {
                        info!(vlan = vlan.id, "restored VLAN");
                    }
                }
                Err(e) => result.fail(format!("failed to restore VLAN {}: {e}", vlan.id)),
            }
        }

        result
    }
}

// ── Device-refresh workflow ──
//
// Fixed phase order; not parameterizable. Mutating phases are followed by
// a settle delay before the next phase reads control-plane state. Every
// per-item failure is recorded and the run continues -- nothing in a
// refresh is fatal.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::classify::classify;
use crate::controlplane::{ControlPlane, DeviceUpdate, ManagementPorts, VlanUpdate};
use crate::model::vlan::MGMT_VLAN_ID;
use crate::model::{
    AddedDevice, DeviceCategory, FixedIpAssignment, MacAddress, Phase, PhaseResult, RefreshPlan,
    WorkflowResult,
};
use crate::preserve::{StaticWanConfig, filter_assignments};
use crate::switches::{map_switch_identities, resolve_subnet_base};
use crate::workflow::Orchestrator;
use crate::workflow::context::WorkflowContext;

impl<C: ControlPlane> Orchestrator<C> {
    /// Run the complete device-refresh workflow against one network.
    ///
    /// Never errors at this boundary: every failure is encoded in the
    /// returned [`WorkflowResult`].
    pub async fn run_refresh(&self, network_id: &str, plan: &RefreshPlan) -> WorkflowResult {
        let mut ctx = WorkflowContext::new(network_id);
        info!(network_id, "starting device refresh");

        let result = self.clear_nonpreserved_assignments(network_id).await;
        ctx.record(result);
        self.settle.settle(Phase::ClearAssignments).await;

        let result = self.remove_tagged_ranges(network_id).await;
        ctx.record(result);
        self.settle.settle(Phase::RemoveReservedRanges).await;

        // Read-only: no settle needed before the next phase.
        let result = self.capture_static_wan(network_id, &mut ctx).await;
        ctx.record(result);

        let result = self.retire_legacy_devices(network_id, &ctx).await;
        ctx.record(result);
        self.settle.settle(Phase::RetireDevices).await;

        let result = self.add_new_devices(network_id, plan, &mut ctx).await;
        ctx.record(result);
        self.settle.settle(Phase::AddDevices).await;

        let result = self.convert_wan_port(network_id, &mut ctx).await;
        let converted = result.affected;
        ctx.record(result);
        if converted > 0 {
            self.settle.settle(Phase::ConvertWanPort).await;
        }

        let result = self.replay_static_wan(network_id, &mut ctx).await;
        let replayed = result.affected;
        ctx.record(result);
        if replayed > 0 {
            self.settle.settle(Phase::ReplayStaticWan).await;
        }

        if let Some(target) = plan.rename_target() {
            let result = self.rename_sensor_devices(network_id, target).await;
            let renamed = result.affected;
            ctx.record(result);
            if renamed > 0 {
                self.settle.settle(Phase::RenameSensors).await;
            }
        }

        if let Some(address) = plan.address.as_ref().and_then(|a| a.formatted()) {
            let result = self.update_site_address(network_id, &address).await;
            let updated = result.affected;
            ctx.record(result);
            if updated > 0 {
                self.settle.settle(Phase::UpdateSiteAddress).await;
            }
        }

        let result = self
            .ensure_switch_assignments(network_id, &plan.switch_names)
            .await;
        ctx.record(result);
        self.settle.settle(Phase::EnsureSwitchAssignments).await;

        if !plan.ap_assignments.is_empty() {
            let result = self.create_ap_assignments(network_id, plan).await;
            ctx.record(result);
            self.settle.settle(Phase::CreateApAssignments).await;
        }

        info!(network_id, "device refresh complete");
        ctx.finish()
    }

    // ── Phase 1: clear non-preserved fixed IP assignments ────────────

    async fn clear_nonpreserved_assignments(&self, network_id: &str) -> PhaseResult {
        let mut result = PhaseResult::new(Phase::ClearAssignments);

        let devices = match self.plane.list_devices(network_id).await {
            Ok(devices) => devices,
            Err(e) => {
                result.fail(format!("failed to list devices: {e}"));
                return result;
            }
        };
        let preserved_macs: HashSet<MacAddress> = devices
            .iter()
            .filter(|d| d.model_matches(&self.rules.preserved_prefixes))
            .filter_map(|d| d.mac.clone())
            .collect();

        let vlan = match self.plane.get_vlan(network_id, MGMT_VLAN_ID).await {
            Ok(vlan) => vlan,
            Err(e) => {
                result.fail(format!("failed to read VLAN {MGMT_VLAN_ID}: {e}"));
                return result;
            }
        };

        let filtered = filter_assignments(
            &vlan.fixed_ip_assignments,
            &preserved_macs,
            &self.rules.preserve_assignment_names,
        );
        for (mac, entry) in &filtered.retained {
            debug!(%mac, ip = entry.ip, name = ?entry.name, "preserving assignment");
        }

        if let Err(e) = self
            .plane
            .update_vlan(
                network_id,
                MGMT_VLAN_ID,
                VlanUpdate::assignments(filtered.retained),
            )
            .await
        {
            result.fail(format!("failed to clear assignments: {e}"));
            return result;
        }

        result.affected = filtered.removed;
        info!(cleared = filtered.removed, "cleared non-preserved assignments");
        result
    }

    // ── Phase 2: drop tagged reserved ranges ─────────────────────────

    async fn remove_tagged_ranges(&self, network_id: &str) -> PhaseResult {
        let mut result = PhaseResult::new(Phase::RemoveReservedRanges);
        let tag = &self.rules.reserved_range_tag;

        let vlan = match self.plane.get_vlan(network_id, MGMT_VLAN_ID).await {
            Ok(vlan) => vlan,
            Err(e) => {
                result.fail(format!("failed to read VLAN {MGMT_VLAN_ID}: {e}"));
                return result;
            }
        };

        let kept: Vec<_> = vlan
            .reserved_ranges
            .iter()
            .filter(|r| !r.tagged(tag))
            .cloned()
            .collect();
        let removed = vlan.reserved_ranges.len() - kept.len();

        if removed == 0 {
            debug!(tag, "no tagged reserved ranges to remove");
            return result;
        }

        if let Err(e) = self
            .plane
            .update_vlan(network_id, MGMT_VLAN_ID, VlanUpdate::ranges(kept))
            .await
        {
            result.fail(format!("failed to remove reserved ranges: {e}"));
            return result;
        }

        result.affected = removed;
        info!(removed, tag, "removed tagged reserved ranges");
        result
    }

    // ── Phase 3: capture static WAN configuration ────────────────────

    async fn capture_static_wan(
        &self,
        network_id: &str,
        ctx: &mut WorkflowContext,
    ) -> PhaseResult {
        let mut result = PhaseResult::new(Phase::CaptureStaticWan);

        let devices = match self.plane.list_devices(network_id).await {
            Ok(devices) => devices,
            Err(e) => {
                result.fail(format!("failed to list devices: {e}"));
                return result;
            }
        };
        let classification = classify(devices, &self.rules, ctx.added_serials());

        for device in &classification.to_retire {
            match self.plane.get_management_ports(&device.serial).await {
                Ok(ports) => {
                    let captured = ports
                        .wan1
                        .as_ref()
                        .and_then(|wan| StaticWanConfig::from_wan(wan, device.category()));
                    if let Some(config) = captured {
                        info!(
                            device = device.display_name(),
                            ip = config.ip,
                            "captured static WAN configuration"
                        );
                        ctx.set_static_wan(config);
                        result.affected = 1;
                        // Single replacement target: first capture wins.
                        break;
                    }
                    debug!(device = device.display_name(), "WAN uplink is DHCP/auto");
                }
                Err(e) => result.fail(format!(
                    "failed to read management interface of {}: {e}",
                    device.display_name()
                )),
            }
        }

        result
    }

    // ── Phase 4: retire legacy devices ───────────────────────────────

    async fn retire_legacy_devices(&self, network_id: &str, ctx: &WorkflowContext) -> PhaseResult {
        let mut result = PhaseResult::new(Phase::RetireDevices);

        let devices = match self.plane.list_devices(network_id).await {
            Ok(devices) => devices,
            Err(e) => {
                result.fail(format!("failed to list devices: {e}"));
                return result;
            }
        };
        let classification = classify(devices, &self.rules, ctx.added_serials());

        for device in &classification.to_retire {
            match self.plane.remove_device(network_id, &device.serial).await {
                Ok(()) => {
                    result.affected += 1;
                    info!(
                        model = device.model,
                        device = device.display_name(),
                        serial = device.serial,
                        "retired device"
                    );
                }
                Err(e) => {
                    let message = e.to_string();
                    if message.to_lowercase().contains("firmware upgrade") {
                        result.fail(format!(
                            "failed to remove {} ({}): device is undergoing a firmware \
                             upgrade; remove it manually once the upgrade completes",
                            device.display_name(),
                            device.serial
                        ));
                    } else {
                        result.fail(format!(
                            "failed to remove {} ({}): {message}",
                            device.display_name(),
                            device.serial
                        ));
                    }
                }
            }
        }

        result
    }

    // ── Phase 5: claim and name new devices ──────────────────────────

    async fn add_new_devices(
        &self,
        network_id: &str,
        plan: &RefreshPlan,
        ctx: &mut WorkflowContext,
    ) -> PhaseResult {
        let mut result = PhaseResult::new(Phase::AddDevices);

        let current: HashSet<String> = match self.plane.list_devices(network_id).await {
            Ok(devices) => devices.into_iter().map(|d| d.serial).collect(),
            Err(e) => {
                result.fail(format!("failed to list devices: {e}"));
                return result;
            }
        };

        for (serial, name) in plan.additions() {
            // Mark before claiming: even a failed claim can land
            // eventually-consistently, and the retirement guard must
            // cover it either way.
            ctx.mark_added(serial);

            if !current.contains(serial) {
                if let Err(e) = self.plane.claim_device(network_id, serial).await {
                    result.fail(format!("failed to add {serial}: {e}"));
                    continue;
                }
                info!(serial, "claimed device");
            }
            result.affected += 1;
            ctx.report_added(AddedDevice {
                serial: serial.to_owned(),
                name: name.to_owned(),
                category: DeviceCategory::Other,
                preserved_ip_note: None,
            });
        }

        for (serial, name) in plan.additions() {
            if let Err(e) = self
                .plane
                .update_device(
                    serial,
                    DeviceUpdate {
                        name: Some(name.to_owned()),
                        address: None,
                    },
                )
                .await
            {
                result.fail(format!("failed to name {serial}: {e}"));
            }
        }

        result
    }

    // ── Phase 6: convert the second port to WAN on new dual-WAN units ─

    async fn convert_wan_port(&self, network_id: &str, ctx: &mut WorkflowContext) -> PhaseResult {
        let mut result = PhaseResult::new(Phase::ConvertWanPort);

        let devices = match self.plane.list_devices(network_id).await {
            Ok(devices) => devices,
            Err(e) => {
                result.fail(format!("failed to list devices: {e}"));
                return result;
            }
        };

        // First post-claim read where the new hardware is visible:
        // backfill the report categories.
        for device in &devices {
            if ctx.was_added(&device.serial) {
                ctx.set_added_category(&device.serial, device.category());
            }
        }

        let targets: Vec<_> = devices
            .into_iter()
            .filter(|d| ctx.was_added(&d.serial) && d.model_matches(&self.rules.dual_wan_prefixes))
            .collect();
        if targets.is_empty() {
            debug!("no newly added dual-WAN devices");
            return result;
        }

        for device in &targets {
            match self.plane.get_management_ports(&device.serial).await {
                Ok(ports) => {
                    if ports.wan2.as_ref().is_some_and(crate::controlplane::WanLink::is_enabled) {
                        debug!(
                            device = device.display_name(),
                            "second port already configured as WAN, skipping"
                        );
                        continue;
                    }
                    match self
                        .plane
                        .update_management_ports(&device.serial, ManagementPorts::enable_wan2())
                        .await
                    {
                        Ok(()) => {
                            result.affected += 1;
                            info!(device = device.display_name(), "converted second port to WAN");
                        }
                        Err(e) => result.fail(format!(
                            "WAN conversion failed for {} ({}): {e}",
                            device.display_name(),
                            device.serial
                        )),
                    }
                }
                Err(e) => result.fail(format!(
                    "failed to read management interface of {} ({}): {e}",
                    device.display_name(),
                    device.serial
                )),
            }
        }

        result
    }

    // ── Phase 7: replay captured static WAN configuration ────────────

    async fn replay_static_wan(&self, network_id: &str, ctx: &mut WorkflowContext) -> PhaseResult {
        let mut result = PhaseResult::new(Phase::ReplayStaticWan);

        let Some(config) = ctx.static_wan().cloned() else {
            return result;
        };

        let devices = match self.plane.list_devices(network_id).await {
            Ok(devices) => devices,
            Err(e) => {
                result.fail(format!("failed to list devices: {e}"));
                return result;
            }
        };
        let targets: Vec<_> = devices
            .into_iter()
            .filter(|d| ctx.was_added(&d.serial) && d.category() == config.source_category)
            .collect();
        if targets.is_empty() {
            debug!("no newly added devices match the captured category");
            return result;
        }

        for device in &targets {
            match self
                .plane
                .update_management_ports(&device.serial, config.to_wan1_patch())
                .await
            {
                Ok(()) => {
                    result.affected += 1;
                    ctx.note_added(
                        &device.serial,
                        format!("static WAN configuration preserved from retired {}", config.source_category),
                    );
                    info!(
                        device = device.display_name(),
                        ip = config.ip,
                        "replayed static WAN configuration"
                    );
                }
                Err(e) => result.fail(format!(
                    "static WAN replay failed for {} ({}): {e}",
                    device.display_name(),
                    device.serial
                )),
            }
        }

        result
    }

    // ── Phase 8: rename surviving sensor devices ─────────────────────

    async fn rename_sensor_devices(&self, network_id: &str, target: &str) -> PhaseResult {
        let mut result = PhaseResult::new(Phase::RenameSensors);

        let devices = match self.plane.list_devices(network_id).await {
            Ok(devices) => devices,
            Err(e) => {
                result.fail(format!("failed to list devices: {e}"));
                return result;
            }
        };
        let sensors: Vec<_> = devices
            .into_iter()
            .filter(|d| d.category() == DeviceCategory::Sensor)
            .collect();
        if sensors.is_empty() {
            debug!("no sensor devices to rename");
            return result;
        }

        for (i, device) in sensors.iter().enumerate() {
            let name = if sensors.len() == 1 {
                target.to_owned()
            } else {
                format!("{target}-{}", i + 1)
            };
            match self
                .plane
                .update_device(
                    &device.serial,
                    DeviceUpdate {
                        name: Some(name.clone()),
                        address: None,
                    },
                )
                .await
            {
                Ok(()) => {
                    result.affected += 1;
                    info!(serial = device.serial, name, "renamed sensor");
                }
                Err(e) => result.fail(format!(
                    "sensor rename failed for {}: {e}",
                    device.serial
                )),
            }
        }

        result
    }

    // ── Phase 9: set the site address on every device ────────────────

    async fn update_site_address(&self, network_id: &str, address: &str) -> PhaseResult {
        let mut result = PhaseResult::new(Phase::UpdateSiteAddress);

        let devices = match self.plane.list_devices(network_id).await {
            Ok(devices) => devices,
            Err(e) => {
                result.fail(format!("failed to list devices: {e}"));
                return result;
            }
        };

        info!(address, "updating device addresses");
        for device in &devices {
            match self
                .plane
                .update_device(
                    &device.serial,
                    DeviceUpdate {
                        name: None,
                        address: Some(address.to_owned()),
                    },
                )
                .await
            {
                Ok(()) => result.affected += 1,
                Err(e) => result.fail(format!(
                    "address update failed for {}: {e}",
                    device.display_name()
                )),
            }
        }

        result
    }

    // ── Phase 10: ensure switch fixed IP assignments ─────────────────

    async fn ensure_switch_assignments(
        &self,
        network_id: &str,
        switch_names: &[String],
    ) -> PhaseResult {
        let mut result = PhaseResult::new(Phase::EnsureSwitchAssignments);

        let devices = match self.plane.list_devices(network_id).await {
            Ok(devices) => devices,
            Err(e) => {
                result.fail(format!("failed to list devices: {e}"));
                return result;
            }
        };
        let switches: Vec<_> = devices
            .into_iter()
            .filter(|d| d.model_matches(&self.rules.preserved_prefixes))
            .collect();
        if switches.is_empty() {
            debug!("no switches in network");
            return result;
        }

        let vlan = match self.plane.get_vlan(network_id, MGMT_VLAN_ID).await {
            Ok(vlan) => vlan,
            Err(e) => {
                result.fail(format!("failed to read VLAN {MGMT_VLAN_ID}: {e}"));
                return result;
            }
        };

        // Never guess a subnet: without a resolvable base the whole
        // sub-step is skipped.
        let Some(base) = resolve_subnet_base(&vlan) else {
            result.fail("cannot determine subnet base; skipping switch IP assignments".to_owned());
            return result;
        };
        debug!(%base, "resolved subnet base");

        let identities = map_switch_identities(&switches, switch_names, base);
        if identities.is_empty() {
            debug!("no switch identity changes required");
            return result;
        }

        let mut assignments = vlan.fixed_ip_assignments;
        for identity in &identities {
            assignments.insert(
                identity.mac.clone(),
                FixedIpAssignment {
                    ip: identity.ip.to_string(),
                    name: Some(identity.name.clone()),
                },
            );
            if let Err(e) = self
                .plane
                .update_device(
                    &identity.serial,
                    DeviceUpdate {
                        name: Some(identity.name.clone()),
                        address: None,
                    },
                )
                .await
            {
                result.fail(format!(
                    "switch rename failed for {}: {e}",
                    identity.serial
                ));
            }
            info!(
                name = identity.name,
                ip = %identity.ip,
                mac = %identity.mac,
                "updated switch assignment"
            );
        }

        if let Err(e) = self
            .plane
            .update_vlan(network_id, MGMT_VLAN_ID, VlanUpdate::assignments(assignments))
            .await
        {
            result.fail(format!("failed to write switch assignments: {e}"));
            return result;
        }

        result.affected = identities.len();
        result
    }

    // ── Phase 11: create access point fixed IP assignments ───────────

    async fn create_ap_assignments(&self, network_id: &str, plan: &RefreshPlan) -> PhaseResult {
        let mut result = PhaseResult::new(Phase::CreateApAssignments);

        let vlan = match self.plane.get_vlan(network_id, MGMT_VLAN_ID).await {
            Ok(vlan) => vlan,
            Err(e) => {
                result.fail(format!("failed to read VLAN {MGMT_VLAN_ID}: {e}"));
                return result;
            }
        };
        let macs_by_serial: HashMap<String, MacAddress> =
            match self.plane.list_devices(network_id).await {
                Ok(devices) => devices
                    .into_iter()
                    .filter_map(|d| d.mac.map(|mac| (d.serial, mac)))
                    .collect(),
                Err(e) => {
                    result.fail(format!("failed to list devices: {e}"));
                    return result;
                }
            };

        let mut assignments = vlan.fixed_ip_assignments;
        for (i, ap) in plan.ap_assignments.iter().enumerate() {
            let Some(mac) = macs_by_serial.get(&ap.serial) else {
                result.fail(format!(
                    "no MAC known for {}; device not visible in network",
                    ap.serial
                ));
                continue;
            };
            let name = ap.name.clone().unwrap_or_else(|| format!("AP{}", i + 1));
            info!(name, ip = ap.ip, mac = %mac, "adding access point assignment");
            assignments.insert(
                mac.clone(),
                FixedIpAssignment {
                    ip: ap.ip.clone(),
                    name: Some(name),
                },
            );
            result.affected += 1;
        }

        if result.affected > 0 {
            if let Err(e) = self
                .plane
                .update_vlan(network_id, MGMT_VLAN_ID, VlanUpdate::assignments(assignments))
                .await
            {
                result.fail(format!("failed to write access point assignments: {e}"));
                result.affected = 0;
            }
        }

        result
    }
}

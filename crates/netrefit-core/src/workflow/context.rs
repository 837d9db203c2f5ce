// ── Per-run workflow context ──
//
// All run-scoped mutable state lives here and is threaded through phase
// calls explicitly. Nothing about a run survives outside the
// WorkflowResult it produces.

use std::collections::HashSet;

use crate::model::{AddedDevice, PhaseResult, WorkflowResult};
use crate::preserve::StaticWanConfig;

#[derive(Debug)]
pub struct WorkflowContext {
    network_id: String,
    /// Serials claimed by THIS run. Guards retirement and scopes the
    /// WAN-conversion and replay phases to new hardware.
    added_serials: HashSet<String>,
    phases: Vec<PhaseResult>,
    added_devices: Vec<AddedDevice>,
    static_wan: Option<StaticWanConfig>,
}

impl WorkflowContext {
    pub fn new(network_id: impl Into<String>) -> Self {
        Self {
            network_id: network_id.into(),
            added_serials: HashSet::new(),
            phases: Vec::new(),
            added_devices: Vec::new(),
            static_wan: None,
        }
    }

    pub fn network_id(&self) -> &str {
        &self.network_id
    }

    /// Record a finished phase.
    pub fn record(&mut self, result: PhaseResult) {
        self.phases.push(result);
    }

    pub fn mark_added(&mut self, serial: impl Into<String>) {
        self.added_serials.insert(serial.into());
    }

    pub fn was_added(&self, serial: &str) -> bool {
        self.added_serials.contains(serial)
    }

    pub fn added_serials(&self) -> &HashSet<String> {
        &self.added_serials
    }

    pub fn report_added(&mut self, device: AddedDevice) {
        self.added_devices.push(device);
    }

    /// Attach a preserved-IP note to an added device's report entry.
    pub fn note_added(&mut self, serial: &str, note: impl Into<String>) {
        if let Some(entry) = self.added_devices.iter_mut().find(|d| d.serial == serial) {
            entry.preserved_ip_note = Some(note.into());
        }
    }

    /// Backfill an added device's category once its inventory record is
    /// visible (claims are not readable until the control plane settles).
    pub fn set_added_category(&mut self, serial: &str, category: crate::model::DeviceCategory) {
        if let Some(entry) = self.added_devices.iter_mut().find(|d| d.serial == serial) {
            entry.category = category;
        }
    }

    pub fn set_static_wan(&mut self, config: StaticWanConfig) {
        // First capture wins: a single replacement target is assumed.
        if self.static_wan.is_none() {
            self.static_wan = Some(config);
        }
    }

    pub fn static_wan(&self) -> Option<&StaticWanConfig> {
        self.static_wan.as_ref()
    }

    /// Freeze into the immutable result. Phase errors are flattened into
    /// the aggregate list in phase order.
    pub fn finish(self) -> WorkflowResult {
        let errors = self
            .phases
            .iter()
            .flat_map(|p| p.errors.iter().cloned())
            .collect();
        WorkflowResult {
            network_id: self.network_id,
            errors,
            static_wan_captured: self.static_wan.is_some(),
            phases: self.phases,
            added_devices: self.added_devices,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeviceCategory, Phase};

    #[test]
    fn first_static_wan_capture_wins() {
        let mut ctx = WorkflowContext::new("N_1");
        let first = StaticWanConfig {
            ip: "198.51.100.10".into(),
            subnet_mask: None,
            gateway: None,
            dns: vec![],
            vlan: None,
            source_category: DeviceCategory::Appliance,
        };
        let second = StaticWanConfig {
            ip: "198.51.100.99".into(),
            ..first.clone()
        };

        ctx.set_static_wan(first);
        ctx.set_static_wan(second);

        assert_eq!(ctx.static_wan().map(|c| c.ip.as_str()), Some("198.51.100.10"));
    }

    #[test]
    fn finish_flattens_phase_errors_in_order() {
        let mut ctx = WorkflowContext::new("N_1");
        let mut a = PhaseResult::new(Phase::RetireDevices);
        a.fail("one");
        let mut b = PhaseResult::new(Phase::AddDevices);
        b.fail("two");
        b.fail("three");
        ctx.record(a);
        ctx.record(b);

        let result = ctx.finish();
        assert_eq!(result.errors, vec!["one", "two", "three"]);
        assert!(!result.static_wan_captured);
    }
}

// ── Run result types ──
//
// Every workflow returns a WorkflowResult: per-phase counts plus a flat,
// verbatim error list. Per-item failures never abort a run; they land
// here. The reporting layer turns this into the persisted run summary.

use serde::Serialize;
use strum::Display;

use super::device::DeviceCategory;

/// The fixed set of workflow phases, in no particular order here --
/// ordering is owned by the engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "kebab-case")]
pub enum Phase {
    // Device refresh
    ClearAssignments,
    RemoveReservedRanges,
    CaptureStaticWan,
    RetireDevices,
    AddDevices,
    ConvertWanPort,
    ReplayStaticWan,
    RenameSensors,
    UpdateSiteAddress,
    EnsureSwitchAssignments,
    CreateApAssignments,
    // Template migration
    SnapshotVlans,
    UnbindNetwork,
    BindNetwork,
    RestoreVlans,
    // Staging
    DistributeBatch,
    RemoveStaged,
}

/// Outcome of a single phase: how many items it affected and which
/// per-item operations failed.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseResult {
    pub phase: Phase,
    pub affected: usize,
    pub errors: Vec<String>,
}

impl PhaseResult {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            affected: 0,
            errors: Vec::new(),
        }
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }
}

/// Detail of one device added during a refresh, for the run summary.
#[derive(Debug, Clone, Serialize)]
pub struct AddedDevice {
    pub serial: String,
    pub name: String,
    pub category: DeviceCategory,
    /// Set when a preserved static WAN configuration was replayed onto it.
    pub preserved_ip_note: Option<String>,
}

/// Aggregate outcome of a workflow run. Immutable once returned.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowResult {
    pub network_id: String,
    /// Phase results in execution order.
    pub phases: Vec<PhaseResult>,
    /// Every per-item error from every phase, verbatim, in order.
    pub errors: Vec<String>,
    /// Devices added this run.
    pub added_devices: Vec<AddedDevice>,
    /// Whether a static WAN configuration was captured for replay.
    pub static_wan_captured: bool,
}

impl WorkflowResult {
    /// The affected count for a phase, if it ran.
    pub fn affected(&self, phase: Phase) -> Option<usize> {
        self.phases.iter().find(|p| p.phase == phase).map(|p| p.affected)
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

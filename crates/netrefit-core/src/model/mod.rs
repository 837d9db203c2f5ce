// ── Domain model ──
//
// Canonical representations of the entities a workflow run touches.
// The api crate's wire models are converted into these on read
// (see `crate::controlplane`); nothing here is held past one run.

pub mod device;
pub mod mac;
pub mod plan;
pub mod report;
pub mod vlan;

// ── Re-exports ──────────────────────────────────────────────────────

pub use mac::MacAddress;

pub use device::{DeviceCategory, DeviceRecord};

pub use vlan::{FixedIpAssignment, ReservedRange, VlanConfig};

pub use plan::{ApAssignment, DeviceIntent, MigrationPlan, RefreshPlan, SiteAddress};

pub use report::{AddedDevice, Phase, PhaseResult, WorkflowResult};

// ── Plan types ──
//
// A RefreshPlan is assembled by the caller (the CLI reads it from a JSON
// plan document) and describes intent only; the engine resolves it against
// live control-plane state. A MigrationPlan is built internally by the
// migration workflow after it snapshots the source network.

use serde::{Deserialize, Serialize};

use super::vlan::VlanConfig;

/// One device-change intent within a refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum DeviceIntent {
    /// Claim a new device into the network and name it.
    Add { serial: String, name: String },
    /// Rename a device already present (sensors kept across the refresh).
    RenameExisting { name: String },
}

/// Street address applied to every device in the network. Only applied
/// when all three components are present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteAddress {
    pub street: String,
    pub city: String,
    pub state: String,
}

impl SiteAddress {
    /// The single-line form the control plane expects, or `None` when any
    /// component is blank.
    pub fn formatted(&self) -> Option<String> {
        if self.street.trim().is_empty()
            || self.city.trim().is_empty()
            || self.state.trim().is_empty()
        {
            return None;
        }
        Some(format!("{}, {}, {}", self.street, self.city, self.state))
    }
}

/// A fixed-IP assignment to create for a newly added access point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApAssignment {
    pub serial: String,
    pub ip: String,
    /// Display name; defaults to `AP{n}` by position when absent.
    pub name: Option<String>,
}

/// Everything a device-refresh run needs to know up front.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshPlan {
    /// Ordered device-change intents.
    pub devices: Vec<DeviceIntent>,
    /// Site address for every device, if known.
    pub address: Option<SiteAddress>,
    /// Target switch names, in ordinal order when role markers are absent.
    #[serde(default)]
    pub switch_names: Vec<String>,
    /// Fixed-IP assignments to create for new access points.
    #[serde(default)]
    pub ap_assignments: Vec<ApAssignment>,
}

impl RefreshPlan {
    /// The add-new intents, in plan order.
    pub fn additions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.devices.iter().filter_map(|d| match d {
            DeviceIntent::Add { serial, name } => Some((serial.as_str(), name.as_str())),
            DeviceIntent::RenameExisting { .. } => None,
        })
    }

    /// The first rename-existing intent's target name, if any.
    pub fn rename_target(&self) -> Option<&str> {
        self.devices.iter().find_map(|d| match d {
            DeviceIntent::RenameExisting { name } => Some(name.as_str()),
            DeviceIntent::Add { .. } => None,
        })
    }
}

/// A template migration, captured before any mutation happens.
#[derive(Debug, Clone)]
pub struct MigrationPlan {
    pub network_id: String,
    pub template_id: String,
    /// Source VLANs of interest, snapshotted pre-unbind.
    pub vlan_snapshot: Vec<VlanConfig>,
}

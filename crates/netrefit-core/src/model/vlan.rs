// ── VLAN domain types ──

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::mac::MacAddress;

/// The VLAN that carries management addressing and DHCP reservations on a
/// site network. All assignment-table work happens here.
pub const MGMT_VLAN_ID: u16 = 1;

/// The VLAN whose address range gets absorbed into VLAN 1 when a target
/// template no longer defines it.
pub const ABSORBED_VLAN_ID: u16 = 4;

/// A DHCP reservation: MAC bound to a fixed IP and display name. Keys of
/// the enclosing table are MACs, unique per VLAN by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedIpAssignment {
    pub ip: String,
    pub name: Option<String>,
}

/// A reserved DHCP range with its free-form comment tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservedRange {
    pub start: String,
    pub end: String,
    pub comment: Option<String>,
}

impl ReservedRange {
    /// True if the comment equals `tag`, ignoring case.
    pub fn tagged(&self, tag: &str) -> bool {
        self.comment
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(tag))
    }
}

/// One appliance VLAN: subnet, gateway IP, and the reservation state that
/// refresh and migration runs preserve across mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlanConfig {
    pub id: u16,
    pub name: Option<String>,
    /// CIDR subnet as the control plane carries it (e.g. `10.1.1.0/27`).
    pub subnet: Option<String>,
    pub appliance_ip: Option<String>,
    pub group_policy_id: Option<String>,
    pub fixed_ip_assignments: BTreeMap<MacAddress, FixedIpAssignment>,
    pub reserved_ranges: Vec<ReservedRange>,
}

impl VlanConfig {
    /// An empty VLAN shell, useful in tests.
    pub fn empty(id: u16) -> Self {
        Self {
            id,
            name: None,
            subnet: None,
            appliance_ip: None,
            group_policy_id: None,
            fixed_ip_assignments: BTreeMap::new(),
            reserved_ranges: Vec::new(),
        }
    }
}

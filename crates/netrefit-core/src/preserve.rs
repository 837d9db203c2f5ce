// ── Configuration preservation ──
//
// Decouples "what must survive a mutation" from "how the mutation is
// performed". Two concerns live here: static WAN capture/replay across a
// device-generation swap, and the keep/drop decision when clearing a
// VLAN's fixed-IP assignment table.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::controlplane::{ManagementPorts, WanLink};
use crate::model::{DeviceCategory, FixedIpAssignment, MacAddress};

/// A static WAN uplink configuration lifted off a device before it is
/// retired, replayed verbatim onto its replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticWanConfig {
    pub ip: String,
    pub subnet_mask: Option<String>,
    pub gateway: Option<String>,
    pub dns: Vec<String>,
    pub vlan: Option<u16>,
    /// Category of the device it was captured from; replay targets must
    /// match it.
    pub source_category: DeviceCategory,
}

impl StaticWanConfig {
    /// Extract a static configuration from a WAN uplink, if the device is
    /// actually using one. Unset fields stay unset.
    pub fn from_wan(wan: &WanLink, source_category: DeviceCategory) -> Option<Self> {
        if wan.using_static_ip != Some(true) {
            return None;
        }
        let ip = wan.static_ip.clone()?;
        Some(Self {
            ip,
            subnet_mask: wan.subnet_mask.clone(),
            gateway: wan.gateway.clone(),
            dns: wan.dns.clone(),
            vlan: wan.vlan,
            source_category,
        })
    }

    /// The management-interface patch that applies this configuration to a
    /// replacement device's first WAN uplink.
    pub fn to_wan1_patch(&self) -> ManagementPorts {
        ManagementPorts {
            wan1: Some(WanLink {
                enabled: None,
                using_static_ip: Some(true),
                static_ip: Some(self.ip.clone()),
                subnet_mask: self.subnet_mask.clone(),
                gateway: self.gateway.clone(),
                dns: self.dns.clone(),
                vlan: self.vlan,
            }),
            wan2: None,
        }
    }
}

/// Outcome of filtering an assignment table: what survives and how many
/// entries were dropped.
#[derive(Debug)]
pub struct FilteredAssignments {
    pub retained: BTreeMap<MacAddress, FixedIpAssignment>,
    pub removed: usize,
}

/// Decide which fixed-IP assignments survive a clear.
///
/// An entry is retained iff its MAC belongs to a currently inventoried
/// preserved device, or its recorded name is on the legacy preserve list.
pub fn filter_assignments(
    assignments: &BTreeMap<MacAddress, FixedIpAssignment>,
    preserved_macs: &HashSet<MacAddress>,
    preserve_names: &[String],
) -> FilteredAssignments {
    let original = assignments.len();
    let retained: BTreeMap<MacAddress, FixedIpAssignment> = assignments
        .iter()
        .filter(|(mac, entry)| {
            preserved_macs.contains(mac)
                || entry
                    .name
                    .as_deref()
                    .is_some_and(|n| preserve_names.iter().any(|p| p == n.trim()))
        })
        .map(|(mac, entry)| (mac.clone(), entry.clone()))
        .collect();

    FilteredAssignments {
        removed: original - retained.len(),
        retained,
    }
}

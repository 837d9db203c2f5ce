// ── Control-plane port ──
//
// The workflow engines speak to the dashboard exclusively through this
// trait: blocking one-call-at-a-time semantics, eventual consistency on
// the far side, no retries. `DashboardClient` is the production
// implementation; tests substitute an in-memory plane.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::CoreError;
use crate::model::{DeviceRecord, FixedIpAssignment, MacAddress, ReservedRange, VlanConfig};

// ── Request / read types ────────────────────────────────────────────

/// Partial device update. Unset fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct DeviceUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
}

/// Partial VLAN update. `fixed_ip_assignments` and `reserved_ranges`
/// replace the whole table when present.
#[derive(Debug, Clone, Default)]
pub struct VlanUpdate {
    pub name: Option<String>,
    pub subnet: Option<String>,
    pub appliance_ip: Option<String>,
    pub group_policy_id: Option<String>,
    pub fixed_ip_assignments: Option<BTreeMap<MacAddress, FixedIpAssignment>>,
    pub reserved_ranges: Option<Vec<ReservedRange>>,
}

impl VlanUpdate {
    /// An update that replaces only the fixed-IP assignment table.
    pub fn assignments(table: BTreeMap<MacAddress, FixedIpAssignment>) -> Self {
        Self {
            fixed_ip_assignments: Some(table),
            ..Self::default()
        }
    }

    /// An update that replaces only the reserved ranges.
    pub fn ranges(ranges: Vec<ReservedRange>) -> Self {
        Self {
            reserved_ranges: Some(ranges),
            ..Self::default()
        }
    }
}

/// One WAN uplink's settings, both as read and as patch (unset fields are
/// omitted on write).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WanLink {
    pub enabled: Option<String>,
    pub using_static_ip: Option<bool>,
    pub static_ip: Option<String>,
    pub subnet_mask: Option<String>,
    pub gateway: Option<String>,
    pub dns: Vec<String>,
    pub vlan: Option<u16>,
}

impl WanLink {
    pub fn is_enabled(&self) -> bool {
        self.enabled.as_deref() == Some("enabled")
    }
}

/// A device's management interface: up to two WAN uplinks.
#[derive(Debug, Clone, Default)]
pub struct ManagementPorts {
    pub wan1: Option<WanLink>,
    pub wan2: Option<WanLink>,
}

impl ManagementPorts {
    /// A patch that enables WAN on the second uplink and nothing else.
    pub fn enable_wan2() -> Self {
        Self {
            wan1: None,
            wan2: Some(WanLink {
                enabled: Some("enabled".into()),
                ..WanLink::default()
            }),
        }
    }
}

// ── The port itself ─────────────────────────────────────────────────

/// Minimum control-plane surface the workflows require.
///
/// Writes are eventually consistent: a mutation may not be visible to the
/// next read. Callers insert settle delays where that matters.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    async fn list_devices(&self, network_id: &str) -> Result<Vec<DeviceRecord>, CoreError>;

    async fn list_org_devices(&self, org_id: &str) -> Result<Vec<DeviceRecord>, CoreError>;

    async fn claim_device(&self, network_id: &str, serial: &str) -> Result<(), CoreError>;

    async fn remove_device(&self, network_id: &str, serial: &str) -> Result<(), CoreError>;

    async fn update_device(&self, serial: &str, update: DeviceUpdate) -> Result<(), CoreError>;

    async fn get_vlan(&self, network_id: &str, vlan_id: u16) -> Result<VlanConfig, CoreError>;

    async fn update_vlan(
        &self,
        network_id: &str,
        vlan_id: u16,
        update: VlanUpdate,
    ) -> Result<(), CoreError>;

    async fn get_management_ports(&self, serial: &str) -> Result<ManagementPorts, CoreError>;

    async fn update_management_ports(
        &self,
        serial: &str,
        update: ManagementPorts,
    ) -> Result<(), CoreError>;

    async fn unbind_network(&self, network_id: &str, retain_configs: bool)
    -> Result<(), CoreError>;

    async fn bind_network(&self, network_id: &str, template_id: &str) -> Result<(), CoreError>;
}

// ── Wire conversions ────────────────────────────────────────────────

fn device_from_wire(d: netrefit_api::models::Device) -> DeviceRecord {
    DeviceRecord {
        serial: d.serial,
        model: d.model.unwrap_or_default(),
        mac: d.mac.map(MacAddress::new),
        name: d.name,
        network_id: d.network_id,
        address: d.address,
    }
}

fn vlan_from_wire(v: netrefit_api::models::ApplianceVlan) -> VlanConfig {
    VlanConfig {
        id: v.id,
        name: v.name,
        subnet: v.subnet,
        appliance_ip: v.appliance_ip,
        group_policy_id: v.group_policy_id,
        fixed_ip_assignments: v
            .fixed_ip_assignments
            .into_iter()
            .map(|(mac, a)| {
                (
                    MacAddress::new(mac),
                    FixedIpAssignment {
                        ip: a.ip,
                        name: a.name,
                    },
                )
            })
            .collect(),
        reserved_ranges: v
            .reserved_ip_ranges
            .into_iter()
            .map(|r| ReservedRange {
                start: r.start,
                end: r.end,
                comment: r.comment,
            })
            .collect(),
    }
}

fn vlan_update_to_wire(u: VlanUpdate) -> netrefit_api::models::VlanUpdate {
    netrefit_api::models::VlanUpdate {
        name: u.name,
        subnet: u.subnet,
        appliance_ip: u.appliance_ip,
        group_policy_id: u.group_policy_id,
        fixed_ip_assignments: u.fixed_ip_assignments.map(|table| {
            table
                .into_iter()
                .map(|(mac, a)| {
                    (
                        mac.as_str().to_owned(),
                        netrefit_api::models::FixedAssignment {
                            ip: a.ip,
                            name: a.name,
                        },
                    )
                })
                .collect()
        }),
        reserved_ip_ranges: u.reserved_ranges.map(|ranges| {
            ranges
                .into_iter()
                .map(|r| netrefit_api::models::ReservedIpRange {
                    start: r.start,
                    end: r.end,
                    comment: r.comment,
                })
                .collect()
        }),
    }
}

fn wan_from_wire(w: netrefit_api::models::WanInterface) -> WanLink {
    WanLink {
        enabled: w.wan_enabled,
        using_static_ip: w.using_static_ip,
        static_ip: w.static_ip,
        subnet_mask: w.static_subnet_mask,
        gateway: w.static_gateway_ip,
        dns: w.static_dns.unwrap_or_default(),
        vlan: w.vlan,
    }
}

fn wan_to_wire(w: WanLink) -> netrefit_api::models::WanInterface {
    netrefit_api::models::WanInterface {
        wan_enabled: w.enabled,
        using_static_ip: w.using_static_ip,
        static_ip: w.static_ip,
        static_subnet_mask: w.subnet_mask,
        static_gateway_ip: w.gateway,
        static_dns: if w.dns.is_empty() { None } else { Some(w.dns) },
        vlan: w.vlan,
    }
}

// ── Production implementation ───────────────────────────────────────

#[async_trait]
impl ControlPlane for netrefit_api::DashboardClient {
    async fn list_devices(&self, network_id: &str) -> Result<Vec<DeviceRecord>, CoreError> {
        let devices = self.list_network_devices(network_id).await?;
        Ok(devices.into_iter().map(device_from_wire).collect())
    }

    async fn list_org_devices(&self, org_id: &str) -> Result<Vec<DeviceRecord>, CoreError> {
        let devices = netrefit_api::DashboardClient::list_org_devices(self, org_id).await?;
        Ok(devices.into_iter().map(device_from_wire).collect())
    }

    async fn claim_device(&self, network_id: &str, serial: &str) -> Result<(), CoreError> {
        netrefit_api::DashboardClient::claim_device(self, network_id, serial).await?;
        Ok(())
    }

    async fn remove_device(&self, network_id: &str, serial: &str) -> Result<(), CoreError> {
        netrefit_api::DashboardClient::remove_device(self, network_id, serial).await?;
        Ok(())
    }

    async fn update_device(&self, serial: &str, update: DeviceUpdate) -> Result<(), CoreError> {
        let wire = netrefit_api::models::DeviceUpdate {
            name: update.name,
            address: update.address,
        };
        netrefit_api::DashboardClient::update_device(self, serial, &wire).await?;
        Ok(())
    }

    async fn get_vlan(&self, network_id: &str, vlan_id: u16) -> Result<VlanConfig, CoreError> {
        let vlan = netrefit_api::DashboardClient::get_vlan(self, network_id, vlan_id).await?;
        Ok(vlan_from_wire(vlan))
    }

    async fn update_vlan(
        &self,
        network_id: &str,
        vlan_id: u16,
        update: VlanUpdate,
    ) -> Result<(), CoreError> {
        let wire = vlan_update_to_wire(update);
        netrefit_api::DashboardClient::update_vlan(self, network_id, vlan_id, &wire).await?;
        Ok(())
    }

    async fn get_management_ports(&self, serial: &str) -> Result<ManagementPorts, CoreError> {
        let mgmt = self.get_management_interface(serial).await?;
        Ok(ManagementPorts {
            wan1: mgmt.wan1.map(wan_from_wire),
            wan2: mgmt.wan2.map(wan_from_wire),
        })
    }

    async fn update_management_ports(
        &self,
        serial: &str,
        update: ManagementPorts,
    ) -> Result<(), CoreError> {
        let wire = netrefit_api::models::ManagementInterface {
            wan1: update.wan1.map(wan_to_wire),
            wan2: update.wan2.map(wan_to_wire),
        };
        self.update_management_interface(serial, &wire).await?;
        Ok(())
    }

    async fn unbind_network(
        &self,
        network_id: &str,
        retain_configs: bool,
    ) -> Result<(), CoreError> {
        netrefit_api::DashboardClient::unbind_network(self, network_id, retain_configs).await?;
        Ok(())
    }

    async fn bind_network(&self, network_id: &str, template_id: &str) -> Result<(), CoreError> {
        netrefit_api::DashboardClient::bind_network(self, network_id, template_id).await?;
        Ok(())
    }
}

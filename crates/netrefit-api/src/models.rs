// Wire models for the dashboard REST API.
//
// These mirror the JSON the dashboard emits (camelCase field names) and are
// deliberately loose: almost everything is optional because the dashboard
// omits unset fields rather than sending nulls. `netrefit-core` converts
// these into its stricter domain types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ── Devices ─────────────────────────────────────────────────────────

/// A device as returned by the inventory endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub serial: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub network_id: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Partial update for a device. Unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

// ── Appliance VLANs ─────────────────────────────────────────────────

/// A fixed IP assignment entry (DHCP reservation), keyed by MAC in the
/// enclosing VLAN's assignment table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedAssignment {
    pub ip: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A reserved DHCP range with its free-form comment tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservedIpRange {
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub comment: Option<String>,
}

/// An appliance VLAN as returned by `GET .../appliance/vlans/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplianceVlan {
    pub id: u16,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub subnet: Option<String>,
    #[serde(default)]
    pub appliance_ip: Option<String>,
    #[serde(default)]
    pub group_policy_id: Option<String>,
    #[serde(default)]
    pub fixed_ip_assignments: BTreeMap<String, FixedAssignment>,
    #[serde(default)]
    pub reserved_ip_ranges: Vec<ReservedIpRange>,
}

/// Partial update for an appliance VLAN. `fixed_ip_assignments` and
/// `reserved_ip_ranges` replace the whole table/list when present.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VlanUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appliance_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_policy_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_ip_assignments: Option<BTreeMap<String, FixedAssignment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reserved_ip_ranges: Option<Vec<ReservedIpRange>>,
}

// ── Management interface ────────────────────────────────────────────

/// WAN uplink configuration on a device's management interface.
///
/// The same shape is used for reads and writes; on write, unset fields are
/// omitted so the dashboard leaves them alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WanInterface {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wan_enabled: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub using_static_ip: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_subnet_mask: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_gateway_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_dns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlan: Option<u16>,
}

/// A device's management interface: up to two WAN uplinks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagementInterface {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wan1: Option<WanInterface>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wan2: Option<WanInterface>,
}

// ── Request bodies ──────────────────────────────────────────────────

/// Body for `POST /networks/{id}/devices/claim`.
#[derive(Debug, Serialize)]
pub struct ClaimRequest {
    pub serials: Vec<String>,
}

/// Body for `POST /networks/{id}/unbind`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnbindRequest {
    pub retain_configs: bool,
}

/// Body for `POST /networks/{id}/bind`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BindRequest {
    pub config_template_id: String,
}

// ── Error envelope ──────────────────────────────────────────────────

/// The dashboard's error body: `{ "errors": ["..."] }`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    #[serde(default)]
    pub errors: Vec<String>,
}

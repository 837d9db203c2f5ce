// In-memory control plane for workflow tests.
//
// Mutations apply immediately (tests run with NoWait), every mutating
// call is journaled so tests can assert on exact call sequences, and
// individual operations can be primed to fail.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use netrefit_core::{
    ControlPlane, CoreError, DeviceRecord, DeviceUpdate, FixedIpAssignment, MacAddress,
    ManagementPorts, VlanConfig, VlanUpdate,
};

/// One journaled mutating call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Claim { network: String, serial: String },
    Remove { network: String, serial: String },
    UpdateDevice { serial: String },
    UpdateVlan { network: String, vlan: u16 },
    UpdateMgmt { serial: String },
    Unbind { network: String },
    Bind { network: String, template: String },
}

#[derive(Default)]
pub struct State {
    /// network id -> devices currently in it.
    pub networks: HashMap<String, Vec<DeviceRecord>>,
    /// Unclaimed inventory, by serial. Claims pull records from here.
    pub inventory: HashMap<String, DeviceRecord>,
    /// (network id, vlan id) -> VLAN.
    pub vlans: HashMap<(String, u16), VlanConfig>,
    /// serial -> management ports.
    pub mgmt: HashMap<String, ManagementPorts>,
    /// Networks whose device listing fails.
    pub fail_lists: HashSet<String>,
    /// Serials whose claim calls fail.
    pub fail_claims: HashSet<String>,
    /// Serials whose remove calls fail, with the error message.
    pub fail_removes: HashMap<String, String>,
    pub fail_unbind: bool,
    pub fail_bind: bool,
    pub calls: Vec<Call>,
}

pub struct MockPlane {
    pub state: Mutex<State>,
}

impl MockPlane {
    pub fn new(state: State) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn mutating_call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    pub fn vlan(&self, network: &str, vlan: u16) -> VlanConfig {
        self.state.lock().unwrap().vlans[&(network.to_owned(), vlan)].clone()
    }

    pub fn network_serials(&self, network: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .networks
            .get(network)
            .map(|devices| devices.iter().map(|d| d.serial.clone()).collect())
            .unwrap_or_default()
    }
}

pub fn device(serial: &str, model: &str, mac: &str, name: Option<&str>) -> DeviceRecord {
    DeviceRecord {
        serial: serial.into(),
        model: model.into(),
        mac: Some(MacAddress::new(mac)),
        name: name.map(Into::into),
        network_id: None,
        address: None,
    }
}

pub fn assignment(ip: &str, name: Option<&str>) -> FixedIpAssignment {
    FixedIpAssignment {
        ip: ip.into(),
        name: name.map(Into::into),
    }
}

fn api_error(message: impl Into<String>) -> CoreError {
    CoreError::Api {
        message: message.into(),
        status: Some(400),
    }
}

#[async_trait]
impl ControlPlane for MockPlane {
    async fn list_devices(&self, network_id: &str) -> Result<Vec<DeviceRecord>, CoreError> {
        let state = self.state.lock().unwrap();
        if state.fail_lists.contains(network_id) {
            return Err(api_error(format!("cannot list {network_id}")));
        }
        Ok(state.networks.get(network_id).cloned().unwrap_or_default())
    }

    async fn list_org_devices(&self, _org_id: &str) -> Result<Vec<DeviceRecord>, CoreError> {
        let state = self.state.lock().unwrap();
        let mut all: Vec<_> = state.inventory.values().cloned().collect();
        for devices in state.networks.values() {
            all.extend(devices.iter().cloned());
        }
        Ok(all)
    }

    async fn claim_device(&self, network_id: &str, serial: &str) -> Result<(), CoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Claim {
            network: network_id.to_owned(),
            serial: serial.to_owned(),
        });
        if state.fail_claims.contains(serial) {
            return Err(api_error(format!("cannot claim {serial}")));
        }
        let record = state
            .inventory
            .remove(serial)
            .unwrap_or_else(|| device(serial, "", "00:00:00:00:00:00", None));
        state
            .networks
            .entry(network_id.to_owned())
            .or_default()
            .push(record);
        Ok(())
    }

    async fn remove_device(&self, network_id: &str, serial: &str) -> Result<(), CoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Remove {
            network: network_id.to_owned(),
            serial: serial.to_owned(),
        });
        if let Some(message) = state.fail_removes.get(serial) {
            let message = message.clone();
            return Err(api_error(message));
        }
        if let Some(devices) = state.networks.get_mut(network_id) {
            devices.retain(|d| d.serial != serial);
        }
        Ok(())
    }

    async fn update_device(&self, serial: &str, update: DeviceUpdate) -> Result<(), CoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::UpdateDevice {
            serial: serial.to_owned(),
        });
        for devices in state.networks.values_mut() {
            for d in devices.iter_mut().filter(|d| d.serial == serial) {
                if let Some(name) = &update.name {
                    d.name = Some(name.clone());
                }
                if let Some(address) = &update.address {
                    d.address = Some(address.clone());
                }
            }
        }
        Ok(())
    }

    async fn get_vlan(&self, network_id: &str, vlan_id: u16) -> Result<VlanConfig, CoreError> {
        let state = self.state.lock().unwrap();
        state
            .vlans
            .get(&(network_id.to_owned(), vlan_id))
            .cloned()
            .ok_or_else(|| CoreError::NotFound {
                entity: "VLAN".into(),
                identifier: format!("{network_id}/{vlan_id}"),
            })
    }

    async fn update_vlan(
        &self,
        network_id: &str,
        vlan_id: u16,
        update: VlanUpdate,
    ) -> Result<(), CoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::UpdateVlan {
            network: network_id.to_owned(),
            vlan: vlan_id,
        });
        let key = (network_id.to_owned(), vlan_id);
        let vlan = state.vlans.entry(key).or_insert_with(|| VlanConfig {
            id: vlan_id,
            name: None,
            subnet: None,
            appliance_ip: None,
            group_policy_id: None,
            fixed_ip_assignments: BTreeMap::new(),
            reserved_ranges: Vec::new(),
        });
        if let Some(name) = update.name {
            vlan.name = Some(name);
        }
        if let Some(subnet) = update.subnet {
            vlan.subnet = Some(subnet);
        }
        if let Some(ip) = update.appliance_ip {
            vlan.appliance_ip = Some(ip);
        }
        if let Some(gp) = update.group_policy_id {
            vlan.group_policy_id = Some(gp);
        }
        if let Some(table) = update.fixed_ip_assignments {
            vlan.fixed_ip_assignments = table;
        }
        if let Some(ranges) = update.reserved_ranges {
            vlan.reserved_ranges = ranges;
        }
        Ok(())
    }

    async fn get_management_ports(&self, serial: &str) -> Result<ManagementPorts, CoreError> {
        let state = self.state.lock().unwrap();
        state
            .mgmt
            .get(serial)
            .map(|m| ManagementPorts {
                wan1: m.wan1.clone(),
                wan2: m.wan2.clone(),
            })
            .ok_or_else(|| CoreError::NotFound {
                entity: "device".into(),
                identifier: serial.to_owned(),
            })
    }

    async fn update_management_ports(
        &self,
        serial: &str,
        update: ManagementPorts,
    ) -> Result<(), CoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::UpdateMgmt {
            serial: serial.to_owned(),
        });
        let entry = state.mgmt.entry(serial.to_owned()).or_default();
        if let Some(wan1) = update.wan1 {
            entry.wan1 = Some(wan1);
        }
        if let Some(wan2) = update.wan2 {
            entry.wan2 = Some(wan2);
        }
        Ok(())
    }

    async fn unbind_network(
        &self,
        network_id: &str,
        _retain_configs: bool,
    ) -> Result<(), CoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Unbind {
            network: network_id.to_owned(),
        });
        if state.fail_unbind {
            return Err(api_error("unbind rejected"));
        }
        Ok(())
    }

    async fn bind_network(&self, network_id: &str, template_id: &str) -> Result<(), CoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Bind {
            network: network_id.to_owned(),
            template: template_id.to_owned(),
        });
        if state.fail_bind {
            return Err(api_error("bind rejected"));
        }
        // Binding replaces the network's VLAN profile with the template's.
        let template_vlans: Vec<(u16, VlanConfig)> = state
            .vlans
            .iter()
            .filter(|((net, _), _)| net == template_id)
            .map(|((_, vid), v)| (*vid, v.clone()))
            .collect();
        state.vlans.retain(|(net, _), _| net != network_id);
        for (vid, vlan) in template_vlans {
            state.vlans.insert((network_id.to_owned(), vid), vlan);
        }
        Ok(())
    }
}

// Appliance VLAN endpoints
//
// Fixed IP assignment tables and reserved ranges live on the VLAN object,
// so reads and writes here carry the whole table each time.

use tracing::debug;

use crate::client::DashboardClient;
use crate::error::Error;
use crate::models::{ApplianceVlan, VlanUpdate};

impl DashboardClient {
    /// Read one appliance VLAN.
    ///
    /// `GET /networks/{networkId}/appliance/vlans/{vlanId}`
    pub async fn get_vlan(&self, network_id: &str, vlan_id: u16) -> Result<ApplianceVlan, Error> {
        let url = self.url(&format!("networks/{network_id}/appliance/vlans/{vlan_id}"))?;
        self.get(url).await
    }

    /// Update one appliance VLAN. Present fields replace their server-side
    /// counterparts wholesale; absent fields are untouched.
    ///
    /// `PUT /networks/{networkId}/appliance/vlans/{vlanId}`
    pub async fn update_vlan(
        &self,
        network_id: &str,
        vlan_id: u16,
        update: &VlanUpdate,
    ) -> Result<(), Error> {
        let url = self.url(&format!("networks/{network_id}/appliance/vlans/{vlan_id}"))?;
        debug!(network_id, vlan_id, "updating VLAN");
        self.put(url, update).await
    }
}

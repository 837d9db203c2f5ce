// Device inventory and lifecycle endpoints
//
// Listing, claim/remove, attribute updates, and the management-interface
// (WAN uplink) settings used by static-IP capture and replay.

use tracing::debug;

use crate::client::DashboardClient;
use crate::error::Error;
use crate::models::{
    ClaimRequest, Device, DeviceUpdate, ManagementInterface,
};

impl DashboardClient {
    /// List all devices in a network.
    ///
    /// `GET /networks/{networkId}/devices`
    pub async fn list_network_devices(&self, network_id: &str) -> Result<Vec<Device>, Error> {
        let url = self.url(&format!("networks/{network_id}/devices"))?;
        self.get(url).await
    }

    /// List every device in the organization's inventory.
    ///
    /// `GET /organizations/{orgId}/devices`
    pub async fn list_org_devices(&self, org_id: &str) -> Result<Vec<Device>, Error> {
        let url = self.url(&format!("organizations/{org_id}/devices"))?;
        self.get(url).await
    }

    /// Claim a device into a network by serial.
    ///
    /// `POST /networks/{networkId}/devices/claim`
    pub async fn claim_device(&self, network_id: &str, serial: &str) -> Result<(), Error> {
        let url = self.url(&format!("networks/{network_id}/devices/claim"))?;
        debug!(serial, network_id, "claiming device");
        let body = ClaimRequest {
            serials: vec![serial.to_owned()],
        };
        self.post(url, &body).await
    }

    /// Remove a device from a network. The device returns to the
    /// organization inventory; its configuration on the network is dropped.
    ///
    /// `POST /networks/{networkId}/devices/{serial}/remove`
    pub async fn remove_device(&self, network_id: &str, serial: &str) -> Result<(), Error> {
        let url = self.url(&format!("networks/{network_id}/devices/{serial}/remove"))?;
        debug!(serial, network_id, "removing device");
        self.post_empty(url).await
    }

    /// Update a device's attributes (name, street address).
    ///
    /// `PUT /devices/{serial}`
    pub async fn update_device(&self, serial: &str, update: &DeviceUpdate) -> Result<(), Error> {
        let url = self.url(&format!("devices/{serial}"))?;
        debug!(serial, ?update, "updating device");
        self.put(url, update).await
    }

    /// Read a device's management interface (WAN uplink settings).
    ///
    /// `GET /devices/{serial}/managementInterface`
    pub async fn get_management_interface(
        &self,
        serial: &str,
    ) -> Result<ManagementInterface, Error> {
        let url = self.url(&format!("devices/{serial}/managementInterface"))?;
        self.get(url).await
    }

    /// Update a device's management interface. Only the WAN sections present
    /// in the update are touched.
    ///
    /// `PUT /devices/{serial}/managementInterface`
    pub async fn update_management_interface(
        &self,
        serial: &str,
        update: &ManagementInterface,
    ) -> Result<(), Error> {
        let url = self.url(&format!("devices/{serial}/managementInterface"))?;
        debug!(serial, "updating management interface");
        self.put(url, update).await
    }
}

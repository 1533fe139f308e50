// Inventory endpoints
//
// Network-device listing is paged with 1-based offsets. The server caps
// `limit` at 500 for network-device and 1000 for device-health.

use tracing::debug;

use crate::client::{DnacClient, paginate};
use crate::error::Error;
use crate::models::{DeviceDetail, DeviceHealth, InventoryDelete, NetworkDevice};

/// Maximum page size accepted by `/network-device`.
pub const NETWORK_DEVICE_PAGE_LIMIT: u32 = 500;

/// Maximum page size accepted by `/device-health`.
pub const DEVICE_HEALTH_PAGE_LIMIT: u32 = 1000;

/// First offset of a DNAC page walk.
pub const FIRST_OFFSET: u32 = 1;

impl DnacClient {
    /// One page of `GET /dna/intent/api/v1/network-device`.
    pub async fn network_devices_page(
        &self,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<NetworkDevice>, Error> {
        self.get(
            "/dna/intent/api/v1/network-device",
            &[("offset", offset.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    /// The whole inventory, page by page until an empty page.
    pub async fn list_network_devices(&self) -> Result<Vec<NetworkDevice>, Error> {
        debug!("listing network devices");
        paginate(FIRST_OFFSET, NETWORK_DEVICE_PAGE_LIMIT, |offset, limit| {
            self.network_devices_page(offset, limit)
        })
        .await
    }

    /// `GET /dna/intent/api/v1/network-device/{id}`
    pub async fn get_network_device(&self, id: &str) -> Result<NetworkDevice, Error> {
        self.get(&format!("/dna/intent/api/v1/network-device/{id}"), &[])
            .await
    }

    /// `GET /dna/intent/api/v1/network-device` filtered by arbitrary query
    /// parameters (e.g. `platformId`).
    pub async fn network_devices_matching(
        &self,
        params: &[(&str, String)],
    ) -> Result<Vec<NetworkDevice>, Error> {
        self.get("/dna/intent/api/v1/network-device", params).await
    }

    /// Look a device up by hostname.
    ///
    /// `GET /dna/intent/api/v1/device-detail?searchBy={hostname}&identifier=nwDeviceName`
    pub async fn device_detail_by_name(&self, hostname: &str) -> Result<DeviceDetail, Error> {
        self.get(
            "/dna/intent/api/v1/device-detail",
            &[
                ("searchBy", hostname.to_owned()),
                ("identifier", "nwDeviceName".to_owned()),
            ],
        )
        .await
    }

    /// One page of `GET /dna/intent/api/v1/device-health` for a site.
    pub async fn device_health_page(
        &self,
        site_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<DeviceHealth>, Error> {
        self.get(
            "/dna/intent/api/v1/device-health",
            &[
                ("siteId", site_id.to_owned()),
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
            ],
        )
        .await
    }

    /// Health entries of every device under a site.
    pub async fn list_device_health(&self, site_id: &str) -> Result<Vec<DeviceHealth>, Error> {
        debug!(site_id, "listing device health");
        paginate(FIRST_OFFSET, DEVICE_HEALTH_PAGE_LIMIT, |offset, limit| {
            self.device_health_page(site_id, offset, limit)
        })
        .await
    }

    /// Remove devices from inventory.
    ///
    /// `DELETE /api/v1/inventory/delete/bulk`
    pub async fn delete_devices(
        &self,
        devices: &[InventoryDelete],
    ) -> Result<serde_json::Value, Error> {
        debug!(count = devices.len(), "bulk deleting devices");
        self.delete_raw("/api/v1/inventory/delete/bulk", devices)
            .await
    }
}

// Plug-and-play endpoints
//
// The PnP listing endpoints return a bare JSON array, not the usual
// `{ "response": ... }` envelope.

use tracing::debug;

use crate::client::DnacClient;
use crate::error::Error;
use crate::models::{PnpDevice, SiteClaimRequest};

/// States a device must be in to be claimable.
pub const CLAIMABLE_STATES: &str = "Unclaimed,Planned";

/// Page size used when listing claimable devices.
pub const CLAIMABLE_LIMIT: u32 = 1000;

impl DnacClient {
    /// Devices waiting in the PnP portal (`Unclaimed` or `Planned`).
    ///
    /// `GET /api/v1/onboarding/pnp-device?state=Unclaimed,Planned&offset=0&limit=1000`
    pub async fn list_claimable_pnp_devices(&self) -> Result<Vec<PnpDevice>, Error> {
        debug!("listing claimable pnp devices");
        self.get_raw(
            "/api/v1/onboarding/pnp-device",
            &[
                ("state", CLAIMABLE_STATES.to_owned()),
                ("offset", "0".to_owned()),
                ("limit", CLAIMABLE_LIMIT.to_string()),
            ],
        )
        .await
    }

    /// Every device in the PnP portal.
    ///
    /// `GET /dna/intent/api/v1/onboarding/pnp-device`
    pub async fn list_pnp_devices(&self) -> Result<Vec<PnpDevice>, Error> {
        self.get_raw("/dna/intent/api/v1/onboarding/pnp-device", &[])
            .await
    }

    /// Claim a device onto a site with an onboarding template.
    ///
    /// `POST /api/v1/onboarding/pnp-device/site-claim`
    pub async fn site_claim(&self, request: &SiteClaimRequest) -> Result<serde_json::Value, Error> {
        debug!(device_id = %request.device_id, site_id = %request.site_id, "site claim");
        self.post_raw("/api/v1/onboarding/pnp-device/site-claim", request)
            .await
    }
}

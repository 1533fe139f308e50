// Site endpoints

use tracing::debug;

use crate::client::DnacClient;
use crate::error::Error;
use crate::models::Site;

impl DnacClient {
    /// List every site in the hierarchy.
    ///
    /// `GET /dna/intent/api/v1/site`
    pub async fn list_sites(&self) -> Result<Vec<Site>, Error> {
        debug!("listing sites");
        self.get("/dna/intent/api/v1/site", &[]).await
    }
}

// System endpoints: token validation and global credentials

use strum::{Display, EnumString};
use tracing::debug;

use crate::client::DnacClient;
use crate::error::Error;
use crate::models::GlobalCredential;

const HEALTH_PATH: &str = "/dna/intent/api/v1/diagnostics/system/health";

/// `credentialSubType` values accepted by the global-credential endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum CredentialSubtype {
    Cli,
    #[strum(serialize = "SNMPV2_READ_COMMUNITY")]
    Snmpv2ReadCommunity,
    #[strum(serialize = "SNMPV2_WRITE_COMMUNITY")]
    Snmpv2WriteCommunity,
    #[strum(serialize = "SNMPV3")]
    Snmpv3,
    HttpWrite,
    HttpRead,
    Netconf,
}

impl DnacClient {
    /// Check whether the current token is still accepted.
    ///
    /// Does not re-authenticate: `Ok(false)` means the token was rejected.
    pub async fn token_is_valid(&self) -> Result<bool, Error> {
        let status = self.probe(HEALTH_PATH).await?;
        debug!(status = status.as_u16(), "token probe");
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(false);
        }
        if status.is_success() {
            return Ok(true);
        }
        Err(Error::Api {
            status: status.as_u16(),
            message: "system health probe failed".into(),
        })
    }

    /// `GET /dna/intent/api/v1/global-credential?credentialSubType={subtype}`
    pub async fn global_credentials(
        &self,
        subtype: CredentialSubtype,
    ) -> Result<Vec<GlobalCredential>, Error> {
        self.get(
            "/dna/intent/api/v1/global-credential",
            &[("credentialSubType", subtype.to_string())],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn subtype_wire_names() {
        assert_eq!(CredentialSubtype::Cli.to_string(), "CLI");
        assert_eq!(CredentialSubtype::Snmpv3.to_string(), "SNMPV3");
        assert_eq!(CredentialSubtype::HttpRead.to_string(), "HTTP_READ");
        assert_eq!(
            CredentialSubtype::from_str("snmpv2_read_community").ok(),
            Some(CredentialSubtype::Snmpv2ReadCommunity)
        );
    }
}

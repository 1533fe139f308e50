// Token authentication
//
// DNAC exchanges HTTP basic credentials for a short-lived token at
// `POST /dna/system/api/v1/auth/token`. Every other call carries that
// token in the `x-auth-token` header.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::client::DnacClient;
use crate::error::Error;

/// Header carrying the bearer token on intent API calls.
pub const AUTH_HEADER: &str = "x-auth-token";

pub(crate) const TOKEN_PATH: &str = "/dna/system/api/v1/auth/token";

/// Username and password for the token endpoint.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}

/// Supplies credentials on demand, e.g. by prompting for a password.
/// Returning `None` declines.
pub type CredentialSource = Box<dyn Fn() -> Option<Credentials> + Send + Sync>;

/// Notified with every token the token endpoint issues.
pub type TokenListener = Box<dyn Fn(&SecretString) + Send + Sync>;

/// Token endpoint body. Failures sometimes arrive as `{"error": "..."}`
/// with a success status.
#[derive(Deserialize)]
struct TokenResponse {
    #[serde(rename = "Token")]
    token: Option<String>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

impl DnacClient {
    /// Exchange `username`/`password` for a token and store it on the client.
    ///
    /// 401 and 403 are reported as [`Error::Authentication`]; the caller
    /// decides whether to re-prompt or abort.
    pub async fn request_token(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<SecretString, Error> {
        let url = self.url(TOKEN_PATH)?;
        debug!("requesting token at {}", url);

        let resp = self
            .http()
            .post(url)
            .basic_auth(username, Some(password.expose_secret()))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = resp.status();
        debug!(status = status.as_u16(), "token endpoint responded");

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(Error::Authentication {
                message: format!("credentials rejected (HTTP {})", status.as_u16()),
            });
        }

        let body = resp.text().await?;
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        if let Some(reason) = parsed.error {
            let message = match reason {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            return Err(Error::Authentication { message });
        }

        let token = SecretString::from(parsed.token.ok_or(Error::MissingField { field: "Token" })?);
        self.token_issued(&token);
        Ok(token)
    }

    /// Re-run the token exchange with the stored credentials, or with
    /// credentials from the credential source when none are stored.
    ///
    /// Credentials obtained from the source are kept once accepted.
    pub async fn authenticate(&self) -> Result<SecretString, Error> {
        let stored = self.credentials().is_some();
        let creds = self
            .resolve_credentials()
            .ok_or_else(|| Error::Authentication {
                message: "no stored credentials to re-authenticate with".into(),
            })?;
        let token = self.request_token(&creds.username, &creds.password).await?;
        if !stored {
            self.set_credentials(creds);
        }
        Ok(token)
    }
}

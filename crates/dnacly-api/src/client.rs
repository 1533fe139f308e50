// DNAC HTTP client
//
// Wraps `reqwest::Client` with URL construction, token injection,
// `{ "response": ... }` envelope unwrapping, and reactive re-authentication.
// Endpoint groups (inventory, pnp, swim, ...) are inherent methods in
// separate files so this module stays focused on transport mechanics.

use std::future::Future;
use std::sync::RwLock;

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::auth::{AUTH_HEADER, CredentialSource, Credentials, TokenListener};
use crate::error::Error;
use crate::models::Envelope;
use crate::transport::TransportConfig;

/// Error body shapes returned by intent API endpoints.
#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    response: Option<ErrorDetail>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

#[derive(serde::Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// Placeholder body type for requests without a payload.
pub(crate) const NO_BODY: Option<&()> = None;

/// HTTP client for the DNA Center REST API.
///
/// Holds the current token behind a lock. When an authenticated call is
/// answered with 401, the client re-runs the token exchange with its
/// stored credentials (or asks its credential source for them) and
/// re-issues the same request once. Every token obtained from the token
/// endpoint is handed to the token listener, if one is installed.
pub struct DnacClient {
    http: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<SecretString>>,
    credentials: RwLock<Option<Credentials>>,
    credential_source: RwLock<Option<CredentialSource>>,
    token_listener: RwLock<Option<TokenListener>>,
}

impl DnacClient {
    /// Create a client for the appliance at `base_url`
    /// (e.g. `https://dnac.example.com`).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            token: RwLock::new(None),
            credentials: RwLock::new(None),
            credential_source: RwLock::new(None),
            token_listener: RwLock::new(None),
        }
    }

    /// Builder form of [`set_credentials`](Self::set_credentials).
    #[must_use]
    pub fn with_credentials(self, credentials: Credentials) -> Self {
        self.set_credentials(credentials);
        self
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The appliance base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Token / credential state ─────────────────────────────────────

    /// The current token, if one has been acquired or injected.
    pub fn token(&self) -> Option<SecretString> {
        self.token.read().expect("token lock poisoned").clone()
    }

    /// Replace the current token (e.g. one loaded from a cache file).
    pub fn set_token(&self, token: SecretString) {
        *self.token.write().expect("token lock poisoned") = Some(token);
    }

    pub fn credentials(&self) -> Option<Credentials> {
        self.credentials
            .read()
            .expect("credentials lock poisoned")
            .clone()
    }

    pub fn set_credentials(&self, credentials: Credentials) {
        *self.credentials.write().expect("credentials lock poisoned") = Some(credentials);
    }

    /// Install a fallback asked for credentials when a 401 arrives and
    /// none are stored (e.g. the session started from a cached token).
    pub fn set_credential_source(&self, source: CredentialSource) {
        *self
            .credential_source
            .write()
            .expect("credential source lock poisoned") = Some(source);
    }

    /// Install a callback run with every newly issued token.
    pub fn set_token_listener(&self, listener: TokenListener) {
        *self
            .token_listener
            .write()
            .expect("token listener lock poisoned") = Some(listener);
    }

    /// Whether a 401 can be answered with a fresh token exchange.
    pub fn can_reauthenticate(&self) -> bool {
        self.credentials().is_some()
            || self
                .credential_source
                .read()
                .expect("credential source lock poisoned")
                .is_some()
    }

    /// Stored credentials, falling back to the credential source.
    pub(crate) fn resolve_credentials(&self) -> Option<Credentials> {
        self.credentials().or_else(|| {
            let source = self
                .credential_source
                .read()
                .expect("credential source lock poisoned");
            source.as_ref().and_then(|ask| ask())
        })
    }

    pub(crate) fn token_issued(&self, token: &SecretString) {
        self.set_token(token.clone());
        let listener = self.token_listener.read().expect("token listener lock poisoned");
        if let Some(notify) = listener.as_ref() {
            notify(token);
        }
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build a full URL for an absolute API path (`/dna/intent/api/v1/...`).
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send an authenticated request, re-authenticating once on 401.
    async fn execute<B: Serialize + ?Sized + Sync>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<reqwest::Response, Error> {
        let url = self.url(path)?;
        let token = self.token().ok_or(Error::NoToken)?;
        debug!("{method} {url}");

        let resp = self
            .build(method.clone(), url.clone(), query, body, &token)
            .send()
            .await?;

        if resp.status() != reqwest::StatusCode::UNAUTHORIZED {
            return Ok(resp);
        }

        if !self.can_reauthenticate() {
            return Err(Error::TokenExpired);
        }

        warn!("token rejected, re-authenticating");
        let token = self.authenticate().await?;
        let retry = self.build(method, url, query, body, &token).send().await?;

        if retry.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::TokenExpired);
        }
        Ok(retry)
    }

    fn build<B: Serialize + ?Sized + Sync>(
        &self,
        method: Method,
        url: Url,
        query: &[(&str, String)],
        body: Option<&B>,
        token: &SecretString,
    ) -> reqwest::RequestBuilder {
        let mut builder = self
            .http
            .request(method, url)
            .header(AUTH_HEADER, token.expose_secret())
            .header(reqwest::header::ACCEPT, "application/json");
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        builder
    }

    /// GET and decode the raw body (no envelope).
    pub(crate) async fn get_raw<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, Error> {
        let resp = self.execute(Method::GET, path, query, NO_BODY).await?;
        decode(resp).await
    }

    /// GET and unwrap the `{ "response": ... }` envelope.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, Error> {
        let envelope: Envelope<T> = self.get_raw(path, query).await?;
        Ok(envelope.response)
    }

    /// POST a JSON body and decode the raw response body.
    pub(crate) async fn post_raw<T: DeserializeOwned, B: Serialize + ?Sized + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let resp = self.execute(Method::POST, path, &[], Some(body)).await?;
        decode(resp).await
    }

    /// POST a JSON body and unwrap the `{ "response": ... }` envelope.
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + ?Sized + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let envelope: Envelope<T> = self.post_raw(path, body).await?;
        Ok(envelope.response)
    }

    /// DELETE with a JSON body and decode the raw response body.
    pub(crate) async fn delete_raw<T: DeserializeOwned, B: Serialize + ?Sized + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let resp = self.execute(Method::DELETE, path, &[], Some(body)).await?;
        decode(resp).await
    }

    /// GET without re-authentication, returning only the status code.
    ///
    /// Used to probe whether a cached token is still accepted.
    pub(crate) async fn probe(&self, path: &str) -> Result<reqwest::StatusCode, Error> {
        let url = self.url(path)?;
        let token = self.token().ok_or(Error::NoToken)?;
        debug!("GET {url} (probe)");
        let resp = self
            .build(Method::GET, url, &[], NO_BODY, &token)
            .send()
            .await?;
        Ok(resp.status())
    }
}

// ── Response handling ────────────────────────────────────────────────

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        return Err(Error::Api {
            status: status.as_u16(),
            message: error_message(&body, status),
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}

fn error_message(raw: &str, status: reqwest::StatusCode) -> String {
    if let Ok(err) = serde_json::from_str::<ErrorBody>(raw) {
        let nested = err.response.and_then(|r| r.detail.or(r.message));
        if let Some(msg) = nested.or(err.detail).or(err.message) {
            return msg;
        }
    }
    if raw.is_empty() {
        status.to_string()
    } else {
        raw.chars().take(200).collect()
    }
}

// ── Pagination ───────────────────────────────────────────────────────

/// Collect offset/limit pages until the first empty page.
///
/// DNAC offsets are 1-based; `start` is the first offset requested and
/// each subsequent request advances it by `limit`.
pub async fn paginate<T, F, Fut>(start: u32, limit: u32, mut fetch: F) -> Result<Vec<T>, Error>
where
    F: FnMut(u32, u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>, Error>>,
{
    let mut all = Vec::new();
    let mut offset = start;

    loop {
        let page = fetch(offset, limit).await?;
        if page.is_empty() {
            break;
        }
        debug!(offset, received = page.len(), "page fetched");
        all.extend(page);
        offset = offset.saturating_add(limit);
    }

    Ok(all)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[test]
    fn error_message_prefers_nested_detail() {
        let raw = r#"{"response":{"errorCode":"NCND01","message":"bad","detail":"device not found"}}"#;
        assert_eq!(
            error_message(raw, reqwest::StatusCode::NOT_FOUND),
            "device not found"
        );
    }

    #[test]
    fn error_message_falls_back_to_status() {
        assert_eq!(
            error_message("", reqwest::StatusCode::BAD_GATEWAY),
            "502 Bad Gateway"
        );
    }

    #[tokio::test]
    async fn paginate_stops_on_empty_page() {
        let calls = AtomicU32::new(0);
        let all = paginate(1, 2, |offset, limit| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                // Five items total, served two at a time.
                let items: Vec<u32> = (offset..offset + limit).filter(|i| *i <= 5).collect();
                Ok(items)
            }
        })
        .await
        .expect("pagination succeeds");

        assert_eq!(all, vec![1, 2, 3, 4, 5]);
        // pages at offsets 1, 3, 5 and the empty page at 7
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn paginate_propagates_errors() {
        let result: Result<Vec<u32>, Error> =
            paginate(1, 10, |_, _| async { Err(Error::TokenExpired) }).await;
        assert!(matches!(result, Err(Error::TokenExpired)));
    }
}

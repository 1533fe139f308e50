// ── Session lifecycle ──
//
// Owns the API client for one appliance and gets it a usable token:
// reuse the cached token when the appliance still accepts it, otherwise
// exchange credentials, re-prompting for the password when it is rejected.

use dnacly_api::transport::{TlsMode, TransportConfig};
use dnacly_api::{Credentials, DnacClient};
use secrecy::SecretString;
use tracing::{debug, info, warn};

use crate::config::{SessionConfig, TlsVerification, WorkflowSettings};
use crate::error::CoreError;
use crate::token_cache::TokenCache;

/// Where the session's token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Cached,
    Acquired,
}

/// An authenticated (or about to be) connection to one appliance.
pub struct Session {
    client: DnacClient,
    config: SessionConfig,
    cache: Option<TokenCache>,
}

impl Session {
    /// Build the HTTP client for `config`. Does not contact the appliance.
    pub fn new(config: SessionConfig) -> Result<Self, CoreError> {
        let transport = build_transport(&config);
        let client = DnacClient::new(config.url.clone(), &transport)?;
        Self::with_client(client, config)
    }

    /// Wrap an existing client.
    pub fn with_client(client: DnacClient, config: SessionConfig) -> Result<Self, CoreError> {
        config.workflow.validate()?;
        let cache = config.token_cache.clone().map(TokenCache::new);
        if let Some(password) = &config.password {
            client.set_credentials(Credentials::new(config.username.clone(), password.clone()));
        }
        if let Some(cache) = cache.clone() {
            client.set_token_listener(Box::new(move |token: &SecretString| {
                store_token(&cache, token);
            }));
        }
        Ok(Self {
            client,
            config,
            cache,
        })
    }

    pub fn client(&self) -> &DnacClient {
        &self.client
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn settings(&self) -> &WorkflowSettings {
        &self.config.workflow
    }

    /// Password source for re-authenticating mid-run when no password is
    /// configured and the session started from a cached token.
    pub fn set_reauth_prompt<F>(&self, prompt: F)
    where
        F: Fn() -> Option<SecretString> + Send + Sync + 'static,
    {
        let username = self.config.username.clone();
        self.client.set_credential_source(Box::new(move || {
            prompt().map(|password| Credentials::new(username.clone(), password))
        }));
    }

    /// Make sure the client holds an accepted token.
    ///
    /// `prompt` supplies a password: attempt 0 when none is configured,
    /// attempts 1.. after each rejection. Returning `None` gives up.
    pub async fn connect<P>(&self, prompt: P) -> Result<TokenSource, CoreError>
    where
        P: FnMut(u32) -> Option<SecretString>,
    {
        if let Some(token) = self.cached_token()? {
            self.client.set_token(token);
            if self.client.token_is_valid().await? {
                info!("reusing cached token");
                return Ok(TokenSource::Cached);
            }
            debug!("cached token rejected");
        }

        self.acquire(prompt).await?;
        Ok(TokenSource::Acquired)
    }

    /// Check the cached token without acquiring a new one.
    pub async fn validate_cached(&self) -> Result<bool, CoreError> {
        let Some(token) = self.cached_token()? else {
            return Ok(false);
        };
        self.client.set_token(token);
        Ok(self.client.token_is_valid().await?)
    }

    /// Exchange credentials for a fresh token. The token listener writes it
    /// to the cache.
    ///
    /// A rejected password is re-prompted up to `auth_retries` times;
    /// with zero retries the first rejection is final.
    pub async fn acquire<P>(&self, mut prompt: P) -> Result<SecretString, CoreError>
    where
        P: FnMut(u32) -> Option<SecretString>,
    {
        let username = &self.config.username;
        let mut password = match &self.config.password {
            Some(p) => p.clone(),
            None => prompt(0).ok_or_else(|| CoreError::AuthenticationFailed {
                message: "no password provided".into(),
            })?,
        };

        let mut attempt = 0;
        loop {
            match self.client.request_token(username, &password).await {
                Ok(token) => {
                    info!(username = %username, "token acquired");
                    self.client
                        .set_credentials(Credentials::new(username.clone(), password));
                    return Ok(token);
                }
                Err(dnacly_api::Error::Authentication { message })
                    if attempt < self.config.auth_retries =>
                {
                    attempt += 1;
                    warn!(attempt, retries = self.config.auth_retries, "{message}");
                    password = prompt(attempt)
                        .ok_or(CoreError::AuthenticationFailed { message })?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn cached_token(&self) -> Result<Option<SecretString>, CoreError> {
        match &self.cache {
            Some(cache) => cache.load(),
            None => Ok(None),
        }
    }
}

fn store_token(cache: &TokenCache, token: &SecretString) {
    if let Err(e) = cache.store(token) {
        warn!("could not write token cache: {e}");
    }
}

fn build_transport(config: &SessionConfig) -> TransportConfig {
    TransportConfig {
        tls: match &config.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        },
        timeout: config.timeout,
    }
}

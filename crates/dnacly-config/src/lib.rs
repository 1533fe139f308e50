//! Profile configuration for dnacly.
//!
//! TOML profiles, password resolution (env + keyring + plaintext), and
//! translation to `dnacly_core::SessionConfig`. The CLI layers its flag
//! overrides on top of what this crate produces.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use dnacly_core::config::DEFAULT_TOKEN_CACHE;
use dnacly_core::{SessionConfig, TlsVerification, WorkflowSettings};

/// Keyring service name under which passwords are stored.
pub const KEYRING_SERVICE: &str = "dnacly";

/// Environment variable consulted first for the appliance password.
pub const PASSWORD_ENV: &str = "DNAC_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("no username configured for profile '{profile}'")]
    NoUsername { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level contents of `config.toml`.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named appliance profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Look up `name`, or the default profile when `name` is `None`.
    ///
    /// Returns `Ok(None)` when no name was given and no default profile
    /// exists, so callers can fall back to flags and environment.
    pub fn profile(&self, name: Option<&str>) -> Result<Option<(&str, &Profile)>, ConfigError> {
        match name {
            Some(name) => self
                .profiles
                .get_key_value(name)
                .map(|(k, p)| Some((k.as_str(), p)))
                .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() }),
            None => Ok(self
                .default_profile
                .as_deref()
                .and_then(|n| self.profiles.get_key_value(n))
                .map(|(k, p)| (k.as_str(), p))),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Appliances ship with self-signed certificates.
    #[serde(default = "default_insecure")]
    pub insecure: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
            insecure: default_insecure(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_insecure() -> bool {
    true
}
fn default_auth_retries() -> u32 {
    3
}

/// A named appliance profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Appliance base URL (e.g., "https://10.8.6.56").
    pub url: String,

    pub username: Option<String>,

    /// Plaintext password. Prefer the keyring or `DNAC_PASSWORD`.
    pub password: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override the global insecure setting.
    pub insecure: Option<bool>,

    /// Override the global timeout, in seconds.
    pub timeout: Option<u64>,

    pub token_cache: Option<PathBuf>,

    /// Password re-prompts after a rejection.
    #[serde(default = "default_auth_retries")]
    pub auth_retries: u32,

    #[serde(default)]
    pub workflow: WorkflowSettings,
}

impl Profile {
    pub fn new(url: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: Some(username.into()),
            password: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
            token_cache: None,
            auth_retries: default_auth_retries(),
            workflow: WorkflowSettings::default(),
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "dnacly", "dnacly").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("dnacly");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path`, merged over defaults and `DNACLY_` variables.
///
/// Nested keys use a double underscore:
/// `DNACLY_DEFAULTS__OUTPUT=json`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("DNACLY_").split("__"));

    Ok(figment.extract()?)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Write `cfg` to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Password resolution ─────────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/password"),
    )?)
}

/// Resolve the appliance password without prompting.
///
/// Order: `DNAC_PASSWORD`, system keyring, plaintext in the profile.
/// `None` leaves the caller to prompt.
pub fn resolve_password(profile: Option<&Profile>, profile_name: &str) -> Option<SecretString> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            return Some(SecretString::from(pw));
        }
    }

    if let Some(pw) = keyring_entry(profile_name)
        .ok()
        .and_then(|e| e.get_password().ok())
    {
        return Some(SecretString::from(pw));
    }

    profile
        .and_then(|p| p.password.clone())
        .map(SecretString::from)
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password.expose_secret())?;
    Ok(())
}

// ── Session translation ─────────────────────────────────────────────

/// TLS policy for a profile: a CA file wins, then the insecure flag
/// (profile over global default), then the system store.
pub fn tls_for(profile: &Profile, defaults: &Defaults) -> TlsVerification {
    if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else {
        TlsVerification::SystemDefaults
    }
}

/// Build a `SessionConfig` from a profile, with no CLI overrides.
///
/// The password is resolved through [`resolve_password`]; when none is
/// found it stays `None` and the session prompts for it.
pub fn profile_to_session_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<SessionConfig, ConfigError> {
    let url: url::Url = profile.url.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {}", profile.url),
    })?;

    let username = profile
        .username
        .clone()
        .ok_or_else(|| ConfigError::NoUsername {
            profile: profile_name.into(),
        })?;

    profile
        .workflow
        .validate()
        .map_err(|e| ConfigError::Validation {
            field: format!("profiles.{profile_name}.workflow"),
            reason: e.to_string(),
        })?;

    let mut config = SessionConfig::new(url, username);
    config.password = resolve_password(Some(profile), profile_name);
    config.tls = tls_for(profile, defaults);
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.token_cache = Some(
        profile
            .token_cache
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_CACHE)),
    );
    config.auth_retries = profile.auth_retries;
    config.workflow = profile.workflow.clone();
    Ok(config)
}

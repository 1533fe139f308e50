// ── Runtime session configuration ──
//
// These types describe how to reach a DNA Center appliance and how the
// workflows pace themselves. They carry credentials and tuning but never
// touch disk; the CLI builds a `SessionConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::batch::{MAX_DISTRIBUTION_BATCH, MAX_TEMPLATE_BATCH};
use crate::error::CoreError;

/// Onboarding template applied when claiming PnP devices onto a site.
pub const DEFAULT_CLAIM_CONFIG_ID: &str = "e1825fc0-655f-464b-bee0-cfda47c87222";

/// Template that puts a managed device back into PnP mode.
pub const DEFAULT_RESET_TEMPLATE_ID: &str = "cb2ff904-054d-4288-afc4-fbd66f0504ea";

/// Default token cache file, relative to the working directory.
pub const DEFAULT_TOKEN_CACHE: &str = "token.tk";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification. Appliances ship with self-signed certificates.
    #[default]
    DangerAcceptInvalid,
}

/// Everything needed to open a session against one appliance.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Appliance URL (e.g. `https://dnac.example.com`).
    pub url: Url,
    pub username: String,
    /// `None` means the password will be prompted for.
    pub password: Option<SecretString>,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Plain-text token cache; `None` disables caching.
    pub token_cache: Option<PathBuf>,
    /// How many times a rejected password is re-prompted. 0 aborts on
    /// the first rejection.
    pub auth_retries: u32,
    pub workflow: WorkflowSettings,
}

impl SessionConfig {
    pub fn new(url: Url, username: impl Into<String>) -> Self {
        Self {
            url,
            username: username.into(),
            password: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            token_cache: Some(PathBuf::from(DEFAULT_TOKEN_CACHE)),
            auth_retries: 3,
            workflow: WorkflowSettings::default(),
        }
    }
}

/// Batch sizes, poll intervals and template ids used by the workflows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowSettings {
    pub distribution_batch_size: usize,
    pub template_batch_size: usize,
    pub poll_interval_secs: u64,
    pub activation_poll_interval_secs: u64,
    pub activation_pacing_ms: u64,
    pub max_polls: u32,
    pub claim_config_id: String,
    pub reset_template_id: String,
    /// Seconds to wait between the reset template and the inventory delete.
    pub reset_wait_secs: u64,
    /// Root of the SWIM report tree (`{swim_log_dir}/SWIM_Jobs/`).
    pub swim_log_dir: PathBuf,
    /// Directory receiving template deployment id files.
    pub deploy_id_dir: PathBuf,
    /// Job counter file for template pushes.
    pub job_id_file: PathBuf,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            distribution_batch_size: 30,
            template_batch_size: MAX_TEMPLATE_BATCH,
            poll_interval_secs: 20,
            activation_poll_interval_secs: 30,
            activation_pacing_ms: 400,
            max_polls: 720,
            claim_config_id: DEFAULT_CLAIM_CONFIG_ID.into(),
            reset_template_id: DEFAULT_RESET_TEMPLATE_ID.into(),
            reset_wait_secs: 81,
            swim_log_dir: PathBuf::from("DNAC_SWIM"),
            deploy_id_dir: PathBuf::from("deployids"),
            job_id_file: PathBuf::from("jobid.id"),
        }
    }
}

impl WorkflowSettings {
    /// Reject values the server or the poll loop cannot work with.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(1..=MAX_DISTRIBUTION_BATCH).contains(&self.distribution_batch_size) {
            return Err(CoreError::ValidationFailed {
                message: format!(
                    "distribution_batch_size must be between 1 and {MAX_DISTRIBUTION_BATCH}, got {}",
                    self.distribution_batch_size
                ),
            });
        }
        if !(1..=MAX_TEMPLATE_BATCH).contains(&self.template_batch_size) {
            return Err(CoreError::ValidationFailed {
                message: format!(
                    "template_batch_size must be between 1 and {MAX_TEMPLATE_BATCH}, got {}",
                    self.template_batch_size
                ),
            });
        }
        if self.max_polls == 0 {
            return Err(CoreError::ValidationFailed {
                message: "max_polls must be at least 1".into(),
            });
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn activation_poll_interval(&self) -> Duration {
        Duration::from_secs(self.activation_poll_interval_secs)
    }

    pub fn activation_pacing(&self) -> Duration {
        Duration::from_millis(self.activation_pacing_ms)
    }

    pub fn reset_wait(&self) -> Duration {
        Duration::from_secs(self.reset_wait_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(WorkflowSettings::default().validate().is_ok());
    }

    #[test]
    fn oversized_distribution_batch_rejected() {
        let settings = WorkflowSettings {
            distribution_batch_size: 41,
            ..WorkflowSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(CoreError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn zero_template_batch_rejected() {
        let settings = WorkflowSettings {
            template_batch_size: 0,
            ..WorkflowSettings::default()
        };
        assert!(settings.validate().is_err());
    }
}

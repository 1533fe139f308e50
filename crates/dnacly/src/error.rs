//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use dnacly_config::ConfigError;
use dnacly_core::{ApiError, CoreError};

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to DNA Center at {url}")]
    #[diagnostic(
        code(dnacly::connection_failed),
        help(
            "Check that the appliance is reachable: {reason}\n\
             Self-signed certificate? Try --insecure (-k)."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(dnacly::auth_failed),
        help(
            "Verify the username and password.\n\
             Store a password with: dnacly config set-password --profile {profile}\n\
             Or set DNAC_PASSWORD."
        )
    )]
    AuthFailed { message: String, profile: String },

    #[error("No username configured for profile '{profile}'")]
    #[diagnostic(
        code(dnacly::no_credentials),
        help("Pass --username, set DNAC_USERNAME, or run: dnacly config init")
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(dnacly::not_found),
        help("Run: dnacly {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({status}): {message}")]
    #[diagnostic(code(dnacly::api_error))]
    ApiError { status: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(dnacly::validation))]
    Validation { field: String, reason: String },

    #[error("Cannot read {path}: {message}")]
    #[diagnostic(
        code(dnacly::input_file),
        help("Check that the file exists and has the expected header row.")
    )]
    InputFile { path: String, message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(dnacly::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: dnacly config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No appliance URL configured")]
    #[diagnostic(
        code(dnacly::no_config),
        help(
            "Pass --url or set DNAC_URL, or create a profile with: dnacly config init\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(dnacly::config))]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(dnacly::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(dnacly::timeout),
        help("Increase timeout with --timeout or check appliance responsiveness.")
    )]
    Timeout { seconds: u64 },

    #[error("Task {task_id} did not finish after {polls} polls")]
    #[diagnostic(
        code(dnacly::poll_timeout),
        help("Raise workflow.max_polls in the profile, or check the task in the DNA Center UI.")
    )]
    PollTimeout { task_id: String, polls: u32 },

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    #[diagnostic(code(dnacly::json))]
    Json(#[from] serde_json::Error),

    #[error("Serialization failed: {0}")]
    #[diagnostic(code(dnacly::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } | Self::PollTimeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Attach the active profile name to authentication failures.
    pub fn for_profile(self, name: &str) -> Self {
        match self {
            Self::AuthFailed { message, .. } => Self::AuthFailed {
                message,
                profile: name.into(),
            },
            other => other,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

fn list_command_for(entity_type: &str) -> String {
    match entity_type.to_ascii_lowercase().as_str() {
        "device" | "network device" | "resource" => "inventory list".into(),
        "template" => "templates list".into(),
        "tag" => "tags list".into(),
        "site" => "sites list".into(),
        other => format!("{other}s list"),
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                message,
                profile: "default".into(),
            },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: list_command_for(&entity_type),
                resource_type: entity_type,
                identifier,
            },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Csv { path, message } => CliError::InputFile {
                path: path.display().to_string(),
                message,
            },

            CoreError::Io { path, source } => CliError::InputFile {
                path: path.display().to_string(),
                message: source.to_string(),
            },

            CoreError::PollTimeout { task_id, polls } => CliError::PollTimeout { task_id, polls },

            CoreError::Api { message, status } => CliError::ApiError {
                status: status.map_or_else(|| "-".into(), |s| s.to_string()),
                message,
            },

            e @ CoreError::ProgressParse { .. } => CliError::ApiError {
                status: "task".into(),
                message: e.to_string(),
            },

            CoreError::Config { message } => CliError::Config { message },

            CoreError::Internal(message) => CliError::ApiError {
                status: "internal".into(),
                message,
            },
        }
    }
}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        CoreError::from(err).into()
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                available: available_profiles(),
                name,
            },
            ConfigError::NoUsername { profile } => CliError::NoCredentials { profile },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

/// Comma-separated profile names for help text.
pub fn available_profiles() -> String {
    let cfg = dnacly_config::load_config_or_default();
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_stable_exit_codes() {
        let cases = [
            (
                CoreError::AuthenticationFailed {
                    message: "bad".into(),
                },
                exit_code::AUTH,
            ),
            (
                CoreError::NotFound {
                    entity_type: "device".into(),
                    identifier: "sw-01".into(),
                },
                exit_code::NOT_FOUND,
            ),
            (
                CoreError::ConnectionFailed {
                    url: "https://dnac".into(),
                    reason: "refused".into(),
                },
                exit_code::CONNECTION,
            ),
            (CoreError::Timeout { timeout_secs: 30 }, exit_code::TIMEOUT),
            (
                CoreError::PollTimeout {
                    task_id: "t".into(),
                    polls: 720,
                },
                exit_code::TIMEOUT,
            ),
            (
                CoreError::ValidationFailed {
                    message: "x".into(),
                },
                exit_code::USAGE,
            ),
            (
                CoreError::Api {
                    message: "boom".into(),
                    status: Some(500),
                },
                exit_code::GENERAL,
            ),
        ];

        for (core, code) in cases {
            let label = core.to_string();
            assert_eq!(CliError::from(core).exit_code(), code, "{label}");
        }
    }

    #[test]
    fn not_found_points_at_list_command() {
        let err = CliError::from(CoreError::NotFound {
            entity_type: "tag".into(),
            identifier: "core".into(),
        });
        match err {
            CliError::NotFound { list_command, .. } => assert_eq!(list_command, "tags list"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn profile_name_is_attached_to_auth_failures() {
        let err = CliError::from(CoreError::AuthenticationFailed {
            message: "rejected".into(),
        })
        .for_profile("lab");

        assert!(matches!(err, CliError::AuthFailed { ref profile, .. } if profile == "lab"));
    }
}

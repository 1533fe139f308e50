// ── Core error types ──
//
// User-facing errors from dnacly-core. Consumers see these rather than
// raw HTTP statuses; the `From<dnacly_api::Error>` impl translates
// transport-layer failures into domain variants.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to DNA Center at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Invalid CSV {}: {message}", path.display())]
    Csv { path: PathBuf, message: String },

    #[error("Cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Task errors ──────────────────────────────────────────────────
    #[error("Unrecognised task progress '{progress}': {reason}")]
    ProgressParse { progress: String, reason: String },

    #[error("Task {task_id} still running after {polls} polls")]
    PollTimeout { task_id: String, polls: u32 },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, err: &csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<dnacly_api::Error> for CoreError {
    fn from(err: dnacly_api::Error) -> Self {
        match err {
            dnacly_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            dnacly_api::Error::TokenExpired => CoreError::AuthenticationFailed {
                message: "token rejected after re-authentication".into(),
            },
            dnacly_api::Error::NoToken => CoreError::AuthenticationFailed {
                message: "no token acquired".into(),
            },
            dnacly_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            dnacly_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            dnacly_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            dnacly_api::Error::Api { status: 404, message } => CoreError::NotFound {
                entity_type: "Resource".into(),
                identifier: message,
            },
            dnacly_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            dnacly_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            dnacly_api::Error::MissingField { field } => CoreError::Api {
                message: format!("response is missing '{field}'"),
                status: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_not_found_becomes_not_found() {
        let err: CoreError = dnacly_api::Error::Api {
            status: 404,
            message: "No device with id x".into(),
        }
        .into();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn token_expired_is_auth_failure() {
        let err: CoreError = dnacly_api::Error::TokenExpired.into();
        assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
    }
}

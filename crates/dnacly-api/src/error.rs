use thiserror::Error;

/// Top-level error type for the `dnacly-api` crate.
///
/// Covers every failure mode of the DNAC REST surface: token exchange,
/// transport, non-success HTTP statuses, and response decoding.
/// `dnacly-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Token exchange rejected (bad credentials, locked account, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// A request was answered with 401 even after re-authenticating.
    #[error("Token expired -- re-authentication did not succeed")]
    TokenExpired,

    /// An authenticated call was made before any token was acquired.
    #[error("No token available -- authenticate first")]
    NoToken,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS configuration or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// Non-success status from an intent API endpoint.
    #[error("DNAC API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// A response decoded but lacked a field the caller depends on.
    #[error("Response is missing '{field}'")]
    MissingField { field: &'static str },
}

impl Error {
    /// Returns `true` if this error indicates the token has expired
    /// and re-authentication might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::TokenExpired | Self::NoToken)
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => matches!(status, 429 | 502 | 503 | 504),
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::TokenExpired => Some(401),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_status_classification() {
        let not_found = Error::Api {
            status: 404,
            message: "missing".into(),
        };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_transient());
        assert_eq!(not_found.status(), Some(404));

        let busy = Error::Api {
            status: 503,
            message: "busy".into(),
        };
        assert!(busy.is_transient());
    }

    #[test]
    fn expired_token_is_auth_expired() {
        assert!(Error::TokenExpired.is_auth_expired());
        assert!(!Error::MissingField { field: "taskId" }.is_auth_expired());
    }
}

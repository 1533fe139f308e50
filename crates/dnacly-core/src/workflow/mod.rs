//! The four operational workflows.
//!
//! Each runs its requests strictly one after another. Failures that
//! concern a single device or batch are collected into the outcome and
//! the run carries on; authentication failures end the run.

pub mod pnp_claim;
pub mod pnp_reset;
pub mod swim;
pub mod template_push;

use crate::error::CoreError;

/// Turn a per-item API failure into a reason string, unless it means the
/// session itself is gone.
pub(crate) fn item_failure(err: dnacly_api::Error) -> Result<String, CoreError> {
    match err {
        dnacly_api::Error::Authentication { .. }
        | dnacly_api::Error::TokenExpired
        | dnacly_api::Error::NoToken => Err(err.into()),
        other => Ok(other.to_string()),
    }
}

/// Same as [`item_failure`] for errors already translated to [`CoreError`].
pub(crate) fn core_item_failure(err: CoreError) -> Result<String, CoreError> {
    match err {
        CoreError::AuthenticationFailed { .. } => Err(err),
        other => Ok(other.to_string()),
    }
}

//! Workflow layer between `dnacly-api` and the `dnacly` CLI.
//!
//! - **[`Session`]** gets the client a usable token: cached token first,
//!   then a credential exchange that re-prompts for rejected passwords.
//! - **Batching and polling**: [`BatchSize`] splits device lists under the
//!   server's ceilings; [`wait_for_task`] polls a task until its
//!   [`TaskTally`] shows nothing running or pending.
//! - **Files**: CSV inputs ([`inputs`]), reports ([`reports`]), the token
//!   cache and the template job counter.
//! - **Workflows** ([`workflow`]): PnP claim, PnP reset, template push and
//!   SWIM distribution/activation. Progress is reported through a
//!   [`WorkflowObserver`].

pub mod batch;
pub mod config;
pub mod error;
pub mod events;
pub mod inputs;
pub mod jobs;
pub mod poll;
pub mod progress;
pub mod reports;
pub mod session;
pub mod sites;
pub mod token_cache;
pub mod workflow;

// ── Primary re-exports ──────────────────────────────────────────────
pub use batch::BatchSize;
pub use config::{SessionConfig, TlsVerification, WorkflowSettings};
pub use error::CoreError;
pub use events::{NoopObserver, PollStatus, WorkflowEvent, WorkflowObserver};
pub use poll::{PollSettings, TaskSource, wait_for_task};
pub use progress::TaskTally;
pub use session::{Session, TokenSource};
pub use token_cache::TokenCache;

pub use dnacly_api::models;
pub use dnacly_api::{CredentialSubtype, DnacClient, Error as ApiError};

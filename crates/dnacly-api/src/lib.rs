// dnacly-api: Async Rust client for the Cisco DNA Center intent API

pub mod auth;
pub mod client;
pub mod error;
pub mod inventory;
pub mod models;
pub mod pnp;
pub mod sites;
pub mod swim;
pub mod system;
pub mod tags;
pub mod templates;
pub mod transport;

pub use auth::{AUTH_HEADER, CredentialSource, Credentials, TokenListener};
pub use client::{DnacClient, paginate};
pub use error::Error;
pub use system::CredentialSubtype;
pub use transport::{TlsMode, TransportConfig};

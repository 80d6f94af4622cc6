//! Session & authorization client for the Flock Directory
//!
//! This crate owns the full client-side session lifecycle: durable
//! credential storage, bearer-token attachment on every outgoing request,
//! transparent refresh-and-retry on credential expiry (at most once per
//! request), and the session state store the rest of the application reads
//! identity and role from.
//!
//! The pieces compose explicitly rather than through globals: `main`
//! constructs one [`client::ApiClient`] over a [`credentials::CredentialStore`]
//! and a [`navigator::Navigator`], wraps it in a [`state::SessionStore`], and
//! hands that to whatever needs it.

pub mod client;
pub mod config;
pub mod credentials;
pub mod guard;
pub mod models;
pub mod navigator;
pub mod state;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use credentials::{CredentialStore, Credentials, FileCredentialStore, MemoryCredentialStore};
pub use models::{AuthUser, Role};
pub use navigator::{Navigator, NoopNavigator};
pub use state::{SessionState, SessionStore};

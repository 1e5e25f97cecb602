//! Core client library for the Envers book community app.
//!
//! This crate is the non-UI half of the mobile client: it owns the
//! authentication session (boot, login, signup, logout), persists it in
//! platform secure storage, and dispatches bearer-authenticated requests
//! to the backend. Screens consume it through three pieces:
//!
//! - [`auth::SessionManager`]: the single source of truth for who is
//!   logged in, constructed with an injected store and client so tests
//!   can swap in fakes
//! - [`api::ApiClient`]: request dispatch with automatic token injection
//! - [`auth::guard`]: pure routing decisions between the auth and main
//!   navigation trees
//!
//! ```no_run
//! use envers_client::api::{ApiClient, TokenHandle};
//! use envers_client::auth::{KeyringStore, SessionManager};
//! use envers_client::config::Config;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::from_env();
//! let api = ApiClient::new(&config, TokenHandle::new())?;
//! let mut sessions = SessionManager::new(api.clone(), KeyringStore::new());
//!
//! sessions.boot();
//! if !sessions.is_authenticated() {
//!     sessions.login("user@example.com", "secret1").await?;
//! }
//! let feed = api.trending_books(30).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;

pub use api::{ApiClient, ApiError, TokenHandle};
pub use auth::{AuthError, AuthState, Session, SessionManager};
pub use config::Config;

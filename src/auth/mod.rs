//! Authentication: session state, credential storage, and the route guard.
//!
//! This module provides:
//! - `SessionManager`: the boot/login/signup/logout state machine
//! - `CredentialStore`: durable session storage (keyring, file, or memory)
//! - `guard`: pure routing decisions from the auth state
//!
//! The session record is persisted as one serialized blob, so the token
//! and user id are always stored together or not at all.

pub mod error;
pub mod guard;
pub mod manager;
pub mod session;
pub mod store;

pub use error::AuthError;
pub use guard::{decide, GuardDecision, RouteGroup};
pub use manager::SessionManager;
pub use session::{AuthState, Session, SessionRecord, SignupProfile};
pub use store::{CredentialStore, FileStore, KeyringStore, MemoryStore};

//! REST API client module for the Envers backend.
//!
//! `ApiClient` handles authentication endpoints and the content endpoints
//! the app's screens consume. Content payloads are passed through as
//! opaque JSON; the bearer token is injected from the shared token handle
//! on every request that has one.

pub mod client;
pub mod error;

pub use client::{ApiClient, TokenHandle};
pub use error::ApiError;

//! HTTP client for the Envers REST API.
//!
//! `ApiClient` owns request dispatch: it applies the configured base URL
//! and timeout, sends `Accept: application/json`, and attaches the current
//! bearer token (read from the shared [`TokenHandle`] at request-build
//! time) when one is present. It never retries and never reinterprets a
//! failure; callers get the raw outcome.

use std::sync::{Arc, RwLock};

use anyhow::Result;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::{AuthError, Session, SignupProfile};
use crate::config::Config;

use super::ApiError;

/// Shared cell holding the current bearer token.
///
/// The session manager writes it on login/signup/logout; every client
/// clone reads it just before dispatching a request, so content requests
/// pick up a new session without rebuilding the client.
#[derive(Clone, Default)]
pub struct TokenHandle {
    inner: Arc<RwLock<Option<String>>>,
}

impl TokenHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, token: String) {
        *self.write_lock() = Some(token);
    }

    pub fn clear(&self) {
        *self.write_lock() = None;
    }

    pub fn get(&self) -> Option<String> {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn write_lock(&self) -> std::sync::RwLockWriteGuard<'_, Option<String>> {
        match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// API client for the Envers backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    tokens: TokenHandle,
}

impl ApiClient {
    /// Create a new API client sharing the given token handle.
    pub fn new(config: &Config, tokens: TokenHandle) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            tokens,
        })
    }

    /// The token handle this client reads from.
    pub fn tokens(&self) -> &TokenHandle {
        &self.tokens
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Headers for every outbound request: JSON accept plus the bearer
    /// token when one is currently held.
    fn request_headers(&self) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        if let Some(token) = self.tokens.get() {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ApiError::InvalidResponse(format!("Invalid token header: {}", e)))?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, ApiError> {
        let url = self.url(path);
        debug!(url = %url, "GET");
        let response = self
            .client
            .get(&url)
            .query(query)
            .headers(self.request_headers()?)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Ok(response.json().await?)
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        let url = self.url(path);
        debug!(url = %url, "POST");
        let response = self
            .client
            .post(&url)
            .headers(self.request_headers()?)
            .json(body)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Ok(response.json().await?)
    }

    // ===== Authentication Endpoints =====

    /// Authenticate with email and password, returning the established
    /// session. Does not touch storage or the token handle; that is the
    /// session manager's job.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let url = self.url("/auth/login");
        let body = serde_json::json!({ "email": email, "password": password });

        let response = self.client.post(&url).json(&body).send().await?;
        let payload = Self::check_auth_response(response, "Login failed").await?;
        session_from_payload(payload)
    }

    /// Register a new account, returning the established session.
    pub async fn signup(&self, profile: &SignupProfile) -> Result<Session, AuthError> {
        let url = self.url("/auth/signup");

        let response = self.client.post(&url).json(profile).send().await?;
        let payload = Self::check_auth_response(response, "Signup failed").await?;
        session_from_payload(payload)
    }

    /// Turn a raw auth response into a parsed payload, mapping non-2xx
    /// statuses to [`AuthError::Rejected`] with the server's own message.
    async fn check_auth_response(
        response: reqwest::Response,
        fallback: &str,
    ) -> Result<AuthPayload, AuthError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = rejection_message(&text, fallback);
            warn!(status = %status, "Authentication rejected");
            return Err(AuthError::Rejected { status, message });
        }

        serde_json::from_str(&text).map_err(|e| {
            AuthError::MalformedResponse(format!("Could not parse auth response: {}", e))
        })
    }

    // ===== Content Endpoints =====
    //
    // Payloads pass through unmodified as JSON values; the screens own
    // their interpretation.

    /// Fetch the trending books feed.
    pub async fn trending_books(&self, limit: u32) -> Result<Value, ApiError> {
        self.get("/books/trending", &[("limit", &limit.to_string())])
            .await
    }

    /// Search users by (partial) username.
    pub async fn search_users(&self, query: &str) -> Result<Value, ApiError> {
        self.get("/user", &[("username", query)]).await
    }

    /// Fetch a user's public profile.
    pub async fn user_profile(&self, user_id: &str) -> Result<Value, ApiError> {
        self.get(&format!("/user/profile/{}", user_id), &[]).await
    }

    /// Fetch the current user's conversation list.
    pub async fn conversations(&self) -> Result<Value, ApiError> {
        self.get("/messages/conversations", &[]).await
    }

    /// Fetch the messages of one conversation.
    pub async fn conversation_messages(&self, conversation_id: &str) -> Result<Value, ApiError> {
        self.get(&format!("/conversations/{}/messages", conversation_id), &[])
            .await
    }

    /// Post a message to a conversation.
    pub async fn send_message(
        &self,
        conversation_id: &str,
        message: &Value,
    ) -> Result<Value, ApiError> {
        self.post(&format!("/conversations/{}/messages", conversation_id), message)
            .await
    }

    /// Fetch the reviews for a book.
    pub async fn book_reviews(&self, book_key: &str) -> Result<Value, ApiError> {
        self.get("/reviews/book", &[("bookKey", book_key)]).await
    }

    /// Fetch aggregate review stats for a book.
    pub async fn book_review_stats(&self, book_key: &str) -> Result<Value, ApiError> {
        self.get(&format!("/reviews/book/{}/stats", book_key), &[])
            .await
    }

    /// Fetch the deep-dive articles for a book.
    pub async fn book_deep_dives(&self, book_key: &str) -> Result<Value, ApiError> {
        self.get(&format!("/deepdive/book/{}", book_key), &[]).await
    }

    /// Fetch the excerpts for a book.
    pub async fn book_excerpts(&self, book_key: &str) -> Result<Value, ApiError> {
        self.get(&format!("/excerpt/book/{}", book_key), &[]).await
    }

    /// Submit a review.
    pub async fn post_review(&self, review: &Value) -> Result<Value, ApiError> {
        self.post("/reviews", review).await
    }

    /// Mark a book as a favorite.
    pub async fn add_favorite(&self, favorite: &Value) -> Result<Value, ApiError> {
        self.post("/favorite", favorite).await
    }
}

// Auth response parsing.
//
// The accepted response shapes are fixed: the auth fields either sit at the
// top level (login) or under a `user` wrapper (signup), with the username
// optionally nested under `account`:
//
//   { "token": "...", "_id": "...", "account": { "username": "..." } }
//   { "message": "...", "user": { "token": "...", "_id": "...", ... } }
//
// Anything else is a malformed response, not a shape to probe around.

#[derive(Debug, Deserialize)]
struct AuthPayload {
    #[serde(default)]
    token: Option<String>,
    #[serde(default, rename = "_id")]
    id: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    account: Option<AccountPayload>,
    #[serde(default)]
    user: Option<Box<AuthPayload>>,
}

#[derive(Debug, Deserialize)]
struct AccountPayload {
    #[serde(default)]
    username: Option<String>,
}

/// The single response-to-session mapping. Requires a non-empty token and
/// user id; the username degrades to empty when absent.
fn session_from_payload(payload: AuthPayload) -> Result<Session, AuthError> {
    // Signup wraps the fields under `user`; login puts them at the top.
    let body = match payload.user {
        Some(user) => *user,
        None => payload,
    };

    let token = body
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::MalformedResponse("Response is missing a token".to_string()))?;
    let id = body
        .id
        .filter(|i| !i.is_empty())
        .ok_or_else(|| AuthError::MalformedResponse("Response is missing a user id".to_string()))?;

    let username = body
        .account
        .and_then(|a| a.username)
        .or(body.username)
        .unwrap_or_default();

    Session::new(token, id, username)
        .ok_or_else(|| AuthError::MalformedResponse("Empty token or user id".to_string()))
}

/// Extract a display message from an auth error body: `message` first,
/// then `error`, then the fallback.
fn rejection_message(body: &str, fallback: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error"] {
            if let Some(text) = value.get(key).and_then(Value::as_str) {
                if !text.is_empty() {
                    return text.to_string();
                }
            }
        }
    }
    fallback.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> AuthPayload {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_login_shape_maps_to_session() {
        let payload = parse(r#"{ "token": "abc", "_id": "u1", "account": { "username": "bob" } }"#);
        let session = session_from_payload(payload).unwrap();
        assert_eq!(session.token(), "abc");
        assert_eq!(session.user_id(), "u1");
        assert_eq!(session.username(), "bob");
    }

    #[test]
    fn test_signup_shape_maps_to_session() {
        let payload = parse(
            r#"{ "message": "ok", "user": { "token": "t2", "_id": "u2", "account": { "username": "alice" } } }"#,
        );
        let session = session_from_payload(payload).unwrap();
        assert_eq!(session.token(), "t2");
        assert_eq!(session.user_id(), "u2");
        assert_eq!(session.username(), "alice");
    }

    #[test]
    fn test_top_level_username_is_accepted() {
        let payload = parse(r#"{ "token": "abc", "_id": "u1", "username": "bob" }"#);
        let session = session_from_payload(payload).unwrap();
        assert_eq!(session.username(), "bob");
    }

    #[test]
    fn test_missing_username_degrades_to_empty() {
        let payload = parse(r#"{ "token": "abc", "_id": "u1" }"#);
        let session = session_from_payload(payload).unwrap();
        assert_eq!(session.username(), "");
    }

    #[test]
    fn test_missing_token_is_malformed() {
        let payload = parse(r#"{ "_id": "u1" }"#);
        assert!(matches!(
            session_from_payload(payload),
            Err(AuthError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_empty_token_is_malformed() {
        let payload = parse(r#"{ "token": "", "_id": "u1" }"#);
        assert!(matches!(
            session_from_payload(payload),
            Err(AuthError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_missing_id_is_malformed() {
        let payload = parse(r#"{ "token": "abc" }"#);
        assert!(matches!(
            session_from_payload(payload),
            Err(AuthError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_wrapped_user_missing_token_is_malformed() {
        // A `user` wrapper takes precedence; missing fields inside it are
        // not backfilled from the top level.
        let payload = parse(r#"{ "token": "outer", "_id": "u1", "user": { "_id": "u2" } }"#);
        assert!(matches!(
            session_from_payload(payload),
            Err(AuthError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_rejection_message_prefers_message_field() {
        assert_eq!(
            rejection_message(r#"{ "message": "Invalid credentials" }"#, "Login failed"),
            "Invalid credentials"
        );
        assert_eq!(
            rejection_message(r#"{ "error": "Account disabled" }"#, "Login failed"),
            "Account disabled"
        );
        assert_eq!(rejection_message("not json", "Login failed"), "Login failed");
        assert_eq!(rejection_message(r#"{ "message": "" }"#, "Login failed"), "Login failed");
    }

    #[test]
    fn test_token_handle_set_and_clear() {
        let tokens = TokenHandle::new();
        assert!(tokens.get().is_none());
        tokens.set("abc".to_string());
        assert_eq!(tokens.get().as_deref(), Some("abc"));

        // Clones observe updates through the shared cell
        let clone = tokens.clone();
        clone.clear();
        assert!(tokens.get().is_none());
    }
}

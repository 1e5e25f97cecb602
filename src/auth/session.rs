use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated identity: the bearer token plus the user it belongs to.
///
/// A `Session` always holds a non-empty token and a non-empty user id -
/// partially authenticated sessions cannot be constructed. The username is
/// display-only and may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    user_id: String,
    username: String,
}

impl Session {
    /// Build a session, returning `None` unless both token and user id are
    /// non-empty. An empty string counts as absent.
    pub fn new(
        token: impl Into<String>,
        user_id: impl Into<String>,
        username: impl Into<String>,
    ) -> Option<Self> {
        let token = token.into();
        let user_id = user_id.into();
        if token.is_empty() || user_id.is_empty() {
            return None;
        }
        Some(Self {
            token,
            user_id,
            username: username.into(),
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

/// The serialized form persisted in the credential store.
///
/// The token, user id, and username are written as a single record rather
/// than three separate entries, so a session can never be half-persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub token: String,
    pub user_id: String,
    #[serde(default)]
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(
        token: impl Into<String>,
        user_id: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            user_id: user_id.into(),
            username: username.into(),
            created_at: Utc::now(),
        }
    }

    /// Convert a restored record back into a session. Records with an empty
    /// token or user id are stale or corrupt and yield `None`.
    pub fn into_session(self) -> Option<Session> {
        Session::new(self.token, self.user_id, self.username)
    }
}

impl From<&Session> for SessionRecord {
    fn from(session: &Session) -> Self {
        Self::new(
            session.token.clone(),
            session.user_id.clone(),
            session.username.clone(),
        )
    }
}

/// Where the session manager currently is in its lifecycle.
///
/// `Booting` is entered exactly once, at construction, and left once the
/// stored session has been checked. After that the state only moves between
/// `Unauthenticated` and `Authenticated`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Booting,
    Unauthenticated,
    Authenticated(Session),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    /// True until boot has resolved.
    pub fn is_loading(&self) -> bool {
        matches!(self, AuthState::Booting)
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthState::Authenticated(session) => Some(session),
            _ => None,
        }
    }
}

/// The signup form payload. Optional fields are omitted from the request
/// body entirely when unset.
#[derive(Debug, Clone, Serialize)]
pub struct SignupProfile {
    pub fullname: String,
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

//! The session manager: single source of truth for authentication state.
//!
//! It mediates between the UI, the [`ApiClient`], and the
//! [`CredentialStore`]: `boot` restores a persisted session once per
//! process, `login`/`signup` establish one, `logout` tears it down. The
//! persisted record is always written before the in-memory state flips, so
//! an in-memory session that would not survive a restart can never be
//! observed.
//!
//! Mutating operations take `&mut self`; the borrow checker enforces the
//! rule that at most one of them is in flight at a time. A caller that
//! drops a login future mid-request commits nothing, because nothing is
//! committed until the response has been fully validated and persisted.

use tracing::{debug, info, warn};

use crate::api::ApiClient;

use super::store::CredentialStore;
use super::{AuthError, AuthState, Session, SignupProfile};

pub struct SessionManager<S: CredentialStore> {
    api: ApiClient,
    store: S,
    state: AuthState,
}

impl<S: CredentialStore> SessionManager<S> {
    /// Create a manager in the `Booting` state. Call [`boot`](Self::boot)
    /// before anything else.
    pub fn new(api: ApiClient, store: S) -> Self {
        Self {
            api,
            store,
            state: AuthState::Booting,
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    /// True from construction until `boot` has resolved, false forever
    /// after within this process.
    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    pub fn session(&self) -> Option<&Session> {
        self.state.session()
    }

    /// The client this manager mirrors its token into. Screens clone it
    /// for their own content requests.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Restore a persisted session, if any. Runs its logic exactly once;
    /// later calls are no-ops. Any storage problem falls back to
    /// `Unauthenticated` rather than blocking startup.
    pub fn boot(&mut self) -> &AuthState {
        if !self.state.is_loading() {
            return &self.state;
        }

        self.state = match self.store.load() {
            Ok(Some(record)) => match record.into_session() {
                Some(session) => {
                    info!(user_id = %session.user_id(), "Restored session from credential store");
                    self.api.tokens().set(session.token().to_string());
                    AuthState::Authenticated(session)
                }
                None => {
                    // Incomplete record: token or user id empty
                    warn!("Stored session record is incomplete, discarding");
                    AuthState::Unauthenticated
                }
            },
            Ok(None) => {
                debug!("No stored session");
                AuthState::Unauthenticated
            }
            Err(e) => {
                warn!(error = %e, "Could not read credential store");
                AuthState::Unauthenticated
            }
        };

        &self.state
    }

    /// Log in with email and password.
    ///
    /// On success the session is persisted, the token handle updated, and
    /// the state becomes `Authenticated`. On any failure the state, the
    /// store, and the token handle are exactly as they were before the
    /// call.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<Session, AuthError> {
        validate_login_input(email, password)?;

        let session = self.api.login(email, password).await?;
        self.commit(session.clone())?;
        info!(user_id = %session.user_id(), "Logged in");
        Ok(session)
    }

    /// Create an account and log in as it. Same contract as
    /// [`login`](Self::login).
    pub async fn signup(&mut self, profile: &SignupProfile) -> Result<Session, AuthError> {
        validate_signup_input(profile)?;

        let session = self.api.signup(profile).await?;
        self.commit(session.clone())?;
        info!(user_id = %session.user_id(), "Signed up");
        Ok(session)
    }

    /// Drop the session: clear the in-memory state and token, then the
    /// store. Idempotent, and the in-memory reset happens even when the
    /// store cannot be cleared.
    pub fn logout(&mut self) -> Result<(), AuthError> {
        self.state = AuthState::Unauthenticated;
        self.api.tokens().clear();
        self.store.clear().map_err(AuthError::Store)?;
        info!("Logged out");
        Ok(())
    }

    /// Persist the session, then flip the in-memory state. Storage comes
    /// first: if the write fails nothing changes.
    fn commit(&mut self, session: Session) -> Result<(), AuthError> {
        self.store
            .save(&(&session).into())
            .map_err(AuthError::Store)?;
        self.api.tokens().set(session.token().to_string());
        self.state = AuthState::Authenticated(session);
        Ok(())
    }
}

fn validate_login_input(email: &str, password: &str) -> Result<(), AuthError> {
    if !email.contains('@') {
        return Err(AuthError::Validation(
            "Email must be a valid address".to_string(),
        ));
    }
    if password.is_empty() {
        return Err(AuthError::Validation("Password is required".to_string()));
    }
    Ok(())
}

fn validate_signup_input(profile: &SignupProfile) -> Result<(), AuthError> {
    validate_login_input(&profile.email, &profile.password)?;
    if profile.username.is_empty() {
        return Err(AuthError::Validation("Username is required".to_string()));
    }
    if profile.fullname.is_empty() {
        return Err(AuthError::Validation("Full name is required".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_input_validation() {
        assert!(validate_login_input("user@example.com", "secret1").is_ok());
        assert!(matches!(
            validate_login_input("not-an-email", "secret1"),
            Err(AuthError::Validation(_))
        ));
        assert!(matches!(
            validate_login_input("user@example.com", ""),
            Err(AuthError::Validation(_))
        ));
    }

    #[test]
    fn test_signup_input_validation() {
        let mut profile = SignupProfile {
            fullname: "Bob Loblaw".to_string(),
            username: "bob".to_string(),
            email: "bob@example.com".to_string(),
            password: "secret1".to_string(),
            city: None,
        };
        assert!(validate_signup_input(&profile).is_ok());

        profile.username.clear();
        assert!(matches!(
            validate_signup_input(&profile),
            Err(AuthError::Validation(_))
        ));
    }
}

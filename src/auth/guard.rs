//! Route guard: decides which navigation tree a user should be on.
//!
//! Pure function of the auth state and the route group currently mounted;
//! the navigation layer executes the decision.

use super::AuthState;

/// The two navigation trees the app mounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteGroup {
    /// Login and signup screens
    Auth,
    /// The authenticated tab tree
    Main,
}

/// What the navigation layer should do right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Boot has not resolved; show the loading indicator and do nothing.
    Wait,
    /// The current tree matches the auth state.
    Stay,
    RedirectToLogin,
    RedirectToMain,
}

/// Decide where the user belongs given the current auth state and the
/// route group they are on.
pub fn decide(state: &AuthState, current: RouteGroup) -> GuardDecision {
    match (state, current) {
        (AuthState::Booting, _) => GuardDecision::Wait,
        (AuthState::Unauthenticated, RouteGroup::Main) => GuardDecision::RedirectToLogin,
        (AuthState::Unauthenticated, RouteGroup::Auth) => GuardDecision::Stay,
        (AuthState::Authenticated(_), RouteGroup::Auth) => GuardDecision::RedirectToMain,
        (AuthState::Authenticated(_), RouteGroup::Main) => GuardDecision::Stay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Session;

    fn authenticated() -> AuthState {
        AuthState::Authenticated(Session::new("abc", "u1", "bob").unwrap())
    }

    #[test]
    fn test_booting_always_waits() {
        assert_eq!(decide(&AuthState::Booting, RouteGroup::Auth), GuardDecision::Wait);
        assert_eq!(decide(&AuthState::Booting, RouteGroup::Main), GuardDecision::Wait);
    }

    #[test]
    fn test_unauthenticated_is_kept_out_of_main() {
        assert_eq!(
            decide(&AuthState::Unauthenticated, RouteGroup::Main),
            GuardDecision::RedirectToLogin
        );
        assert_eq!(
            decide(&AuthState::Unauthenticated, RouteGroup::Auth),
            GuardDecision::Stay
        );
    }

    #[test]
    fn test_authenticated_is_kept_out_of_auth_screens() {
        assert_eq!(
            decide(&authenticated(), RouteGroup::Auth),
            GuardDecision::RedirectToMain
        );
        assert_eq!(decide(&authenticated(), RouteGroup::Main), GuardDecision::Stay);
    }
}

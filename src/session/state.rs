use crate::session::{Principal, Profile, Role};

/// Snapshot of the authentication state owned by the session store.
///
/// Everything outside the store reads snapshots and never mutates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub principal: Principal,
    pub profile: Option<Profile>,
    /// True only while the initial session restoration is in flight.
    pub auth_loading: bool,
    pub profile_loading: bool,
    /// The profile fetch deadline expired without a committed profile.
    pub profile_unavailable: bool,
}

impl SessionState {
    pub(crate) fn initial() -> Self {
        Self {
            principal: Principal::Anonymous,
            profile: None,
            auth_loading: true,
            profile_loading: false,
            profile_unavailable: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.profile.as_ref().map(|p| p.role), Some(Role::Admin))
    }

    /// Known unauthenticated, or authenticated with the profile committed.
    pub fn is_ready(&self) -> bool {
        if !self.is_authenticated() {
            return true;
        }
        self.profile.is_some() && !self.profile_loading
    }
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::User;

    fn user() -> User {
        User {
            id: "u-1".into(),
            email: "a@x.com".into(),
        }
    }

    #[test]
    fn initial_state_is_loading_and_anonymous() {
        let state = SessionState::initial();

        assert!(state.auth_loading);
        assert!(!state.is_authenticated());
        assert!(state.profile.is_none());
    }

    #[test]
    fn anonymous_is_trivially_ready() {
        let state = SessionState {
            auth_loading: false,
            ..SessionState::initial()
        };

        assert!(state.is_ready());
        assert!(!state.is_admin());
    }

    #[test]
    fn authenticated_without_profile_is_not_ready() {
        let state = SessionState {
            principal: Principal::User(user()),
            profile: None,
            auth_loading: false,
            profile_loading: true,
            profile_unavailable: false,
        };

        assert!(!state.is_ready());
    }

    #[test]
    fn authenticated_with_profile_is_ready() {
        let state = SessionState {
            principal: Principal::User(user()),
            profile: Some(Profile {
                id: "u-1".into(),
                display_name: "Ada".into(),
                role: Role::Admin,
            }),
            auth_loading: false,
            profile_loading: false,
            profile_unavailable: false,
        };

        assert!(state.is_ready());
        assert!(state.is_admin());
    }
}

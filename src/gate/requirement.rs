/// Access requirement a protected view declares to the gate.
///
/// `fallback` marks that the view brings its own unauthenticated content, in
/// which case an unauthenticated state renders that instead of redirecting
/// to the login route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Requirement {
    pub require_admin: bool,
    pub require_applicant: bool,
    pub fallback: bool,
}

impl Requirement {
    /// Any authenticated principal, no role constraint.
    pub fn authenticated() -> Self {
        Self::default()
    }

    pub fn admin_only() -> Self {
        Self {
            require_admin: true,
            ..Self::default()
        }
    }

    pub fn applicant_only() -> Self {
        Self {
            require_applicant: true,
            ..Self::default()
        }
    }

    pub fn with_fallback(mut self) -> Self {
        self.fallback = true;
        self
    }
}

use crate::gate::decision::{route, Decision, RenderTarget};
use crate::gate::Requirement;
use crate::session::SessionState;

/// Decide what a protected view may show for the given state snapshot.
///
/// Pure and side effect free, so any number of views can evaluate the same
/// snapshot concurrently. The checks run in this exact order; in particular
/// an authenticated principal whose profile is still loading must wait
/// before any role check, otherwise a denied redirect would fire against a
/// role that has not arrived yet.
pub fn decide(state: &SessionState, requirement: &Requirement) -> Decision {
    if state.auth_loading {
        return Decision::Wait;
    }

    if !state.is_authenticated() {
        return if requirement.fallback {
            Decision::Render(RenderTarget::Fallback)
        } else {
            Decision::Redirect(route::LOGIN)
        };
    }

    if state.profile_unavailable {
        return Decision::Unavailable;
    }

    if !state.is_ready() {
        return Decision::Wait;
    }

    if requirement.require_applicant && state.is_admin() {
        return Decision::Redirect(route::ADMIN);
    }
    if requirement.require_admin && !state.is_admin() {
        return Decision::Redirect(route::HOME);
    }

    Decision::Render(RenderTarget::Children)
}

/// Performs the navigation a gate decided on.
///
/// Kept separate from [`decide`] so deciding to redirect and mutating
/// navigation state are distinct steps.
pub trait Navigator {
    fn navigate(&mut self, path: &'static str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStatus {
    /// No state snapshot observed yet.
    Init,
    Waiting,
    /// Navigation scheduled, view shows a plain redirect indicator.
    Redirecting(&'static str),
    /// Role requirement failed on a ready state; the view shows the denial
    /// message plus a note that redirection is imminent.
    DeniedTransient(&'static str),
    Rendered(RenderTarget),
    Unavailable,
}

/// Per view state machine driving [`decide`] over a stream of snapshots.
pub struct Gate {
    requirement: Requirement,
    status: GateStatus,
}

impl Gate {
    pub fn new(requirement: Requirement) -> Self {
        Self {
            requirement,
            status: GateStatus::Init,
        }
    }

    pub fn status(&self) -> GateStatus {
        self.status
    }

    /// React to a state snapshot. Navigation is scheduled through the
    /// navigator at most once per target path.
    pub fn observe(
        &mut self,
        state: &SessionState,
        navigator: &mut impl Navigator,
    ) -> GateStatus {
        self.status = match decide(state, &self.requirement) {
            Decision::Wait => GateStatus::Waiting,
            Decision::Render(target) => GateStatus::Rendered(target),
            Decision::Unavailable => GateStatus::Unavailable,
            Decision::Redirect(path) => match self.status {
                GateStatus::Redirecting(scheduled) | GateStatus::DeniedTransient(scheduled)
                    if scheduled == path =>
                {
                    self.status
                }
                _ => {
                    navigator.navigate(path);
                    if state.is_ready() && state.is_authenticated() {
                        GateStatus::DeniedTransient(path)
                    } else {
                        GateStatus::Redirecting(path)
                    }
                }
            },
        };

        self.status
    }

    /// The navigator finished the scheduled navigation; the protected view
    /// is gone and the gate resets.
    pub fn navigation_complete(&mut self) {
        if matches!(
            self.status,
            GateStatus::Redirecting(_) | GateStatus::DeniedTransient(_)
        ) {
            self.status = GateStatus::Init;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Principal, Profile, Role, User};

    #[derive(Default)]
    struct RecordingNavigator {
        navigations: Vec<&'static str>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&mut self, path: &'static str) {
            self.navigations.push(path);
        }
    }

    fn anonymous() -> SessionState {
        SessionState {
            auth_loading: false,
            ..SessionState::default()
        }
    }

    fn loading_profile(role_holder_id: &str) -> SessionState {
        SessionState {
            principal: Principal::User(User {
                id: role_holder_id.into(),
                email: "a@x.com".into(),
            }),
            profile: None,
            auth_loading: false,
            profile_loading: true,
            profile_unavailable: false,
        }
    }

    fn ready(role: Role) -> SessionState {
        SessionState {
            principal: Principal::User(User {
                id: "u-1".into(),
                email: "a@x.com".into(),
            }),
            profile: Some(Profile {
                id: "u-1".into(),
                display_name: "Ada".into(),
                role,
            }),
            auth_loading: false,
            profile_loading: false,
            profile_unavailable: false,
        }
    }

    #[test]
    fn auth_loading_always_waits() {
        let state = SessionState::default();
        assert!(state.auth_loading);

        for requirement in [
            Requirement::authenticated(),
            Requirement::admin_only(),
            Requirement::applicant_only(),
            Requirement::authenticated().with_fallback(),
        ] {
            assert_eq!(decide(&state, &requirement), Decision::Wait);
        }
    }

    #[test]
    fn unauthenticated_redirects_to_login() {
        assert_eq!(
            decide(&anonymous(), &Requirement::authenticated()),
            Decision::Redirect(route::LOGIN)
        );
    }

    #[test]
    fn unauthenticated_with_fallback_renders_fallback() {
        assert_eq!(
            decide(&anonymous(), &Requirement::authenticated().with_fallback()),
            Decision::Render(RenderTarget::Fallback)
        );
    }

    #[test]
    fn profile_in_flight_waits_never_renders_or_redirects() {
        let state = loading_profile("u-1");

        assert_eq!(decide(&state, &Requirement::admin_only()), Decision::Wait);
        assert_eq!(
            decide(&state, &Requirement::applicant_only()),
            Decision::Wait
        );
    }

    #[test]
    fn applicant_on_admin_view_redirects_home() {
        assert_eq!(
            decide(&ready(Role::Applicant), &Requirement::admin_only()),
            Decision::Redirect(route::HOME)
        );
    }

    #[test]
    fn admin_on_applicant_view_redirects_to_admin() {
        assert_eq!(
            decide(&ready(Role::Admin), &Requirement::applicant_only()),
            Decision::Redirect(route::ADMIN)
        );
    }

    #[test]
    fn no_role_constraint_renders_for_any_ready_principal() {
        for role in [Role::Admin, Role::Applicant, Role::Reviewer] {
            assert_eq!(
                decide(&ready(role), &Requirement::authenticated()),
                Decision::Render(RenderTarget::Children)
            );
        }
    }

    #[test]
    fn reviewer_passes_applicant_requirement() {
        // Only admins are steered away from applicant views.
        assert_eq!(
            decide(&ready(Role::Reviewer), &Requirement::applicant_only()),
            Decision::Render(RenderTarget::Children)
        );
    }

    #[test]
    fn expired_profile_deadline_is_unavailable_not_wait() {
        let state = SessionState {
            profile_loading: false,
            profile_unavailable: true,
            ..loading_profile("u-1")
        };

        assert_eq!(
            decide(&state, &Requirement::authenticated()),
            Decision::Unavailable
        );
    }

    #[test]
    fn role_mismatch_goes_denied_transient_until_navigation_completes() {
        let mut gate = Gate::new(Requirement::admin_only());
        let mut navigator = RecordingNavigator::default();

        assert_eq!(gate.status(), GateStatus::Init);

        gate.observe(&SessionState::default(), &mut navigator);
        assert_eq!(gate.status(), GateStatus::Waiting);
        assert!(navigator.navigations.is_empty());

        gate.observe(&ready(Role::Applicant), &mut navigator);
        assert_eq!(gate.status(), GateStatus::DeniedTransient(route::HOME));
        assert_eq!(navigator.navigations, vec![route::HOME]);

        // Re-observing the same snapshot must not schedule a second
        // navigation.
        gate.observe(&ready(Role::Applicant), &mut navigator);
        assert_eq!(navigator.navigations, vec![route::HOME]);

        gate.navigation_complete();
        assert_eq!(gate.status(), GateStatus::Init);
    }

    #[test]
    fn unauthenticated_gate_redirects_without_denial_message() {
        let mut gate = Gate::new(Requirement::authenticated());
        let mut navigator = RecordingNavigator::default();

        gate.observe(&anonymous(), &mut navigator);

        assert_eq!(gate.status(), GateStatus::Redirecting(route::LOGIN));
        assert_eq!(navigator.navigations, vec![route::LOGIN]);
    }
}

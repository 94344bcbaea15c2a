use crate::model::Me;

/// Process-wide sign-in state, passed to whatever owns it rather than held
/// in a global. Initialized empty (or from a persisted token), updated on
/// sign-in and sign-out.
#[derive(Debug, Default)]
pub struct Session {
    token: Option<String>,
    me: Option<Me>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a previously persisted token; the account snapshot is
    /// refetched separately.
    pub fn restore(token: String) -> Self {
        Self {
            token: Some(token),
            me: None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn me(&self) -> Option<&Me> {
        self.me.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Signed in but no profile created yet.
    pub fn needs_onboarding(&self) -> bool {
        matches!(&self.me, Some(me) if me.profile.is_none())
    }

    pub fn sign_in(&mut self, token: String, me: Me) {
        self.token = Some(token);
        self.me = Some(me);
    }

    pub fn set_me(&mut self, me: Me) {
        self.me = Some(me);
    }

    pub fn sign_out(&mut self) {
        self.token = None;
        self.me = None;
    }
}

/// Fires the redirect to profile creation exactly once while it is in
/// flight, so a re-render during navigation cannot loop.
#[derive(Debug, Default)]
pub struct OnboardingGuard {
    in_flight: bool,
}

impl OnboardingGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// True exactly once per onboarding episode; callers navigate to the
    /// profile-creation screen when they see it.
    pub fn should_redirect(&mut self, session: &Session) -> bool {
        if session.needs_onboarding() && !self.in_flight {
            self.in_flight = true;
            true
        } else {
            false
        }
    }

    /// Call when the redirect target has been reached (or onboarding
    /// finished) so a later episode can redirect again.
    pub fn complete(&mut self) {
        self.in_flight = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Me, Principal, Profile};
    use chrono::Utc;
    use uuid::Uuid;

    fn me_without_profile() -> Me {
        Me {
            principal: Principal {
                id: Uuid::new_v4(),
                email: "alice@example.com".into(),
            },
            profile: None,
        }
    }

    fn me_with_profile() -> Me {
        Me {
            profile: Some(Profile {
                id: Uuid::new_v4(),
                handle: "alice".into(),
                bio: String::new(),
                social_links: Default::default(),
                avatar_url: None,
                created_at: Utc::now(),
            }),
            ..me_without_profile()
        }
    }

    #[test]
    fn sign_out_clears_everything() {
        let mut session = Session::new();
        session.sign_in("token".into(), me_with_profile());
        assert!(session.is_authenticated());

        session.sign_out();
        assert!(!session.is_authenticated());
        assert!(session.me().is_none());
        assert!(!session.needs_onboarding());
    }

    #[test]
    fn onboarding_is_only_flagged_without_a_profile() {
        let mut session = Session::new();
        assert!(!session.needs_onboarding());

        session.sign_in("token".into(), me_without_profile());
        assert!(session.needs_onboarding());

        session.set_me(me_with_profile());
        assert!(!session.needs_onboarding());
    }

    #[test]
    fn redirect_fires_once_while_in_flight() {
        let mut session = Session::new();
        session.sign_in("token".into(), me_without_profile());

        let mut guard = OnboardingGuard::new();
        assert!(guard.should_redirect(&session));
        // re-render mid-navigation: no second redirect
        assert!(!guard.should_redirect(&session));
        assert!(!guard.should_redirect(&session));
    }

    #[test]
    fn guard_resets_for_a_new_episode() {
        let mut session = Session::new();
        session.sign_in("token".into(), me_without_profile());

        let mut guard = OnboardingGuard::new();
        assert!(guard.should_redirect(&session));
        guard.complete();

        // profile now exists: nothing to do even though the guard reset
        session.set_me(me_with_profile());
        assert!(!guard.should_redirect(&session));
    }

    #[test]
    fn anonymous_sessions_never_redirect() {
        let session = Session::new();
        let mut guard = OnboardingGuard::new();
        assert!(!guard.should_redirect(&session));
    }
}

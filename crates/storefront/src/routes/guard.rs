//! Route guard.

use super::Route;
use crate::services::auth::SessionState;

/// Outcome of a guarded navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// The session is still resolving; show a loading indicator.
    Loading,
    /// Not signed in.
    RedirectToLogin,
    /// Signed in without the required role.
    RedirectHome,
    /// Show the view.
    Granted,
}

impl Access {
    /// Where to send the user instead, if anywhere.
    #[must_use]
    pub fn redirect(self) -> Option<Route> {
        match self {
            Self::RedirectToLogin => Some(Route::Login),
            Self::RedirectHome => Some(Route::Home),
            Self::Loading | Self::Granted => None,
        }
    }
}

/// Decide whether `route` may be shown in `session`.
#[must_use]
pub fn authorize(route: &Route, session: &SessionState) -> Access {
    if !route.requires_auth() {
        return Access::Granted;
    }
    match session {
        SessionState::Unresolved | SessionState::Resolving => Access::Loading,
        SessionState::Unauthenticated => Access::RedirectToLogin,
        SessionState::Resolved(user) if route.requires_admin() && !user.is_admin() => {
            Access::RedirectHome
        }
        SessionState::Resolved(_) => Access::Granted,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use devmart_core::{Email, OrderId, UserId, UserRole};

    use super::*;
    use crate::api::User;

    fn user(role: UserRole) -> User {
        User {
            id: UserId::new(1),
            username: "ana".into(),
            email: Email::parse("ana@example.com").unwrap(),
            role,
            created_at: None,
        }
    }

    #[test]
    fn test_public_routes_always_granted() {
        for state in [SessionState::Resolving, SessionState::Unauthenticated] {
            assert_eq!(authorize(&Route::Products, &state), Access::Granted);
        }
    }

    #[test]
    fn test_loading_while_resolving() {
        assert_eq!(
            authorize(&Route::Orders, &SessionState::Resolving),
            Access::Loading
        );
        assert_eq!(
            authorize(&Route::Checkout, &SessionState::Unresolved),
            Access::Loading
        );
    }

    #[test]
    fn test_unauthenticated_redirects_to_login() {
        let access = authorize(&Route::Order(OrderId::new(3)), &SessionState::Unauthenticated);
        assert_eq!(access, Access::RedirectToLogin);
        assert_eq!(access.redirect(), Some(Route::Login));
    }

    #[test]
    fn test_admin_requires_role() {
        let customer = SessionState::Resolved(user(UserRole::User));
        let access = authorize(&Route::Admin, &customer);
        assert_eq!(access, Access::RedirectHome);
        assert_eq!(access.redirect(), Some(Route::Home));
        assert_eq!(authorize(&Route::Profile, &customer), Access::Granted);

        let admin = SessionState::Resolved(user(UserRole::Admin));
        assert_eq!(authorize(&Route::Admin, &admin), Access::Granted);
    }
}

//! Session gating between the public catalog, the login view and the
//! admin dashboard.

use chrono::{DateTime, Utc};

use crate::auth::{AuthError, Session};

/// Views of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Public catalog.
    Home,
    /// Admin login form.
    Login,
    /// Admin dashboard.
    Dashboard,
}

impl Route {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => "/admin",
            Self::Dashboard => "/dashboard",
        }
    }

    /// Route for a path; unknown paths fall back to the catalog.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "/admin" | "admin" => Self::Login,
            "/dashboard" | "dashboard" => Self::Dashboard,
            _ => Self::Home,
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Where a request for `requested` actually lands.
///
/// Signed-out visitors are sent from the dashboard to the login view, and
/// signed-in admins skip the login view.
#[must_use]
pub fn resolve_route(requested: Route, session: Option<&Session>) -> Route {
    resolve_route_at(requested, session, Utc::now())
}

/// [`resolve_route`] evaluated at a fixed instant. Expired sessions count as
/// signed out.
#[must_use]
pub fn resolve_route_at(
    requested: Route,
    session: Option<&Session>,
    now: DateTime<Utc>,
) -> Route {
    let signed_in = session.is_some_and(|s| !s.is_expired_at(now));
    match (requested, signed_in) {
        (Route::Dashboard, false) => Route::Login,
        (Route::Login, true) => Route::Dashboard,
        (route, _) => route,
    }
}

/// The session, if it may open the dashboard.
///
/// # Errors
///
/// Returns [`AuthError::SignInRequired`] when there is no active session.
pub fn require_admin(session: Option<&Session>) -> Result<&Session, AuthError> {
    session
        .filter(|s| s.is_active())
        .ok_or(AuthError::SignInRequired)
}

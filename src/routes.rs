use serde::{Deserialize, Serialize};

/// The navigation surface the core consumes: one public login route and the
/// protected admin views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    #[default]
    Login,
    Dashboard,
    Map,
    Reports,
}

impl Route {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/auth/login",
            Self::Dashboard => "/dashboard",
            Self::Map => "/map",
            Self::Reports => "/reports",
        }
    }

    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        match path.trim_end_matches('/') {
            "/auth/login" => Some(Self::Login),
            "/dashboard" | "" => Some(Self::Dashboard),
            "/map" => Some(Self::Map),
            "/reports" => Some(Self::Reports),
            _ => None,
        }
    }

    #[must_use]
    pub const fn requires_auth(self) -> bool {
        !matches!(self, Self::Login)
    }
}

/// Guard decision for one navigation attempt, taken synchronously from the
/// session state at the moment of the attempt:
/// a protected destination without a token bounces to login, and an
/// authenticated session asking for login bounces to the landing view.
#[must_use]
pub fn resolve_navigation(to: Route, authenticated: bool) -> Route {
    if to.requires_auth() && !authenticated {
        Route::Login
    } else if to == Route::Login && authenticated {
        Route::Dashboard
    } else {
        to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protected_routes_require_auth() {
        assert!(!Route::Login.requires_auth());
        assert!(Route::Dashboard.requires_auth());
        assert!(Route::Map.requires_auth());
        assert!(Route::Reports.requires_auth());
    }

    #[test]
    fn unauthenticated_navigation_bounces_to_login() {
        for to in [Route::Dashboard, Route::Map, Route::Reports] {
            assert_eq!(resolve_navigation(to, false), Route::Login);
        }
        assert_eq!(resolve_navigation(Route::Login, false), Route::Login);
    }

    #[test]
    fn authenticated_login_attempt_bounces_to_dashboard() {
        assert_eq!(resolve_navigation(Route::Login, true), Route::Dashboard);
    }

    #[test]
    fn authenticated_navigation_passes_through() {
        for to in [Route::Dashboard, Route::Map, Route::Reports] {
            assert_eq!(resolve_navigation(to, true), to);
        }
    }

    #[test]
    fn paths_round_trip() {
        for route in [Route::Login, Route::Dashboard, Route::Map, Route::Reports] {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
        assert_eq!(Route::from_path("/nope"), None);
        assert_eq!(Route::from_path("/"), Some(Route::Dashboard));
    }
}

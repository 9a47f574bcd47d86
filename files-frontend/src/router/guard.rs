use crate::auth::AuthStateProvider;
use crate::router::{Location, RouteDescriptor};

pub const LOGIN_PATH: &str = "/login";

/// Query key carrying the originally requested location to the login page.
pub const REDIRECT_QUERY_KEY: &str = "redirect";

/// A single navigation attempt.
///
/// The guard takes the intent by value and always returns an outcome, so an
/// intent is resolved exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationIntent {
    pub to: Location,
    pub from: Option<Location>,
}

impl NavigationIntent {
    pub fn new(to: Location, from: Option<Location>) -> Self {
        Self { to, from }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GuardOutcome {
    /// Proceed to the requested location unchanged.
    Allowed(Location),
    /// Navigate here instead.
    Redirected(Location),
}

impl GuardOutcome {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardOutcome::Allowed(_))
    }

    pub fn location(&self) -> &Location {
        match self {
            GuardOutcome::Allowed(location) | GuardOutcome::Redirected(location) => location,
        }
    }
}

/// Decides whether a navigation may proceed.
#[derive(Debug, Clone)]
pub struct NavigationGuard {
    login_path: String,
}

impl Default for NavigationGuard {
    fn default() -> Self {
        Self::new(LOGIN_PATH)
    }
}

impl NavigationGuard {
    pub fn new(login_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
        }
    }

    /// Resolve `intent` against the already-resolved target `route`.
    ///
    /// Routes that require authentication redirect to the login page when
    /// `auth` does not report a signed-in user; the original full path rides
    /// along in the `redirect` query parameter. Everything else is allowed.
    pub fn evaluate(
        &self,
        intent: NavigationIntent,
        route: Option<&RouteDescriptor>,
        auth: &dyn AuthStateProvider,
    ) -> GuardOutcome {
        let requires_auth = route.is_some_and(|route| route.requires_auth);

        if requires_auth && !auth.is_authenticated() {
            let login = Location::new(self.login_path.clone())
                .with_query(REDIRECT_QUERY_KEY, intent.to.full_path());

            tracing::debug!(
                to = %intent.to,
                from = ?intent.from.as_ref().map(Location::full_path),
                "Navigation requires sign-in"
            );

            GuardOutcome::Redirected(login)
        } else {
            GuardOutcome::Allowed(intent.to)
        }
    }
}

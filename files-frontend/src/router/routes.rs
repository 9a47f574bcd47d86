use crate::router::Location;

/// Views the application can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Public,
    Upload,
    Dashboard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub path: &'static str,
    pub view: View,
    pub requires_auth: bool,
}

#[derive(Debug, Clone)]
enum RouteRecord {
    View(RouteDescriptor),
    Redirect {
        path: &'static str,
        to: &'static str,
    },
}

impl RouteRecord {
    fn path(&self) -> &'static str {
        match self {
            RouteRecord::View(route) => route.path,
            RouteRecord::Redirect { path, .. } => path,
        }
    }
}

/// Outcome of matching a location against the table.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRoute<'a> {
    /// Location after redirect records have been applied.
    pub location: Location,
    /// Matched view route, `None` for paths the table does not know.
    pub route: Option<&'a RouteDescriptor>,
    /// Whether a redirect record changed the location.
    pub redirected: bool,
}

/// Redirect chains longer than this are treated as cycles.
const MAX_REDIRECTS: usize = 8;

/// Static route table. Built once at startup and read-only afterwards.
#[derive(Debug, Clone)]
pub struct RouteTable {
    records: Vec<RouteRecord>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
            .route("/login", View::Login, false)
            .route("/public", View::Public, false)
            .route("/upload", View::Upload, true)
            .route("/dashboard", View::Dashboard, true)
            .redirect("/", "/public")
    }
}

impl RouteTable {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub fn route(mut self, path: &'static str, view: View, requires_auth: bool) -> Self {
        self.records.push(RouteRecord::View(RouteDescriptor {
            path,
            view,
            requires_auth,
        }));
        self
    }

    pub fn redirect(mut self, path: &'static str, to: &'static str) -> Self {
        self.records.push(RouteRecord::Redirect { path, to });
        self
    }

    /// View routes in declaration order.
    pub fn routes(&self) -> impl Iterator<Item = &RouteDescriptor> {
        self.records.iter().filter_map(|record| match record {
            RouteRecord::View(route) => Some(route),
            RouteRecord::Redirect { .. } => None,
        })
    }

    /// Paths match exactly, the same way the HTTP router matches them.
    fn find(&self, path: &str) -> Option<&RouteRecord> {
        self.records.iter().find(|record| record.path() == path)
    }

    /// Apply redirect records to `location` and match the result.
    ///
    /// The query survives redirects. A redirect chain that does not settle
    /// within a few hops resolves to no route at the original location.
    pub fn resolve(&self, location: &Location) -> ResolvedRoute<'_> {
        let mut current = location.clone();

        for _ in 0..=MAX_REDIRECTS {
            match self.find(current.path()) {
                Some(RouteRecord::Redirect { to, .. }) => {
                    current = current.with_path(*to);
                }
                Some(RouteRecord::View(route)) => {
                    let redirected = current.path() != location.path();
                    return ResolvedRoute {
                        location: current,
                        route: Some(route),
                        redirected,
                    };
                }
                None => {
                    let redirected = current.path() != location.path();
                    return ResolvedRoute {
                        location: current,
                        route: None,
                        redirected,
                    };
                }
            }
        }

        tracing::warn!(path = %location.path(), "Redirect chain did not settle");
        ResolvedRoute {
            location: location.clone(),
            route: None,
            redirected: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(path: &str) -> (String, Option<View>, bool) {
        let table = RouteTable::default();
        let resolved = table.resolve(&Location::parse(path));
        (
            resolved.location.full_path(),
            resolved.route.map(|r| r.view),
            resolved.redirected,
        )
    }

    #[test]
    fn default_table_protects_upload_and_dashboard() {
        let table = RouteTable::default();
        let protected: Vec<_> = table
            .routes()
            .filter(|r| r.requires_auth)
            .map(|r| r.path)
            .collect();
        assert_eq!(protected, vec!["/upload", "/dashboard"]);
    }

    #[test]
    fn root_redirects_to_public() {
        assert_eq!(resolve("/"), ("/public".to_string(), Some(View::Public), true));
    }

    #[test]
    fn redirect_keeps_query() {
        assert_eq!(
            resolve("/?ref=mail"),
            ("/public?ref=mail".to_string(), Some(View::Public), true)
        );
    }

    #[test]
    fn matches_views_directly() {
        assert_eq!(resolve("/upload"), ("/upload".to_string(), Some(View::Upload), false));
        assert_eq!(resolve("/login"), ("/login".to_string(), Some(View::Login), false));
    }

    #[test]
    fn matching_is_exact() {
        assert_eq!(resolve("/dashboard/"), ("/dashboard/".to_string(), None, false));
        assert_eq!(resolve("/Upload"), ("/Upload".to_string(), None, false));
        assert_eq!(resolve("/Public").1, None);
    }

    #[test]
    fn unknown_path_has_no_route() {
        assert_eq!(resolve("/health"), ("/health".to_string(), None, false));
    }

    #[test]
    fn redirect_cycle_resolves_to_nothing() {
        let table = RouteTable::new().redirect("/a", "/b").redirect("/b", "/a");
        let resolved = table.resolve(&Location::new("/a"));

        assert_eq!(resolved.route, None);
        assert_eq!(resolved.location.path(), "/a");
        assert!(!resolved.redirected);
    }

    #[test]
    fn redirect_to_unknown_path_reports_redirect() {
        let table = RouteTable::new().redirect("/old", "/gone");
        let resolved = table.resolve(&Location::new("/old"));

        assert_eq!(resolved.route, None);
        assert_eq!(resolved.location.path(), "/gone");
        assert!(resolved.redirected);
    }
}

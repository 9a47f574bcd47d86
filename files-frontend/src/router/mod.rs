//! Route table and navigation guard.
//!
//! Every request for a page is treated as a navigation: the path is first
//! resolved through the [`RouteTable`] (which applies redirect records), and
//! the resolved route is then handed to the [`NavigationGuard`] together with
//! the caller's authentication state.

pub mod guard;
pub mod location;
pub mod routes;

pub use guard::{GuardOutcome, NavigationGuard, NavigationIntent, LOGIN_PATH, REDIRECT_QUERY_KEY};
pub use location::Location;
pub use routes::{ResolvedRoute, RouteDescriptor, RouteTable, View};

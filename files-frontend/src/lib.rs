pub mod auth;
pub mod backend;
pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod router;
pub mod startup;

use backend::BackendProject;
use router::{NavigationGuard, RouteTable};
use std::sync::Arc;

/// Shared application state: the backend project and the navigation setup.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<BackendProject>,
    pub routes: Arc<RouteTable>,
    pub guard: Arc<NavigationGuard>,
}

impl AppState {
    /// State with the application's route table and default guard.
    pub fn new(backend: Arc<BackendProject>) -> Self {
        Self {
            backend,
            routes: Arc::new(RouteTable::default()),
            guard: Arc::new(NavigationGuard::default()),
        }
    }
}

//! Authentication collaborator: who is signed in, and how they got there.

pub mod identity;
pub mod session;
pub mod state;

pub use identity::IdentityClient;
pub use session::{AuthSession, CurrentUser};
pub use state::{AuthState, AuthStateProvider};

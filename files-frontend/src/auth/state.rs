use crate::models::SignedInUser;

/// Answers "is a user signed in right now?" from cached state, without I/O.
pub trait AuthStateProvider {
    fn is_authenticated(&self) -> bool;
}

/// Authentication state of one browser session.
///
/// Starts out as `Initializing` until the session store has been consulted.
/// Only `SignedIn` counts as authenticated, so an unknown state is treated
/// like a signed-out one.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AuthState {
    #[default]
    Initializing,
    SignedOut,
    SignedIn(SignedInUser),
}

impl AuthState {
    pub fn user(&self) -> Option<&SignedInUser> {
        match self {
            AuthState::SignedIn(user) => Some(user),
            _ => None,
        }
    }
}

impl AuthStateProvider for AuthState {
    fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::SignedIn(_))
    }
}

impl AuthStateProvider for bool {
    fn is_authenticated(&self) -> bool {
        *self
    }
}

use serde::{Deserialize, Serialize};

/// A user signed in through the identity service, as kept in the session.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SignedInUser {
    pub uid: String,
    pub email: String,
    pub id_token: String,
    pub refresh_token: String,
}

impl SignedInUser {
    /// Local part of the email, used as a display name.
    pub fn display_name(&self) -> &str {
        self.email.split('@').next().unwrap_or("User")
    }
}

//! Credential verification interface.

use super::{error::AuthError, value_object::UserId};

/// Identity recovered from a verified credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub role: String,
}

/// Verifies bearer credentials issued to clients.
///
/// Used by the REST endpoints and, in token identity mode, by the WebSocket
/// upgrade handler.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}

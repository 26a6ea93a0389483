//! UseCase error types.

use thiserror::Error;

use crate::domain::{AuthError, ClientIdError, RepositoryError, UserId, UserIdError};

/// Upgrade-time identity failure. Nothing has been registered when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("missing userID query parameter")]
    MissingUserId,
    #[error("missing token query parameter")]
    MissingToken,
    #[error("invalid user id: {0}")]
    InvalidUserId(#[from] ClientIdError),
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] AuthError),
}

/// Failure to relay one inbound frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("malformed frame: {0}")]
    MalformedFrame(String),
    #[error("invalid receiver: {0}")]
    InvalidReceiver(UserIdError),
    #[error("invalid sender: {0}")]
    InvalidSender(UserIdError),
    #[error("failed to persist message: {0}")]
    PersistenceFailed(#[from] RepositoryError),
    #[error("failed to encode message: {0}")]
    EncodeFailed(String),
}

impl RelayError {
    /// Whether the same frame might be relayed successfully later.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::PersistenceFailed(e) => e.is_transient(),
            _ => false,
        }
    }
}

/// Conversation query failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversationError {
    #[error("user {0} not found")]
    UserNotFound(UserId),
    #[error("repository error: {0}")]
    RepositoryError(String),
}

impl From<RepositoryError> for ConversationError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::UserNotFound(user_id) => Self::UserNotFound(user_id),
            other => Self::RepositoryError(other.to_string()),
        }
    }
}

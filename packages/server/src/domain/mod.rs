//! Domain layer: value objects, entities and the collaborator interfaces the
//! relay depends on.
//!
//! Concrete implementations live in the infrastructure layer.

pub mod auth;
pub mod entity;
pub mod error;
pub mod registry;
pub mod repository;
pub mod value_object;

pub use auth::{AuthenticatedUser, TokenVerifier};
pub use entity::{ConversationSummary, NewMessage, Principal, StoredMessage};
pub use error::{AuthError, ClientIdError, MessagePushError, RepositoryError, UserIdError};
pub use registry::{ConnectionHandle, ConnectionRegistry, Outbound};
pub use repository::{MessageRepository, UserRepository};
#[cfg(test)]
pub use repository::{MockMessageRepository, MockUserRepository};
pub use value_object::{ClientId, ConnectionId, MessageId, Timestamp, UserId};

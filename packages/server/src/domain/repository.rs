//! Persistence gateway interfaces.
//!
//! The relay and the REST layer depend on these traits only; the
//! infrastructure layer provides the implementations (dependency inversion).

use async_trait::async_trait;

use super::{
    entity::{ConversationSummary, NewMessage, Principal, StoredMessage},
    error::RepositoryError,
    value_object::UserId,
};

/// User directory used to resolve principals.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look up a user by id.
    async fn get_user(&self, user_id: UserId) -> Result<Principal, RepositoryError>;

    /// Add a user. Fails if the id is already taken.
    async fn add_user(&self, user: Principal) -> Result<(), RepositoryError>;
}

/// Durable storage of direct messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Store a message atomically and return its canonical form.
    ///
    /// Either the message is stored and returned in full, or an error is
    /// returned and nothing is stored.
    async fn save_message(&self, message: NewMessage) -> Result<StoredMessage, RepositoryError>;

    /// All messages exchanged between `user_id` and `peer_id`, oldest first.
    async fn get_conversation_messages(
        &self,
        user_id: UserId,
        peer_id: UserId,
    ) -> Result<Vec<StoredMessage>, RepositoryError>;

    /// Mark every message sent by `peer_id` to `reader_id` as read.
    async fn mark_conversation_read(
        &self,
        reader_id: UserId,
        peer_id: UserId,
    ) -> Result<(), RepositoryError>;

    /// Number of unread messages sent by `peer_id` to `reader_id`.
    async fn count_unread(&self, reader_id: UserId, peer_id: UserId)
    -> Result<usize, RepositoryError>;

    /// One summary per conversation partner of `user_id`, most recent first.
    async fn get_user_conversations(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ConversationSummary>, RepositoryError>;
}

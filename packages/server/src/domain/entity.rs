//! Domain entities.

use serde::{Deserialize, Serialize};

use super::value_object::{MessageId, Timestamp, UserId};

/// A resolved user identity, embedded in stored messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: UserId,
    pub user_name: String,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_is_active() -> bool {
    true
}

fn default_role() -> String {
    "user".to_string()
}

impl Principal {
    /// Create an active principal with the default `user` role.
    pub fn new(id: UserId, user_name: &str, full_name: &str, email: &str) -> Self {
        Self {
            id,
            user_name: user_name.to_string(),
            full_name: full_name.to_string(),
            email: email.to_string(),
            profile_picture: None,
            is_active: default_is_active(),
            role: default_role(),
        }
    }
}

/// Request handed to the persistence gateway for one relayed frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub content: String,
}

impl NewMessage {
    pub fn new(sender_id: UserId, receiver_id: UserId, content: String) -> Self {
        Self {
            sender_id,
            receiver_id,
            content,
        }
    }
}

/// Canonical persisted form of a chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    pub id: MessageId,
    pub content: String,
    pub created_at: Timestamp,
    pub is_read: bool,
    pub sender: Principal,
    pub receiver: Principal,
}

impl StoredMessage {
    /// Whether `user_id` is either party of this message.
    pub fn involves(&self, user_id: UserId) -> bool {
        self.sender.id == user_id || self.receiver.id == user_id
    }

    /// The party of this message that is not `user_id`.
    pub fn peer_of(&self, user_id: UserId) -> &Principal {
        if self.sender.id == user_id {
            &self.receiver
        } else {
            &self.sender
        }
    }
}

/// One entry of a user's conversation list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSummary {
    pub peer: Principal,
    pub last_message: StoredMessage,
    pub unread_count: usize,
}

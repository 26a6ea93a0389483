//! WebSocket wire shapes.

use serde::{Deserialize, Serialize};

/// Inbound chat frame: `{"to": "<user id>", "content": "<text>"}`.
///
/// Unknown fields are ignored. Missing fields decode as empty strings, so a
/// frame without `to` fails later as an unparseable receiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundChatFrame {
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub content: String,
}

/// Principal summary embedded in a delivered message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalDto {
    pub id: i64,
    pub user_name: String,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub profile_picture: Option<String>,
    pub is_active: bool,
    pub role: String,
}

/// Outbound delivery: the canonical stored message.
///
/// The same shape is returned by the REST conversation endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessageDto {
    pub id: i64,
    pub sender: PrincipalDto,
    pub receiver: PrincipalDto,
    pub content: String,
    /// RFC 3339, UTC
    pub created_at: String,
    pub is_read: bool,
}

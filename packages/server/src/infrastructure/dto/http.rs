//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

use super::websocket::{PrincipalDto, StoredMessageDto};

/// One entry of `GET /api/conversations`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationDto {
    pub user: PrincipalDto,
    pub last_message: StoredMessageDto,
    pub unread: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationsResponse {
    pub conversations: Vec<ConversationDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub messages: Vec<StoredMessageDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnreadCountResponse {
    pub number: usize,
}

/// Error body for REST failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDto {
    pub error: String,
}

//! Conversion logic between DTOs and domain entities.

use flexin_shared::time::timestamp_to_rfc3339;

use crate::domain::{ConversationSummary, Principal, StoredMessage};
use crate::infrastructure::dto::{http, websocket as dto};

// ========================================
// Domain Entity → DTO
// ========================================

impl From<Principal> for dto::PrincipalDto {
    fn from(model: Principal) -> Self {
        Self {
            id: model.id.value(),
            user_name: model.user_name,
            full_name: model.full_name,
            email: model.email,
            profile_picture: model.profile_picture,
            is_active: model.is_active,
            role: model.role,
        }
    }
}

impl From<StoredMessage> for dto::StoredMessageDto {
    fn from(model: StoredMessage) -> Self {
        Self {
            id: model.id.value(),
            sender: model.sender.into(),
            receiver: model.receiver.into(),
            content: model.content,
            created_at: timestamp_to_rfc3339(model.created_at.value()),
            is_read: model.is_read,
        }
    }
}

impl From<ConversationSummary> for http::ConversationDto {
    fn from(model: ConversationSummary) -> Self {
        Self {
            user: model.peer.into(),
            last_message: model.last_message.into(),
            unread: model.unread_count,
        }
    }
}

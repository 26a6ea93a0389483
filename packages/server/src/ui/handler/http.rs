//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    domain::UserId,
    infrastructure::dto::http::{
        ApiErrorDto, ConversationDto, ConversationsResponse, MessagesResponse,
        UnreadCountResponse,
    },
    ui::state::AppState,
    usecase::ConversationError,
};

use super::auth::AuthUser;

/// REST error response
pub struct ApiError(ConversationError);

impl From<ConversationError> for ApiError {
    fn from(e: ConversationError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ConversationError::UserNotFound(_) => StatusCode::NOT_FOUND,
            ConversationError::RepositoryError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Conversation request failed: {}", self.0);
        }
        (
            status,
            Json(ApiErrorDto {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// List the caller's conversations
pub async fn get_conversations(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<ConversationsResponse>, ApiError> {
    let conversations = state
        .conversation_usecase
        .list_conversations(auth.user_id)
        .await?;

    // Domain Model から DTO への変換
    Ok(Json(ConversationsResponse {
        conversations: conversations
            .into_iter()
            .map(ConversationDto::from)
            .collect(),
    }))
}

/// Messages exchanged with `user_id`, oldest first
pub async fn get_conversation_messages(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(peer_id): Path<i64>,
) -> Result<Json<MessagesResponse>, ApiError> {
    let messages = state
        .conversation_usecase
        .get_messages(auth.user_id, UserId::new(peer_id))
        .await?;

    Ok(Json(MessagesResponse {
        messages: messages.into_iter().map(Into::into).collect(),
    }))
}

/// Mark everything `user_id` sent to the caller as read
pub async fn mark_conversation_read(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(peer_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .conversation_usecase
        .mark_read(auth.user_id, UserId::new(peer_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Number of unread messages from `user_id`
pub async fn count_unread(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(peer_id): Path<i64>,
) -> Result<Json<UnreadCountResponse>, ApiError> {
    let number = state
        .conversation_usecase
        .count_unread(auth.user_id, UserId::new(peer_id))
        .await?;
    Ok(Json(UnreadCountResponse { number }))
}

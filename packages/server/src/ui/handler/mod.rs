//! Request handlers.

mod auth;
mod http;
mod websocket;

pub use http::{
    count_unread, get_conversation_messages, get_conversations, health_check,
    mark_conversation_read,
};
pub use websocket::websocket_handler;

//! Connection registry implementations.
//!
//! - `websocket`: in-memory registry of WebSocket connection handles

pub mod websocket;

pub use websocket::WebSocketConnectionRegistry;

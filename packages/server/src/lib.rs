//! Real-time direct message relay for the Flexin social network.
//!
//! Clients hold one WebSocket each. Every inbound chat frame is persisted
//! first and the stored message is then pushed to the receiver (if connected)
//! and echoed to the sender. Conversation history is served over REST.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;

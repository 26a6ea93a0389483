//! Data Transfer Objects (DTOs) for the relay.
//!
//! DTOs are organized by protocol:
//! - `websocket`: inbound chat frames and outbound stored messages
//! - `http`: REST response bodies

pub mod conversion;
pub mod http;
pub mod websocket;

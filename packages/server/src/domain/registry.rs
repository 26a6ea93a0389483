//! Connection registry interface.
//!
//! The registry maps a [`ClientId`] to at most one live [`ConnectionHandle`].
//! Delivery through it is live-only: a peer that is not registered at the
//! moment of delivery simply does not receive the push, and catches up later
//! through the conversation history endpoints.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{
    error::MessagePushError,
    value_object::{ClientId, ConnectionId},
};

/// Instruction for a connection's writer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Serialized payload to write as a text frame
    Deliver(String),
    /// Send a close frame and stop writing
    Close,
}

/// Handle to one live bidirectional connection.
///
/// Cloning is cheap; every clone refers to the same connection.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    sender: mpsc::UnboundedSender<Outbound>,
}

impl ConnectionHandle {
    pub fn new(sender: mpsc::UnboundedSender<Outbound>) -> Self {
        Self {
            id: ConnectionId::generate(),
            sender,
        }
    }

    /// Create a handle together with the receiving end its writer task drains.
    ///
    /// The queue is unbounded. Delivery is live-only and the writer task drains
    /// it as fast as the socket accepts writes, so a peer that stops reading
    /// grows it until its connection fails or is replaced.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue a payload for delivery on this connection.
    pub fn send(&self, payload: String) -> Result<(), MessagePushError> {
        self.sender
            .send(Outbound::Deliver(payload))
            .map_err(|_| MessagePushError::PushFailed(format!("connection {} is closed", self.id)))
    }

    /// Ask the writer task to close the connection. A no-op if it is already gone.
    pub fn close(&self) {
        let _ = self.sender.send(Outbound::Close);
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Process-wide registry of live connections, one per client id.
///
/// Every method is individually linearizable. Callers must tolerate a handle
/// returned by [`lookup`](Self::lookup) whose peer disconnects right after.
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// Associate `handle` with `client_id`, replacing any previous entry.
    ///
    /// The replaced handle, if any, is closed and returned.
    async fn register(
        &self,
        client_id: ClientId,
        handle: ConnectionHandle,
    ) -> Option<ConnectionHandle>;

    /// Current handle for `client_id`, if connected.
    async fn lookup(&self, client_id: &ClientId) -> Option<ConnectionHandle>;

    /// Remove whatever entry `client_id` has. Idempotent.
    async fn deregister(&self, client_id: &ClientId);

    /// Remove the entry for `client_id` only if it still belongs to
    /// `connection_id`. Returns whether an entry was removed.
    async fn deregister_connection(&self, client_id: &ClientId, connection_id: ConnectionId)
    -> bool;

    /// Number of registered connections.
    async fn connected_count(&self) -> usize;
}

//! In-memory registry of WebSocket connection handles.
//!
//! The WebSocket itself is owned by the UI layer
//! (`ui::handler::websocket`), which creates a [`ConnectionHandle`] per
//! accepted socket and registers it here. This module only stores handles and
//! hands out clones for delivery.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ClientId, ConnectionHandle, ConnectionId, ConnectionRegistry};

/// Registry backed by a mutex-guarded map.
///
/// The map is never exposed; all access goes through [`ConnectionRegistry`].
#[derive(Default)]
pub struct WebSocketConnectionRegistry {
    /// Key: client id, Value: the client's only live handle
    clients: Mutex<HashMap<ClientId, ConnectionHandle>>,
}

impl WebSocketConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionRegistry for WebSocketConnectionRegistry {
    async fn register(
        &self,
        client_id: ClientId,
        handle: ConnectionHandle,
    ) -> Option<ConnectionHandle> {
        let connection_id = handle.id();
        let replaced = {
            let mut clients = self.clients.lock().await;
            clients.insert(client_id.clone(), handle)
        };

        match &replaced {
            Some(old) => {
                old.close();
                tracing::info!(
                    user_id = %client_id,
                    connection_id = %connection_id,
                    replaced_connection_id = %old.id(),
                    "Connection replaced; previous connection closed"
                );
            }
            None => tracing::debug!(
                user_id = %client_id,
                connection_id = %connection_id,
                "Connection registered"
            ),
        }

        replaced
    }

    async fn lookup(&self, client_id: &ClientId) -> Option<ConnectionHandle> {
        let clients = self.clients.lock().await;
        clients.get(client_id).cloned()
    }

    async fn deregister(&self, client_id: &ClientId) {
        let removed = self.clients.lock().await.remove(client_id);
        if let Some(handle) = removed {
            tracing::debug!(
                user_id = %client_id,
                connection_id = %handle.id(),
                "Connection deregistered"
            );
        }
    }

    async fn deregister_connection(
        &self,
        client_id: &ClientId,
        connection_id: ConnectionId,
    ) -> bool {
        let mut clients = self.clients.lock().await;
        match clients.get(client_id) {
            Some(current) if current.id() == connection_id => {
                clients.remove(client_id);
                tracing::debug!(
                    user_id = %client_id,
                    connection_id = %connection_id,
                    "Connection deregistered"
                );
                true
            }
            Some(current) => {
                tracing::debug!(
                    user_id = %client_id,
                    connection_id = %connection_id,
                    current_connection_id = %current.id(),
                    "Connection already replaced; leaving successor registered"
                );
                false
            }
            None => false,
        }
    }

    async fn connected_count(&self) -> usize {
        self.clients.lock().await.len()
    }
}

//! WebSocket connection handlers.
//!
//! Each accepted socket runs two tasks: a relay loop that reads frames in
//! arrival order and hands them to [`RelayMessageUseCase`], and a pusher loop
//! that drains the connection's outbound queue onto the socket. When either
//! ends, the connection is torn down and its registry entry removed.
//!
//! [`RelayMessageUseCase`]: crate::usecase::RelayMessageUseCase

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode, header::ORIGIN},
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    config::FrameErrorPolicy,
    domain::{ClientId, ConnectionHandle, Outbound},
    ui::state::AppState,
    usecase::ConnectError,
};

/// How long a terminating connection may take to flush queued deliveries.
const CLOSE_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    #[serde(rename = "userID")]
    pub user_id: Option<String>,
    pub token: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, StatusCode> {
    let origin = headers.get(ORIGIN).and_then(|v| v.to_str().ok());
    if !state.settings.is_origin_allowed(origin) {
        tracing::warn!(origin = ?origin, "Rejected WebSocket upgrade from disallowed origin");
        return Err(StatusCode::FORBIDDEN);
    }

    let client_id = state
        .connect_user_usecase
        .resolve_identity(state.settings.identity_mode, query.user_id, query.token)
        .map_err(|e| {
            tracing::warn!("Rejected WebSocket upgrade: {}", e);
            match e {
                ConnectError::MissingUserId
                | ConnectError::MissingToken
                | ConnectError::InvalidUserId(_) => StatusCode::BAD_REQUEST,
                ConnectError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            }
        })?;

    let failed_client_id = client_id.clone();
    Ok(ws
        .on_failed_upgrade(move |e| {
            tracing::warn!(user_id = %failed_client_id, "WebSocket upgrade failed: {}", e);
        })
        .on_upgrade(move |socket| handle_socket(socket, state, client_id)))
}

/// Drains `rx` onto the WebSocket until a close is requested or a write fails.
///
/// # Arguments
///
/// * `rx` - Outbound queue of this connection
/// * `sender` - WebSocket sink of this connection
///
/// # Returns
///
/// A `JoinHandle` for the spawned task
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<Outbound>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            match outbound {
                Outbound::Deliver(payload) => {
                    if let Err(e) = sender.send(Message::Text(payload.into())).await {
                        tracing::debug!("WebSocket write failed: {}", e);
                        break;
                    }
                }
                Outbound::Close => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    })
}

/// Reads frames in arrival order and relays them one at a time.
///
/// Returns when the socket fails or closes, or when a frame cannot be relayed
/// under [`FrameErrorPolicy::Terminate`].
async fn relay_loop(
    mut receiver: SplitStream<WebSocket>,
    state: Arc<AppState>,
    client_id: ClientId,
) {
    let policy = state.settings.frame_error_policy;

    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!(user_id = %client_id, "WebSocket read error: {}", e);
                break;
            }
        };

        let result = match &msg {
            Message::Text(text) => {
                tracing::debug!(user_id = %client_id, "Received frame: {}", text.as_str());
                state
                    .relay_message_usecase
                    .handle_frame(&client_id, text.as_str().as_bytes())
                    .await
            }
            Message::Binary(data) => {
                state
                    .relay_message_usecase
                    .handle_frame(&client_id, data.as_ref())
                    .await
            }
            Message::Close(_) => {
                tracing::info!(user_id = %client_id, "Client requested close");
                break;
            }
            // Ping/pong is handled automatically by the WebSocket protocol
            Message::Ping(_) | Message::Pong(_) => continue,
        };

        match result {
            Ok(outcome) => tracing::info!(
                user_id = %client_id,
                message_id = outcome.message.id.value(),
                delivered_to_receiver = outcome.delivered_to_receiver,
                echoed_to_sender = outcome.echoed_to_sender,
                "Message relayed"
            ),
            Err(e) => match policy {
                FrameErrorPolicy::Terminate => {
                    tracing::warn!(
                        user_id = %client_id,
                        transient = e.is_transient(),
                        "Terminating connection: {}",
                        e
                    );
                    break;
                }
                FrameErrorPolicy::Skip => {
                    tracing::warn!(
                        user_id = %client_id,
                        transient = e.is_transient(),
                        "Dropping frame: {}",
                        e
                    );
                }
            },
        }
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, client_id: ClientId) {
    let (handle, rx) = ConnectionHandle::channel();
    let connection_id = handle.id();

    // Connecting → Active
    state
        .connect_user_usecase
        .execute(client_id.clone(), handle.clone())
        .await;
    tracing::info!(user_id = %client_id, connection_id = %connection_id, "User connected");

    let (sender, receiver) = socket.split();
    let mut send_task = pusher_loop(rx, sender);
    let mut recv_task = tokio::spawn(relay_loop(receiver, state.clone(), client_id.clone()));

    // Active → Terminating
    let relay_ended = tokio::select! {
        _ = &mut recv_task => true,
        _ = &mut send_task => {
            recv_task.abort();
            false
        }
    };

    state
        .disconnect_user_usecase
        .execute(&client_id, connection_id)
        .await;

    if relay_ended {
        // Let already queued deliveries go out before the close frame.
        handle.close();
        if tokio::time::timeout(CLOSE_FLUSH_TIMEOUT, &mut send_task)
            .await
            .is_err()
        {
            send_task.abort();
        }
    }

    let remaining = state.disconnect_user_usecase.count_remaining().await;
    tracing::info!(
        user_id = %client_id,
        connection_id = %connection_id,
        remaining,
        "User disconnected"
    );
}

//! HTTP routes and WebSocket connection handler
//!
//! A single `/` route answers plain GET requests with the liveness response
//! and upgrades WebSocket requests. Each upgraded socket gets a read task and
//! a write task talking to the ChatServer.

use std::net::SocketAddr;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::error::AppError;
use crate::message::{ClientMessage, ServerMessage};
use crate::server::ServerCommand;
use crate::types::{ClientId, OriginAddr};

/// Per-client outbound queue size
const CLIENT_BUFFER_SIZE: usize = 32;

/// Body returned to plain HTTP requests
pub const LIVENESS_BODY: &str = "Stranger Chat server is alive";

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Build the HTTP router, feeding upgraded sockets into `cmd_tx`
pub fn router(cmd_tx: mpsc::Sender<ServerCommand>) -> Router {
    Router::new().route("/", get(index)).with_state(cmd_tx)
}

/// Liveness for plain requests, chat session for WebSocket upgrades
async fn index(
    State(cmd_tx): State<mpsc::Sender<ServerCommand>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    ws: Option<WebSocketUpgrade>,
) -> Response {
    let Some(ws) = ws else {
        debug!("Liveness check from {}", peer);
        return liveness().await.into_response();
    };

    let origin = OriginAddr::resolve(forwarded_for(&headers), Some(peer));
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = handle_socket(socket, peer, origin, cmd_tx).await {
            error!("Connection handler error: {}", e);
        }
    })
}

/// Static body with permissive CORS
async fn liveness() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        LIVENESS_BODY,
    )
}

/// Raw `X-Forwarded-For` value, if present and readable
fn forwarded_for(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
}

/// Drive one upgraded WebSocket
///
/// Registers the client with the ChatServer, sets up bidirectional
/// communication, and reports the disconnect once either side ends.
async fn handle_socket(
    socket: WebSocket,
    peer: SocketAddr,
    origin: OriginAddr,
    cmd_tx: mpsc::Sender<ServerCommand>,
) -> Result<(), AppError> {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let client_id = ClientId::new();
    info!("Client {} connected from {} ({})", client_id, peer, origin);

    // Create channel for server -> client messages
    let (msg_tx, mut msg_rx) = mpsc::channel::<ServerMessage>(CLIENT_BUFFER_SIZE);

    // Register with ChatServer; it decides admission
    if cmd_tx
        .send(ServerCommand::Connect {
            client_id,
            origin,
            sender: msg_tx,
        })
        .await
        .is_err()
    {
        error!("Failed to register client {} - server closed", client_id);
        return Err(AppError::ChannelSend);
    }

    // Clone cmd_tx for read task
    let cmd_tx_read = cmd_tx.clone();

    // Spawn read task (WebSocket -> ServerCommand)
    let mut read_task = tokio::spawn(async move {
        while let Some(msg_result) = ws_receiver.next().await {
            match msg_result {
                Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => {
                        let cmd = ServerCommand::from_client(client_id, client_msg);
                        if cmd_tx_read.send(cmd).await.is_err() {
                            debug!("Server closed, ending read task for {}", client_id);
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Invalid JSON from {}: {}", client_id, e);
                    }
                },
                Ok(Message::Close(_)) => {
                    debug!("Client {} sent close frame", client_id);
                    break;
                }
                Ok(Message::Ping(_)) => {
                    // Pong is sent automatically
                    debug!("Ping from {}", client_id);
                }
                Ok(_) => {
                    // Binary or other message types - ignore
                }
                Err(e) => {
                    error!("WebSocket error for {}: {}", client_id, e);
                    break;
                }
            }
        }
        debug!("Read task ended for {}", client_id);
    });

    // Spawn write task (ServerMessage -> WebSocket)
    //
    // Ends when the server drops the client's sender (disconnect or ban),
    // after flushing everything still queued.
    let mut write_task = tokio::spawn(async move {
        while let Some(msg) = msg_rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json)).await.is_err() {
                        debug!("WebSocket send failed, ending write task");
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize message: {}", e);
                }
            }
        }
        debug!("Write task ended for client");

        // Send close frame when done
        let _ = ws_sender.close().await;
    });

    // Wait for either task to complete
    tokio::select! {
        _ = &mut read_task => {
            debug!("Read task completed for {}", client_id);
        }
        _ = &mut write_task => {
            debug!("Write task completed for {}", client_id);
        }
    }
    read_task.abort();
    write_task.abort();

    // Send disconnect command
    let _ = cmd_tx.send(ServerCommand::Disconnect { client_id }).await;

    info!("Client {} disconnected", client_id);

    Ok(())
}

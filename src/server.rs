//! ChatServer Actor implementation
//!
//! The central actor that owns the [`Lobby`] and feeds it one command at a
//! time. Uses the Actor pattern with mpsc channels for message passing.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::info;

use crate::ban::BanPolicy;
use crate::error::AppError;
use crate::handler::router;
use crate::lobby::Lobby;
use crate::message::{ClientMessage, ServerMessage};
use crate::types::{ClientId, OriginAddr};

/// Channel buffer size for server commands
pub const CHANNEL_BUFFER_SIZE: usize = 256;

/// Commands sent from handlers to the ChatServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// New client connected
    Connect {
        client_id: ClientId,
        origin: OriginAddr,
        sender: mpsc::Sender<ServerMessage>,
    },
    /// Client disconnected
    Disconnect { client_id: ClientId },
    /// Ask for a partner
    Join {
        client_id: ClientId,
        username: Option<String>,
    },
    /// Leave the partner and ask for a new one
    Next { client_id: ClientId },
    /// Send a chat message
    Chat {
        client_id: ClientId,
        msg: String,
        username: Option<String>,
    },
    /// Client started typing
    Typing { client_id: ClientId },
    /// Client stopped typing
    StopTyping { client_id: ClientId },
    /// Report the current partner
    Report { client_id: ClientId },
}

impl ServerCommand {
    /// Convert a parsed client frame into a command
    pub fn from_client(client_id: ClientId, msg: ClientMessage) -> Self {
        match msg {
            ClientMessage::Join { username } => ServerCommand::Join { client_id, username },
            ClientMessage::Next => ServerCommand::Next { client_id },
            ClientMessage::Message { msg, username } => ServerCommand::Chat {
                client_id,
                msg,
                username,
            },
            ClientMessage::Typing => ServerCommand::Typing { client_id },
            ClientMessage::StopTyping => ServerCommand::StopTyping { client_id },
            ClientMessage::Report => ServerCommand::Report { client_id },
        }
    }
}

/// The main ChatServer actor
///
/// Owns all session state and processes commands from client handlers.
pub struct ChatServer {
    lobby: Lobby,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
}

impl ChatServer {
    /// Create a new ChatServer with the given ban policy and command receiver
    pub fn new(policy: BanPolicy, receiver: mpsc::Receiver<ServerCommand>) -> Self {
        Self {
            lobby: Lobby::new(policy),
            receiver,
        }
    }

    /// Run the ChatServer event loop
    ///
    /// Continuously receives and processes commands until all senders are dropped.
    pub async fn run(mut self) {
        info!("ChatServer started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
        }

        info!("ChatServer shutting down");
    }

    /// Process a single command to completion
    fn handle_command(&mut self, cmd: ServerCommand) {
        match cmd {
            ServerCommand::Connect {
                client_id,
                origin,
                sender,
            } => {
                if let Err(e) = self.lobby.connect(client_id, origin, sender) {
                    info!("Client {} refused: {}", client_id, e);
                }
            }
            ServerCommand::Disconnect { client_id } => self.lobby.disconnect(client_id),
            ServerCommand::Join {
                client_id,
                username,
            } => self.lobby.join(client_id, username),
            ServerCommand::Next { client_id } => self.lobby.next(client_id),
            ServerCommand::Chat {
                client_id,
                msg,
                username,
            } => self.lobby.chat(client_id, msg, username),
            ServerCommand::Typing { client_id } => self.lobby.typing(client_id, true),
            ServerCommand::StopTyping { client_id } => self.lobby.typing(client_id, false),
            ServerCommand::Report { client_id } => self.lobby.report(client_id),
        }
    }
}

/// Start the ChatServer actor and serve HTTP/WebSocket on `listener`
///
/// Returns only if the listener fails.
pub async fn serve(listener: TcpListener, policy: BanPolicy) -> Result<(), AppError> {
    let (cmd_tx, cmd_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
    tokio::spawn(ChatServer::new(policy, cmd_rx).run());
    info!("ChatServer actor started");

    axum::serve(
        listener,
        router(cmd_tx).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_to_command() {
        let id = ClientId::new();

        let cmd = ServerCommand::from_client(
            id,
            ClientMessage::Message {
                msg: "hi".to_string(),
                username: None,
            },
        );
        match cmd {
            ServerCommand::Chat {
                client_id, msg, ..
            } => {
                assert_eq!(client_id, id);
                assert_eq!(msg, "hi");
            }
            other => panic!("unexpected {:?}", other),
        }

        assert!(matches!(
            ServerCommand::from_client(id, ClientMessage::Report),
            ServerCommand::Report { client_id } if client_id == id
        ));
    }

    #[tokio::test]
    async fn test_actor_pairs_clients() {
        let (cmd_tx, cmd_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let actor = tokio::spawn(ChatServer::new(BanPolicy::default(), cmd_rx).run());

        let mut receivers = Vec::new();
        for origin in ["10.0.0.1", "10.0.0.2"] {
            let (tx, rx) = mpsc::channel(32);
            let client_id = ClientId::new();
            cmd_tx
                .send(ServerCommand::Connect {
                    client_id,
                    origin: OriginAddr::from(origin),
                    sender: tx,
                })
                .await
                .unwrap();
            cmd_tx
                .send(ServerCommand::Join {
                    client_id,
                    username: None,
                })
                .await
                .unwrap();
            receivers.push(rx);
        }
        drop(cmd_tx);
        actor.await.unwrap();

        // First client: connected, waiting, partner, paired
        let mut first = Vec::new();
        while let Some(msg) = receivers[0].recv().await {
            first.push(msg);
        }
        assert_eq!(first.len(), 4);
        assert_eq!(first[1], ServerMessage::waiting());
        assert_eq!(first[3], ServerMessage::paired());

        // Actor gone: the channel is closed after the queued messages
        let mut second = Vec::new();
        while let Some(msg) = receivers[1].recv().await {
            second.push(msg);
        }
        assert_eq!(second.last(), Some(&ServerMessage::paired()));
    }
}

//! Client struct and registry
//!
//! Represents a connected client with their state and communication channel,
//! and the registry that owns every connected client.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::warn;

use crate::error::SendError;
use crate::message::ServerMessage;
use crate::types::{ClientId, OriginAddr, RoomId};

/// Connected client information
///
/// Holds all state related to a connected client including their
/// unique ID, origin, current room, message sender channel, and typing status.
#[derive(Debug)]
pub struct Client {
    /// Unique identifier for this client
    pub id: ClientId,
    /// Address reports and bans are attributed to
    pub origin: OriginAddr,
    /// Display name (None until the client supplies one)
    pub username: Option<String>,
    /// Room the client is currently chatting in
    pub room: Option<RoomId>,
    /// Server → Client message channel
    pub sender: mpsc::Sender<ServerMessage>,
    /// Currently typing flag
    pub is_typing: bool,
}

impl Client {
    /// Create a new client with the given ID, origin and sender channel
    pub fn new(id: ClientId, origin: OriginAddr, sender: mpsc::Sender<ServerMessage>) -> Self {
        Self {
            id,
            origin,
            username: None,
            room: None,
            sender,
            is_typing: false,
        }
    }

    /// Send a message to this client
    ///
    /// Never waits: a closed or full channel is reported as an error so the
    /// caller is never suspended in the middle of a state transition.
    pub fn send(&self, msg: ServerMessage) -> Result<(), SendError> {
        self.sender.try_send(msg).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SendError::ChannelFull,
            mpsc::error::TrySendError::Closed(_) => SendError::ChannelClosed,
        })
    }

    /// Send a message, logging instead of failing
    pub fn notify(&self, msg: ServerMessage) {
        if let Err(e) = self.send(msg) {
            warn!("Dropped message for client {}: {}", self.id, e);
        }
    }

    /// Get the display name for this client
    ///
    /// Returns the username if set, otherwise "Stranger".
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or("Stranger")
    }

    /// Set the client's username
    pub fn set_username(&mut self, username: String) {
        self.username = Some(username);
    }

    /// Set typing status
    pub fn set_typing(&mut self, is_typing: bool) {
        self.is_typing = is_typing;
    }
}

/// All connected clients, keyed by ID
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: HashMap<ClientId, Client>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly admitted client (no room yet)
    pub fn register(&mut self, client: Client) {
        self.clients.insert(client.id, client);
    }

    /// Remove a client, dropping its sender channel
    pub fn deregister(&mut self, client_id: ClientId) -> Option<Client> {
        self.clients.remove(&client_id)
    }

    pub fn get(&self, client_id: ClientId) -> Option<&Client> {
        self.clients.get(&client_id)
    }

    pub fn get_mut(&mut self, client_id: ClientId) -> Option<&mut Client> {
        self.clients.get_mut(&client_id)
    }

    pub fn contains(&self, client_id: ClientId) -> bool {
        self.clients.contains_key(&client_id)
    }

    /// Send to a client if it is still registered
    pub fn notify(&self, client_id: ClientId, msg: ServerMessage) {
        if let Some(client) = self.clients.get(&client_id) {
            client.notify(msg);
        }
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

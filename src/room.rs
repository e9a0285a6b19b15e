//! Two-party rooms
//!
//! A room exists only while both of its members are in it: when either one
//! leaves, the room is destroyed and the other member is notified.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::client::ClientRegistry;
use crate::error::AppError;
use crate::message::ServerMessage;
use crate::types::{ClientId, RoomId};

/// 1:1 Chat Room
#[derive(Debug)]
pub struct Room {
    /// Generated room identifier
    pub id: RoomId,
    /// Both participants
    pub members: [ClientId; 2],
}

impl Room {
    /// Create a new room for the given pair
    pub fn new(a: ClientId, b: ClientId) -> Self {
        Self {
            id: RoomId::new(),
            members: [a, b],
        }
    }

    /// Get the partner's ClientId for a given client
    ///
    /// Returns None if the client is not in the room.
    pub fn partner_of(&self, client_id: ClientId) -> Option<ClientId> {
        match self.members {
            [a, b] if a == client_id => Some(b),
            [a, b] if b == client_id => Some(a),
            _ => None,
        }
    }
}

/// Owns every active room and routes traffic inside them
#[derive(Debug, Default)]
pub struct RoomManager {
    rooms: HashMap<RoomId, Room>,
}

impl RoomManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `a` and `b` in a new room and tell both about it
    ///
    /// Both room references are set before any notification goes out.
    pub fn pair(&mut self, clients: &mut ClientRegistry, a: ClientId, b: ClientId) -> RoomId {
        let room = Room::new(a, b);
        let room_id = room.id;

        for member in room.members {
            if let Some(client) = clients.get_mut(member) {
                client.room = Some(room_id);
                client.set_typing(false);
            }
        }
        self.rooms.insert(room_id, room);

        let name_of = |id: ClientId| clients.get(id).and_then(|c| c.username.clone());
        let (a_name, b_name) = (name_of(a), name_of(b));

        clients.notify(a, ServerMessage::Partner { username: b_name });
        clients.notify(b, ServerMessage::Partner { username: a_name });
        clients.notify(a, ServerMessage::paired());
        clients.notify(b, ServerMessage::paired());

        info!("Paired {} with {} in room {}", a, b, room_id);
        debug!("Total rooms: {}", self.rooms.len());
        room_id
    }

    /// Take `client` out of its room, destroying the room
    ///
    /// Returns the partner that was left behind. Does nothing if the client
    /// is not in a room.
    pub fn leave(&mut self, clients: &mut ClientRegistry, client_id: ClientId) -> Option<ClientId> {
        let client = clients.get_mut(client_id)?;
        let room_id = client.room.take()?;
        let was_typing = client.is_typing;
        client.set_typing(false);

        let room = self.rooms.remove(&room_id)?;
        info!("Client {} left room {}", client_id, room_id);

        let partner_id = room.partner_of(client_id)?;
        if let Some(partner) = clients.get_mut(partner_id) {
            partner.room = None;
            partner.set_typing(false);
            if was_typing {
                partner.notify(ServerMessage::StopTyping);
            }
            partner.notify(ServerMessage::partner_left());
        }

        Some(partner_id)
    }

    /// Broadcast a chat message to both members, sender included
    pub fn relay_chat(
        &self,
        clients: &mut ClientRegistry,
        from: ClientId,
        msg: String,
        username: Option<String>,
    ) -> Result<RoomId, AppError> {
        let room = self.room_of(clients, from)?;
        let Some(sender) = clients.get_mut(from) else {
            return Err(AppError::NoActiveRoom);
        };

        let username = username.unwrap_or_else(|| sender.display_name().to_string());
        let was_typing = sender.is_typing;
        sender.set_typing(false);

        if was_typing {
            if let Some(partner_id) = room.partner_of(from) {
                clients.notify(partner_id, ServerMessage::StopTyping);
            }
        }

        let out = ServerMessage::Message { username, msg };
        for member in room.members {
            clients.notify(member, out.clone());
        }
        Ok(room.id)
    }

    /// Forward a typing signal to the partner only
    ///
    /// Returns false when the signal matched the current state and was
    /// suppressed.
    pub fn relay_typing(
        &self,
        clients: &mut ClientRegistry,
        from: ClientId,
        typing: bool,
    ) -> Result<bool, AppError> {
        let room = self.room_of(clients, from)?;
        let partner_id = room.partner_of(from).ok_or(AppError::NoActiveRoom)?;

        let Some(sender) = clients.get_mut(from) else {
            return Err(AppError::NoActiveRoom);
        };
        if sender.is_typing == typing {
            return Ok(false);
        }
        sender.set_typing(typing);

        let signal = if typing {
            ServerMessage::Typing
        } else {
            ServerMessage::StopTyping
        };
        clients.notify(partner_id, signal);
        Ok(true)
    }

    /// Look up the room a client is currently in
    pub fn room_of(&self, clients: &ClientRegistry, client_id: ClientId) -> Result<&Room, AppError> {
        clients
            .get(client_id)
            .and_then(|c| c.room)
            .and_then(|room_id| self.rooms.get(&room_id))
            .ok_or(AppError::NoActiveRoom)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Client;
    use crate::types::OriginAddr;
    use tokio::sync::mpsc;

    fn add_client(
        clients: &mut ClientRegistry,
        name: Option<&str>,
    ) -> (ClientId, mpsc::Receiver<ServerMessage>) {
        let (tx, rx) = mpsc::channel(32);
        let mut client = Client::new(ClientId::new(), OriginAddr::from("10.0.0.1"), tx);
        client.username = name.map(str::to_string);
        let id = client.id;
        clients.register(client);
        (id, rx)
    }

    fn drain(rx: &mut mpsc::Receiver<ServerMessage>) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    #[test]
    fn test_room_partner() {
        let a = ClientId::new();
        let b = ClientId::new();
        let room = Room::new(a, b);

        assert_eq!(room.members, [a, b]);
        assert_eq!(room.partner_of(a), Some(b));
        assert_eq!(room.partner_of(b), Some(a));
        assert!(room.partner_of(ClientId::new()).is_none());
    }

    #[test]
    fn test_pair_sets_both_rooms_and_notifies() {
        let mut clients = ClientRegistry::new();
        let mut rooms = RoomManager::new();
        let (a, mut a_rx) = add_client(&mut clients, Some("Alice"));
        let (b, mut b_rx) = add_client(&mut clients, None);

        let room_id = rooms.pair(&mut clients, a, b);

        assert_eq!(clients.get(a).unwrap().room, Some(room_id));
        assert_eq!(clients.get(b).unwrap().room, Some(room_id));
        assert_eq!(rooms.len(), 1);

        assert_eq!(
            drain(&mut a_rx),
            vec![ServerMessage::Partner { username: None }, ServerMessage::paired()]
        );
        assert_eq!(
            drain(&mut b_rx),
            vec![
                ServerMessage::Partner {
                    username: Some("Alice".to_string())
                },
                ServerMessage::paired()
            ]
        );
    }

    #[test]
    fn test_leave_destroys_room() {
        let mut clients = ClientRegistry::new();
        let mut rooms = RoomManager::new();
        let (a, _a_rx) = add_client(&mut clients, None);
        let (b, mut b_rx) = add_client(&mut clients, None);
        rooms.pair(&mut clients, a, b);
        drain(&mut b_rx);

        assert_eq!(rooms.leave(&mut clients, a), Some(b));

        assert!(rooms.is_empty());
        assert!(clients.get(a).unwrap().room.is_none());
        assert!(clients.get(b).unwrap().room.is_none());
        assert_eq!(drain(&mut b_rx), vec![ServerMessage::partner_left()]);

        // Second leave is a no-op
        assert_eq!(rooms.leave(&mut clients, a), None);
        assert_eq!(rooms.leave(&mut clients, b), None);
        assert!(drain(&mut b_rx).is_empty());
    }

    #[test]
    fn test_relay_chat_includes_sender() {
        let mut clients = ClientRegistry::new();
        let mut rooms = RoomManager::new();
        let (a, mut a_rx) = add_client(&mut clients, Some("Alice"));
        let (b, mut b_rx) = add_client(&mut clients, None);
        rooms.pair(&mut clients, a, b);
        drain(&mut a_rx);
        drain(&mut b_rx);

        rooms
            .relay_chat(&mut clients, a, "hi".to_string(), None)
            .unwrap();

        let expected = ServerMessage::Message {
            username: "Alice".to_string(),
            msg: "hi".to_string(),
        };
        assert_eq!(drain(&mut a_rx), vec![expected.clone()]);
        assert_eq!(drain(&mut b_rx), vec![expected]);
    }

    #[test]
    fn test_relay_without_room_is_dropped() {
        let mut clients = ClientRegistry::new();
        let rooms = RoomManager::new();
        let (a, mut a_rx) = add_client(&mut clients, None);

        assert!(matches!(
            rooms.relay_chat(&mut clients, a, "hello?".to_string(), None),
            Err(AppError::NoActiveRoom)
        ));
        assert!(matches!(
            rooms.relay_typing(&mut clients, a, true),
            Err(AppError::NoActiveRoom)
        ));
        assert!(drain(&mut a_rx).is_empty());
        assert!(!clients.get(a).unwrap().is_typing);
    }

    #[test]
    fn test_typing_excludes_sender_and_dedupes() {
        let mut clients = ClientRegistry::new();
        let mut rooms = RoomManager::new();
        let (a, mut a_rx) = add_client(&mut clients, None);
        let (b, mut b_rx) = add_client(&mut clients, None);
        rooms.pair(&mut clients, a, b);
        drain(&mut a_rx);
        drain(&mut b_rx);

        assert!(rooms.relay_typing(&mut clients, a, true).unwrap());
        assert!(!rooms.relay_typing(&mut clients, a, true).unwrap());
        assert_eq!(drain(&mut b_rx), vec![ServerMessage::Typing]);
        assert!(drain(&mut a_rx).is_empty());

        assert!(rooms.relay_typing(&mut clients, a, false).unwrap());
        assert_eq!(drain(&mut b_rx), vec![ServerMessage::StopTyping]);
    }

    #[test]
    fn test_chat_clears_typing() {
        let mut clients = ClientRegistry::new();
        let mut rooms = RoomManager::new();
        let (a, _a_rx) = add_client(&mut clients, None);
        let (b, mut b_rx) = add_client(&mut clients, None);
        rooms.pair(&mut clients, a, b);
        rooms.relay_typing(&mut clients, a, true).unwrap();
        drain(&mut b_rx);

        rooms
            .relay_chat(&mut clients, a, "done".to_string(), Some("A".to_string()))
            .unwrap();

        assert_eq!(
            drain(&mut b_rx),
            vec![
                ServerMessage::StopTyping,
                ServerMessage::Message {
                    username: "A".to_string(),
                    msg: "done".to_string()
                }
            ]
        );
        assert!(!clients.get(a).unwrap().is_typing);
    }
}

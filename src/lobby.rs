//! Session lifecycle
//!
//! `Lobby` owns all shared state (clients, the waiting slot, rooms and the
//! ban guard) and applies one event at a time. Every method is synchronous,
//! so a transition can never be interleaved with another event.

use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::ban::{BanGuard, BanPolicy};
use crate::client::{Client, ClientRegistry};
use crate::error::AppError;
use crate::matchmaker::{MatchOutcome, Matchmaker, WaitingSlot};
use crate::message::ServerMessage;
use crate::room::RoomManager;
use crate::types::{ClientId, OriginAddr, RoomId};

#[derive(Debug, Default)]
pub struct Lobby {
    clients: ClientRegistry,
    matchmaker: Matchmaker,
    rooms: RoomManager,
    ban_guard: BanGuard,
}

impl Lobby {
    pub fn new(policy: BanPolicy) -> Self {
        Self {
            clients: ClientRegistry::new(),
            matchmaker: Matchmaker::new(),
            rooms: RoomManager::new(),
            ban_guard: BanGuard::new(policy),
        }
    }

    /// Admit and register a new connection
    pub fn connect(
        &mut self,
        client_id: ClientId,
        origin: OriginAddr,
        sender: mpsc::Sender<ServerMessage>,
    ) -> Result<(), AppError> {
        self.connect_at(client_id, origin, sender, Instant::now())
    }

    /// Same as [`Lobby::connect`] with an explicit clock reading
    ///
    /// A rejected client gets the ban notice and its sender is dropped, which
    /// closes the connection once the notice has been written.
    pub fn connect_at(
        &mut self,
        client_id: ClientId,
        origin: OriginAddr,
        sender: mpsc::Sender<ServerMessage>,
        now: Instant,
    ) -> Result<(), AppError> {
        if !self.ban_guard.admit(&origin, now) {
            info!("Rejected client {} from banned address {}", client_id, origin);
            let client = Client::new(client_id, origin.clone(), sender);
            client.notify(ServerMessage::admission_denied());
            return Err(AppError::AdmissionDenied(origin));
        }

        info!("Client {} connected from {}", client_id, origin);
        let client = Client::new(client_id, origin, sender);
        client.notify(ServerMessage::Connected {
            client_id: client_id.to_string(),
        });
        self.clients.register(client);
        self.log_totals();
        Ok(())
    }

    /// First match request, optionally carrying a display name
    pub fn join(&mut self, client_id: ClientId, username: Option<String>) {
        let Some(client) = self.clients.get_mut(client_id) else {
            return;
        };
        if let Some(username) = username {
            info!("Client {} set username to '{}'", client_id, username);
            client.set_username(username);
        }

        self.rooms.leave(&mut self.clients, client_id);
        self.request_match(client_id);
    }

    /// Drop the current partner and look for a new one
    pub fn next(&mut self, client_id: ClientId) {
        if !self.clients.contains(client_id) {
            return;
        }
        info!("Next requested by {}", client_id);

        self.rooms.leave(&mut self.clients, client_id);
        self.matchmaker.withdraw(client_id);
        self.request_match(client_id);
    }

    /// Relay a chat message to the client's room
    pub fn chat(&mut self, client_id: ClientId, msg: String, username: Option<String>) {
        if let Err(e) = self.rooms.relay_chat(&mut self.clients, client_id, msg, username) {
            debug!("Dropped chat from {}: {}", client_id, e);
        }
    }

    /// Relay a typing / stop typing signal to the partner
    pub fn typing(&mut self, client_id: ClientId, typing: bool) {
        if let Err(e) = self.rooms.relay_typing(&mut self.clients, client_id, typing) {
            debug!("Dropped typing signal from {}: {}", client_id, e);
        }
    }

    /// Report the client's current partner
    pub fn report(&mut self, client_id: ClientId) {
        self.report_at(client_id, Instant::now());
    }

    /// Same as [`Lobby::report`] with an explicit clock reading
    ///
    /// The report counts against the partner's origin. If that pushes the
    /// partner over the threshold, the partner is told and disconnected.
    pub fn report_at(&mut self, client_id: ClientId, now: Instant) {
        let Some(partner_id) = self.partner_of(client_id) else {
            debug!("Ignoring report from {} with no partner", client_id);
            return;
        };
        let Some(partner) = self.clients.get(partner_id) else {
            return;
        };

        let origin = partner.origin.clone();
        info!("Client {} reported {} ({})", client_id, partner_id, origin);
        self.clients.notify(client_id, ServerMessage::report_received());

        if self.ban_guard.record_report(&origin, now) {
            self.clients.notify(partner_id, ServerMessage::banned());
            self.disconnect(partner_id);
        }
    }

    /// Tear down everything the client was part of and forget it
    pub fn disconnect(&mut self, client_id: ClientId) {
        if !self.clients.contains(client_id) {
            return;
        }

        self.rooms.leave(&mut self.clients, client_id);
        if self.matchmaker.withdraw(client_id) {
            debug!("Client {} removed from waiting slot", client_id);
        }
        self.clients.deregister(client_id);

        info!("Client {} disconnected", client_id);
        self.log_totals();
    }

    /// Pair with the waiting client or start waiting
    ///
    /// Taking the occupant and creating the room happen in one call, so no
    /// other client can claim the same occupant in between.
    fn request_match(&mut self, client_id: ClientId) {
        match self.matchmaker.request_match(client_id) {
            MatchOutcome::Paired(other) => {
                self.rooms.pair(&mut self.clients, client_id, other);
            }
            MatchOutcome::Waiting => {
                debug!("Client {} is waiting", client_id);
                self.clients.notify(client_id, ServerMessage::waiting());
            }
        }
    }

    fn log_totals(&self) {
        debug!(
            "Total clients: {}, Total rooms: {}",
            self.clients.len(),
            self.rooms.len()
        );
    }

    pub fn partner_of(&self, client_id: ClientId) -> Option<ClientId> {
        self.rooms
            .room_of(&self.clients, client_id)
            .ok()
            .and_then(|room| room.partner_of(client_id))
    }

    pub fn room_of(&self, client_id: ClientId) -> Option<RoomId> {
        self.clients.get(client_id).and_then(|c| c.room)
    }

    pub fn waiting_slot(&self) -> WaitingSlot {
        self.matchmaker.slot()
    }

    pub fn is_connected(&self, client_id: ClientId) -> bool {
        self.clients.contains(client_id)
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn ban_guard(&self) -> &BanGuard {
        &self.ban_guard
    }
}

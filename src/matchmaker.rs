//! Single-slot matchmaking
//!
//! At most one client waits at a time. The next client to ask for a match
//! takes the waiting client out of the slot and is paired with it.

use crate::types::ClientId;

/// The process-wide waiting slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WaitingSlot {
    #[default]
    Empty,
    Occupied(ClientId),
}

/// Result of a match request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The caller was matched with this previously waiting client
    Paired(ClientId),
    /// Nobody was waiting; the caller now occupies the slot
    Waiting,
}

#[derive(Debug, Default)]
pub struct Matchmaker {
    slot: WaitingSlot,
}

impl Matchmaker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair `client` with the waiting client, or park it in the slot
    ///
    /// The slot is taken before it is inspected, so a waiting client is
    /// handed out at most once. A client never pairs with itself: if it is
    /// already waiting it simply stays in the slot.
    pub fn request_match(&mut self, client: ClientId) -> MatchOutcome {
        match std::mem::take(&mut self.slot) {
            WaitingSlot::Occupied(other) if other != client => MatchOutcome::Paired(other),
            _ => {
                self.slot = WaitingSlot::Occupied(client);
                MatchOutcome::Waiting
            }
        }
    }

    /// Clear the slot if `client` is the one waiting
    ///
    /// Returns true if the client was removed.
    pub fn withdraw(&mut self, client: ClientId) -> bool {
        if self.slot == WaitingSlot::Occupied(client) {
            self.slot = WaitingSlot::Empty;
            true
        } else {
            false
        }
    }

    pub fn slot(&self) -> WaitingSlot {
        self.slot
    }

    pub fn waiting(&self) -> Option<ClientId> {
        match self.slot {
            WaitingSlot::Occupied(id) => Some(id),
            WaitingSlot::Empty => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_request_waits() {
        let mut mm = Matchmaker::new();
        let a = ClientId::new();

        assert_eq!(mm.request_match(a), MatchOutcome::Waiting);
        assert_eq!(mm.slot(), WaitingSlot::Occupied(a));
    }

    #[test]
    fn test_second_request_pairs() {
        let mut mm = Matchmaker::new();
        let a = ClientId::new();
        let b = ClientId::new();

        mm.request_match(a);
        assert_eq!(mm.request_match(b), MatchOutcome::Paired(a));
        assert_eq!(mm.slot(), WaitingSlot::Empty);
    }

    #[test]
    fn test_waiting_client_never_pairs_with_itself() {
        let mut mm = Matchmaker::new();
        let a = ClientId::new();

        mm.request_match(a);
        assert_eq!(mm.request_match(a), MatchOutcome::Waiting);
        assert_eq!(mm.waiting(), Some(a));
    }

    #[test]
    fn test_waiting_client_handed_out_once() {
        let mut mm = Matchmaker::new();
        let a = ClientId::new();
        let b = ClientId::new();
        let c = ClientId::new();

        mm.request_match(a);
        assert_eq!(mm.request_match(b), MatchOutcome::Paired(a));
        // C finds an empty slot rather than A again
        assert_eq!(mm.request_match(c), MatchOutcome::Waiting);
        assert_eq!(mm.waiting(), Some(c));
    }

    #[test]
    fn test_withdraw_only_removes_occupant() {
        let mut mm = Matchmaker::new();
        let a = ClientId::new();
        let b = ClientId::new();

        mm.request_match(a);
        assert!(!mm.withdraw(b));
        assert_eq!(mm.waiting(), Some(a));

        assert!(mm.withdraw(a));
        assert_eq!(mm.slot(), WaitingSlot::Empty);
        assert!(!mm.withdraw(a));
    }
}

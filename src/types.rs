//! Basic type definitions for the chat server
//!
//! Provides newtype wrappers for type safety:
//! - `ClientId`: UUID-based unique client identifier
//! - `RoomId`: UUID-based room identifier, independent of its members
//! - `OriginAddr`: the address a connection is attributed to for bans

use std::net::SocketAddr;

use uuid::Uuid;

/// Unique client identifier (newtype pattern)
///
/// Wraps a UUID v4 for type-safe client identification.
/// Implements Hash and Eq for use as HashMap keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub Uuid);

impl ClientId {
    /// Create a new random client ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Room identifier
///
/// Generated fresh for every pairing, so it never depends on which
/// member joined first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoomId(pub Uuid);

impl RoomId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RoomId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Origin address of a connection (usually an IP)
///
/// Reports and bans are keyed by this value, not by client ID, so a
/// banned user cannot come back simply by reconnecting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OriginAddr(pub String);

impl OriginAddr {
    /// Resolve the origin of a connection
    ///
    /// Prefers the first entry of an `X-Forwarded-For` header, falling back
    /// to the peer IP (port stripped) and finally to `"unknown"`.
    pub fn resolve(forwarded_for: Option<&str>, peer: Option<SocketAddr>) -> Self {
        let forwarded = forwarded_for
            .and_then(|header| header.split(',').next())
            .map(str::trim)
            .filter(|first| !first.is_empty());

        match (forwarded, peer) {
            (Some(first), _) => Self(first.to_string()),
            (None, Some(peer)) => Self(peer.ip().to_string()),
            (None, None) => Self("unknown".to_string()),
        }
    }
}

impl From<&str> for OriginAddr {
    fn from(addr: &str) -> Self {
        Self(addr.to_string())
    }
}

impl std::fmt::Display for OriginAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

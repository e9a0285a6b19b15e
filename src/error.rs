//! Error types for the chat server
//!
//! Defines application-level errors and message send errors.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

use crate::types::OriginAddr;

/// Application-level errors
///
/// Covers both fatal errors (server or connection termination) and
/// session errors that are handled inside the lobby.
#[derive(Debug, Error)]
pub enum AppError {
    /// IO error (fatal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel send error (fatal - internal channel broken)
    #[error("Channel send error")]
    ChannelSend,

    /// Connection refused because its origin is currently banned
    #[error("Admission denied for banned address {0}")]
    AdmissionDenied(OriginAddr),

    /// Client is not in any room
    #[error("Not in room")]
    NoActiveRoom,
}

/// Message send errors
///
/// Occurs when attempting to send messages to a client that
/// cannot accept them.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,

    /// The client is not draining its outbound queue
    #[error("Channel full")]
    ChannelFull,
}

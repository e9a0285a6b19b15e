//! Anonymous 1:1 Stranger Chat Server Library
//!
//! A WebSocket chat server built with axum that pairs
//! anonymous visitors with each other, using the Actor pattern for state
//! management.
//!
//! # Features
//! - Single-slot matchmaking (`join` / `next`)
//! - Room-scoped chat relay with typing indicators
//! - Report tally per origin address with temporary bans
//! - `X-Forwarded-For` aware origin detection
//! - Plain HTTP liveness response on the same `/` route as the upgrade
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `ChatServer` is the central actor owning the `Lobby`
//! - `Lobby` holds the client registry, waiting slot, rooms and ban guard
//! - Each upgraded socket has `handler` tasks communicating with the server
//! - No locks needed - all state access goes through message passing
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use stranger_chat::{serve, BanPolicy};
//!
//! #[tokio::main]
//! async fn main() {
//!     let listener = TcpListener::bind("127.0.0.1:3000").await.unwrap();
//!     serve(listener, BanPolicy::default()).await.unwrap();
//! }
//! ```

pub mod ban;
pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod lobby;
pub mod matchmaker;
pub mod message;
pub mod room;
pub mod server;
pub mod types;

// Re-export main types for convenience
pub use ban::{BanGuard, BanPolicy};
pub use client::{Client, ClientRegistry};
pub use config::Config;
pub use error::{AppError, SendError};
pub use handler::router;
pub use lobby::Lobby;
pub use matchmaker::{MatchOutcome, Matchmaker, WaitingSlot};
pub use message::{ClientMessage, ServerMessage};
pub use room::{Room, RoomManager};
pub use server::{serve, ChatServer, ServerCommand};
pub use types::{ClientId, OriginAddr, RoomId};

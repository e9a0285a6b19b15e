//! Message protocol definitions
//!
//! JSON-based bidirectional message protocol using Serde's tagged enum
//! for type-safe serialization/deserialization.

use serde::{Deserialize, Serialize};

/// Sender label used for messages generated by the server itself
pub const SYSTEM_SENDER: &str = "Stranger Chat";

/// Client → Server message
///
/// All messages from client to server. Uses tagged enum with snake_case naming.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Ask for a partner, optionally setting a display name
    Join {
        #[serde(default)]
        username: Option<String>,
    },
    /// Leave the current partner and ask for a new one
    Next,
    /// Send a chat message to the current room
    Message {
        msg: String,
        #[serde(default)]
        username: Option<String>,
    },
    /// Indicate typing started
    Typing,
    /// Indicate typing stopped
    StopTyping,
    /// Report the current partner
    Report,
}

/// Server → Client message
///
/// All messages from server to client. Uses tagged enum with snake_case naming.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection admitted, client ID issued
    Connected { client_id: String },
    /// Chat message, either relayed or from the system
    Message { username: String, msg: String },
    /// A partner was found
    Partner { username: Option<String> },
    /// Partner is typing
    Typing,
    /// Partner stopped typing
    StopTyping,
}

impl ServerMessage {
    /// Build a message authored by the server
    pub fn system(msg: impl Into<String>) -> Self {
        ServerMessage::Message {
            username: SYSTEM_SENDER.to_string(),
            msg: msg.into(),
        }
    }

    pub fn waiting() -> Self {
        Self::system("Waiting for a stranger...")
    }

    pub fn paired() -> Self {
        Self::system("You are now chatting with a stranger. Say hi!")
    }

    pub fn partner_left() -> Self {
        Self::system("Stranger has left the chat.")
    }

    pub fn report_received() -> Self {
        Self::system("Thanks, your report has been recorded.")
    }

    pub fn banned() -> Self {
        Self::system("You have been temporarily banned due to multiple reports.")
    }

    /// Notice for a connection refused at admission
    pub fn admission_denied() -> Self {
        Self::system("You are temporarily banned due to reports. Try again later.")
    }
}

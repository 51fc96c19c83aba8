//! Error types for the game server
//!
//! Defines connection-level errors, room errors and board errors.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

use crate::types::{ClientId, RoomId};

/// Application-level errors
///
/// Fatal for a single connection: the connection task ends and the
/// server is told the client disconnected.
#[derive(Debug, Error)]
pub enum AppError {
    /// WebSocket protocol error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Channel send error (internal channel broken)
    #[error("Channel send error")]
    ChannelSend,

    /// Connection closed before the client sent its join request
    #[error("Connection closed before login")]
    ClosedBeforeLogin,

    /// First message was not a `PlayerJoinRequest`
    #[error("Expected player join request")]
    LoginExpected,
}

/// Room errors
///
/// Local to one message-handling step: logged by the caller, never fatal
/// to the server.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoomError {
    /// Channel added to a room it already belongs to
    #[error("Client {0} is already a member of room {1}")]
    AlreadyMember(ClientId, RoomId),

    /// Room lookup failed
    #[error("Room not found: {0}")]
    RoomNotFound(RoomId),
}

/// Board errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    /// Cell index outside 0..9
    #[error("Cell index {0} is out of range")]
    CellOutOfRange(usize),
}

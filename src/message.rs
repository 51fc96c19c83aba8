//! Message protocol definitions
//!
//! JSON-based message protocol using Serde's tagged enum. A single closed
//! `Message` type covers both directions so every kind round-trips through
//! the same codec; rooms dispatch on the variant.

use serde::{Deserialize, Serialize};

use crate::board::BoardSnapshot;
use crate::types::RoomKind;

/// Every message kind exchanged with clients
///
/// Uses tagged enum with snake_case naming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// C→S: first message on a connection, registers the display name
    PlayerJoinRequest { name: String },
    /// S→C: login accepted or rejected
    PlayerJoinResult { accepted: bool },
    /// C→S: toggle readiness in the lobby
    ChangeReadyStatusRequest { ready: bool },
    /// C↔S: chat line
    ChatMessage { message: String },
    /// C→S: claim a cell (0-8)
    MakeMoveRequest {
        #[serde(rename = "move")]
        cell: usize,
    },
    /// S→C: board after a move attempt
    MakeMoveResult {
        who_made_the_move: u8,
        board_data: BoardSnapshot,
    },
    /// C→S: give up the current game
    ConcedeRequest,
    /// C→S: leave a game room for the lobby
    ReturnToLobby { are_ya_winnin_son: bool },
    /// S→C: final result, per recipient
    GameFinished {
        board_data: BoardSnapshot,
        you_won: bool,
        is_draw: bool,
    },
    /// S→C: names of both players at game start
    PlayerNames {
        player1_name: String,
        player2_name: String,
    },
    /// S→C: the channel was moved into a room
    RoomJoinedEvent { room: RoomKind },
    /// S→C: lobby occupancy
    LobbyInfoUpdate {
        member_count: usize,
        ready_count: usize,
    },
}

impl Message {
    /// Wire tag of this message, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Message::PlayerJoinRequest { .. } => "player_join_request",
            Message::PlayerJoinResult { .. } => "player_join_result",
            Message::ChangeReadyStatusRequest { .. } => "change_ready_status_request",
            Message::ChatMessage { .. } => "chat_message",
            Message::MakeMoveRequest { .. } => "make_move_request",
            Message::MakeMoveResult { .. } => "make_move_result",
            Message::ConcedeRequest => "concede_request",
            Message::ReturnToLobby { .. } => "return_to_lobby",
            Message::GameFinished { .. } => "game_finished",
            Message::PlayerNames { .. } => "player_names",
            Message::RoomJoinedEvent { .. } => "room_joined_event",
            Message::LobbyInfoUpdate { .. } => "lobby_info_update",
        }
    }

    /// Decode one text frame
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Encode as one text frame
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

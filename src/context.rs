//! Context objects handed to rooms while they tick
//!
//! Rooms never hold a reference to the server. Instead, for the duration of
//! one tick, the server lends each room the parts of its state that room is
//! allowed to reach: the lobby may start games, a game room may hand players
//! back to the lobby, and both may read player metadata.

use tracing::error;

use crate::channel::Channel;
use crate::game::GameRooms;
use crate::lobby::LobbyRoom;
use crate::player::{PlayerDirectory, PlayerInfo};
use crate::types::{ClientId, RoomId};

/// What the lobby can reach while it ticks
pub struct MatchContext<'a> {
    games: &'a mut GameRooms,
    players: &'a PlayerDirectory,
}

impl<'a> MatchContext<'a> {
    pub fn new(games: &'a mut GameRooms, players: &'a PlayerDirectory) -> Self {
        Self { games, players }
    }

    /// Move a matched pair into an available (or new) game room
    pub fn start_game(&mut self, player1: Channel, player2: Channel) -> Option<RoomId> {
        match self.games.start_game(player1, player2, self.players) {
            Ok(room_id) => Some(room_id),
            Err(e) => {
                error!("Failed to start game: {}", e);
                None
            }
        }
    }

    pub fn player_info(&self, id: ClientId) -> Option<&PlayerInfo> {
        self.players.get(id)
    }
}

/// What a game room can reach while it ticks
pub struct GameContext<'a> {
    lobby: &'a mut LobbyRoom,
    players: &'a PlayerDirectory,
}

impl<'a> GameContext<'a> {
    pub fn new(lobby: &'a mut LobbyRoom, players: &'a PlayerDirectory) -> Self {
        Self { lobby, players }
    }

    pub fn lobby_room(&mut self) -> &mut LobbyRoom {
        &mut *self.lobby
    }

    pub fn player_info(&self, id: ClientId) -> Option<&PlayerInfo> {
        self.players.get(id)
    }
}

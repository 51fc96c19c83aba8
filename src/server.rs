//! GameServer actor implementation
//!
//! The central actor that owns all rooms and player metadata. Connection
//! tasks talk to it through an mpsc channel; a fixed-interval tick drives
//! message dispatch in every room.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::channel::Channel;
use crate::context::{GameContext, MatchContext};
use crate::game::GameRooms;
use crate::lobby::LobbyRoom;
use crate::message::Message;
use crate::player::PlayerDirectory;
use crate::types::ClientId;

/// Commands sent from connection handlers to the GameServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// Client completed login
    Connect {
        client_id: ClientId,
        name: String,
        channel: Channel,
    },
    /// Client disconnected
    Disconnect { client_id: ClientId },
}

/// The main GameServer actor
///
/// Single-threaded: commands and ticks are handled one at a time inside
/// `run`, so room state needs no locking.
pub struct GameServer {
    /// Display names of logged-in clients
    players: PlayerDirectory,
    /// The lobby singleton
    lobby: LobbyRoom,
    /// Game rooms in creation order
    games: GameRooms,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
    /// Time between ticks
    tick_interval: Duration,
}

impl GameServer {
    /// Create a new GameServer with the given command receiver
    pub fn new(receiver: mpsc::Receiver<ServerCommand>, tick_interval: Duration) -> Self {
        Self {
            players: PlayerDirectory::new(),
            lobby: LobbyRoom::new(),
            games: GameRooms::new(),
            receiver,
            tick_interval,
        }
    }

    /// Run the GameServer event loop
    ///
    /// Processes commands as they arrive and ticks every room at the
    /// configured interval, until all senders are dropped.
    pub async fn run(mut self) {
        info!("GameServer started (tick every {:?})", self.tick_interval);

        let mut ticker = time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                _ = ticker.tick() => self.tick(),
            }
        }

        info!("GameServer shutting down");
    }

    /// Process a single command
    pub fn handle_command(&mut self, cmd: ServerCommand) {
        match cmd {
            ServerCommand::Connect {
                client_id,
                name,
                channel,
            } => {
                self.handle_connect(client_id, name, channel);
            }
            ServerCommand::Disconnect { client_id } => {
                self.handle_disconnect(client_id);
            }
        }
    }

    /// Dispatch queued messages: lobby first, then each game room in
    /// creation order
    pub fn tick(&mut self) {
        let mut ctx = MatchContext::new(&mut self.games, &self.players);
        self.lobby.tick(&mut ctx);

        for game in self.games.iter_mut() {
            let mut ctx = GameContext::new(&mut self.lobby, &self.players);
            game.tick(&mut ctx);
        }
    }

    pub fn lobby(&self) -> &LobbyRoom {
        &self.lobby
    }

    pub fn games(&self) -> &GameRooms {
        &self.games
    }

    pub fn players(&self) -> &PlayerDirectory {
        &self.players
    }

    /// Handle a completed login
    ///
    /// Rejected logins get a negative result and their channel is dropped,
    /// which closes the connection.
    fn handle_connect(&mut self, client_id: ClientId, name: String, channel: Channel) {
        let name = name.trim().to_string();
        if name.is_empty() || !self.players.register(client_id, name.clone()) {
            warn!("Client {} rejected: name '{}' unavailable", client_id, name);
            channel.send(Message::PlayerJoinResult { accepted: false });
            return;
        }

        info!("Client {} logged in as '{}'", client_id, name);
        channel.send(Message::PlayerJoinResult { accepted: true });

        if let Err(e) = self.lobby.add_member(channel, &self.players) {
            warn!("Could not add {} to the lobby: {}", client_id, e);
            self.players.remove(client_id);
        }
        debug!(
            "Total players: {}, Game rooms: {}",
            self.players.len(),
            self.games.len()
        );
    }

    /// Handle client disconnection
    ///
    /// Removes the client from whichever room holds it. Leaving a game in
    /// play forfeits it.
    fn handle_disconnect(&mut self, client_id: ClientId) {
        let Some(info) = self.players.remove(client_id) else {
            debug!("Disconnect from unregistered client {}", client_id);
            return;
        };
        info!("Client {} ({}) disconnected", client_id, info.name);

        let removed = self
            .lobby
            .remove_member(client_id)
            .or_else(|| self.games.remove_member(client_id));
        if removed.is_none() {
            warn!("Disconnected client {} was not in any room", client_id);
        }
    }
}

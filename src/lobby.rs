//! Lobby room
//!
//! Every logged-in client starts here. Members toggle their ready status;
//! as soon as two members are ready the two who readied first are moved
//! into a game room.

use std::collections::VecDeque;

use tracing::{debug, error, info, warn};

use crate::channel::Channel;
use crate::context::MatchContext;
use crate::error::RoomError;
use crate::message::Message;
use crate::player::PlayerDirectory;
use crate::room::Room;
use crate::types::{ClientId, RoomId, RoomKind};

/// The lobby singleton
///
/// `ready` is a FIFO subset of the room's members.
#[derive(Debug)]
pub struct LobbyRoom {
    room: Room,
    ready: VecDeque<ClientId>,
}

impl LobbyRoom {
    pub fn new() -> Self {
        Self {
            room: Room::new(RoomId::LOBBY, RoomKind::Lobby),
            ready: VecDeque::new(),
        }
    }

    /// Add a freshly logged-in client and announce it
    pub fn add_member(
        &mut self,
        channel: Channel,
        players: &PlayerDirectory,
    ) -> Result<(), RoomError> {
        let id = channel.id();
        self.room.add_member(channel)?;
        self.room.send_to(id, Message::RoomJoinedEvent {
            room: self.room.kind(),
        });

        let name = players.display_name(id);
        info!("Client {} ({}) joined the lobby", id, name);
        self.room.broadcast(
            &Message::ChatMessage {
                message: format!("Client {} has joined the lobby!", name),
            },
            None,
        );
        self.broadcast_counts();
        Ok(())
    }

    /// Take back a client whose game has ended
    pub fn return_to_lobby(&mut self, channel: Channel) -> Result<(), RoomError> {
        let id = channel.id();
        self.room.add_member(channel)?;
        self.room.send_to(id, Message::RoomJoinedEvent {
            room: self.room.kind(),
        });
        info!("Client {} returned to the lobby", id);
        self.broadcast_counts();
        Ok(())
    }

    /// Remove a member (and its ready mark), handing back its channel
    pub fn remove_member(&mut self, id: ClientId) -> Option<Channel> {
        let channel = self.detach(id)?;
        self.broadcast_counts();
        Some(channel)
    }

    /// Send to a single lobby member
    pub fn send_to(&self, id: ClientId, msg: Message) -> bool {
        self.room.send_to(id, msg)
    }

    pub fn contains(&self, id: ClientId) -> bool {
        self.room.contains(id)
    }

    pub fn member_count(&self) -> usize {
        self.room.len()
    }

    pub fn ready_count(&self) -> usize {
        self.ready.len()
    }

    /// Ready members, oldest first
    pub fn ready_members(&self) -> Vec<ClientId> {
        self.ready.iter().copied().collect()
    }

    /// Dispatch every member's queued messages
    pub fn tick(&mut self, ctx: &mut MatchContext<'_>) {
        let mut cursor = self.room.begin_tick();
        while let Some((sender, msg)) = cursor.next_message(&mut self.room) {
            self.handle_message(msg, sender, ctx);
        }
    }

    fn handle_message(&mut self, msg: Message, sender: ClientId, ctx: &mut MatchContext<'_>) {
        match msg {
            Message::ChangeReadyStatusRequest { ready } => {
                self.set_ready(sender, ready);
                self.match_ready_members(ctx);
                self.broadcast_counts();
            }
            Message::ChatMessage { message } => {
                let name = ctx
                    .player_info(sender)
                    .map(|info| info.name.as_str())
                    .unwrap_or("Unknown");
                self.room.broadcast(
                    &Message::ChatMessage {
                        message: format!("{}: {}", name, message),
                    },
                    None,
                );
            }
            other => {
                warn!(
                    "Lobby dropped unexpected {} from {}",
                    other.kind(),
                    sender
                );
            }
        }
    }

    fn set_ready(&mut self, id: ClientId, ready: bool) {
        if ready {
            if !self.ready.contains(&id) {
                self.ready.push_back(id);
            }
        } else {
            self.ready.retain(|member| *member != id);
        }
        debug!("Client {} ready={} ({} ready)", id, ready, self.ready.len());
    }

    /// Pair the two oldest ready members until fewer than two remain
    fn match_ready_members(&mut self, ctx: &mut MatchContext<'_>) {
        while self.ready.len() >= 2 {
            let (Some(first), Some(second)) = (self.ready.pop_front(), self.ready.pop_front())
            else {
                break;
            };

            match (self.detach(first), self.detach(second)) {
                (Some(player1), Some(player2)) => {
                    if let Some(room_id) = ctx.start_game(player1, player2) {
                        info!("Matched {} and {} into room {}", first, second, room_id);
                    }
                }
                (Some(stray), None) | (None, Some(stray)) => {
                    error!("Ready member missing from lobby, keeping {}", stray.id());
                    let id = stray.id();
                    if self.room.add_member(stray).is_ok() {
                        self.ready.push_front(id);
                    }
                }
                (None, None) => {
                    error!("Ready members {} and {} missing from lobby", first, second);
                }
            }
        }
    }

    fn detach(&mut self, id: ClientId) -> Option<Channel> {
        let channel = self.room.remove_member(id)?;
        self.ready.retain(|member| *member != id);
        Some(channel)
    }

    fn broadcast_counts(&self) {
        self.room.broadcast(
            &Message::LobbyInfoUpdate {
                member_count: self.room.len(),
                ready_count: self.ready.len(),
            },
            None,
        );
    }
}

impl Default for LobbyRoom {
    fn default() -> Self {
        Self::new()
    }
}

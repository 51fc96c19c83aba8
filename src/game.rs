//! Game rooms
//!
//! A `GameRoom` runs one match at a time between two players and is reused
//! for later matches once both players have gone back to the lobby.
//!
//! ```text
//! WaitingForPlayers --start_game--> InPlay --win/draw/concede--> Finished
//!        ^                                                          |
//!        +-------------- both players returned to lobby ------------+
//! ```
//!
//! Player ids come from join order: the first member is player 1, the
//! second player 2. Moves are not checked against `Board::current_turn`;
//! clients are trusted to take turns.

use tracing::{debug, info, warn};

use crate::board::{Board, Seat};
use crate::channel::Channel;
use crate::context::GameContext;
use crate::error::RoomError;
use crate::message::Message;
use crate::player::PlayerDirectory;
use crate::room::Room;
use crate::types::{ClientId, RoomId, RoomKind};

/// Chat line sent to a player who reports having won
const WINNER_LINE: &str = "Heck yeah, I won!";
/// Chat line sent to a player who reports having lost
const LOSER_LINE: &str = "Nah, I'm a disappointment.";

/// How a match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win(Seat),
    Draw,
}

/// Lifecycle state of a game room
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    /// Empty and ready for the next pair
    WaitingForPlayers,
    /// A match is running
    InPlay,
    /// Match over, players still looking at the result
    Finished,
}

/// A two-player tic-tac-toe room
#[derive(Debug)]
pub struct GameRoom {
    room: Room,
    board: Board,
    in_play: bool,
    outcome: Option<Outcome>,
}

impl GameRoom {
    pub fn new(id: RoomId) -> Self {
        Self {
            room: Room::new(id, RoomKind::Game),
            board: Board::new(),
            in_play: false,
            outcome: None,
        }
    }

    pub fn id(&self) -> RoomId {
        self.room.id()
    }

    pub fn in_play(&self) -> bool {
        self.in_play
    }

    pub fn state(&self) -> GameState {
        if self.in_play {
            GameState::InPlay
        } else if self.room.is_empty() {
            GameState::WaitingForPlayers
        } else {
            GameState::Finished
        }
    }

    /// True when the room can host a new match
    pub fn is_available(&self) -> bool {
        self.state() == GameState::WaitingForPlayers
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Result of the last finished match
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn contains(&self, id: ClientId) -> bool {
        self.room.contains(id)
    }

    pub fn member_count(&self) -> usize {
        self.room.len()
    }

    /// Seat of a member, derived from join order
    pub fn seat_of(&self, id: ClientId) -> Option<Seat> {
        self.room.position(id).and_then(Seat::from_index)
    }

    /// Begin a match between two players
    ///
    /// Resets the board, adds both players (player 1 first) and tells them
    /// each other's names.
    pub fn start_game(
        &mut self,
        player1: Channel,
        player2: Channel,
        players: &PlayerDirectory,
    ) -> Result<(), RoomError> {
        self.board.reset();
        self.outcome = None;
        self.in_play = true;

        let (id1, id2) = (player1.id(), player2.id());
        self.add_member(player1)?;
        self.add_member(player2)?;

        let player1_name = players.display_name(id1).to_string();
        let player2_name = players.display_name(id2).to_string();
        info!(
            "Room {} started: {} vs {}",
            self.id(),
            player1_name,
            player2_name
        );
        self.room.broadcast(
            &Message::PlayerNames {
                player1_name,
                player2_name,
            },
            None,
        );
        Ok(())
    }

    /// Remove a member, handing back its channel
    ///
    /// Leaving a match that is still in play forfeits it.
    pub fn remove_member(&mut self, id: ClientId) -> Option<Channel> {
        let seat = self.seat_of(id)?;
        if self.in_play {
            info!("Client {} left room {} mid-game", id, self.id());
            self.finish(Outcome::Win(seat.other()));
        }
        self.room.remove_member(id)
    }

    /// Dispatch every member's queued messages
    pub fn tick(&mut self, ctx: &mut GameContext<'_>) {
        let mut cursor = self.room.begin_tick();
        while let Some((sender, msg)) = cursor.next_message(&mut self.room) {
            self.handle_message(msg, sender, ctx);
        }
    }

    fn handle_message(&mut self, msg: Message, sender: ClientId, ctx: &mut GameContext<'_>) {
        match msg {
            Message::MakeMoveRequest { cell } if self.in_play => {
                self.handle_move(cell, sender);
            }
            Message::ConcedeRequest if self.in_play => {
                if let Some(seat) = self.seat_of(sender) {
                    info!("Client {} conceded in room {}", sender, self.id());
                    self.finish(Outcome::Win(seat.other()));
                }
            }
            Message::ReturnToLobby { are_ya_winnin_son } => {
                self.return_to_lobby(sender, are_ya_winnin_son, ctx);
            }
            other => {
                warn!(
                    "Room {} dropped unexpected {} from {} (in play: {})",
                    self.id(),
                    other.kind(),
                    sender,
                    self.in_play
                );
            }
        }
    }

    fn handle_move(&mut self, cell: usize, sender: ClientId) {
        let Some(seat) = self.seat_of(sender) else {
            return;
        };

        match self.board.make_move(cell, seat) {
            Ok(true) => debug!("Room {}: player {} took cell {}", self.id(), seat.id(), cell),
            Ok(false) => debug!("Room {}: cell {} already taken", self.id(), cell),
            Err(e) => {
                warn!("Room {} rejected move from {}: {}", self.id(), sender, e);
                return;
            }
        }

        self.room.broadcast(
            &Message::MakeMoveResult {
                who_made_the_move: seat.id(),
                board_data: self.board.snapshot(),
            },
            None,
        );

        if let Some(winner) = self.board.who_has_won() {
            self.finish(Outcome::Win(winner));
        } else if self.board.is_full() {
            self.finish(Outcome::Draw);
        }
    }

    /// Send each player the result and leave the in-play state
    fn finish(&mut self, outcome: Outcome) {
        let board_data = self.board.snapshot();
        for (index, id) in self.room.member_ids().into_iter().enumerate() {
            let you_won = Seat::from_index(index).is_some_and(|seat| outcome == Outcome::Win(seat));
            self.room.send_to(id, Message::GameFinished {
                board_data,
                you_won,
                is_draw: outcome == Outcome::Draw,
            });
        }
        self.in_play = false;
        self.outcome = Some(outcome);
        info!("Room {} finished: {:?}", self.id(), outcome);
    }

    fn return_to_lobby(&mut self, sender: ClientId, claims_win: bool, ctx: &mut GameContext<'_>) {
        let Some(channel) = self.remove_member(sender) else {
            return;
        };
        let name = ctx
            .player_info(sender)
            .map(|info| info.name.clone())
            .unwrap_or_default();
        debug!("{} leaving room {} for the lobby", name, self.id());

        let lobby = ctx.lobby_room();
        if let Err(e) = lobby.return_to_lobby(channel) {
            warn!("Could not return {} to the lobby: {}", sender, e);
            return;
        }
        let line = if claims_win { WINNER_LINE } else { LOSER_LINE };
        lobby.send_to(sender, Message::ChatMessage {
            message: line.to_string(),
        });
    }

    fn add_member(&mut self, channel: Channel) -> Result<(), RoomError> {
        let id = channel.id();
        self.room.add_member(channel)?;
        self.room.send_to(id, Message::RoomJoinedEvent {
            room: self.room.kind(),
        });
        Ok(())
    }
}

/// All game rooms, in creation order
#[derive(Debug, Default)]
pub struct GameRooms {
    rooms: Vec<GameRoom>,
    last_id: Option<RoomId>,
}

impl GameRooms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a match in the first available room, creating one if needed
    pub fn start_game(
        &mut self,
        player1: Channel,
        player2: Channel,
        players: &PlayerDirectory,
    ) -> Result<RoomId, RoomError> {
        let index = match self.rooms.iter().position(GameRoom::is_available) {
            Some(index) => index,
            None => {
                let id = self.last_id.unwrap_or(RoomId::LOBBY).next();
                self.last_id = Some(id);
                self.rooms.push(GameRoom::new(id));
                debug!("Created game room {}", id);
                self.rooms.len() - 1
            }
        };

        let room = &mut self.rooms[index];
        room.start_game(player1, player2, players)?;
        Ok(room.id())
    }

    /// Remove a client from whichever game room holds it
    pub fn remove_member(&mut self, id: ClientId) -> Option<Channel> {
        self.rooms
            .iter_mut()
            .find(|room| room.contains(id))
            .and_then(|room| room.remove_member(id))
    }

    /// The game room holding a client
    pub fn room_of(&self, id: ClientId) -> Option<&GameRoom> {
        self.rooms.iter().find(|room| room.contains(id))
    }

    pub fn get(&self, id: RoomId) -> Result<&GameRoom, RoomError> {
        self.rooms
            .iter()
            .find(|room| room.id() == id)
            .ok_or(RoomError::RoomNotFound(id))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut GameRoom> {
        self.rooms.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::CELL_COUNT;
    use crate::channel::Peer;
    use crate::lobby::LobbyRoom;

    struct Fixture {
        game: GameRoom,
        lobby: LobbyRoom,
        players: PlayerDirectory,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                game: GameRoom::new(RoomId(1)),
                lobby: LobbyRoom::new(),
                players: PlayerDirectory::new(),
            }
        }

        fn start(&mut self, name1: &str, name2: &str) -> (Peer, Peer) {
            let (c1, p1) = Channel::pair(ClientId::new());
            let (c2, p2) = Channel::pair(ClientId::new());
            self.players.register(p1.id(), name1.to_string());
            self.players.register(p2.id(), name2.to_string());
            self.game.start_game(c1, c2, &self.players).unwrap();
            (p1, p2)
        }

        fn tick(&mut self) {
            let mut ctx = GameContext::new(&mut self.lobby, &self.players);
            self.game.tick(&mut ctx);
        }

        /// Feed moves one at a time so each lands in its own tick
        fn play(&mut self, p1: &Peer, p2: &Peer, moves: &[usize]) {
            for (n, cell) in moves.iter().enumerate() {
                let peer = if n % 2 == 0 { p1 } else { p2 };
                peer.send(Message::MakeMoveRequest { cell: *cell });
                self.tick();
            }
        }
    }

    fn finished_messages(peer: &mut Peer) -> Vec<Message> {
        peer.drain()
            .into_iter()
            .filter(|msg| matches!(msg, Message::GameFinished { .. }))
            .collect()
    }

    #[test]
    fn test_start_game_notifies_players() {
        let mut fx = Fixture::new();
        let (mut p1, mut p2) = fx.start("Alice", "Bob");

        let expected = vec![
            Message::RoomJoinedEvent {
                room: RoomKind::Game,
            },
            Message::PlayerNames {
                player1_name: "Alice".to_string(),
                player2_name: "Bob".to_string(),
            },
        ];
        assert_eq!(p1.drain(), expected);
        assert_eq!(p2.drain(), expected);
        assert_eq!(fx.game.state(), GameState::InPlay);
        assert_eq!(fx.game.seat_of(p1.id()), Some(Seat::One));
        assert_eq!(fx.game.seat_of(p2.id()), Some(Seat::Two));
    }

    #[test]
    fn test_move_is_broadcast() {
        let mut fx = Fixture::new();
        let (mut p1, mut p2) = fx.start("Alice", "Bob");
        p1.drain();
        p2.drain();

        p2.send(Message::MakeMoveRequest { cell: 4 });
        fx.tick();

        let mut cells = [0; CELL_COUNT];
        cells[4] = 2;
        let expected = Message::MakeMoveResult {
            who_made_the_move: 2,
            board_data: crate::board::BoardSnapshot {
                cells,
                current_turn: 1,
            },
        };
        assert_eq!(p1.drain(), vec![expected.clone()]);
        assert_eq!(p2.drain(), vec![expected]);
    }

    #[test]
    fn test_occupied_cell_still_broadcasts_unchanged_board() {
        let mut fx = Fixture::new();
        let (mut p1, p2) = fx.start("Alice", "Bob");
        fx.play(&p1, &p2, &[4]);
        let before = fx.game.board().snapshot();
        p1.drain();

        p2.send(Message::MakeMoveRequest { cell: 4 });
        fx.tick();

        assert_eq!(
            p1.drain(),
            vec![Message::MakeMoveResult {
                who_made_the_move: 2,
                board_data: before,
            }]
        );
        assert!(fx.game.in_play());
    }

    #[test]
    fn test_out_of_range_move_is_dropped() {
        let mut fx = Fixture::new();
        let (mut p1, _p2) = fx.start("Alice", "Bob");
        p1.drain();

        p1.send(Message::MakeMoveRequest { cell: 12 });
        fx.tick();

        assert!(p1.drain().is_empty());
        assert!(fx.game.in_play());
    }

    #[test]
    fn test_off_turn_moves_are_accepted() {
        let mut fx = Fixture::new();
        let (p1, _p2) = fx.start("Alice", "Bob");

        p1.send(Message::MakeMoveRequest { cell: 0 });
        p1.send(Message::MakeMoveRequest { cell: 1 });
        fx.tick();

        let cells = fx.game.board().snapshot().cells;
        assert_eq!(&cells[..2], &[1, 1]);
    }

    #[test]
    fn test_win_finishes_game() {
        let mut fx = Fixture::new();
        let (mut p1, mut p2) = fx.start("Alice", "Bob");
        fx.play(&p1, &p2, &[0, 3, 1, 4]);
        assert!(fx.game.in_play());
        assert!(finished_messages(&mut p1).is_empty());

        fx.play(&p1, &p2, &[2]);
        assert!(!fx.game.in_play());
        assert_eq!(fx.game.state(), GameState::Finished);
        assert_eq!(fx.game.outcome(), Some(Outcome::Win(Seat::One)));

        let board_data = fx.game.board().snapshot();
        assert_eq!(
            finished_messages(&mut p1),
            vec![Message::GameFinished {
                board_data,
                you_won: true,
                is_draw: false
            }]
        );
        assert_eq!(
            finished_messages(&mut p2),
            vec![Message::GameFinished {
                board_data,
                you_won: false,
                is_draw: false
            }]
        );
    }

    #[test]
    fn test_draw_finishes_game() {
        let mut fx = Fixture::new();
        let (mut p1, mut p2) = fx.start("Alice", "Bob");
        fx.play(&p1, &p2, &[0, 1, 2, 4, 3, 5, 7, 6, 8]);

        assert_eq!(fx.game.outcome(), Some(Outcome::Draw));
        assert!(!fx.game.in_play());
        for peer in [&mut p1, &mut p2] {
            match finished_messages(peer).as_slice() {
                [Message::GameFinished {
                    you_won, is_draw, ..
                }] => {
                    assert!(!you_won);
                    assert!(is_draw);
                }
                other => panic!("unexpected messages: {:?}", other),
            }
        }
    }

    #[test]
    fn test_concede_on_empty_board() {
        let mut fx = Fixture::new();
        let (mut p1, mut p2) = fx.start("Alice", "Bob");

        p1.send(Message::ConcedeRequest);
        fx.tick();

        assert!(!fx.game.in_play());
        assert_eq!(fx.game.outcome(), Some(Outcome::Win(Seat::Two)));
        assert_eq!(fx.game.board().snapshot().cells, [0; CELL_COUNT]);
        assert!(matches!(
            finished_messages(&mut p1).as_slice(),
            [Message::GameFinished { you_won: false, .. }]
        ));
        assert!(matches!(
            finished_messages(&mut p2).as_slice(),
            [Message::GameFinished { you_won: true, .. }]
        ));
    }

    #[test]
    fn test_moves_after_finish_are_dropped() {
        let mut fx = Fixture::new();
        let (mut p1, p2) = fx.start("Alice", "Bob");
        p2.send(Message::ConcedeRequest);
        fx.tick();
        p1.drain();

        p1.send(Message::MakeMoveRequest { cell: 0 });
        p1.send(Message::ConcedeRequest);
        fx.tick();

        assert!(p1.drain().is_empty());
        assert_eq!(fx.game.outcome(), Some(Outcome::Win(Seat::One)));
    }

    #[test]
    fn test_return_to_lobby() {
        let mut fx = Fixture::new();
        let (mut p1, p2) = fx.start("Alice", "Bob");
        p2.send(Message::ConcedeRequest);
        fx.tick();
        p1.drain();

        p1.send(Message::ReturnToLobby {
            are_ya_winnin_son: true,
        });
        fx.tick();

        assert!(!fx.game.contains(p1.id()));
        assert!(fx.lobby.contains(p1.id()));
        assert_eq!(fx.game.state(), GameState::Finished);
        assert_eq!(
            p1.drain(),
            vec![
                Message::RoomJoinedEvent {
                    room: RoomKind::Lobby
                },
                Message::LobbyInfoUpdate {
                    member_count: 1,
                    ready_count: 0
                },
                Message::ChatMessage {
                    message: WINNER_LINE.to_string()
                },
            ]
        );

        p2.send(Message::ReturnToLobby {
            are_ya_winnin_son: false,
        });
        fx.tick();
        assert_eq!(fx.game.state(), GameState::WaitingForPlayers);
        assert_eq!(fx.lobby.member_count(), 2);
    }

    #[test]
    fn test_return_to_lobby_mid_game_concedes() {
        let mut fx = Fixture::new();
        let (p1, mut p2) = fx.start("Alice", "Bob");
        p2.drain();

        p1.send(Message::ReturnToLobby {
            are_ya_winnin_son: true,
        });
        fx.tick();

        assert!(!fx.game.in_play());
        assert!(fx.lobby.contains(p1.id()));
        assert!(matches!(
            finished_messages(&mut p2).as_slice(),
            [Message::GameFinished { you_won: true, .. }]
        ));
    }

    #[test]
    fn test_room_reuse_resets_board_and_seats() {
        let mut fx = Fixture::new();
        let (p1, p2) = fx.start("Alice", "Bob");
        fx.play(&p1, &p2, &[0, 3, 1, 4, 2]);
        for peer in [&p1, &p2] {
            peer.send(Message::ReturnToLobby {
                are_ya_winnin_son: false,
            });
        }
        fx.tick();
        assert!(fx.game.is_available());

        let (p3, p4) = fx.start("Carol", "Dave");
        assert!(fx.game.in_play());
        assert_eq!(fx.game.board().snapshot().cells, [0; CELL_COUNT]);
        assert_eq!(fx.game.outcome(), None);
        assert_eq!(fx.game.seat_of(p3.id()), Some(Seat::One));
        assert_eq!(fx.game.seat_of(p4.id()), Some(Seat::Two));
    }

    #[test]
    fn test_remove_member_mid_game_forfeits() {
        let mut fx = Fixture::new();
        let (p1, mut p2) = fx.start("Alice", "Bob");
        p2.drain();

        let channel = fx.game.remove_member(p1.id()).unwrap();
        assert_eq!(channel.id(), p1.id());
        assert_eq!(fx.game.outcome(), Some(Outcome::Win(Seat::Two)));
        assert!(matches!(
            finished_messages(&mut p2).as_slice(),
            [Message::GameFinished { you_won: true, .. }]
        ));
    }

    #[test]
    fn test_pool_reuses_available_room() {
        let mut rooms = GameRooms::new();
        let players = PlayerDirectory::new();
        let pair = || {
            let (c1, p1) = Channel::pair(ClientId::new());
            let (c2, p2) = Channel::pair(ClientId::new());
            (c1, c2, p1, p2)
        };

        let (c1, c2, p1, p2) = pair();
        let first = rooms.start_game(c1, c2, &players).unwrap();
        assert_eq!(first, RoomId(1));

        let (c3, c4, _p3, _p4) = pair();
        let second = rooms.start_game(c3, c4, &players).unwrap();
        assert_eq!(second, RoomId(2));

        assert!(rooms.remove_member(p1.id()).is_some());
        assert!(rooms.remove_member(p2.id()).is_some());
        assert!(rooms.get(first).unwrap().is_available());

        let (c5, c6, _p5, _p6) = pair();
        assert_eq!(rooms.start_game(c5, c6, &players).unwrap(), first);
        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms.get(RoomId(9)).err(), Some(RoomError::RoomNotFound(RoomId(9))));
    }
}

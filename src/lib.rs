//! Tic-tac-toe Session Server Library
//!
//! A tick-driven WebSocket game server built with tokio-tungstenite.
//! Clients log in, wait in a lobby, get paired into two-player games and
//! return to the lobby when the game is over.
//!
//! # Features
//! - Login with a unique display name
//! - Lobby chat, ready toggling and FIFO pair matching
//! - Authoritative tic-tac-toe board with win and draw detection
//! - Concede, leave and disconnect handling
//! - Game room reuse across matches
//!
//! # Architecture
//! - `GameServer` is the central actor owning every room
//! - Each connection has a `handler` task that owns the socket and feeds
//!   the client's `Channel`
//! - Rooms are polled once per tick: lobby first, then game rooms in
//!   creation order, all on the actor's task
//!
//! # Example
//! ```ignore
//! use std::time::Duration;
//! use tokio::net::TcpListener;
//! use tokio::sync::mpsc;
//! use tictactoe_server::{GameServer, handle_connection};
//!
//! #[tokio::main]
//! async fn main() {
//!     let listener = TcpListener::bind("127.0.0.1:8080").await.unwrap();
//!     let (cmd_tx, cmd_rx) = mpsc::channel(256);
//!
//!     tokio::spawn(GameServer::new(cmd_rx, Duration::from_millis(50)).run());
//!
//!     while let Ok((stream, _)) = listener.accept().await {
//!         let cmd_tx = cmd_tx.clone();
//!         tokio::spawn(handle_connection(stream, cmd_tx));
//!     }
//! }
//! ```

pub mod board;
pub mod channel;
pub mod config;
pub mod context;
pub mod error;
pub mod game;
pub mod handler;
pub mod lobby;
pub mod message;
pub mod player;
pub mod room;
pub mod server;
pub mod types;

// Re-export main types for convenience
pub use board::{Board, BoardSnapshot, Cell, Seat};
pub use channel::{Channel, Peer};
pub use config::ServerConfig;
pub use error::{AppError, BoardError, RoomError};
pub use game::{GameRoom, GameRooms, GameState, Outcome};
pub use handler::handle_connection;
pub use lobby::LobbyRoom;
pub use message::Message;
pub use player::{PlayerDirectory, PlayerInfo};
pub use room::Room;
pub use server::{GameServer, ServerCommand};
pub use types::{ClientId, RoomId, RoomKind};

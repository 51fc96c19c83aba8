//! Per-connection player metadata
//!
//! The server fills this table at login; rooms only read it.

use std::collections::HashMap;

use crate::types::ClientId;

/// Display information for a connected player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerInfo {
    pub name: String,
}

/// Player metadata keyed by connection
#[derive(Debug, Default)]
pub struct PlayerDirectory {
    players: HashMap<ClientId, PlayerInfo>,
}

impl PlayerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a player
    ///
    /// Returns false, leaving the table unchanged, if the name is already
    /// taken by another connection.
    pub fn register(&mut self, id: ClientId, name: String) -> bool {
        if self.is_name_taken(&name) {
            return false;
        }
        self.players.insert(id, PlayerInfo { name });
        true
    }

    pub fn remove(&mut self, id: ClientId) -> Option<PlayerInfo> {
        self.players.remove(&id)
    }

    pub fn get(&self, id: ClientId) -> Option<&PlayerInfo> {
        self.players.get(&id)
    }

    /// Name to show for a client
    ///
    /// Returns "Unknown" for unregistered connections.
    pub fn display_name(&self, id: ClientId) -> &str {
        self.get(id).map(|info| info.name.as_str()).unwrap_or("Unknown")
    }

    pub fn is_name_taken(&self, name: &str) -> bool {
        self.players.values().any(|info| info.name == name)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

//! Shared room plumbing
//!
//! `Room` owns the member channels of one room and provides the pieces
//! every room kind needs: membership bookkeeping, message fan-out and the
//! per-tick dispatch cursor. `LobbyRoom` and `GameRoom` wrap a `Room` and
//! add their own message handling on top.

use std::collections::VecDeque;

use crate::channel::Channel;
use crate::error::RoomError;
use crate::message::Message;
use crate::types::{ClientId, RoomId, RoomKind};

/// Membership and fan-out for a single room
///
/// Members are kept in join order.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    kind: RoomKind,
    members: Vec<Channel>,
}

impl Room {
    /// Create an empty room
    pub fn new(id: RoomId, kind: RoomKind) -> Self {
        Self {
            id,
            kind,
            members: Vec::new(),
        }
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn kind(&self) -> RoomKind {
        self.kind
    }

    /// Append a channel to the member list
    ///
    /// Adding a client that is already a member is a caller error; the
    /// duplicate channel is dropped and the error returned.
    pub fn add_member(&mut self, channel: Channel) -> Result<(), RoomError> {
        if self.contains(channel.id()) {
            return Err(RoomError::AlreadyMember(channel.id(), self.id));
        }
        self.members.push(channel);
        Ok(())
    }

    /// Remove a member, handing its channel back to the caller
    ///
    /// Returns `None` if the client is not a member.
    pub fn remove_member(&mut self, id: ClientId) -> Option<Channel> {
        let index = self.position(id)?;
        Some(self.members.remove(index))
    }

    /// Check if a client is in this room
    pub fn contains(&self, id: ClientId) -> bool {
        self.members.iter().any(|member| member.id() == id)
    }

    /// Join-order position of a member
    pub fn position(&self, id: ClientId) -> Option<usize> {
        self.members.iter().position(|member| member.id() == id)
    }

    /// Member ids in join order
    pub fn member_ids(&self) -> Vec<ClientId> {
        self.members.iter().map(Channel::id).collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Send a message to one member
    ///
    /// Returns false if the client is not a member.
    pub fn send_to(&self, id: ClientId, msg: Message) -> bool {
        match self.members.iter().find(|member| member.id() == id) {
            Some(member) => {
                member.send(msg);
                true
            }
            None => false,
        }
    }

    /// Send a message to every member except `excluding`
    pub fn broadcast(&self, msg: &Message, excluding: Option<ClientId>) {
        for member in &self.members {
            if Some(member.id()) != excluding {
                member.send(msg.clone());
            }
        }
    }

    /// Start dispatching this tick's inbound messages
    ///
    /// The member list is snapshotted here; see [`TickCursor`].
    pub fn begin_tick(&self) -> TickCursor {
        TickCursor {
            pending: self.member_ids().into(),
        }
    }

    fn member_mut(&mut self, id: ClientId) -> Option<&mut Channel> {
        self.members.iter_mut().find(|member| member.id() == id)
    }
}

/// Iterates the inbound messages of one tick, member by member
///
/// Only members present when the tick began are polled. A member that
/// leaves the room mid-dispatch is skipped from then on; whatever it still
/// has queued is handled by the room it moved to.
#[derive(Debug)]
pub struct TickCursor {
    pending: VecDeque<ClientId>,
}

impl TickCursor {
    /// Next `(sender, message)` pair, or `None` when the tick is drained
    pub fn next_message(&mut self, room: &mut Room) -> Option<(ClientId, Message)> {
        while let Some(&id) = self.pending.front() {
            if let Some(msg) = room.member_mut(id).and_then(Channel::next_inbound) {
                return Some((id, msg));
            }
            self.pending.pop_front();
        }
        None
    }
}

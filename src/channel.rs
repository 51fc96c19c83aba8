//! Per-connection message channel
//!
//! A connection is split into two ends:
//! - `Channel`: owned by exactly one room at a time, polled once per tick
//! - `Peer`: held by the transport (or a test), feeds inbound messages and
//!   consumes outbound ones
//!
//! Both directions are unbounded so neither side ever blocks.

use tokio::sync::mpsc;
use tracing::debug;

use crate::message::Message;
use crate::types::ClientId;

/// Room-side end of a connection
///
/// Moving a `Channel` between rooms moves ownership, so a channel can never
/// be a member of two rooms at once.
#[derive(Debug)]
pub struct Channel {
    id: ClientId,
    inbound: mpsc::UnboundedReceiver<Message>,
    outbound: mpsc::UnboundedSender<Message>,
}

impl Channel {
    /// Create a connected channel/peer pair
    pub fn pair(id: ClientId) -> (Channel, Peer) {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let channel = Channel {
            id,
            inbound: inbound_rx,
            outbound: outbound_tx,
        };
        let peer = Peer {
            id,
            inbound: inbound_tx,
            outbound: outbound_rx,
        };
        (channel, peer)
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Queue a message for the client
    ///
    /// Never fails: if the connection is gone the message is dropped and
    /// the disconnect is reported through the server's command channel.
    pub fn send(&self, msg: Message) {
        if self.outbound.send(msg).is_err() {
            debug!("Dropping outbound message for closed client {}", self.id);
        }
    }

    /// Next queued inbound message, without waiting
    pub fn next_inbound(&mut self) -> Option<Message> {
        self.inbound.try_recv().ok()
    }

    /// All inbound messages received since the last poll, in arrival order
    pub fn poll_inbound(&mut self) -> Vec<Message> {
        std::iter::from_fn(|| self.next_inbound()).collect()
    }
}

/// Transport-side end of a connection
#[derive(Debug)]
pub struct Peer {
    id: ClientId,
    inbound: mpsc::UnboundedSender<Message>,
    outbound: mpsc::UnboundedReceiver<Message>,
}

impl Peer {
    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Deliver a message from the client into its channel
    ///
    /// Returns false once the room-side channel has been dropped.
    pub fn send(&self, msg: Message) -> bool {
        self.inbound.send(msg).is_ok()
    }

    /// Wait for the next message addressed to the client
    ///
    /// Returns `None` once the room-side channel has been dropped.
    pub async fn recv(&mut self) -> Option<Message> {
        self.outbound.recv().await
    }

    /// Everything currently queued for the client, without waiting
    pub fn drain(&mut self) -> Vec<Message> {
        std::iter::from_fn(|| self.outbound.try_recv().ok()).collect()
    }

    /// Split into the raw halves for the read and write pumps
    pub fn into_parts(
        self,
    ) -> (
        mpsc::UnboundedSender<Message>,
        mpsc::UnboundedReceiver<Message>,
    ) {
        (self.inbound, self.outbound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_inbound_preserves_order() {
        let (mut channel, peer) = Channel::pair(ClientId::new());
        assert!(channel.poll_inbound().is_empty());

        peer.send(Message::ChangeReadyStatusRequest { ready: true });
        peer.send(Message::ChatMessage {
            message: "hi".to_string(),
        });

        let polled = channel.poll_inbound();
        assert_eq!(
            polled,
            vec![
                Message::ChangeReadyStatusRequest { ready: true },
                Message::ChatMessage {
                    message: "hi".to_string()
                },
            ]
        );
        assert!(channel.poll_inbound().is_empty());
    }

    #[test]
    fn test_send_reaches_peer() {
        let (channel, mut peer) = Channel::pair(ClientId::new());
        channel.send(Message::ConcedeRequest);
        assert_eq!(peer.drain(), vec![Message::ConcedeRequest]);
        assert!(peer.drain().is_empty());
    }

    #[test]
    fn test_send_after_peer_dropped_does_not_panic() {
        let (channel, peer) = Channel::pair(ClientId::new());
        drop(peer);
        channel.send(Message::ConcedeRequest);
    }

    #[tokio::test]
    async fn test_peer_recv_ends_when_channel_dropped() {
        let (channel, mut peer) = Channel::pair(ClientId::new());
        assert_eq!(channel.id(), peer.id());
        drop(channel);
        assert!(peer.recv().await.is_none());
        assert!(!peer.send(Message::ConcedeRequest));
    }
}

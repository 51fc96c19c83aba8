//! WebSocket connection handler
//!
//! Handles individual client connections: WebSocket handshake, login,
//! and pumping JSON frames between the socket and the client's `Channel`.

use futures_util::{SinkExt, Stream, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{self, Message as WsMessage};
use tracing::{debug, error, info, warn};

use crate::channel::Channel;
use crate::error::AppError;
use crate::message::Message;
use crate::server::ServerCommand;
use crate::types::ClientId;

/// Handle a new TCP connection
///
/// Performs the WebSocket handshake, waits for the client's
/// `PlayerJoinRequest`, registers the client with the GameServer and then
/// relays messages until either side closes.
pub async fn handle_connection(
    stream: TcpStream,
    cmd_tx: mpsc::Sender<ServerCommand>,
) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    debug!("New TCP connection from {}", peer_addr);

    // WebSocket handshake
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let name = read_login(&mut ws_receiver).await?;

    // Generate client ID
    let client_id = ClientId::new();
    info!("Client {} ('{}') connected from {}", client_id, name, peer_addr);

    let (channel, peer) = Channel::pair(client_id);

    // Register with GameServer
    if cmd_tx
        .send(ServerCommand::Connect {
            client_id,
            name,
            channel,
        })
        .await
        .is_err()
    {
        error!("Failed to register client {} - server closed", client_id);
        return Err(AppError::ChannelSend);
    }

    let (inbound_tx, mut outbound_rx) = peer.into_parts();

    // Spawn read task (WebSocket -> Channel)
    let read_task = tokio::spawn(async move {
        while let Some(msg_result) = ws_receiver.next().await {
            match msg_result {
                Ok(WsMessage::Text(text)) => match Message::decode(&text) {
                    Ok(msg) => {
                        if inbound_tx.send(msg).is_err() {
                            debug!("Channel closed, ending read task for {}", client_id);
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Invalid message from {}: {}", client_id, e);
                    }
                },
                Ok(WsMessage::Close(_)) => {
                    debug!("Client {} sent close frame", client_id);
                    break;
                }
                Ok(WsMessage::Ping(_)) | Ok(WsMessage::Pong(_)) => {
                    // Pong is handled automatically by tungstenite
                }
                Ok(_) => {
                    // Binary or other message types - ignore
                }
                Err(e) => {
                    error!("WebSocket error for {}: {}", client_id, e);
                    break;
                }
            }
        }
        debug!("Read task ended for {}", client_id);
    });

    // Spawn write task (Channel -> WebSocket)
    let write_task = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            match msg.encode() {
                Ok(json) => {
                    if ws_sender.send(WsMessage::Text(json.into())).await.is_err() {
                        debug!("WebSocket send failed, ending write task");
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize message: {}", e);
                }
            }
        }
        debug!("Write task ended for {}", client_id);

        // Send close frame when done
        let _ = ws_sender.close().await;
    });

    // Wait for either task to complete
    tokio::select! {
        _ = read_task => {
            debug!("Read task completed for {}", client_id);
        }
        _ = write_task => {
            debug!("Write task completed for {}", client_id);
        }
    }

    // Send disconnect command
    let _ = cmd_tx.send(ServerCommand::Disconnect { client_id }).await;

    info!("Client {} disconnected", client_id);

    Ok(())
}

/// Wait for the `PlayerJoinRequest` that must open every session
async fn read_login<S>(ws_receiver: &mut S) -> Result<String, AppError>
where
    S: Stream<Item = Result<WsMessage, tungstenite::Error>> + Unpin,
{
    while let Some(frame) = ws_receiver.next().await {
        match frame? {
            WsMessage::Text(text) => {
                return match Message::decode(&text)? {
                    Message::PlayerJoinRequest { name } => Ok(name),
                    other => {
                        warn!("Expected login, got {}", other.kind());
                        Err(AppError::LoginExpected)
                    }
                };
            }
            WsMessage::Close(_) => break,
            _ => {}
        }
    }
    Err(AppError::ClosedBeforeLogin)
}

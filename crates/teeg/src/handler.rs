//! Per-connection handler.
//!
//! Each accepted connection gets its own Tokio task running this handler:
//!   1. Derive the player's id from the connection and send `Welcome`
//!   2. Spawn a writer task draining the player's outbound channel
//!   3. Loop: receive frames → decode → act on the room manager
//!
//! The loop ends on close, receive error, or when the peer has sent no
//! frame of any kind for the idle timeout. A drop guard
//! then takes the player out of every room.

use std::sync::Arc;

use teeg_protocol::{ClientMessage, Codec, ServerMessage};
use teeg_room::{PlayerSender, RoomError};
use teeg_rules::PlayerId;
use teeg_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::TeegError;
use crate::server::ServerState;

/// Removes the player from all rooms when the handler exits.
///
/// `Drop` is synchronous, so the async cleanup runs in a spawned task.
struct DisconnectGuard<C: Codec> {
    player_id: PlayerId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for DisconnectGuard<C> {
    fn drop(&mut self) {
        let player_id = self.player_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            state.rooms.lock().await.disconnect(player_id).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), TeegError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    let player_id = PlayerId(conn_id.into_inner());
    tracing::info!(%conn_id, %player_id, "player connected");

    let (tx, rx) = mpsc::unbounded_channel();
    let _guard = DisconnectGuard {
        player_id,
        state: Arc::clone(&state),
    };
    let _ = tx.send(ServerMessage::Welcome { player_id });
    let writer = tokio::spawn(write_outbound(
        Arc::clone(&conn),
        rx,
        Arc::clone(&state),
    ));

    loop {
        let received = match state.idle_timeout {
            Some(limit) => {
                // Any frame resets the clock, WebSocket pings included,
                // even though recv only hands back data frames.
                let budget = limit.saturating_sub(conn.idle_for());
                if budget.is_zero() {
                    tracing::info!(%player_id, "connection timed out");
                    break;
                }
                match tokio::time::timeout(budget, conn.recv()).await {
                    Ok(received) => received,
                    Err(_) => continue,
                }
            }
            None => conn.recv().await,
        };

        let data = match received {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%player_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                break;
            }
        };

        let msg: ClientMessage = match state.codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "failed to decode message");
                continue;
            }
        };

        if let Err(e) = handle_client_message(&state, player_id, &tx, msg).await
        {
            report(&tx, player_id, e);
        }
    }

    writer.abort();
    let _ = conn.close().await;
    // _guard drops here → player leaves every room.
    Ok(())
}

/// Applies one client request to the room manager.
///
/// The manager lock is held for the whole request, so requests from
/// different connections never interleave.
async fn handle_client_message<C: Codec>(
    state: &ServerState<C>,
    player_id: PlayerId,
    tx: &PlayerSender,
    msg: ClientMessage,
) -> Result<(), RoomError> {
    match msg {
        ClientMessage::CreateRoom { name } => {
            state
                .rooms
                .lock()
                .await
                .create_room(player_id, name, tx.clone())?;
        }
        ClientMessage::JoinRoom { room_id, name } => {
            state
                .rooms
                .lock()
                .await
                .join_room(player_id, &room_id, name, tx.clone())
                .await?;
        }
        ClientMessage::Play { room_id, card } => {
            state
                .rooms
                .lock()
                .await
                .play(player_id, &room_id, card)
                .await?;
        }
        ClientMessage::LeaveRoom { room_id } => {
            state
                .rooms
                .lock()
                .await
                .leave_room(player_id, &room_id)
                .await?;
        }
        ClientMessage::Ping { client_time } => {
            let _ = tx.send(ServerMessage::Pong {
                client_time,
                server_time: state.server_time(),
            });
        }
    }
    Ok(())
}

/// Tells the client about errors it should hear about; drops the rest.
fn report(tx: &PlayerSender, player_id: PlayerId, err: RoomError) {
    match err.client_code() {
        Some(code) => {
            tracing::info!(%player_id, error = %err, "request refused");
            let _ = tx.send(ServerMessage::Error {
                code,
                message: err.to_string(),
            });
        }
        None => {
            tracing::debug!(%player_id, error = %err, "request ignored");
        }
    }
}

/// Encodes and sends everything queued for this connection, in order.
async fn write_outbound<C: Codec>(
    conn: Arc<WebSocketConnection>,
    mut outbound: mpsc::UnboundedReceiver<ServerMessage>,
    state: Arc<ServerState<C>>,
) {
    while let Some(msg) = outbound.recv().await {
        let bytes = match state.codec.encode(&msg) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode message");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(conn_id = %conn.id(), error = %e, "send failed");
            break;
        }
    }
}

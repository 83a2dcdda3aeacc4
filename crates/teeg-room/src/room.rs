//! Room actor: an isolated Tokio task that owns one room's [`Table`].
//!
//! Each room runs in its own task and is reached only through an mpsc
//! channel, so commands for one room are applied strictly one at a time
//! while different rooms run in parallel.

use std::collections::HashMap;

use teeg_protocol::{RoomId, RoomSnapshot, ServerMessage};
use teeg_rules::{PlayEvent, PlayerId, Rank, RulesError, Table, apply_play};
use tokio::sync::{mpsc, oneshot};

use crate::RoomError;

/// Channel for delivering outbound messages to one connection.
///
/// Unbounded and fire-and-forget: a send to a connection that has gone
/// away is ignored.
pub type PlayerSender = mpsc::UnboundedSender<ServerMessage>;

/// Commands sent to a room actor through its channel.
///
/// Variants carrying a `oneshot::Sender` expect a reply; the rest are
/// fire-and-forget.
pub(crate) enum RoomCommand {
    /// Deal a new player in.
    Join {
        player_id: PlayerId,
        name: String,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Remove a player. Replies with how many players remain.
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<usize, RoomError>>,
    },

    /// A player plays a card.
    Play { player_id: PlayerId, card: Rank },

    /// Read the current table.
    Snapshot { reply: oneshot::Sender<Table> },

    Shutdown,
}

/// Handle to a running room actor.
///
/// Cheap to clone; the [`RoomManager`](crate::RoomManager) holds one per
/// room.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.room_id.clone())
    }

    /// Asks the room to deal `player_id` in.
    pub async fn join(
        &self,
        player_id: PlayerId,
        name: String,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                player_id,
                name,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Asks the room to drop `player_id`. Returns the number of players
    /// still seated.
    pub async fn leave(&self, player_id: PlayerId) -> Result<usize, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Leave {
                player_id,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Forwards a play (fire-and-forget). Whatever happens is announced
    /// to the room's members, or nothing is if the play doesn't apply.
    pub async fn play(
        &self,
        player_id: PlayerId,
        card: Rank,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Play { player_id, card })
            .await
            .map_err(|_| self.unavailable())
    }

    /// A copy of the room's table as of every command sent before this
    /// one.
    pub async fn snapshot(&self) -> Result<Table, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Snapshot { reply: reply_tx })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| self.unavailable())
    }
}

struct RoomActor {
    room_id: RoomId,
    table: Table,
    /// Outbound channel per seated player.
    senders: HashMap<PlayerId, PlayerSender>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    async fn run(mut self) {
        tracing::info!(room_id = %self.room_id, "room actor started");
        self.broadcast_state();

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    player_id,
                    name,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(player_id, name, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Leave { player_id, reply } => {
                    let result = self.handle_leave(player_id);
                    let _ = reply.send(result);
                }
                RoomCommand::Play { player_id, card } => {
                    self.handle_play(player_id, card);
                }
                RoomCommand::Snapshot { reply } => {
                    let _ = reply.send(self.table.clone());
                }
                RoomCommand::Shutdown => {
                    tracing::info!(room_id = %self.room_id, "room shutting down");
                    break;
                }
            }
        }

        tracing::info!(room_id = %self.room_id, "room actor stopped");
    }

    fn handle_join(
        &mut self,
        player_id: PlayerId,
        name: String,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        match self.table.seat(player_id, name) {
            Ok(()) => {}
            Err(RulesError::AlreadySeated(_)) => {
                return Err(RoomError::AlreadyInRoom(
                    player_id,
                    self.room_id.clone(),
                ));
            }
            Err(e) => return Err(e.into()),
        }
        self.senders.insert(player_id, sender);
        tracing::info!(
            room_id = %self.room_id,
            %player_id,
            players = self.table.players().len(),
            deck = self.table.deck().len(),
            "player joined"
        );
        self.broadcast_state();
        Ok(())
    }

    fn handle_leave(&mut self, player_id: PlayerId) -> Result<usize, RoomError> {
        self.table.remove_player(player_id).map_err(|_| {
            RoomError::NotInRoom(player_id, self.room_id.clone())
        })?;
        self.senders.remove(&player_id);

        let remaining = self.table.players().len();
        tracing::info!(
            room_id = %self.room_id,
            %player_id,
            players = remaining,
            "player left"
        );
        if remaining > 0 {
            self.broadcast_state();
        }
        Ok(remaining)
    }

    fn handle_play(&mut self, player_id: PlayerId, card: Rank) {
        let (table, events) = match apply_play(&self.table, player_id, card) {
            Ok(next) => next,
            Err(reason) => {
                tracing::debug!(
                    room_id = %self.room_id,
                    %player_id,
                    %card,
                    %reason,
                    "play rejected"
                );
                return;
            }
        };
        self.table = table;

        let mut detonated = false;
        for event in &events {
            match event {
                PlayEvent::Detonated { cause, .. } => {
                    detonated = true;
                    tracing::debug!(room_id = %self.room_id, %player_id, ?cause, "pile detonated");
                }
                PlayEvent::PickedUp { cards, .. } => {
                    tracing::debug!(room_id = %self.room_id, %player_id, cards, "picked up pile");
                }
                PlayEvent::StageAdvanced { stage, .. } => {
                    tracing::debug!(room_id = %self.room_id, %player_id, %stage, "stage advanced");
                }
            }
        }

        if detonated {
            self.broadcast(ServerMessage::Bomb {
                room_id: self.room_id.clone(),
            });
        }
        self.broadcast_state();
    }

    fn broadcast_state(&self) {
        self.broadcast(ServerMessage::State {
            room_id: self.room_id.clone(),
            room: RoomSnapshot::from(&self.table),
        });
    }

    fn broadcast(&self, msg: ServerMessage) {
        for sender in self.senders.values() {
            let _ = sender.send(msg.clone());
        }
    }
}

/// Spawns a room actor for a freshly dealt `table` whose only player is
/// `creator`. The actor greets the creator with the initial state.
pub(crate) fn spawn_room(
    room_id: RoomId,
    table: Table,
    creator: PlayerId,
    sender: PlayerSender,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = RoomActor {
        room_id: room_id.clone(),
        table,
        senders: HashMap::from([(creator, sender)]),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle { room_id, sender: tx }
}

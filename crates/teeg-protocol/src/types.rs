//! Everything that travels on the wire between a Teeg client and server.
//!
//! Messages are JSON objects tagged with a `"type"` field, e.g.
//! `{"type":"Play","room_id":"k3x9qa","card":"10"}`.

use std::fmt;

use serde::{Deserialize, Serialize};
use teeg_rules::{CardPool, Player, PlayerId, Rank, Stage, Table};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identifier of a live room: a short lowercase base-36 string that
/// players can read out to each other.
///
/// `#[serde(transparent)]` keeps it a bare string in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// Actions a client can ask for.
///
/// None of these get a negative acknowledgement: an action that doesn't
/// apply (unknown room, not your turn, card not held) is dropped and the
/// client simply sees no new state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Open a new room and take the first seat.
    /// Answered with [`ServerMessage::RoomCreated`].
    CreateRoom { name: String },

    /// Take a seat at the end of an existing room's turn order.
    JoinRoom { room_id: RoomId, name: String },

    /// Play one card from the pool you are currently on.
    Play { room_id: RoomId, card: Rank },

    /// Give up your seat in one room.
    LeaveRoom { room_id: RoomId },

    /// Keep-alive. Answered with [`ServerMessage::Pong`].
    Ping { client_time: u64 },
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// Everything the server sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// First message on every connection: who the server thinks you are.
    Welcome { player_id: PlayerId },

    /// Acknowledges [`ClientMessage::CreateRoom`].
    RoomCreated { room_id: RoomId },

    /// The full state of a room, sent to every member after each change.
    State { room_id: RoomId, room: RoomSnapshot },

    /// The pile just blew up. Always followed by a `State`.
    Bomb { room_id: RoomId },

    /// Echo of a [`ClientMessage::Ping`].
    Pong { client_time: u64, server_time: u64 },

    /// A request could not be honoured for a reason the client should
    /// hear about, such as a room whose deck can't deal another seat.
    Error { code: u16, message: String },
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// One seat as the clients see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub hand: CardPool,
    pub face_up: CardPool,
    pub face_down: CardPool,
    pub stage: Stage,
}

impl From<&Player> for PlayerSnapshot {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id,
            name: player.name.clone(),
            hand: player.hand.clone(),
            face_up: player.face_up.clone(),
            face_down: player.face_down.clone(),
            stage: player.stage(),
        }
    }
}

/// A room's table as broadcast to its members.
///
/// The undealt deck is reduced to a count; everything else is sent as is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub players: Vec<PlayerSnapshot>,
    pub deck_remaining: usize,
    pub pile: Vec<Rank>,
    pub pile_value: Option<u8>,
    pub run_count: u8,
    pub last_normal_rank: Option<Rank>,
    pub turn_index: usize,
    pub turn_holder: Option<PlayerId>,
}

impl From<&Table> for RoomSnapshot {
    fn from(table: &Table) -> Self {
        Self {
            players: table.players().iter().map(PlayerSnapshot::from).collect(),
            deck_remaining: table.deck().len(),
            pile: table.pile().to_vec(),
            pile_value: table.pile_value(),
            run_count: table.run_count(),
            last_normal_rank: table.last_normal_rank(),
            turn_index: table.turn_index(),
            turn_holder: table.turn_holder().map(|p| p.id),
        }
    }
}

impl RoomSnapshot {
    pub fn player(&self, id: PlayerId) -> Option<&PlayerSnapshot> {
        self.players.iter().find(|p| p.id == id)
    }
}

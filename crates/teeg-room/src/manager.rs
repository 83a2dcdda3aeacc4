//! Room manager: creates rooms, tracks who sits where, routes actions.

use std::collections::{HashMap, HashSet};

use rand::SeedableRng;
use rand::rngs::StdRng;
use teeg_protocol::{RoomId, ServerMessage};
use teeg_rules::{PlayerId, Rank, Table};

use crate::room::spawn_room;
use crate::source::random_room_id;
use crate::{DeckSource, PlayerSender, RoomConfig, RoomError, RoomHandle, ShuffledDecks};

/// Owns every live room and the index of which rooms each player is in.
///
/// A player may sit in any number of rooms at once, but holds at most
/// one seat per room. The server keeps the manager behind a mutex and
/// holds it for one action at a time.
pub struct RoomManager {
    config: RoomConfig,
    decks: Box<dyn DeckSource>,

    /// Draws room ids. OS-seeded unless [`with_id_seed`](Self::with_id_seed)
    /// replaces it.
    ids: StdRng,

    /// Live rooms, keyed by room ID.
    rooms: HashMap<RoomId, RoomHandle>,

    /// Rooms each player currently sits in.
    player_rooms: HashMap<PlayerId, HashSet<RoomId>>,
}

impl RoomManager {
    /// A manager dealing OS-seeded shuffled decks.
    pub fn new(config: RoomConfig) -> Self {
        Self::with_deck_source(config, ShuffledDecks::new())
    }

    pub fn with_deck_source(
        config: RoomConfig,
        decks: impl DeckSource,
    ) -> Self {
        Self::with_boxed_decks(config, Box::new(decks))
    }

    pub fn with_boxed_decks(
        config: RoomConfig,
        decks: Box<dyn DeckSource>,
    ) -> Self {
        Self {
            config,
            decks,
            ids: StdRng::from_os_rng(),
            rooms: HashMap::new(),
            player_rooms: HashMap::new(),
        }
    }

    /// Makes room ids repeatable: managers given the same seed hand out
    /// the same sequence of ids.
    pub fn with_id_seed(mut self, seed: u64) -> Self {
        self.ids = StdRng::seed_from_u64(seed);
        self
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Opens a room with `player_id` in the first seat.
    ///
    /// The creator is sent `RoomCreated` right away and the initial
    /// `State` once the room actor is running, in that order.
    pub fn create_room(
        &mut self,
        player_id: PlayerId,
        name: impl Into<String>,
        sender: PlayerSender,
    ) -> Result<RoomId, RoomError> {
        let room_id = self.fresh_room_id()?;
        let table = Table::new(
            self.decks.next_deck(),
            self.config.pool_size,
            player_id,
            name,
        )?;

        let _ = sender.send(ServerMessage::RoomCreated {
            room_id: room_id.clone(),
        });
        let handle = spawn_room(
            room_id.clone(),
            table,
            player_id,
            sender,
            self.config.channel_size,
        );
        self.rooms.insert(room_id.clone(), handle);
        self.player_rooms
            .entry(player_id)
            .or_default()
            .insert(room_id.clone());

        tracing::info!(%room_id, %player_id, "room created");
        Ok(room_id)
    }

    /// Deals `player_id` into an existing room at the end of the turn
    /// order.
    pub async fn join_room(
        &mut self,
        player_id: PlayerId,
        room_id: &RoomId,
        name: impl Into<String>,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        let handle = self.handle(room_id)?;
        if self.is_seated(player_id, room_id) {
            return Err(RoomError::AlreadyInRoom(player_id, room_id.clone()));
        }

        handle.join(player_id, name.into(), sender).await?;
        self.player_rooms
            .entry(player_id)
            .or_default()
            .insert(room_id.clone());
        Ok(())
    }

    /// Takes `player_id` out of one room, closing the room if it is left
    /// empty.
    pub async fn leave_room(
        &mut self,
        player_id: PlayerId,
        room_id: &RoomId,
    ) -> Result<(), RoomError> {
        if !self.is_seated(player_id, room_id) {
            return Err(RoomError::NotInRoom(player_id, room_id.clone()));
        }
        let handle = self.handle(room_id)?.clone();
        self.forget_seat(player_id, room_id);

        if handle.leave(player_id).await? == 0 {
            self.destroy_room(room_id).await;
        }
        Ok(())
    }

    /// Takes `player_id` out of every room they sit in.
    ///
    /// Called when a connection goes away, so failures are only logged.
    pub async fn disconnect(&mut self, player_id: PlayerId) {
        let Some(rooms) = self.player_rooms.remove(&player_id) else {
            return;
        };

        for room_id in rooms {
            let Some(handle) = self.rooms.get(&room_id).cloned() else {
                continue;
            };
            match handle.leave(player_id).await {
                Ok(0) => self.destroy_room(&room_id).await,
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(%room_id, %player_id, error = %e, "leave on disconnect failed");
                }
            }
        }
        tracing::debug!(%player_id, "player disconnected from all rooms");
    }

    /// Forwards a play to the room. The outcome reaches the players as
    /// room broadcasts, not as a return value.
    pub async fn play(
        &self,
        player_id: PlayerId,
        room_id: &RoomId,
        card: Rank,
    ) -> Result<(), RoomError> {
        let handle = self.handle(room_id)?;
        if !self.is_seated(player_id, room_id) {
            return Err(RoomError::NotInRoom(player_id, room_id.clone()));
        }
        handle.play(player_id, card).await
    }

    /// The room's current table.
    pub async fn snapshot(&self, room_id: &RoomId) -> Result<Table, RoomError> {
        self.handle(room_id)?.snapshot().await
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Lists all live room IDs.
    pub fn room_ids(&self) -> Vec<RoomId> {
        let mut ids: Vec<RoomId> = self.rooms.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Rooms `player_id` currently sits in.
    pub fn player_rooms(&self, player_id: PlayerId) -> Vec<RoomId> {
        let mut ids: Vec<RoomId> = self
            .player_rooms
            .get(&player_id)
            .map(|rooms| rooms.iter().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }

    fn handle(&self, room_id: &RoomId) -> Result<&RoomHandle, RoomError> {
        self.rooms
            .get(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))
    }

    fn is_seated(&self, player_id: PlayerId, room_id: &RoomId) -> bool {
        self.player_rooms
            .get(&player_id)
            .is_some_and(|rooms| rooms.contains(room_id))
    }

    fn forget_seat(&mut self, player_id: PlayerId, room_id: &RoomId) {
        if let Some(rooms) = self.player_rooms.get_mut(&player_id) {
            rooms.remove(room_id);
            if rooms.is_empty() {
                self.player_rooms.remove(&player_id);
            }
        }
    }

    async fn destroy_room(&mut self, room_id: &RoomId) {
        let Some(handle) = self.rooms.remove(room_id) else {
            return;
        };
        let _ = handle.shutdown().await;

        self.player_rooms.retain(|_, rooms| {
            rooms.remove(room_id);
            !rooms.is_empty()
        });
        tracing::info!(%room_id, "room destroyed");
    }

    fn fresh_room_id(&mut self) -> Result<RoomId, RoomError> {
        for _ in 0..self.config.max_id_attempts {
            let id = random_room_id(&mut self.ids, self.config.room_id_len);
            if !self.rooms.contains_key(&id) {
                return Ok(id);
            }
            tracing::debug!(room_id = %id, "room id collision, regenerating");
        }
        Err(RoomError::IdSpaceExhausted {
            attempts: self.config.max_id_attempts,
        })
    }
}

impl Default for RoomManager {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}

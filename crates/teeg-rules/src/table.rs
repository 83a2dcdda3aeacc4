//! The game state of one room.

use crate::{CardPool, Deck, Player, PlayerId, Rank, RulesError};

/// Cards dealt into each of a new player's three pools.
pub const DEFAULT_POOL_SIZE: usize = 3;

/// Everything the rule engine needs to know about a room.
///
/// Players are stored in turn order; a new player is always appended, so
/// joining never reorders the seats already taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub(crate) players: Vec<Player>,
    pub(crate) deck: Deck,
    pub(crate) pool_size: usize,
    pub(crate) pile: Vec<Rank>,
    pub(crate) pile_value: Option<u8>,
    pub(crate) run_count: u8,
    pub(crate) last_normal_rank: Option<Rank>,
    pub(crate) turn_index: usize,
    pub(crate) discarded: usize,
}

impl Table {
    /// Opens a table for `creator`, dealing their three pools from `deck`.
    pub fn new(
        deck: Deck,
        pool_size: usize,
        creator: PlayerId,
        name: impl Into<String>,
    ) -> Result<Self, RulesError> {
        let mut table = Self {
            players: Vec::new(),
            deck,
            pool_size,
            pile: Vec::new(),
            pile_value: None,
            run_count: 0,
            last_normal_rank: None,
            turn_index: 0,
            discarded: 0,
        };
        table.seat(creator, name)?;
        Ok(table)
    }

    /// Deals a new player in at the end of the turn order.
    ///
    /// The deck is checked up front so a failed deal leaves the table
    /// exactly as it was.
    pub fn seat(
        &mut self,
        id: PlayerId,
        name: impl Into<String>,
    ) -> Result<(), RulesError> {
        if self.player(id).is_some() {
            return Err(RulesError::AlreadySeated(id));
        }
        let needed = self.pool_size * 3;
        if self.deck.len() < needed {
            return Err(RulesError::InsufficientCards {
                requested: needed,
                remaining: self.deck.len(),
            });
        }

        let hand = self.deck.deal(self.pool_size)?;
        let face_up = self.deck.deal(self.pool_size)?;
        let face_down = self.deck.deal(self.pool_size)?;
        self.players.push(Player {
            id,
            name: name.into(),
            hand: CardPool::new(hand),
            face_up: CardPool::new(face_up),
            face_down: CardPool::new(face_down),
        });
        Ok(())
    }

    /// Removes a player, taking their cards out of play.
    ///
    /// The turn stays with whoever held it. If the holder is the one
    /// leaving, it passes to the player who sat after them.
    pub fn remove_player(&mut self, id: PlayerId) -> Result<Player, RulesError> {
        let idx = self
            .seat_of(id)
            .ok_or(RulesError::NotSeated(id))?;
        let player = self.players.remove(idx);
        self.discarded += player.card_count();

        if self.players.is_empty() {
            self.turn_index = 0;
        } else if idx < self.turn_index {
            self.turn_index -= 1;
        } else if idx == self.turn_index {
            self.turn_index %= self.players.len();
            if self.players[self.turn_index].is_out() {
                // Land on the next player who can still act.
                self.turn_index = self.step_back(self.turn_index);
                self.advance_turn();
            }
        }
        Ok(player)
    }

    /// Moves the turn to the next player who still has cards.
    ///
    /// Players who are out are passed over. If nobody else can act the
    /// turn comes back around to the current holder.
    ///
    /// A plain `(turn_index + 1) % players` step would hand the turn to a
    /// player who is out. Every play they could make is rejected with
    /// `PlayerOut`, so they would hold the turn forever and the room would
    /// deadlock.
    pub(crate) fn advance_turn(&mut self) {
        let n = self.players.len();
        if n == 0 {
            return;
        }
        for step in 1..=n {
            let idx = (self.turn_index + step) % n;
            if !self.players[idx].is_out() {
                self.turn_index = idx;
                return;
            }
        }
        self.turn_index = (self.turn_index + 1) % n;
    }

    fn step_back(&self, idx: usize) -> usize {
        (idx + self.players.len() - 1) % self.players.len()
    }

    /// Clears the pile out of play and resets every counter.
    pub(crate) fn detonate(&mut self) {
        self.discarded += self.pile.len();
        self.pile.clear();
        self.reset_counters();
    }

    pub(crate) fn reset_counters(&mut self) {
        self.pile_value = None;
        self.run_count = 0;
        self.last_normal_rank = None;
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn seat_of(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    /// The player whose turn it is.
    pub fn turn_holder(&self) -> Option<&Player> {
        self.players.get(self.turn_index)
    }

    pub fn turn_index(&self) -> usize {
        self.turn_index
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn pile(&self) -> &[Rank] {
        &self.pile
    }

    /// Strength the next normal play must meet, if any.
    pub fn pile_value(&self) -> Option<u8> {
        self.pile_value
    }

    pub fn run_count(&self) -> u8 {
        self.run_count
    }

    pub fn last_normal_rank(&self) -> Option<Rank> {
        self.last_normal_rank
    }

    /// Cards taken out of play by detonations and departing players.
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Every card the table has ever held: pools, deck, pile and
    /// discards. Constant for the life of the table.
    pub fn accounted_cards(&self) -> usize {
        self.players.iter().map(Player::card_count).sum::<usize>()
            + self.deck.len()
            + self.pile.len()
            + self.discarded
    }
}

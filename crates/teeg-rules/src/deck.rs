//! The 52-card deck and dealing.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::{Rank, RulesError};

/// Copies of each rank in a standard deck.
pub const COPIES_PER_RANK: usize = 4;

/// Cards in a standard deck.
pub const DECK_SIZE: usize = Rank::ALL.len() * COPIES_PER_RANK;

/// An ordered stack of undealt cards. The front is dealt first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Rank>,
}

impl Deck {
    /// A full deck in rank order, four of each.
    pub fn standard() -> Self {
        let cards = Rank::ALL
            .into_iter()
            .flat_map(|rank| std::iter::repeat_n(rank, COPIES_PER_RANK))
            .collect();
        Self { cards }
    }

    /// A full deck in a uniformly random order.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::standard();
        deck.cards.shuffle(rng);
        deck
    }

    /// A stacked deck: `cards[0]` is dealt first.
    pub fn from_cards(cards: Vec<Rank>) -> Self {
        Self { cards }
    }

    /// Removes and returns the first `n` cards.
    ///
    /// Leaves the deck untouched and returns
    /// [`RulesError::InsufficientCards`] if fewer than `n` remain.
    pub fn deal(&mut self, n: usize) -> Result<Vec<Rank>, RulesError> {
        if n > self.cards.len() {
            return Err(RulesError::InsufficientCards {
                requested: n,
                remaining: self.cards.len(),
            });
        }
        Ok(self.cards.drain(..n).collect())
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// The undealt cards, next card first.
    pub fn cards(&self) -> &[Rank] {
        &self.cards
    }
}

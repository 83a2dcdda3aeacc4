//! Cards, deck, table state, and the rule engine for Teeg.
//!
//! Nothing in this crate does I/O or holds shared state. A room's whole
//! game lives in a [`Table`]; [`apply_play`] takes a table and a proposed
//! play and returns the next table plus the [`PlayEvent`]s it caused.
//!
//! # Key types
//!
//! - [`Rank`]: a card; suits don't exist in Teeg
//! - [`Deck`]: the undealt stack
//! - [`Player`]: three [`CardPool`]s and a derived [`Stage`]
//! - [`Table`]: one room's roster, pile, counters and turn
//! - [`RulesError`]: invalid actions and dealing failures

mod card;
mod deck;
mod engine;
mod error;
mod player;
mod table;

pub use card::Rank;
pub use deck::{COPIES_PER_RANK, DECK_SIZE, Deck};
pub use engine::{Detonation, PlayEvent, RUN_TO_DETONATE, apply_play, can_play};
pub use error::RulesError;
pub use player::{CardPool, Player, PlayerId, Stage};
pub use table::{DEFAULT_POOL_SIZE, Table};

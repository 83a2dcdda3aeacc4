//! Error types for the rules layer.

use crate::{PlayerId, Rank, Stage};

/// Errors produced by the deck, the table, and the rule engine.
///
/// Most variants are *invalid actions*: requests that are simply not
/// applicable to the current table (wrong player, card not held). The
/// room layer drops those without telling anyone. `InsufficientCards`
/// is different: it means a deal could not be honoured and must be
/// surfaced to whoever asked for it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    /// The deck ran out during a deal.
    #[error("deck has {remaining} cards left, {requested} requested")]
    InsufficientCards { requested: usize, remaining: usize },

    /// Someone other than the turn holder tried to play.
    #[error("it is not {0}'s turn")]
    NotYourTurn(PlayerId),

    /// The player has emptied all three pools.
    #[error("{0} is out of cards")]
    PlayerOut(PlayerId),

    /// The named card is not in the pool the player must play from.
    #[error("{player} has no {rank} in their {stage} pool")]
    CardNotInPool {
        player: PlayerId,
        rank: Rank,
        stage: Stage,
    },

    /// The player has no seat at this table.
    #[error("{0} is not seated")]
    NotSeated(PlayerId),

    /// The player already holds a seat at this table.
    #[error("{0} is already seated")]
    AlreadySeated(PlayerId),
}

impl RulesError {
    /// Returns `true` for errors that should be ignored silently rather
    /// than reported back to the client.
    pub fn is_invalid_action(&self) -> bool {
        !matches!(self, Self::InsufficientCards { .. })
    }
}

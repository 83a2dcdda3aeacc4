//! Players, their three card pools, and the stage derived from them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Rank;

/// Identity of a seated player.
///
/// The server derives one from each connection, so a player id is
/// effectively "whoever is on the other end of this socket".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// An unordered multiset of cards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardPool(Vec<Rank>);

impl CardPool {
    pub fn new(cards: Vec<Rank>) -> Self {
        Self(cards)
    }

    pub fn contains(&self, rank: Rank) -> bool {
        self.0.contains(&rank)
    }

    /// Removes one card of `rank`. Returns `false` if there was none.
    pub fn take(&mut self, rank: Rank) -> bool {
        match self.0.iter().position(|r| *r == rank) {
            Some(idx) => {
                self.0.swap_remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn extend(&mut self, cards: impl IntoIterator<Item = Rank>) {
        self.0.extend(cards);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn cards(&self) -> &[Rank] {
        &self.0
    }

    /// Number of cards of `rank` in the pool.
    pub fn count(&self, rank: Rank) -> usize {
        self.0.iter().filter(|r| **r == rank).count()
    }
}

/// Which pool a player is currently playing from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Hand,
    FaceUp,
    FaceDown,
    /// All three pools are empty.
    Out,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hand => write!(f, "hand"),
            Self::FaceUp => write!(f, "face-up"),
            Self::FaceDown => write!(f, "face-down"),
            Self::Out => write!(f, "out"),
        }
    }
}

/// A seated player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub hand: CardPool,
    pub face_up: CardPool,
    pub face_down: CardPool,
}

impl Player {
    /// The stage is never stored. It is always the first non-empty pool
    /// in hand, face-up, face-down order, so a player who picks up the
    /// pile is back on their hand without anyone having to say so.
    pub fn stage(&self) -> Stage {
        if !self.hand.is_empty() {
            Stage::Hand
        } else if !self.face_up.is_empty() {
            Stage::FaceUp
        } else if !self.face_down.is_empty() {
            Stage::FaceDown
        } else {
            Stage::Out
        }
    }

    /// The pool for `stage`, or `None` for [`Stage::Out`].
    pub fn pool(&self, stage: Stage) -> Option<&CardPool> {
        match stage {
            Stage::Hand => Some(&self.hand),
            Stage::FaceUp => Some(&self.face_up),
            Stage::FaceDown => Some(&self.face_down),
            Stage::Out => None,
        }
    }

    pub fn pool_mut(&mut self, stage: Stage) -> Option<&mut CardPool> {
        match stage {
            Stage::Hand => Some(&mut self.hand),
            Stage::FaceUp => Some(&mut self.face_up),
            Stage::FaceDown => Some(&mut self.face_down),
            Stage::Out => None,
        }
    }

    /// Cards held across all three pools.
    pub fn card_count(&self) -> usize {
        self.hand.len() + self.face_up.len() + self.face_down.len()
    }

    pub fn is_out(&self) -> bool {
        self.stage() == Stage::Out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(hand: &[Rank], up: &[Rank], down: &[Rank]) -> Player {
        Player {
            id: PlayerId(1),
            name: "ada".into(),
            hand: CardPool::new(hand.to_vec()),
            face_up: CardPool::new(up.to_vec()),
            face_down: CardPool::new(down.to_vec()),
        }
    }

    #[test]
    fn test_stage_prefers_hand_over_everything() {
        let p = player(&[Rank::Two], &[Rank::Ace], &[Rank::King]);
        assert_eq!(p.stage(), Stage::Hand);
    }

    #[test]
    fn test_stage_skips_empty_face_up() {
        let p = player(&[], &[], &[Rank::King]);
        assert_eq!(p.stage(), Stage::FaceDown);
    }

    #[test]
    fn test_stage_out_when_all_pools_empty() {
        let p = player(&[], &[], &[]);
        assert_eq!(p.stage(), Stage::Out);
        assert!(p.is_out());
        assert!(p.pool(Stage::Out).is_none());
    }

    #[test]
    fn test_take_removes_a_single_copy() {
        let mut pool = CardPool::new(vec![Rank::Four, Rank::Four, Rank::Nine]);
        assert!(pool.take(Rank::Four));
        assert_eq!(pool.count(Rank::Four), 1);
        assert!(!pool.take(Rank::Ace));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_stage_json_is_snake_case() {
        let json = serde_json::to_string(&Stage::FaceUp).unwrap();
        assert_eq!(json, r#""face_up""#);
    }
}

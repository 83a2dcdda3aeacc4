//! Card ranks and their strengths.
//!
//! Suits play no part in Teeg, so a card is just its [`Rank`]. Two cards
//! of the same rank are interchangeable.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A card rank. On the wire each rank is its printed label: `"2"`,
/// `"10"`, `"J"`, and so on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Rank {
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "J")]
    Jack,
    #[serde(rename = "Q")]
    Queen,
    #[serde(rename = "K")]
    King,
    #[serde(rename = "A")]
    Ace,
}

impl Rank {
    /// Every rank, lowest label first.
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// The value a normal play sets the pile to, and that later normal
    /// plays must meet or beat.
    ///
    /// `None` for the special ranks `2`, `3` and `10`, which never take
    /// part in the comparison.
    pub fn strength(self) -> Option<u8> {
        match self {
            Rank::Two | Rank::Three | Rank::Ten => None,
            Rank::Four => Some(4),
            Rank::Five => Some(5),
            Rank::Six => Some(6),
            Rank::Seven => Some(7),
            Rank::Eight => Some(8),
            Rank::Nine => Some(9),
            Rank::Jack => Some(11),
            Rank::Queen => Some(12),
            Rank::King => Some(13),
            Rank::Ace => Some(14),
        }
    }

    /// Returns `true` for `2`, `3` and `10`.
    pub fn is_special(self) -> bool {
        self.strength().is_none()
    }

    /// The printed label, as used on the wire.
    pub fn label(self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

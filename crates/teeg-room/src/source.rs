//! Where rooms get their decks and ids.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use teeg_protocol::RoomId;
use teeg_rules::Deck;

/// Supplies a fresh deck for each new room.
///
/// The manager asks once per room. Closures returning a [`Deck`] work
/// too, which is how tests stack the cards.
pub trait DeckSource: Send + Sync + 'static {
    fn next_deck(&mut self) -> Deck;
}

impl<F> DeckSource for F
where
    F: FnMut() -> Deck + Send + Sync + 'static,
{
    fn next_deck(&mut self) -> Deck {
        self()
    }
}

/// Uniformly shuffled standard decks.
#[derive(Debug)]
pub struct ShuffledDecks {
    rng: StdRng,
}

impl ShuffledDecks {
    /// Seeds from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible shuffles.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for ShuffledDecks {
    fn default() -> Self {
        Self::new()
    }
}

impl DeckSource for ShuffledDecks {
    fn next_deck(&mut self) -> Deck {
        Deck::shuffled(&mut self.rng)
    }
}

const ROOM_ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A random lowercase base-36 id of `len` characters.
pub(crate) fn random_room_id<R: Rng + ?Sized>(rng: &mut R, len: usize) -> RoomId {
    let id = (0..len)
        .map(|_| ROOM_ID_ALPHABET[rng.random_range(0..ROOM_ID_ALPHABET.len())] as char)
        .collect::<String>();
    RoomId(id)
}

//! Rooms and the session coordinator for Teeg.
//!
//! Each room runs as an isolated Tokio task (actor model) owning its
//! [`Table`](teeg_rules::Table). The [`RoomManager`] creates and destroys
//! rooms, remembers which players sit where, and forwards their actions.
//!
//! # Key types
//!
//! - [`RoomManager`]: creates/destroys rooms, routes players
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`DeckSource`]: where new rooms get their shuffled deck
//! - [`RoomConfig`]: pool size, id length, queue size

mod config;
mod error;
mod manager;
mod room;
mod source;

pub use config::RoomConfig;
pub use error::RoomError;
pub use manager::RoomManager;
pub use room::{PlayerSender, RoomHandle};
pub use source::{DeckSource, ShuffledDecks};

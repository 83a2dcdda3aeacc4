//! # Teeg
//!
//! A server for Teeg, a multi-room shedding card game played over
//! WebSocket.
//!
//! Every connection is a player. Players open rooms, join each other's
//! rooms by id, and play one card at a time; after every change the
//! room broadcasts its full state to everyone seated in it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use teeg::prelude::*;
//!
//! # async fn run() -> Result<(), TeegError> {
//! let config = ServerConfig::from_env()?;
//! let server = TeegServer::builder().config(config).build().await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::ServerConfig;
pub use error::TeegError;
pub use server::{TeegServer, TeegServerBuilder};

/// Everything needed to run a server or talk to one.
pub mod prelude {
    pub use crate::{ServerConfig, TeegError, TeegServer, TeegServerBuilder};
    pub use teeg_protocol::{
        ClientMessage, Codec, JsonCodec, PlayerSnapshot, RoomId,
        RoomSnapshot, ServerMessage,
    };
    pub use teeg_room::{DeckSource, RoomConfig, ShuffledDecks};
    pub use teeg_rules::{Deck, PlayerId, Rank, Stage};
}

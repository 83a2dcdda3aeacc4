//! Wire protocol for Teeg.
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`RoomSnapshot`]):
//!   the messages that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages
//!   become bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Transport (frames) → Protocol (messages) → Rooms (game actions)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientMessage, PlayerSnapshot, RoomId, RoomSnapshot, ServerMessage,
};

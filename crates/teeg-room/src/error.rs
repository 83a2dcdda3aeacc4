//! Error types for the room layer.

use teeg_protocol::RoomId;
use teeg_rules::{PlayerId, RulesError};

/// Errors that can occur during room operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The player already holds a seat in this room.
    #[error("player {0} already in room {1}")]
    AlreadyInRoom(PlayerId, RoomId),

    /// The player has no seat in this room.
    #[error("player {0} not in room {1}")]
    NotInRoom(PlayerId, RoomId),

    /// The room's actor has stopped.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),

    /// Every generated id collided with a live room.
    #[error("no free room id after {attempts} attempts")]
    IdSpaceExhausted { attempts: usize },

    /// The table refused the action.
    #[error(transparent)]
    Rules(#[from] RulesError),
}

impl RoomError {
    /// The code to report to the client, for the few errors a client is
    /// told about. Everything else is dropped quietly.
    pub fn client_code(&self) -> Option<u16> {
        match self {
            Self::Rules(RulesError::InsufficientCards { .. }) => Some(409),
            Self::IdSpaceExhausted { .. } => Some(503),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_hard_errors_reach_the_client() {
        let full = RoomError::Rules(RulesError::InsufficientCards {
            requested: 9,
            remaining: 7,
        });
        assert_eq!(full.client_code(), Some(409));
        assert_eq!(
            RoomError::IdSpaceExhausted { attempts: 16 }.client_code(),
            Some(503)
        );

        let quiet = [
            RoomError::NotFound(RoomId::new("abc")),
            RoomError::AlreadyInRoom(PlayerId(1), RoomId::new("abc")),
            RoomError::Rules(RulesError::NotYourTurn(PlayerId(1))),
        ];
        for err in quiet {
            assert_eq!(err.client_code(), None, "{err}");
        }
    }
}

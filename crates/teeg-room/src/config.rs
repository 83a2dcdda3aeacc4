//! Room settings.

use serde::{Deserialize, Serialize};
use teeg_rules::DEFAULT_POOL_SIZE;

/// Settings shared by every room a [`RoomManager`](crate::RoomManager)
/// creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Cards dealt into each of a player's hand, face-up and face-down
    /// pools.
    pub pool_size: usize,

    /// Characters in a generated room id.
    pub room_id_len: usize,

    /// Capacity of each room actor's command queue. A full queue makes
    /// callers wait.
    pub channel_size: usize,

    /// How many fresh ids to try before giving up on a collision.
    pub max_id_attempts: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            room_id_len: 6,
            channel_size: 64,
            max_id_attempts: 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_config_default() {
        let config = RoomConfig::default();
        assert_eq!(config.pool_size, 3);
        assert_eq!(config.room_id_len, 6);
        assert_eq!(config.channel_size, 64);
        assert_eq!(config.max_id_attempts, 16);
    }
}

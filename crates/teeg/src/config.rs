//! Server settings and how they are read from the environment.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use teeg_room::RoomConfig;

use crate::TeegError;

/// Settings for a [`TeegServer`](crate::TeegServer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,

    /// A connection that sends no frame at all for this long, WebSocket
    /// pings included, is dropped and its player removed from every room.
    /// `None` keeps quiet connections open until the peer goes away.
    pub idle_timeout: Option<Duration>,

    pub room: RoomConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:10000".to_string(),
            idle_timeout: Some(Duration::from_secs(60)),
            room: RoomConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Defaults, overridden by `TEEG_BIND` (or `PORT`, on all interfaces)
    /// and `TEEG_IDLE_TIMEOUT_SECS` (`0` turns the idle timeout off).
    pub fn from_env() -> Result<Self, TeegError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, TeegError> {
        let mut config = Self::default();

        if let Some(addr) = lookup("TEEG_BIND") {
            config.bind_addr = addr;
        } else if let Some(port) = lookup("PORT") {
            let port: u16 = port
                .parse()
                .map_err(|_| TeegError::Config(format!("PORT={port}")))?;
            config.bind_addr = format!("0.0.0.0:{port}");
        }

        if let Some(secs) = lookup("TEEG_IDLE_TIMEOUT_SECS") {
            let secs = secs.parse::<u64>().map_err(|_| {
                TeegError::Config(format!("TEEG_IDLE_TIMEOUT_SECS={secs}"))
            })?;
            config.idle_timeout =
                (secs > 0).then_some(Duration::from_secs(secs));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_vars(vars: &[(&str, &str)]) -> Result<ServerConfig, TeegError> {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        ServerConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults_without_env() {
        let config = from_vars(&[]).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_addr, "0.0.0.0:10000");
        assert_eq!(config.idle_timeout, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_port_binds_all_interfaces() {
        let config = from_vars(&[("PORT", "8080")]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_teeg_bind_wins_over_port() {
        let config =
            from_vars(&[("PORT", "8080"), ("TEEG_BIND", "127.0.0.1:9000")])
                .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
    }

    #[test]
    fn test_idle_timeout_from_env() {
        let config = from_vars(&[("TEEG_IDLE_TIMEOUT_SECS", "5")]).unwrap();
        assert_eq!(config.idle_timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_zero_idle_timeout_disables_it() {
        let config = from_vars(&[("TEEG_IDLE_TIMEOUT_SECS", "0")]).unwrap();
        assert_eq!(config.idle_timeout, None);
    }

    #[test]
    fn test_bad_values_are_config_errors() {
        for vars in [
            [("PORT", "http")],
            [("PORT", "70000")],
            [("TEEG_IDLE_TIMEOUT_SECS", "-1")],
            [("TEEG_IDLE_TIMEOUT_SECS", "soon")],
        ] {
            let result = from_vars(&vars);
            assert!(
                matches!(result, Err(TeegError::Config(_))),
                "{vars:?} should be rejected"
            );
        }
    }
}

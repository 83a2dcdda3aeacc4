//! `TeegServer` builder and server loop.
//!
//! Ties the layers together: transport → protocol → rooms.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use teeg_protocol::{Codec, JsonCodec};
use teeg_room::{DeckSource, RoomManager, ShuffledDecks};
use teeg_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::{ServerConfig, TeegError};

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) rooms: Mutex<RoomManager>,
    pub(crate) codec: C,
    pub(crate) idle_timeout: Option<Duration>,
}

impl<C: Codec> ServerState<C> {
    /// Wall-clock milliseconds, as echoed in `Pong`.
    pub(crate) fn server_time(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    }
}

/// Builder for configuring and starting a Teeg server.
///
/// # Example
///
/// ```rust,no_run
/// use teeg::prelude::*;
///
/// # async fn run() -> Result<(), TeegError> {
/// let server = TeegServer::builder()
///     .bind("0.0.0.0:10000")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct TeegServerBuilder {
    config: ServerConfig,
    decks: Option<Box<dyn DeckSource>>,
}

impl TeegServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            decks: None,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Replaces every setting, including the bind address.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Where new rooms get their decks. Defaults to OS-seeded shuffles.
    pub fn deck_source(mut self, decks: impl DeckSource) -> Self {
        self.decks = Some(Box::new(decks));
        self
    }

    /// Binds the listener. Messages are JSON over WebSocket.
    pub async fn build(self) -> Result<TeegServer<JsonCodec>, TeegError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;

        let decks = self
            .decks
            .unwrap_or_else(|| Box::new(ShuffledDecks::new()));
        let state = Arc::new(ServerState {
            rooms: Mutex::new(RoomManager::with_boxed_decks(
                self.config.room,
                decks,
            )),
            codec: JsonCodec,
            idle_timeout: self.config.idle_timeout,
        });

        Ok(TeegServer { transport, state })
    }
}

impl Default for TeegServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Teeg server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct TeegServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl TeegServer<JsonCodec> {
    pub fn builder() -> TeegServerBuilder {
        TeegServerBuilder::new()
    }
}

impl<C: Codec> TeegServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop, spawning a handler task for each connection.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), TeegError> {
        match self.transport.local_addr() {
            Ok(addr) => tracing::info!(%addr, "Teeg server running"),
            Err(_) => tracing::info!("Teeg server running"),
        }

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                }
            }
        }
    }
}

//! `WordrushServer` builder and accept loop.
//!
//! This is the entry point for running a wordrush server. It ties
//! together all the layers: transport → protocol → session → room.

use std::sync::Arc;

use tokio::sync::Mutex;
use wordrush_dict::Dictionary;
use wordrush_protocol::{Codec, JsonCodec};
use wordrush_room::{GameConfig, RoomRegistry};
use wordrush_session::SessionManager;
use wordrush_transport::{Transport, WebSocketTransport};

use crate::WordrushError;
use crate::handler::handle_connection;

/// The current protocol version, announced to every client in the
/// `welcome` frame.
pub const PROTOCOL_VERSION: u32 = 1;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks.
/// Interior mutability via `Mutex` where needed.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) sessions: Mutex<SessionManager>,
    pub(crate) rooms: Mutex<RoomRegistry>,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a wordrush server.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use wordrush::prelude::*;
///
/// let lexicon = Lexicon::load("words.txt", LexiconConfig::default())?;
/// let server = WordrushServer::builder()
///     .bind("0.0.0.0:8080")
///     .build(Arc::new(lexicon))
///     .await?;
/// server.run().await
/// ```
pub struct WordrushServerBuilder {
    bind_addr: String,
    game_config: GameConfig,
}

impl WordrushServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            game_config: GameConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the per-room game rules (starting lives, minimum players).
    pub fn game_config(mut self, config: GameConfig) -> Self {
        self.game_config = config;
        self
    }

    /// Builds the server with the given dictionary.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`, which is what the
    /// browser clients speak.
    pub async fn build(
        self,
        dictionary: Arc<dyn Dictionary>,
    ) -> Result<WordrushServer<JsonCodec>, WordrushError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            sessions: Mutex::new(SessionManager::new()),
            rooms: Mutex::new(RoomRegistry::new(self.game_config, dictionary)),
            codec: JsonCodec,
        });

        Ok(WordrushServer { transport, state })
    }
}

impl Default for WordrushServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running wordrush server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct WordrushServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl WordrushServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> WordrushServerBuilder {
        WordrushServerBuilder::new()
    }
}

impl<C: Codec> WordrushServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each
    /// connected player. Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), WordrushError> {
        tracing::info!("wordrush server running");

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
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

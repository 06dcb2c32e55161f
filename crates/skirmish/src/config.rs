//! Client configuration.

use serde::{Deserialize, Serialize};
use skirmish_frame::{FrameConfig, WorldConfig};
use skirmish_session::SessionConfig;

/// Where the bundled demos and the builder point by default.
pub const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:6969";

/// Everything a client needs besides its connection.
///
/// Each section can be left out of a config file and takes its defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// `host:port` of the game server.
    pub server_addr: String,
    pub session: SessionConfig,
    pub frame: FrameConfig,
    pub world: WorldConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: DEFAULT_SERVER_ADDR.to_string(),
            session: SessionConfig::default(),
            frame: FrameConfig::default(),
            world: WorldConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Clamp every section to usable values.
    pub fn validated(mut self) -> Self {
        if self.server_addr.trim().is_empty() {
            tracing::warn!(
                default = DEFAULT_SERVER_ADDR,
                "empty server_addr, using default"
            );
            self.server_addr = DEFAULT_SERVER_ADDR.to_string();
        }
        self.frame = self.frame.validated();
        self.world = self.world.validated();
        self
    }

    /// The WebSocket URL for `server_addr`.
    pub fn url(&self) -> String {
        skirmish_transport::websocket_url(&self.server_addr)
    }
}

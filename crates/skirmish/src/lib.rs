//! # Skirmish
//!
//! Client for a real-time multiplayer game spoken over a binary
//! WebSocket protocol.
//!
//! A client connects, completes the server's hello handshake, mirrors
//! every player the server announces, predicts their motion between
//! updates, and reports the local player's key presses back. Rendering
//! is left to a [`RenderSurface`] you supply.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use skirmish::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), SkirmishError> {
//!     let client = SkirmishClient::builder()
//!         .server_addr("127.0.0.1:6969")
//!         .connect()
//!         .await?;
//!
//!     let (keys, input) = input_channel();
//!     tokio::spawn(async move {
//!         keys.send(KeyEvent::press(MovementKey::Right)).await.ok();
//!     });
//!
//!     client.run(NullSurface, input).await?;
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod handler;
mod render;

pub use client::{
    input_channel, RunSummary, SkirmishClient, SkirmishClientBuilder,
    INPUT_CHANNEL_CAPACITY,
};
pub use config::{ClientConfig, DEFAULT_SERVER_ADDR};
pub use error::SkirmishError;
pub use render::{NullSurface, RenderSurface, TraceSurface};

/// Everything a typical client needs, in one import.
pub mod prelude {
    pub use crate::{
        input_channel, ClientConfig, NullSurface, RenderSurface, RunSummary,
        SkirmishClient, SkirmishClientBuilder, SkirmishError, TraceSurface,
    };
    pub use skirmish_frame::{FrameConfig, FrameInfo, WorldConfig};
    pub use skirmish_input::{InputError, KeyAction, KeyEvent, MovementKey};
    pub use skirmish_protocol::{
        BinaryCodec, Codec, Movement, Player, PlayerId, ProtocolError,
    };
    pub use skirmish_session::{
        InboundFraming, Marker, Session, SessionConfig, SessionError,
        SessionState,
    };
    pub use skirmish_transport::{
        ChannelConnection, Connection, TransportError, WebSocketConnection,
    };
}

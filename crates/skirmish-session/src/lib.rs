//! Client session state for Skirmish.
//!
//! This crate owns everything the client knows about the game world:
//!
//! 1. **Handshake**: the `Connecting → AwaitingHello → Active` state
//!    machine driven by [`Session::on_open`], [`Session::receive`] and
//!    [`Session::on_close`]
//! 2. **Player registry**: the local mirror of every player
//!    ([`PlayerRegistry`]), updated by the events the server sends
//!
//! # How it fits in the stack
//!
//! ```text
//! Client loop (above)  ← feeds inbound buffers in, sends replies out
//!     ↕
//! Session Layer (this crate)  ← handshake state and the player registry
//!     ↕
//! Protocol Layer (below)  ← decodes envelopes and payloads
//! ```

mod error;
mod registry;
mod session;

pub use error::SessionError;
pub use registry::{Marker, PlayerRegistry};
pub use session::{Dispatch, InboundFraming, Session, SessionConfig, SessionState};

//! Keyboard input for Skirmish.
//!
//! Maps WASD transitions onto the local player's movement flags and
//! encodes each change as a `PlayerMoved` event for the server:
//!
//! ```rust
//! use skirmish_input::{InputEmitter, KeyEvent, MovementKey};
//! use skirmish_protocol::BinaryCodec;
//! use skirmish_session::Session;
//!
//! let mut emitter = InputEmitter::new();
//! let mut session = Session::default();
//!
//! // Nothing to steer until the server has introduced us.
//! let result = emitter.handle(&mut session, &BinaryCodec, KeyEvent::press(MovementKey::Up));
//! assert!(result.is_err());
//! ```

mod emitter;
mod error;
mod key;

pub use emitter::InputEmitter;
pub use error::InputError;
pub use key::{KeyAction, KeyEvent, MovementKey};

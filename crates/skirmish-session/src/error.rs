//! Error types for the session layer.

use skirmish_protocol::ProtocolError;

use crate::SessionState;

/// Errors that can occur while driving a session.
///
/// None of these end the session on their own. The client loop logs
/// them, drops the offending message and keeps going; only a transport
/// close moves the session to `Disconnected`.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The buffer (or the envelope inside it) couldn't be decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A well-formed message arrived in a state that doesn't accept it,
    /// e.g. a `PlayerJoined` before the handshake or a second
    /// `PlayerHello` after it.
    #[error("{kind} not accepted in state {state}")]
    StateViolation { state: SessionState, kind: String },

    /// A lifecycle call that makes no sense from the current state, such
    /// as opening a session twice.
    #[error("cannot {action} in state {state}")]
    InvalidTransition {
        state: SessionState,
        action: &'static str,
    },
}

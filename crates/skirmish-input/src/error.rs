//! Error types for the input layer.

use skirmish_protocol::ProtocolError;

/// Why a key event produced no outbound message.
///
/// The first two are expected during startup and are worth a debug log,
/// nothing more.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// The handshake hasn't finished, so there's no local id yet.
    #[error("session is not active")]
    NotActive,

    /// We know our id but the server hasn't sent our player record.
    #[error("local player {0} not in registry yet")]
    NoLocalPlayer(skirmish_protocol::PlayerId),

    /// Encoding the outbound event failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

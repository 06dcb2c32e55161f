//! Unified error type for the Skirmish client.

use skirmish_input::InputError;
use skirmish_protocol::ProtocolError;
use skirmish_session::SessionError;
use skirmish_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `skirmish` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate.
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum SkirmishError {
    /// A transport-level error (connect, send, recv). Fatal to the run.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, unknown kind).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (handshake state violations).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// An input-level error (no local player yet).
    #[error(transparent)]
    Input(#[from] InputError),
}

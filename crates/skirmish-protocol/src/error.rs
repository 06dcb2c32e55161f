//! Error types for the protocol layer.
//!
//! Each crate in Skirmish defines its own error enum. When you see a
//! `ProtocolError`, you know the problem is in encoding/decoding bytes,
//! not in networking or session state.

/// Errors that can occur in the protocol layer.
///
/// None of these are fatal to a session. The dispatch point logs them
/// and drops the offending message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// The buffer was truncated or structurally invalid.
    ///
    /// Common causes: a length prefix pointing past the end of the
    /// buffer, a boolean byte that is neither 0 nor 1, a `kind` that is
    /// not valid UTF-8, or bytes left over after the message ended.
    #[error("malformed message: {0}")]
    Malformed(String),

    /// The envelope decoded fine, but its `kind` names no known payload.
    #[error("unknown event kind {0:?}")]
    UnknownKind(String),

    /// A value could not be encoded (e.g. a buffer longer than the
    /// 32-bit length prefix can describe).
    #[error("encode failed: {0}")]
    Encode(String),
}

impl ProtocolError {
    /// Returns `true` for [`ProtocolError::Malformed`].
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }
}

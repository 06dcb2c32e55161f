//! Turns key transitions into `PlayerMoved` events for the server.

use skirmish_protocol::{Codec, Payload, PlayerMoved};
use skirmish_session::Session;

use crate::{InputError, KeyAction, KeyEvent};

/// Applies key events to the local player and builds the message that
/// tells the server about it.
///
/// Every accepted transition yields exactly one outbound buffer; there is
/// no batching or debouncing. Auto-repeat events yield nothing.
#[derive(Debug, Default)]
pub struct InputEmitter {
    emitted: u64,
}

impl InputEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages produced so far.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Handles one key event.
    ///
    /// Returns `Ok(None)` for auto-repeats and `Ok(Some(bytes))` with an
    /// encoded `PlayerMoved` envelope for real presses and releases. The
    /// local player's flags are updated before encoding, so the event
    /// carries the post-transition state.
    ///
    /// # Errors
    /// - `NotActive` before the handshake has assigned a local id.
    /// - `NoLocalPlayer` if the local record hasn't arrived yet.
    /// - `Protocol` if encoding fails.
    pub fn handle<C: Codec>(
        &mut self,
        session: &mut Session,
        codec: &C,
        event: KeyEvent,
    ) -> Result<Option<Vec<u8>>, InputError> {
        if event.repeat {
            return Ok(None);
        }
        if !session.state().is_active() {
            return Err(InputError::NotActive);
        }
        let local_id = session.local_id().ok_or(InputError::NotActive)?;
        let player = session
            .local_player_mut()
            .ok_or(InputError::NoLocalPlayer(local_id))?;

        event
            .key
            .apply(&mut player.moving, event.action == KeyAction::Press);
        let snapshot = *player;

        let bytes = codec.encode_payload(&Payload::PlayerMoved(PlayerMoved {
            player: snapshot,
        }))?;
        self.emitted += 1;

        tracing::debug!(
            player_id = %snapshot.id,
            key = %event.key,
            action = ?event.action,
            "movement input"
        );
        Ok(Some(bytes))
    }
}

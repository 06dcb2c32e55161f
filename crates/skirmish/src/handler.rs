//! What the client loop does with one inbound buffer or one key event.
//!
//! Both paths follow the same rule: anything wrong with a single message
//! is logged and dropped, and only a failed send (or a failed encode of
//! our own message) is returned to the loop, which treats it as fatal.

use skirmish_input::{InputEmitter, InputError, KeyEvent};
use skirmish_protocol::{Codec, ProtocolError};
use skirmish_session::{Session, SessionError};
use skirmish_transport::{Connection, TransportError};

use crate::{RunSummary, SkirmishError};

/// Feeds one inbound buffer to the session and sends its reply, if any.
pub(crate) async fn handle_inbound<C, K>(
    conn: &C,
    codec: &K,
    session: &mut Session,
    data: &[u8],
    summary: &mut RunSummary,
) -> Result<(), SkirmishError>
where
    C: Connection<Error = TransportError>,
    K: Codec,
{
    let conn_id = conn.id();
    let dispatch = match session.receive(codec, data) {
        Ok(dispatch) => dispatch,
        Err(SessionError::Protocol(e @ ProtocolError::Encode(_))) => {
            return Err(e.into());
        }
        Err(e) => {
            tracing::debug!(%conn_id, error = %e, "dropping inbound message");
            summary.dropped += 1;
            return Ok(());
        }
    };

    summary.dropped += dispatch.dropped as u64;
    if let Some(reply) = dispatch.reply {
        conn.send(&reply).await?;
        summary.sent += 1;
    }
    Ok(())
}

/// Applies one key event and sends the resulting `PlayerMoved`, if any.
pub(crate) async fn handle_input<C, K>(
    conn: &C,
    codec: &K,
    session: &mut Session,
    emitter: &mut InputEmitter,
    event: KeyEvent,
    summary: &mut RunSummary,
) -> Result<(), SkirmishError>
where
    C: Connection<Error = TransportError>,
    K: Codec,
{
    match emitter.handle(session, codec, event) {
        Ok(Some(bytes)) => {
            conn.send(&bytes).await?;
            summary.sent += 1;
        }
        Ok(None) => {}
        Err(InputError::Protocol(e)) => return Err(e.into()),
        Err(e) => {
            tracing::debug!(key = %event.key, error = %e, "input not sent");
        }
    }
    Ok(())
}

//! The client session: handshake state plus everything learned from the
//! server since the connection opened.
//!
//! A `Session` is the single owner of client-side game state. The client
//! loop holds it and passes `&mut Session` to whichever component runs:
//! inbound dispatch, the integration step, or the input emitter.
//!
//! ```text
//!   Connecting ──(on_open)──→ AwaitingHello ──(PlayerHello)──→ Active
//!       │                          │                            │
//!       └────────────(on_close)────┴────────────────────────────┴──→ Disconnected
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use skirmish_protocol::{
    Codec, Event, EventKind, EventList, Payload, Player, PlayerHello,
    PlayerHelloConfirm, PlayerId,
};

use crate::{PlayerRegistry, SessionError};

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// How buffers received in the `Active` state are framed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum InboundFraming {
    /// Every buffer is an `EventList`; each entry is dispatched on its own.
    #[default]
    Batched,
    /// Every buffer is a single `Event`.
    Single,
}

/// Configuration for session behavior.
///
/// `#[serde(default)]` lets a config file name only the fields it wants
/// to change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Framing of inbound traffic once the handshake is done.
    ///
    /// Default: [`InboundFraming::Batched`].
    pub inbound_framing: InboundFraming,
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Where the session is in its lifecycle.
///
/// - **Connecting**: the transport isn't open yet. Nothing inbound is
///   accepted.
/// - **AwaitingHello**: open, waiting for the server to assign our id.
///   Only `PlayerHello` is accepted.
/// - **Active**: handshake done. World updates flow in, input flows out.
/// - **Disconnected**: terminal. There is no reconnect; a new connection
///   gets a new `Session`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    Connecting,
    AwaitingHello,
    Active,
    Disconnected,
}

impl SessionState {
    pub fn is_active(self) -> bool {
        self == Self::Active
    }

    pub fn is_disconnected(self) -> bool {
        self == Self::Disconnected
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connecting => "Connecting",
            Self::AwaitingHello => "AwaitingHello",
            Self::Active => "Active",
            Self::Disconnected => "Disconnected",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// What [`Session::receive`] did with one inbound buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dispatch {
    /// Bytes to send back to the server, if any. Only the handshake
    /// produces a reply.
    pub reply: Option<Vec<u8>>,

    /// Events applied to the session.
    pub applied: usize,

    /// Events inside a batch that were skipped because they were
    /// malformed, of an unknown kind, or not allowed in this state.
    pub dropped: usize,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The client's view of one connection to the game server.
#[derive(Debug, Default)]
pub struct Session {
    config: SessionConfig,
    state: SessionState,
    local_id: Option<PlayerId>,
    registry: PlayerRegistry,
}

impl Session {
    /// Creates a session in the `Connecting` state.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The id the server assigned us, once the handshake is done.
    pub fn local_id(&self) -> Option<PlayerId> {
        self.local_id
    }

    pub fn registry(&self) -> &PlayerRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut PlayerRegistry {
        &mut self.registry
    }

    /// The local player's record, if both the id and the record are known.
    pub fn local_player(&self) -> Option<&Player> {
        self.local_id.and_then(|id| self.registry.get(id))
    }

    /// Mutable access to the local player's record.
    pub fn local_player_mut(&mut self) -> Option<&mut Player> {
        let id = self.local_id?;
        self.registry.get_mut(id)
    }

    /// The transport is open: start waiting for the server's hello.
    ///
    /// # Errors
    /// `InvalidTransition` unless the session is still `Connecting`.
    pub fn on_open(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Connecting {
            return Err(SessionError::InvalidTransition {
                state: self.state,
                action: "open",
            });
        }
        self.state = SessionState::AwaitingHello;
        tracing::info!("connection open, awaiting hello");
        Ok(())
    }

    /// The transport closed. Allowed from any state; forgets the local id
    /// and every known player.
    pub fn on_close(&mut self) {
        if !self.state.is_disconnected() {
            tracing::info!(
                local_id = ?self.local_id,
                players = self.registry.len(),
                "session disconnected"
            );
        }
        self.state = SessionState::Disconnected;
        self.local_id = None;
        self.registry.clear();
    }

    /// Processes one inbound buffer.
    ///
    /// In `Active` state with batched framing, a bad entry inside the
    /// batch is dropped and counted in [`Dispatch::dropped`]; the rest of
    /// the batch still applies. Everything else that can't be handled
    /// comes back as an error and leaves the session untouched.
    ///
    /// # Errors
    /// - `StateViolation` for anything other than a hello before the
    ///   handshake, or for any buffer while `Connecting`/`Disconnected`.
    /// - `Protocol` if the buffer (or, with single framing, its only
    ///   event) can't be decoded.
    pub fn receive<C: Codec>(
        &mut self,
        codec: &C,
        bytes: &[u8],
    ) -> Result<Dispatch, SessionError> {
        match self.state {
            SessionState::Connecting | SessionState::Disconnected => {
                Err(SessionError::StateViolation {
                    state: self.state,
                    kind: "inbound message".into(),
                })
            }
            SessionState::AwaitingHello => self.receive_hello(codec, bytes),
            SessionState::Active => match self.config.inbound_framing {
                InboundFraming::Batched => self.receive_batch(codec, bytes),
                InboundFraming::Single => {
                    let event = codec.unwrap_event(bytes)?;
                    self.apply(codec, &event)?;
                    Ok(Dispatch {
                        applied: 1,
                        ..Dispatch::default()
                    })
                }
            },
        }
    }

    fn receive_hello<C: Codec>(
        &mut self,
        codec: &C,
        bytes: &[u8],
    ) -> Result<Dispatch, SessionError> {
        let event = codec.unwrap_event(bytes)?;
        if event.kind != EventKind::PlayerHello.as_str() {
            return Err(SessionError::StateViolation {
                state: self.state,
                kind: event.kind,
            });
        }
        let hello: PlayerHello = codec.decode(&event.data)?;

        // Build the reply first so a failed encode leaves us waiting.
        let reply = codec.encode_payload(&Payload::PlayerHelloConfirm(
            PlayerHelloConfirm { id: hello.id },
        ))?;

        self.local_id = Some(hello.id);
        self.state = SessionState::Active;
        tracing::info!(player_id = %hello.id, "handshake complete");

        Ok(Dispatch {
            reply: Some(reply),
            applied: 1,
            dropped: 0,
        })
    }

    fn receive_batch<C: Codec>(
        &mut self,
        codec: &C,
        bytes: &[u8],
    ) -> Result<Dispatch, SessionError> {
        let list: EventList = codec.decode(bytes)?;
        let mut dispatch = Dispatch::default();

        for raw in &list.events {
            let result = codec
                .unwrap_event(&raw.raw_data)
                .map_err(SessionError::from)
                .and_then(|event| self.apply(codec, &event));
            match result {
                Ok(()) => dispatch.applied += 1,
                Err(e) => {
                    tracing::debug!(error = %e, "dropping event from batch");
                    dispatch.dropped += 1;
                }
            }
        }

        tracing::trace!(
            applied = dispatch.applied,
            dropped = dispatch.dropped,
            "batch dispatched"
        );
        Ok(dispatch)
    }

    /// Applies one world event to the registry.
    fn apply<C: Codec>(
        &mut self,
        codec: &C,
        event: &Event,
    ) -> Result<(), SessionError> {
        match codec.decode_payload(event)? {
            Payload::PlayerJoined(p) => self.registry.apply_joined(p.player),
            Payload::PlayerJoinedList(p) => {
                self.registry.apply_joined_list(p.players)
            }
            Payload::PlayerQuit(p) => {
                self.registry.apply_quit(p.id);
            }
            Payload::PlayerMoved(p) => {
                self.registry.apply_moved(p.player);
            }
            Payload::PlayerMovedList(p) => {
                self.registry.apply_moved_list(p.players)
            }
            Payload::PlayerHello(_) | Payload::PlayerHelloConfirm(_) => {
                return Err(SessionError::StateViolation {
                    state: self.state,
                    kind: event.kind.clone(),
                });
            }
        }
        Ok(())
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_protocol::{
        BinaryCodec, Movement, PlayerJoined, PlayerMoved, PlayerQuit,
        ProtocolError,
    };

    fn hello(codec: &BinaryCodec, id: i32) -> Vec<u8> {
        codec
            .encode_payload(&Payload::PlayerHello(PlayerHello {
                id: PlayerId(id),
            }))
            .unwrap()
    }

    fn joined(id: i32, x: f32) -> Payload {
        Payload::PlayerJoined(PlayerJoined {
            player: Player {
                speed: 250.0,
                x,
                ..Player::new(PlayerId(id))
            },
        })
    }

    /// Encodes payloads as individual events and bundles them in a batch.
    fn batch(codec: &BinaryCodec, payloads: &[Payload]) -> Vec<u8> {
        let events: Vec<Event> = payloads
            .iter()
            .map(|p| {
                codec
                    .unwrap_event(&codec.encode_payload(p).unwrap())
                    .unwrap()
            })
            .collect();
        codec.wrap_event_list(&events).unwrap()
    }

    fn active_session(codec: &BinaryCodec, id: i32) -> Session {
        let mut session = Session::default();
        session.on_open().unwrap();
        session.receive(codec, &hello(codec, id)).unwrap();
        session
    }

    // -- Lifecycle --------------------------------------------------------

    #[test]
    fn test_new_session_is_connecting() {
        let session = Session::default();
        assert_eq!(session.state(), SessionState::Connecting);
        assert!(session.local_id().is_none());
    }

    #[test]
    fn test_on_open_twice_is_invalid() {
        let mut session = Session::default();
        session.on_open().unwrap();
        let err = session.on_open().unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidTransition {
                state: SessionState::AwaitingHello,
                ..
            }
        ));
    }

    #[test]
    fn test_receive_while_connecting_is_state_violation() {
        let codec = BinaryCodec;
        let mut session = Session::default();
        let err = session.receive(&codec, &hello(&codec, 1)).unwrap_err();
        assert!(matches!(err, SessionError::StateViolation { .. }));
        assert_eq!(session.state(), SessionState::Connecting);
    }

    // -- Handshake --------------------------------------------------------

    #[test]
    fn test_hello_completes_handshake_and_replies_with_confirm() {
        let codec = BinaryCodec;
        let mut session = Session::default();
        session.on_open().unwrap();

        let dispatch = session.receive(&codec, &hello(&codec, 42)).unwrap();

        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.local_id(), Some(PlayerId(42)));

        let reply = dispatch.reply.expect("handshake must reply");
        let event = codec.unwrap_event(&reply).unwrap();
        assert_eq!(
            codec.decode_payload(&event).unwrap(),
            Payload::PlayerHelloConfirm(PlayerHelloConfirm { id: PlayerId(42) })
        );
    }

    #[test]
    fn test_non_hello_before_handshake_is_dropped() {
        let codec = BinaryCodec;
        let mut session = Session::default();
        session.on_open().unwrap();

        let bytes = codec.encode_payload(&joined(3, 0.0)).unwrap();
        let err = session.receive(&codec, &bytes).unwrap_err();

        match err {
            SessionError::StateViolation { state, kind } => {
                assert_eq!(state, SessionState::AwaitingHello);
                assert_eq!(kind, "PlayerJoined");
            }
            other => panic!("expected StateViolation, got {other:?}"),
        }
        assert_eq!(session.state(), SessionState::AwaitingHello);
        assert!(session.registry().is_empty());
    }

    #[test]
    fn test_truncated_hello_is_malformed_and_keeps_waiting() {
        let codec = BinaryCodec;
        let mut session = Session::default();
        session.on_open().unwrap();

        let bytes = hello(&codec, 42);
        let err = session
            .receive(&codec, &bytes[..bytes.len() - 1])
            .unwrap_err();

        assert!(matches!(
            err,
            SessionError::Protocol(ProtocolError::Malformed(_))
        ));
        assert_eq!(session.state(), SessionState::AwaitingHello);
    }

    // -- Active dispatch --------------------------------------------------

    #[test]
    fn test_batch_applies_every_event_in_order() {
        let codec = BinaryCodec;
        let mut session = active_session(&codec, 1);

        let bytes = batch(
            &codec,
            &[
                joined(1, 10.0),
                joined(2, 20.0),
                Payload::PlayerQuit(PlayerQuit { id: PlayerId(2) }),
            ],
        );
        let dispatch = session.receive(&codec, &bytes).unwrap();

        assert_eq!(dispatch.applied, 3);
        assert_eq!(dispatch.dropped, 0);
        assert!(dispatch.reply.is_none());
        assert_eq!(session.registry().len(), 1);
        assert_eq!(session.local_player().unwrap().x, 10.0);
    }

    #[test]
    fn test_batch_skips_bad_entries_and_applies_the_rest() {
        let codec = BinaryCodec;
        let mut session = active_session(&codec, 1);

        let events = vec![
            Event {
                kind: "Teleported".into(),
                data: vec![],
            },
            codec
                .unwrap_event(&codec.encode_payload(&joined(5, 1.0)).unwrap())
                .unwrap(),
            Event {
                kind: "PlayerJoined".into(),
                data: vec![1, 2],
            },
            codec.unwrap_event(&hello(&codec, 9)).unwrap(),
        ];
        let bytes = codec.wrap_event_list(&events).unwrap();

        let dispatch = session.receive(&codec, &bytes).unwrap();

        assert_eq!(dispatch.applied, 1);
        assert_eq!(dispatch.dropped, 3);
        assert!(session.registry().get(PlayerId(5)).is_some());
        assert_eq!(session.local_id(), Some(PlayerId(1)), "hello ignored");
    }

    #[test]
    fn test_malformed_batch_leaves_registry_unchanged() {
        let codec = BinaryCodec;
        let mut session = active_session(&codec, 1);
        let bytes = batch(&codec, &[joined(1, 0.0), joined(2, 0.0)]);

        let err = session
            .receive(&codec, &bytes[..bytes.len() - 3])
            .unwrap_err();

        assert!(matches!(err, SessionError::Protocol(_)));
        assert!(session.registry().is_empty());
    }

    #[test]
    fn test_single_framing_dispatches_one_event() {
        let codec = BinaryCodec;
        let mut session = Session::new(SessionConfig {
            inbound_framing: InboundFraming::Single,
        });
        session.on_open().unwrap();
        session.receive(&codec, &hello(&codec, 1)).unwrap();

        let moved = Payload::PlayerMoved(PlayerMoved {
            player: Player {
                x: 3.0,
                y: 4.0,
                moving: Movement {
                    down: true,
                    ..Movement::STILL
                },
                ..Player::new(PlayerId(8))
            },
        });
        let dispatch = session
            .receive(&codec, &codec.encode_payload(&moved).unwrap())
            .unwrap();

        assert_eq!(dispatch.applied, 1);
        let p = session.registry().get(PlayerId(8)).unwrap();
        assert_eq!((p.x, p.y), (3.0, 4.0));
        assert!(p.moving.down);
    }

    #[test]
    fn test_on_close_clears_everything() {
        let codec = BinaryCodec;
        let mut session = active_session(&codec, 1);
        session
            .receive(&codec, &batch(&codec, &[joined(1, 0.0)]))
            .unwrap();

        session.on_close();

        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(session.local_id().is_none());
        assert!(session.registry().is_empty());
        assert!(session.on_open().is_err(), "no reconnect");
    }

    // -- Config -----------------------------------------------------------

    #[test]
    fn test_session_config_deserializes_with_defaults() {
        let config: SessionConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.inbound_framing, InboundFraming::Batched);

        let config: SessionConfig =
            serde_json::from_str(r#"{"inbound_framing":"single"}"#).unwrap();
        assert_eq!(config.inbound_framing, InboundFraming::Single);
    }
}

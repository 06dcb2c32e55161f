//! Core protocol types for Skirmish's wire format.
//!
//! This module defines every type that travels "on the wire": the
//! structures that get encoded to bytes, sent over the connection, and
//! decoded on the other side. How they are laid out in bytes lives in
//! `codec.rs`; this file only says what they are.

use std::fmt;
use std::str::FromStr;

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A unique identifier for a player, assigned by the server.
///
/// Newtype wrapper over the 32-bit signed integer the wire carries, so a
/// player id can't be confused with a coordinate or a count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub i32);

/// `tracing::info!("player {} joined", id)` prints "player P-42 joined".
impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// The four movement flags of a player.
///
/// Grouped into one `Copy` value so a server update replaces all four at
/// once. Opposing flags (left and right) may both be set; the integration
/// step applies each one independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Movement {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl Movement {
    /// No flag set.
    pub const STILL: Self = Self {
        left: false,
        right: false,
        up: false,
        down: false,
    };

    /// Returns `true` if any flag is set.
    pub fn is_moving(&self) -> bool {
        self.left || self.right || self.up || self.down
    }
}

/// One player's state as the server describes it.
///
/// `x` and `y` are world coordinates; `speed` is in world units per
/// second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub speed: f32,
    pub x: f32,
    pub y: f32,
    pub moving: Movement,
}

impl Player {
    /// A player at the origin with zero speed and no movement.
    ///
    /// This is the record the registry synthesizes when a move arrives
    /// for an id it has never seen.
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            speed: 0.0,
            x: 0.0,
            y: 0.0,
            moving: Movement::STILL,
        }
    }
}

// ---------------------------------------------------------------------------
// EventKind: the `kind` tag of an envelope
// ---------------------------------------------------------------------------

/// Every payload kind the protocol knows.
///
/// On the wire the kind is a plain string (`"PlayerMoved"`). Parsing it
/// into this enum up front means the rest of the code matches on variants
/// instead of comparing strings, and unknown tags surface exactly once,
/// as [`ProtocolError::UnknownKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PlayerHello,
    PlayerHelloConfirm,
    PlayerJoined,
    PlayerJoinedList,
    PlayerQuit,
    PlayerMoved,
    PlayerMovedList,
}

impl EventKind {
    /// All kinds, in declaration order.
    pub const ALL: [EventKind; 7] = [
        Self::PlayerHello,
        Self::PlayerHelloConfirm,
        Self::PlayerJoined,
        Self::PlayerJoinedList,
        Self::PlayerQuit,
        Self::PlayerMoved,
        Self::PlayerMovedList,
    ];

    /// The string carried in `Event::kind`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlayerHello => "PlayerHello",
            Self::PlayerHelloConfirm => "PlayerHelloConfirm",
            Self::PlayerJoined => "PlayerJoined",
            Self::PlayerJoinedList => "PlayerJoinedList",
            Self::PlayerQuit => "PlayerQuit",
            Self::PlayerMoved => "PlayerMoved",
            Self::PlayerMovedList => "PlayerMovedList",
        }
    }
}

impl FromStr for EventKind {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ProtocolError::UnknownKind(s.to_string()))
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Typed payloads
// ---------------------------------------------------------------------------

/// Server → Client: "Here is your id." First message of every session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerHello {
    pub id: PlayerId,
}

/// Client → Server: "I accept that id." Sent once, in reply to the hello.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerHelloConfirm {
    pub id: PlayerId,
}

/// Server → Client: a player entered the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerJoined {
    pub player: Player,
}

/// Server → Client: several players entered (or were already there).
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerJoinedList {
    pub players: Vec<Player>,
}

/// Server → Client: a player left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerQuit {
    pub id: PlayerId,
}

/// Either direction: a player's position and movement flags changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerMoved {
    pub player: Player,
}

/// Server → Client: authoritative positions for several players.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerMovedList {
    pub players: Vec<Player>,
}

/// Any typed payload, tagged by its kind.
///
/// This is the decoded form of an [`Event`]: the `kind` string has been
/// matched and the `data` bytes parsed with the matching layout.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    PlayerHello(PlayerHello),
    PlayerHelloConfirm(PlayerHelloConfirm),
    PlayerJoined(PlayerJoined),
    PlayerJoinedList(PlayerJoinedList),
    PlayerQuit(PlayerQuit),
    PlayerMoved(PlayerMoved),
    PlayerMovedList(PlayerMovedList),
}

impl Payload {
    /// The kind tag this payload travels under.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::PlayerHello(_) => EventKind::PlayerHello,
            Self::PlayerHelloConfirm(_) => EventKind::PlayerHelloConfirm,
            Self::PlayerJoined(_) => EventKind::PlayerJoined,
            Self::PlayerJoinedList(_) => EventKind::PlayerJoinedList,
            Self::PlayerQuit(_) => EventKind::PlayerQuit,
            Self::PlayerMoved(_) => EventKind::PlayerMoved,
            Self::PlayerMovedList(_) => EventKind::PlayerMovedList,
        }
    }
}

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

/// The outer envelope. Every message on the wire is (or contains) one.
///
/// ```text
/// ┌──────────────────────────────┐
/// │ kind: "PlayerMoved"          │  ← selects the payload layout
/// │ data: [...encoded payload...]│  ← opaque until `kind` is known
/// └──────────────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: String,
    pub data: Vec<u8>,
}

/// One entry of an [`EventList`]: the bytes of an encoded [`Event`].
///
/// A batch does not hold typed payloads directly. Each entry has to be
/// decoded again as an `Event` before its `kind` can be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub raw_data: Vec<u8>,
}

/// A batch of encoded events, delivered together by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventList {
    pub events: Vec<RawEvent>,
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_display() {
        assert_eq!(PlayerId(7).to_string(), "P-7");
        assert_eq!(PlayerId(-1).to_string(), "P--1");
    }

    #[test]
    fn test_event_kind_parses_every_known_tag() {
        for kind in EventKind::ALL {
            let parsed: EventKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_event_kind_unknown_tag_is_error() {
        let err = "FlyToMoon".parse::<EventKind>().unwrap_err();
        assert_eq!(err, ProtocolError::UnknownKind("FlyToMoon".into()));
    }

    #[test]
    fn test_event_kind_is_case_sensitive() {
        assert!("playermoved".parse::<EventKind>().is_err());
    }

    #[test]
    fn test_payload_kind_matches_variant() {
        let p = Payload::PlayerQuit(PlayerQuit { id: PlayerId(3) });
        assert_eq!(p.kind(), EventKind::PlayerQuit);

        let p = Payload::PlayerMovedList(PlayerMovedList { players: vec![] });
        assert_eq!(p.kind(), EventKind::PlayerMovedList);
    }

    #[test]
    fn test_new_player_is_still_at_origin() {
        let p = Player::new(PlayerId(9));
        assert_eq!(p.id, PlayerId(9));
        assert_eq!((p.x, p.y, p.speed), (0.0, 0.0, 0.0));
        assert!(!p.moving.is_moving());
    }
}

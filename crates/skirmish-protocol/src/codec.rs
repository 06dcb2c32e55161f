//! Codec trait and the binary wire layout.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The layers above only talk to the [`Codec`] trait; [`BinaryCodec`] is
//! the one implementation, and the per-type byte layouts live behind the
//! [`Wire`] trait.
//!
//! ## Layout rules
//!
//! Everything is fixed-width little-endian and self-contained:
//!
//! ```text
//! i32 / f32   4 bytes
//! bool        1 byte, 0 or 1 (anything else is malformed)
//! bytes       u32 length, then the bytes
//! string      u32 length, then UTF-8
//! sequence    u32 count, then the elements
//! Player      id:i32 speed:f32 x:f32 y:f32 left right up down (20 bytes)
//! ```
//!
//! Decoding is strict: a buffer must be consumed exactly. Leftover bytes
//! mean the sender and receiver disagree about the layout, so they are
//! reported as [`ProtocolError::Malformed`] rather than ignored.

use std::io::{self, Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::types::{
    Event, EventKind, EventList, Movement, Payload, Player, PlayerHello,
    PlayerHelloConfirm, PlayerId, PlayerJoined, PlayerJoinedList,
    PlayerMoved, PlayerMovedList, PlayerQuit, RawEvent,
};
use crate::ProtocolError;

/// Encoded size of one [`Player`].
pub const PLAYER_WIRE_SIZE: usize = 20;

// ---------------------------------------------------------------------------
// Wire: per-type layout
// ---------------------------------------------------------------------------

/// A type with a fixed binary layout.
///
/// `write_to` appends the value to any writer; `read_from` parses it from
/// the front of a cursor and leaves the cursor just past it. Neither
/// method checks for trailing data; [`Codec::decode`] does that once for
/// the outermost value.
pub trait Wire: Sized {
    fn write_to(&self, writer: &mut impl WriteBytesExt) -> io::Result<()>;
    fn read_from(reader: &mut Cursor<&[u8]>) -> io::Result<Self>;
}

fn remaining(reader: &Cursor<&[u8]>) -> usize {
    let len = reader.get_ref().len();
    len.saturating_sub(reader.position() as usize)
}

fn write_len(writer: &mut impl WriteBytesExt, len: usize) -> io::Result<()> {
    let len = u32::try_from(len).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("length {len} does not fit a u32 prefix"),
        )
    })?;
    writer.write_u32::<LittleEndian>(len)
}

/// Reads a `u32` length/count prefix and checks that `len` elements of
/// at least `min_size` bytes can still fit in the buffer.
///
/// This keeps a corrupt prefix from triggering a multi-gigabyte
/// allocation before the read fails.
fn read_len(reader: &mut Cursor<&[u8]>, min_size: usize) -> io::Result<usize> {
    let len = reader.read_u32::<LittleEndian>()? as usize;
    let available = remaining(reader);
    if len.saturating_mul(min_size) > available {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("prefix claims {len} items but only {available} bytes remain"),
        ));
    }
    Ok(len)
}

fn write_bytes(writer: &mut impl WriteBytesExt, bytes: &[u8]) -> io::Result<()> {
    write_len(writer, bytes.len())?;
    writer.write_all(bytes)
}

fn read_bytes(reader: &mut Cursor<&[u8]>) -> io::Result<Vec<u8>> {
    let len = read_len(reader, 1)?;
    let mut buf = vec![0; len];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

fn read_string(reader: &mut Cursor<&[u8]>) -> io::Result<String> {
    String::from_utf8(read_bytes(reader)?)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn write_bool(writer: &mut impl WriteBytesExt, value: bool) -> io::Result<()> {
    writer.write_u8(u8::from(value))
}

fn read_bool(reader: &mut Cursor<&[u8]>) -> io::Result<bool> {
    match reader.read_u8()? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("invalid bool byte {other:#04x}"),
        )),
    }
}

fn write_players(writer: &mut impl WriteBytesExt, players: &[Player]) -> io::Result<()> {
    write_len(writer, players.len())?;
    players.iter().try_for_each(|p| p.write_to(writer))
}

fn read_players(reader: &mut Cursor<&[u8]>) -> io::Result<Vec<Player>> {
    let count = read_len(reader, PLAYER_WIRE_SIZE)?;
    (0..count).map(|_| Player::read_from(reader)).collect()
}

impl Wire for PlayerId {
    fn write_to(&self, writer: &mut impl WriteBytesExt) -> io::Result<()> {
        writer.write_i32::<LittleEndian>(self.0)
    }

    fn read_from(reader: &mut Cursor<&[u8]>) -> io::Result<Self> {
        Ok(PlayerId(reader.read_i32::<LittleEndian>()?))
    }
}

impl Wire for Player {
    fn write_to(&self, writer: &mut impl WriteBytesExt) -> io::Result<()> {
        self.id.write_to(writer)?;
        writer.write_f32::<LittleEndian>(self.speed)?;
        writer.write_f32::<LittleEndian>(self.x)?;
        writer.write_f32::<LittleEndian>(self.y)?;
        write_bool(writer, self.moving.left)?;
        write_bool(writer, self.moving.right)?;
        write_bool(writer, self.moving.up)?;
        write_bool(writer, self.moving.down)
    }

    fn read_from(reader: &mut Cursor<&[u8]>) -> io::Result<Self> {
        Ok(Player {
            id: PlayerId::read_from(reader)?,
            speed: reader.read_f32::<LittleEndian>()?,
            x: reader.read_f32::<LittleEndian>()?,
            y: reader.read_f32::<LittleEndian>()?,
            moving: Movement {
                left: read_bool(reader)?,
                right: read_bool(reader)?,
                up: read_bool(reader)?,
                down: read_bool(reader)?,
            },
        })
    }
}

// The three id-only payloads share one layout.
macro_rules! id_payload_wire {
    ($($ty:ident),*) => {
        $(
            impl Wire for $ty {
                fn write_to(&self, writer: &mut impl WriteBytesExt) -> io::Result<()> {
                    self.id.write_to(writer)
                }

                fn read_from(reader: &mut Cursor<&[u8]>) -> io::Result<Self> {
                    Ok($ty { id: PlayerId::read_from(reader)? })
                }
            }
        )*
    };
}

id_payload_wire!(PlayerHello, PlayerHelloConfirm, PlayerQuit);

impl Wire for PlayerJoined {
    fn write_to(&self, writer: &mut impl WriteBytesExt) -> io::Result<()> {
        self.player.write_to(writer)
    }

    fn read_from(reader: &mut Cursor<&[u8]>) -> io::Result<Self> {
        Ok(PlayerJoined { player: Player::read_from(reader)? })
    }
}

impl Wire for PlayerMoved {
    fn write_to(&self, writer: &mut impl WriteBytesExt) -> io::Result<()> {
        self.player.write_to(writer)
    }

    fn read_from(reader: &mut Cursor<&[u8]>) -> io::Result<Self> {
        Ok(PlayerMoved { player: Player::read_from(reader)? })
    }
}

impl Wire for PlayerJoinedList {
    fn write_to(&self, writer: &mut impl WriteBytesExt) -> io::Result<()> {
        write_players(writer, &self.players)
    }

    fn read_from(reader: &mut Cursor<&[u8]>) -> io::Result<Self> {
        Ok(PlayerJoinedList { players: read_players(reader)? })
    }
}

impl Wire for PlayerMovedList {
    fn write_to(&self, writer: &mut impl WriteBytesExt) -> io::Result<()> {
        write_players(writer, &self.players)
    }

    fn read_from(reader: &mut Cursor<&[u8]>) -> io::Result<Self> {
        Ok(PlayerMovedList { players: read_players(reader)? })
    }
}

impl Wire for Event {
    fn write_to(&self, writer: &mut impl WriteBytesExt) -> io::Result<()> {
        write_bytes(writer, self.kind.as_bytes())?;
        write_bytes(writer, &self.data)
    }

    fn read_from(reader: &mut Cursor<&[u8]>) -> io::Result<Self> {
        Ok(Event {
            kind: read_string(reader)?,
            data: read_bytes(reader)?,
        })
    }
}

impl Wire for RawEvent {
    fn write_to(&self, writer: &mut impl WriteBytesExt) -> io::Result<()> {
        write_bytes(writer, &self.raw_data)
    }

    fn read_from(reader: &mut Cursor<&[u8]>) -> io::Result<Self> {
        Ok(RawEvent { raw_data: read_bytes(reader)? })
    }
}

impl Wire for EventList {
    fn write_to(&self, writer: &mut impl WriteBytesExt) -> io::Result<()> {
        write_len(writer, self.events.len())?;
        self.events.iter().try_for_each(|e| e.write_to(writer))
    }

    fn read_from(reader: &mut Cursor<&[u8]>) -> io::Result<Self> {
        // Each RawEvent is at least its 4-byte length prefix.
        let count = read_len(reader, 4)?;
        let events = (0..count)
            .map(|_| RawEvent::read_from(reader))
            .collect::<io::Result<_>>()?;
        Ok(EventList { events })
    }
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

/// A codec that can encode wire types to bytes and decode bytes back.
///
/// ## Trait bounds
///
/// - `Send + Sync` → safe to share between tasks.
/// - `'static` → the codec owns everything it needs.
///
/// The envelope helpers (`wrap_event`, `unwrap_event_list`, ...) are
/// provided methods built on `encode`/`decode`, so an implementation only
/// has to supply those two.
pub trait Codec: Send + Sync + 'static {
    /// Encodes a value into a fresh buffer.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if a length doesn't fit its prefix.
    fn encode<T: Wire>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Decodes a value that must span the whole buffer.
    ///
    /// # Errors
    /// Returns `ProtocolError::Malformed` if the bytes are truncated,
    /// invalid, or have anything left over.
    fn decode<T: Wire>(&self, data: &[u8]) -> Result<T, ProtocolError>;

    /// Wraps already-encoded payload bytes in an [`Event`] envelope.
    fn wrap_event(
        &self,
        kind: &str,
        data: &[u8],
    ) -> Result<Vec<u8>, ProtocolError> {
        self.encode(&Event {
            kind: kind.to_string(),
            data: data.to_vec(),
        })
    }

    /// Decodes a single envelope.
    fn unwrap_event(&self, bytes: &[u8]) -> Result<Event, ProtocolError> {
        self.decode(bytes)
    }

    /// Builds a batch: every event is encoded on its own, then the
    /// encoded buffers are collected into an [`EventList`].
    fn wrap_event_list(
        &self,
        events: &[Event],
    ) -> Result<Vec<u8>, ProtocolError> {
        let events = events
            .iter()
            .map(|event| Ok(RawEvent { raw_data: self.encode(event)? }))
            .collect::<Result<Vec<_>, ProtocolError>>()?;
        self.encode(&EventList { events })
    }

    /// Flattens a batch: decodes the outer [`EventList`], then re-decodes
    /// each raw entry as an [`Event`]. Order is preserved.
    ///
    /// Fails as a whole if any entry is malformed. Callers that want to
    /// keep the good entries decode the `EventList` themselves and call
    /// [`unwrap_event`](Self::unwrap_event) per entry.
    fn unwrap_event_list(
        &self,
        bytes: &[u8],
    ) -> Result<Vec<Event>, ProtocolError> {
        let list: EventList = self.decode(bytes)?;
        list.events
            .iter()
            .map(|raw| self.unwrap_event(&raw.raw_data))
            .collect()
    }

    /// Encodes a typed payload and wraps it under its own kind.
    fn encode_payload(
        &self,
        payload: &Payload,
    ) -> Result<Vec<u8>, ProtocolError> {
        let data = match payload {
            Payload::PlayerHello(p) => self.encode(p)?,
            Payload::PlayerHelloConfirm(p) => self.encode(p)?,
            Payload::PlayerJoined(p) => self.encode(p)?,
            Payload::PlayerJoinedList(p) => self.encode(p)?,
            Payload::PlayerQuit(p) => self.encode(p)?,
            Payload::PlayerMoved(p) => self.encode(p)?,
            Payload::PlayerMovedList(p) => self.encode(p)?,
        };
        self.wrap_event(payload.kind().as_str(), &data)
    }

    /// Parses an envelope's `data` with the layout its `kind` selects.
    ///
    /// # Errors
    /// - `ProtocolError::UnknownKind` if `kind` names no payload.
    /// - `ProtocolError::Malformed` if `data` doesn't match the layout.
    fn decode_payload(&self, event: &Event) -> Result<Payload, ProtocolError> {
        let kind: EventKind = event.kind.parse()?;
        let data = event.data.as_slice();
        Ok(match kind {
            EventKind::PlayerHello => Payload::PlayerHello(self.decode(data)?),
            EventKind::PlayerHelloConfirm => {
                Payload::PlayerHelloConfirm(self.decode(data)?)
            }
            EventKind::PlayerJoined => Payload::PlayerJoined(self.decode(data)?),
            EventKind::PlayerJoinedList => {
                Payload::PlayerJoinedList(self.decode(data)?)
            }
            EventKind::PlayerQuit => Payload::PlayerQuit(self.decode(data)?),
            EventKind::PlayerMoved => Payload::PlayerMoved(self.decode(data)?),
            EventKind::PlayerMovedList => {
                Payload::PlayerMovedList(self.decode(data)?)
            }
        })
    }
}

// ---------------------------------------------------------------------------
// BinaryCodec
// ---------------------------------------------------------------------------

/// The [`Codec`] that speaks the Skirmish binary layout.
///
/// ## Example
///
/// ```rust
/// use skirmish_protocol::{BinaryCodec, Codec, Payload, PlayerHello, PlayerId};
///
/// let codec = BinaryCodec;
/// let hello = Payload::PlayerHello(PlayerHello { id: PlayerId(42) });
///
/// let bytes = codec.encode_payload(&hello).unwrap();
/// let event = codec.unwrap_event(&bytes).unwrap();
/// assert_eq!(event.kind, "PlayerHello");
/// assert_eq!(codec.decode_payload(&event).unwrap(), hello);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryCodec;

impl Codec for BinaryCodec {
    fn encode<T: Wire>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        let mut buf = Vec::new();
        value
            .write_to(&mut buf)
            .map_err(|e| ProtocolError::Encode(e.to_string()))?;
        Ok(buf)
    }

    fn decode<T: Wire>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        let mut reader = Cursor::new(data);
        let value = T::read_from(&mut reader).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => {
                ProtocolError::Malformed(format!("truncated buffer: {e}"))
            }
            _ => ProtocolError::Malformed(e.to_string()),
        })?;

        let trailing = remaining(&reader);
        if trailing > 0 {
            return Err(ProtocolError::Malformed(format!(
                "{trailing} trailing bytes after message"
            )));
        }
        Ok(value)
    }
}

// =========================================================================
// Tests
// =========================================================================

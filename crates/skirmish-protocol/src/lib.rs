//! Wire protocol for Skirmish.
//!
//! This crate defines the "language" that the game client and server
//! speak:
//!
//! - **Types** ([`Event`], [`EventList`], [`Payload`], [`Player`], ...):
//!   the message structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`BinaryCodec`], [`Wire`]): how those
//!   messages are converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong while decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and session
//! (handshake + player registry). It doesn't know about connections or
//! frames; it only knows how to encode and decode messages.
//!
//! ```text
//! Transport (bytes) → Protocol (Event / Payload) → Session (registry)
//! ```
//!
//! # Double wrapping
//!
//! Every message is an [`Event`] envelope whose `data` is an encoded
//! payload. Server batches are an [`EventList`] whose entries are
//! *encoded events*, so a batch entry is decoded twice: once as an
//! `Event`, then its `data` as the payload its `kind` names.

mod codec;
mod error;
mod types;

pub use codec::{BinaryCodec, Codec, Wire, PLAYER_WIRE_SIZE};
pub use error::ProtocolError;
pub use types::{
    Event, EventKind, EventList, Movement, Payload, Player, PlayerHello,
    PlayerHelloConfirm, PlayerId, PlayerJoined, PlayerJoinedList,
    PlayerMoved, PlayerMovedList, PlayerQuit, RawEvent,
};

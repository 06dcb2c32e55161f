//! Keys and key events, independent of any windowing library.

use std::fmt;

use serde::{Deserialize, Serialize};
use skirmish_protocol::Movement;

/// The four keys that steer a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementKey {
    Up,
    Left,
    Down,
    Right,
}

impl MovementKey {
    pub const ALL: [Self; 4] = [Self::Up, Self::Left, Self::Down, Self::Right];

    /// Maps a physical key code (`"KeyW"`, `"KeyA"`, `"KeyS"`, `"KeyD"`)
    /// to a movement key. Codes name the key's position, not the
    /// character it types, so the layout doesn't matter.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "KeyW" => Some(Self::Up),
            "KeyA" => Some(Self::Left),
            "KeyS" => Some(Self::Down),
            "KeyD" => Some(Self::Right),
            _ => None,
        }
    }

    /// The physical key code this key is bound to.
    pub fn code(self) -> &'static str {
        match self {
            Self::Up => "KeyW",
            Self::Left => "KeyA",
            Self::Down => "KeyS",
            Self::Right => "KeyD",
        }
    }

    /// Sets or clears this key's flag.
    pub fn apply(self, movement: &mut Movement, held: bool) {
        let flag = match self {
            Self::Up => &mut movement.up,
            Self::Left => &mut movement.left,
            Self::Down => &mut movement.down,
            Self::Right => &mut movement.right,
        };
        *flag = held;
    }
}

impl fmt::Display for MovementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Whether a key went down or came up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyAction {
    Press,
    Release,
}

/// One keyboard transition for a movement key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: MovementKey,
    pub action: KeyAction,
    /// `true` for the synthetic presses the OS emits while a key is held.
    pub repeat: bool,
}

impl KeyEvent {
    pub fn press(key: MovementKey) -> Self {
        Self {
            key,
            action: KeyAction::Press,
            repeat: false,
        }
    }

    pub fn release(key: MovementKey) -> Self {
        Self {
            key,
            action: KeyAction::Release,
            repeat: false,
        }
    }

    /// Builds an event from a physical key code. Returns `None` for keys
    /// that don't steer.
    pub fn from_code(code: &str, action: KeyAction, repeat: bool) -> Option<Self> {
        MovementKey::from_code(code).map(|key| Self {
            key,
            action,
            repeat,
        })
    }
}

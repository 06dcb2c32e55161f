//! The player registry: the client's mirror of every player in the world.
//!
//! The registry is responsible for:
//! - Inserting players when the server announces them
//! - Removing players when they quit
//! - Overwriting positions and movement flags with authoritative updates
//! - Handing out the per-frame snapshot the render surface draws
//!
//! # Concurrency note
//!
//! `PlayerRegistry` is a plain `HashMap`, not a concurrent one. It is
//! owned by the [`Session`](crate::Session), which is owned by the single
//! client loop, so every operation runs to completion before the next one
//! starts. Each `apply_*` method touches exactly one entry per player and
//! never leaves a half-updated record behind.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use skirmish_protocol::{Player, PlayerId};

/// One thing for the render surface to paint: a player's id and position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub id: PlayerId,
    pub x: f32,
    pub y: f32,
}

/// All known players, keyed by id.
///
/// ## Invariant
///
/// At most one record per [`PlayerId`]. `HashMap` gives us that for free
/// and O(1) lookups by id.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: HashMap<PlayerId, Player>,
}

impl PlayerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a player, replacing any existing record with the same id.
    pub fn apply_joined(&mut self, player: Player) {
        tracing::debug!(player_id = %player.id, "player joined");
        self.players.insert(player.id, player);
    }

    /// Inserts or replaces every player in the list.
    ///
    /// Order inside the list doesn't matter; ids are unique keys.
    pub fn apply_joined_list(&mut self, players: impl IntoIterator<Item = Player>) {
        for player in players {
            self.apply_joined(player);
        }
    }

    /// Removes a player.
    ///
    /// Returns `true` if a record was removed. Quitting an id we never
    /// saw is a no-op, not an error.
    pub fn apply_quit(&mut self, id: PlayerId) -> bool {
        let removed = self.players.remove(&id).is_some();
        if removed {
            tracing::debug!(player_id = %id, "player quit");
        } else {
            tracing::debug!(player_id = %id, "quit for unknown player ignored");
        }
        removed
    }

    /// Applies an authoritative position update.
    ///
    /// Overwrites `x`, `y` and the four movement flags. `speed` is left
    /// alone: the server only sends it on join.
    ///
    /// If the id is unknown (a move raced ahead of its join), a new
    /// record is created with just those fields and zero speed. Returns
    /// `true` if the player was already known.
    pub fn apply_moved(&mut self, update: Player) -> bool {
        // `entry` looks the key up once and hands back either the
        // existing record or the empty slot, so the read-modify-write
        // below is a single step.
        match self.players.entry(update.id) {
            Entry::Occupied(mut entry) => {
                let player = entry.get_mut();
                player.x = update.x;
                player.y = update.y;
                player.moving = update.moving;
                true
            }
            Entry::Vacant(entry) => {
                tracing::debug!(
                    player_id = %update.id,
                    "move for unknown player, synthesizing record"
                );
                entry.insert(Player {
                    x: update.x,
                    y: update.y,
                    moving: update.moving,
                    ..Player::new(update.id)
                });
                false
            }
        }
    }

    /// Applies [`apply_moved`](Self::apply_moved) to every entry.
    pub fn apply_moved_list(&mut self, updates: impl IntoIterator<Item = Player>) {
        for update in updates {
            self.apply_moved(update);
        }
    }

    /// Looks up a player by id.
    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// Looks up a player by id for mutation.
    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    /// Iterates over all players in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// Iterates mutably over all players in no particular order.
    ///
    /// This is what the integration step walks every frame.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.values_mut()
    }

    /// Positions of every player, sorted by id so frames draw in a
    /// stable order.
    pub fn snapshot(&self) -> Vec<Marker> {
        let mut markers: Vec<Marker> = self
            .players
            .values()
            .map(|p| Marker { id: p.id, x: p.x, y: p.y })
            .collect();
        markers.sort_by_key(|m| m.id);
        markers
    }

    /// Number of known players.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Returns `true` if no players are known.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Forgets every player.
    pub fn clear(&mut self) {
        self.players.clear();
    }
}

// =========================================================================
// Tests
// =========================================================================

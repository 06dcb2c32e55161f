//! World geometry and per-frame motion prediction.

use serde::{Deserialize, Serialize};
use skirmish_protocol::Player;
use tracing::warn;

/// Size of the playfield and of a player's sprite, in world units.
///
/// A player's position is its sprite's top-left corner, so the furthest
/// a player can go is `width - sprite_width` across and
/// `height - sprite_height` down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
    pub sprite_width: f32,
    pub sprite_height: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 1600.0,
            height: 1200.0,
            sprite_width: 20.0,
            sprite_height: 20.0,
        }
    }
}

impl WorldConfig {
    /// Replace unusable dimensions so the bounds checks stay meaningful.
    ///
    /// Non-finite or negative sizes fall back to the defaults, and a
    /// sprite larger than the world is shrunk to fit.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        for (name, value, fallback) in [
            ("width", &mut self.width, defaults.width),
            ("height", &mut self.height, defaults.height),
            ("sprite_width", &mut self.sprite_width, defaults.sprite_width),
            ("sprite_height", &mut self.sprite_height, defaults.sprite_height),
        ] {
            if !value.is_finite() || *value < 0.0 {
                warn!(field = name, value = *value, "invalid world size, using default");
                *value = fallback;
            }
        }
        if self.sprite_width > self.width {
            warn!(
                sprite_width = self.sprite_width,
                width = self.width,
                "sprite wider than world, clamping"
            );
            self.sprite_width = self.width;
        }
        if self.sprite_height > self.height {
            warn!(
                sprite_height = self.sprite_height,
                height = self.height,
                "sprite taller than world, clamping"
            );
            self.sprite_height = self.height;
        }
        self
    }

    /// Exclusive upper bound for `x`.
    pub fn max_x(&self) -> f32 {
        self.width - self.sprite_width
    }

    /// Exclusive upper bound for `y`.
    pub fn max_y(&self) -> f32 {
        self.height - self.sprite_height
    }
}

/// Advances one player by `elapsed_secs` along its movement flags.
///
/// Each flag is applied on its own: a step that would take the player
/// past an edge is skipped entirely rather than clamped, so a player
/// near a wall stops short of it. Left and right (or up and down) held
/// together both apply, which cancels out away from the edges.
///
/// `elapsed_secs` below zero, or NaN, counts as no time passing.
pub fn integrate(player: &mut Player, elapsed_secs: f32, world: &WorldConfig) {
    // `!(x >= 0.0)` is true for NaN too.
    let elapsed = if !(elapsed_secs >= 0.0) { 0.0 } else { elapsed_secs };
    let delta = elapsed * player.speed;
    let moving = player.moving;

    if moving.left && player.x - delta >= 0.0 {
        player.x -= delta;
    }
    if moving.right && player.x + delta < world.max_x() {
        player.x += delta;
    }
    if moving.up && player.y - delta >= 0.0 {
        player.y -= delta;
    }
    if moving.down && player.y + delta < world.max_y() {
        player.y += delta;
    }
}

/// Runs [`integrate`] over every player.
pub fn step<'a>(
    players: impl IntoIterator<Item = &'a mut Player>,
    elapsed_secs: f32,
    world: &WorldConfig,
) {
    for player in players {
        integrate(player, elapsed_secs, world);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_protocol::{Movement, PlayerId};

    fn moving(x: f32, y: f32, speed: f32, movement: Movement) -> Player {
        Player {
            id: PlayerId(1),
            speed,
            x,
            y,
            moving: movement,
        }
    }

    const LEFT: Movement = Movement {
        left: true,
        right: false,
        up: false,
        down: false,
    };
    const RIGHT: Movement = Movement {
        left: false,
        right: true,
        up: false,
        down: false,
    };
    const UP: Movement = Movement {
        left: false,
        right: false,
        up: true,
        down: false,
    };
    const DOWN: Movement = Movement {
        left: false,
        right: false,
        up: false,
        down: true,
    };

    #[test]
    fn test_default_world_geometry() {
        let world = WorldConfig::default();
        assert_eq!(world.max_x(), 1580.0);
        assert_eq!(world.max_y(), 1180.0);
    }

    #[test]
    fn test_integrate_moves_along_each_flag() {
        let world = WorldConfig::default();

        let mut p = moving(100.0, 100.0, 200.0, RIGHT);
        integrate(&mut p, 0.5, &world);
        assert_eq!((p.x, p.y), (200.0, 100.0));

        let mut p = moving(100.0, 100.0, 200.0, LEFT);
        integrate(&mut p, 0.25, &world);
        assert_eq!(p.x, 50.0);

        let mut p = moving(100.0, 100.0, 200.0, UP);
        integrate(&mut p, 0.25, &world);
        assert_eq!(p.y, 50.0);

        let mut p = moving(100.0, 100.0, 200.0, DOWN);
        integrate(&mut p, 0.25, &world);
        assert_eq!(p.y, 150.0);
    }

    #[test]
    fn test_integrate_left_at_zero_does_not_move() {
        let world = WorldConfig::default();
        let mut p = moving(0.0, 10.0, 300.0, LEFT);
        integrate(&mut p, 1.0 / 60.0, &world);
        assert_eq!(p.x, 0.0);
    }

    #[test]
    fn test_integrate_right_at_edge_does_not_cross() {
        let world = WorldConfig::default();
        let start = world.max_x() - 1.0;
        let mut p = moving(start, 10.0, 300.0, RIGHT);
        integrate(&mut p, 10.0, &world);
        assert_eq!(p.x, start);
    }

    #[test]
    fn test_integrate_step_past_edge_is_skipped_not_clamped() {
        let world = WorldConfig::default();
        // 5 units from the top, moving 10.
        let mut p = moving(50.0, 5.0, 10.0, UP);
        integrate(&mut p, 1.0, &world);
        assert_eq!(p.y, 5.0);

        let mut p = moving(50.0, 5.0, 5.0, UP);
        integrate(&mut p, 1.0, &world);
        assert_eq!(p.y, 0.0, "landing exactly on 0 is allowed");
    }

    #[test]
    fn test_integrate_opposing_flags_both_apply() {
        let world = WorldConfig::default();
        let both = Movement {
            left: true,
            right: true,
            up: false,
            down: false,
        };
        let mut p = moving(100.0, 100.0, 100.0, both);
        integrate(&mut p, 0.5, &world);
        assert_eq!(p.x, 100.0);

        // At the left edge only the right step applies.
        let mut p = moving(0.0, 100.0, 100.0, both);
        integrate(&mut p, 0.5, &world);
        assert_eq!(p.x, 50.0);
    }

    #[test]
    fn test_integrate_negative_or_nan_elapsed_is_zero() {
        let world = WorldConfig::default();
        let mut p = moving(100.0, 100.0, 100.0, RIGHT);
        integrate(&mut p, -1.0, &world);
        assert_eq!(p.x, 100.0);
        integrate(&mut p, f32::NAN, &world);
        assert_eq!(p.x, 100.0);
    }

    #[test]
    fn test_integrate_still_player_stays() {
        let world = WorldConfig::default();
        let mut p = moving(10.0, 20.0, 300.0, Movement::STILL);
        integrate(&mut p, 1.0, &world);
        assert_eq!((p.x, p.y), (10.0, 20.0));
    }

    #[test]
    fn test_step_advances_every_player() {
        let world = WorldConfig::default();
        let mut players = vec![
            moving(10.0, 10.0, 100.0, RIGHT),
            moving(10.0, 10.0, 100.0, DOWN),
        ];
        step(players.iter_mut(), 0.1, &world);
        assert_eq!(players[0].x, 20.0);
        assert_eq!(players[1].y, 20.0);
    }

    #[test]
    fn test_world_validated_fixes_bad_sizes() {
        let world = WorldConfig {
            width: f32::NAN,
            height: 100.0,
            sprite_width: -3.0,
            sprite_height: 500.0,
        }
        .validated();
        assert_eq!(world.width, 1600.0);
        assert_eq!(world.sprite_width, 20.0);
        assert_eq!(world.sprite_height, 100.0);
    }
}

//! World state: the single owner of everything the simulation mutates.
//!
//! The main loop holds one `WorldState` and passes it by reference into the
//! physics step and the mesh builder; nothing lives in module statics, so
//! tests build worlds directly and drive them deterministically.

use glam::Vec2;

use crate::level::{build_level, Level};
use crate::player::Player;

/// Dead-zone scrolling camera. The player moves freely while inside the
/// middle band of the screen; scroll engages only past either band edge and
/// never goes negative (the world has a hard left edge).
#[derive(Debug, Clone)]
pub struct ScrollCamera {
    pub scroll_x: f32,
    pub viewport_width: f32,
}

/// Band edges as fractions of the viewport width.
const BAND_LEFT: f32 = 0.25;
const BAND_RIGHT: f32 = 0.55;

impl ScrollCamera {
    pub fn new(viewport_width: f32) -> Self {
        Self {
            scroll_x: 0.0,
            viewport_width,
        }
    }

    pub fn follow(&mut self, player_x: f32) {
        let left_margin = self.viewport_width * BAND_LEFT;
        let right_margin = self.viewport_width * BAND_RIGHT;
        let screen_x = player_x - self.scroll_x;
        if screen_x < left_margin {
            self.scroll_x = (player_x - left_margin).max(0.0);
        } else if screen_x > right_margin {
            self.scroll_x = player_x - right_margin;
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorldState {
    pub player: Player,
    pub level: Level,
    pub camera: ScrollCamera,
    /// Where a fall past the bottom of the world puts the player back:
    /// the level spawn until a checkpoint activates.
    pub respawn_anchor: Vec2,
    pub viewport: Vec2,
}

impl WorldState {
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        let level = build_level(viewport_height);
        let spawn = level.spawn;
        Self {
            player: Player::new(spawn),
            level,
            camera: ScrollCamera::new(viewport_width),
            respawn_anchor: spawn,
            viewport: Vec2::new(viewport_width, viewport_height),
        }
    }

    pub fn orbs_collected(&self) -> usize {
        self.level.orbs.iter().filter(|o| o.collected).count()
    }
}

//! The player entity: one persistent, mutable struct owned by the world.
//!
//! Positions are canvas-style world pixels (origin top-left, y grows
//! downward); velocities are world pixels per fixed step. Only the physics
//! step mutates a `Player`.

use glam::Vec2;
use orb_core::animation::{AnimationPlayer, Facing};

pub const PLAYER_WIDTH: f32 = 34.0;
pub const PLAYER_HEIGHT: f32 = 44.0;

#[derive(Debug, Clone)]
pub struct Player {
    pub position: Vec2,
    pub velocity: Vec2,
    pub width: f32,
    pub height: f32,
    pub on_ground: bool,
    /// Jumps consumed since last grounding: 0, 1, or 2.
    pub jump_count: u8,
    pub facing: Facing,
    pub anim: AnimationPlayer,
}

impl Player {
    pub fn new(spawn: Vec2) -> Self {
        Self {
            position: spawn,
            velocity: Vec2::ZERO,
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
            on_ground: false,
            jump_count: 0,
            facing: Facing::Right,
            anim: AnimationPlayer::new(),
        }
    }

    /// Bottom edge of the collision box, the line that rests on platforms.
    pub fn bottom(&self) -> f32 {
        self.position.y + self.height
    }
}

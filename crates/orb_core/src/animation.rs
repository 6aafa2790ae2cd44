//! Player animation state machine and deterministic frame advancement.
//!
//! The visual state space is four actions crossed with two facings, eight
//! variants total. Selection happens once per fixed step from physics output,
//! with a single priority order: airborne vertical velocity beats horizontal
//! intent, grounded falls back to horizontal intent. The rule lives in
//! `select_action` and nowhere else.
//!
//! All timing uses integer microseconds (`u64`) so frame advancement is
//! deterministic under the fixed-timestep model -- no floating-point drift.

/// What the player is visually doing. Mirrored left/right via [`Facing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Idle,
    Run,
    Jump,
    Fall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facing {
    Left,
    Right,
}

/// Frame count and per-frame duration for one action's sprite strip.
/// Durations mirror the source art's pacing: 8-frame idle/run strips, short
/// 2-frame jump/fall strips held longer per frame.
#[derive(Debug, Clone, Copy)]
pub struct ClipSpec {
    pub frame_count: u32,
    pub frame_duration_us: u64,
}

pub const fn clip_for(action: Action) -> ClipSpec {
    match action {
        Action::Idle => ClipSpec {
            frame_count: 8,
            frame_duration_us: 116_667,
        },
        Action::Run => ClipSpec {
            frame_count: 8,
            frame_duration_us: 83_333,
        },
        Action::Jump => ClipSpec {
            frame_count: 2,
            frame_duration_us: 166_667,
        },
        Action::Fall => ClipSpec {
            frame_count: 2,
            frame_duration_us: 166_667,
        },
    }
}

/// Select the action for this step. Priority: airborne vertical velocity
/// first (`vy < 0` rising, anything else falling), then horizontal intent.
/// `vy` is in world units per step, y-down.
pub fn select_action(on_ground: bool, move_x: f32, vy: f32) -> Action {
    if !on_ground {
        if vy < 0.0 {
            Action::Jump
        } else {
            Action::Fall
        }
    } else if move_x != 0.0 {
        Action::Run
    } else {
        Action::Idle
    }
}

/// Runtime playback state for the player's current visual variant.
#[derive(Debug, Clone)]
pub struct AnimationPlayer {
    pub action: Action,
    pub facing: Facing,
    pub frame_index: u32,
    elapsed_us: u64,
}

impl AnimationPlayer {
    pub fn new() -> Self {
        Self {
            action: Action::Idle,
            facing: Facing::Right,
            frame_index: 0,
            elapsed_us: 0,
        }
    }

    /// Switch to a visual variant. Playback restarts only when the variant
    /// actually changes; re-setting the current one is a no-op so frames
    /// keep advancing across steps.
    pub fn set_visual(&mut self, action: Action, facing: Facing) {
        if self.action == action && self.facing == facing {
            return;
        }
        self.action = action;
        self.facing = facing;
        self.frame_index = 0;
        self.elapsed_us = 0;
    }

    /// Advance playback by `dt_us`. Frames wrap modulo the clip's count; all
    /// clips loop.
    pub fn tick(&mut self, dt_us: u64) {
        let clip = clip_for(self.action);
        self.elapsed_us += dt_us;
        while self.elapsed_us >= clip.frame_duration_us {
            self.elapsed_us -= clip.frame_duration_us;
            self.frame_index = (self.frame_index + 1) % clip.frame_count;
        }
    }
}

impl Default for AnimationPlayer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP_US: u64 = 16_667;

    #[test]
    fn grounded_selection_follows_horizontal_intent() {
        assert_eq!(select_action(true, 0.0, 0.0), Action::Idle);
        assert_eq!(select_action(true, 1.0, 0.0), Action::Run);
        assert_eq!(select_action(true, -1.0, 0.0), Action::Run);
    }

    #[test]
    fn airborne_velocity_beats_horizontal_intent() {
        assert_eq!(select_action(false, 1.0, -5.0), Action::Jump);
        assert_eq!(select_action(false, 1.0, 5.0), Action::Fall);
        // Apex: vy exactly zero while airborne reads as falling.
        assert_eq!(select_action(false, 0.0, 0.0), Action::Fall);
    }

    #[test]
    fn switching_variant_restarts_playback() {
        let mut anim = AnimationPlayer::new();
        anim.tick(STEP_US * 10);
        assert_ne!(anim.frame_index, 0);
        anim.set_visual(Action::Run, Facing::Right);
        assert_eq!(anim.frame_index, 0);
    }

    #[test]
    fn facing_flip_alone_restarts_playback() {
        let mut anim = AnimationPlayer::new();
        anim.set_visual(Action::Run, Facing::Right);
        anim.tick(STEP_US * 8);
        let before = anim.frame_index;
        assert_ne!(before, 0);
        anim.set_visual(Action::Run, Facing::Left);
        assert_eq!(anim.frame_index, 0);
    }

    #[test]
    fn resetting_same_variant_keeps_playback() {
        let mut anim = AnimationPlayer::new();
        anim.tick(STEP_US * 10);
        let frame = anim.frame_index;
        anim.set_visual(Action::Idle, Facing::Right);
        assert_eq!(anim.frame_index, frame);
    }

    #[test]
    fn frames_wrap_modulo_count() {
        let mut anim = AnimationPlayer::new();
        anim.set_visual(Action::Jump, Facing::Right);
        let clip = clip_for(Action::Jump);
        // One full cycle plus one frame.
        anim.tick(clip.frame_duration_us * (clip.frame_count as u64 + 1));
        assert_eq!(anim.frame_index, 1);
    }

    #[test]
    fn advancement_is_deterministic() {
        let mut a = AnimationPlayer::new();
        let mut b = AnimationPlayer::new();
        a.set_visual(Action::Run, Facing::Left);
        b.set_visual(Action::Run, Facing::Left);
        for _ in 0..600 {
            a.tick(STEP_US);
            b.tick(STEP_US);
            assert_eq!(a.frame_index, b.frame_index);
        }
    }

    #[test]
    fn run_advances_faster_than_idle() {
        let mut idle = AnimationPlayer::new();
        let mut run = AnimationPlayer::new();
        run.set_visual(Action::Run, Facing::Right);
        // Half a second: idle crosses 4 frames, run crosses 6.
        idle.tick(500_000);
        run.tick(500_000);
        assert_eq!(idle.frame_index, 4);
        assert_eq!(run.frame_index, 6);
    }
}

//! Scripted input sequences for deterministic physics runs in tests.
//!
//! A replay is a JSON list of input frames with repeat counts; expanding it
//! yields the exact per-step `FrameInput` stream, so a whole route through
//! the level can be asserted end-to-end without a window or a clock.

use crate::physics::FrameInput;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(default)]
    pub move_x: f32,
    #[serde(default)]
    pub jump_pressed: bool,
    #[serde(default)]
    pub interact_pressed: bool,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplaySequence {
    pub fn expanded_inputs(&self) -> Vec<FrameInput> {
        let mut out = Vec::new();
        for frame in &self.frames {
            for _ in 0..frame.repeat.max(1) {
                out.push(FrameInput {
                    move_x: frame.move_x.clamp(-1.0, 1.0),
                    jump_pressed: frame.jump_pressed,
                    interact_pressed: frame.interact_pressed,
                });
            }
        }
        out
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(replay)
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{step, GameEvent, PhysicsTuning};
    use crate::world::WorldState;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "orb_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn replay_file_parses_and_expands() {
        let path = temp_file_path("parse");
        fs::write(
            &path,
            r#"{
              "frames": [
                { "move_x": 1.0, "repeat": 3 },
                { "jump_pressed": true },
                { "interact_pressed": true, "repeat": 2 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let expanded = replay.expanded_inputs();
        assert_eq!(expanded.len(), 6);
        assert!(expanded[3].jump_pressed);
        assert!(expanded[5].interact_pressed);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn empty_replay_is_rejected() {
        let path = temp_file_path("empty");
        fs::write(&path, r#"{ "frames": [] }"#).expect("write replay file");
        let err = load_replay_from_path(&path).expect_err("empty frames should fail");
        assert!(err.contains("frames list is empty"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_run_is_deterministic() {
        let path = temp_file_path("deterministic");
        fs::write(
            &path,
            r#"{
              "frames": [
                { "move_x": 1.0, "repeat": 90 },
                { "move_x": 1.0, "jump_pressed": true },
                { "move_x": 1.0, "repeat": 120 },
                { "jump_pressed": true },
                { "move_x": -1.0, "repeat": 60 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let inputs = replay.expanded_inputs();
        let tuning = PhysicsTuning::default();

        let mut run_a = WorldState::new(800.0, 600.0);
        let mut run_b = WorldState::new(800.0, 600.0);
        for input in &inputs {
            step(&mut run_a, *input, &tuning);
        }
        for input in &inputs {
            step(&mut run_b, *input, &tuning);
        }

        assert_eq!(run_a.player.position, run_b.player.position);
        assert_eq!(run_a.player.velocity, run_b.player.velocity);
        assert_eq!(run_a.player.on_ground, run_b.player.on_ground);
        assert_eq!(run_a.camera.scroll_x, run_b.camera.scroll_x);
        assert_eq!(run_a.orbs_collected(), run_b.orbs_collected());
    }

    #[test]
    fn scripted_route_lands_on_the_first_platform_and_collects_its_orb() {
        let path = temp_file_path("route");
        // Run under the first floating platform, then a neutral jump up
        // through it onto its top.
        fs::write(
            &path,
            r#"{
              "frames": [
                { "repeat": 30 },
                { "move_x": 1.0, "repeat": 26 },
                { "jump_pressed": true },
                { "repeat": 60 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let tuning = PhysicsTuning::default();
        let mut world = WorldState::new(800.0, 600.0);

        let mut events = Vec::new();
        for input in replay.expanded_inputs() {
            events.extend(step(&mut world, input, &tuning));
        }

        assert!(world.player.on_ground);
        let platform = &world.level.platforms[1];
        assert_eq!(world.player.bottom(), platform.walkable_top());
        assert!(events.contains(&GameEvent::SkillUnlocked { skill: "C++" }));
        assert_eq!(world.orbs_collected(), 1);

        let _ = fs::remove_file(path);
    }
}

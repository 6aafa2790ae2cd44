//! Physics and collision: one fixed simulation step.
//!
//! `step` is the only mutator of world state. It runs the stages in a fixed
//! order -- horizontal control, jump, integration, platform resolution, orb
//! collection, terminal interaction, checkpoints, fall recovery, camera --
//! and reports anything the presentation layer should react to as
//! [`GameEvent`]s instead of touching UI itself.
//!
//! Collision policy: for each platform, a top-landing (moving downward and
//! crossing the walkable line this step) is resolved first; a side-push
//! applies only to overlaps that were not top-landings, against the solid
//! sub-box below the walkable line, and never pushes against the approach
//! direction. Every snap is strictly corrective within the step, so the
//! player can never stay clipped inside a platform.
//!
//! Velocities and accelerations are per fixed step, matching the 60 Hz
//! timestep the clock drains.

use orb_core::animation::{select_action, Facing};
use orb_core::time::FIXED_DT_US;

use crate::level::TerminalKind;
use crate::world::WorldState;

pub const MAX_JUMPS: u8 = 2;

/// Tunable movement constants. Jump impulses are negative because y grows
/// downward.
#[derive(Debug, Clone, Copy)]
pub struct PhysicsTuning {
    pub run_speed: f32,
    pub gravity: f32,
    pub jump_impulse: f32,
    pub double_jump_impulse: f32,
    /// How far below the viewport the player may fall before respawning.
    pub fall_recovery_margin: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            run_speed: 4.2,
            gravity: 0.9,
            jump_impulse: -13.0,
            double_jump_impulse: -11.0,
            fall_recovery_margin: 200.0,
        }
    }
}

/// Input intent sampled once per fixed step. `jump_pressed` and
/// `interact_pressed` are edges, true only on the step that consumed the
/// physical press.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    pub move_x: f32,
    pub jump_pressed: bool,
    pub interact_pressed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    SkillUnlocked { skill: &'static str },
    ProjectOpened { repo_index: usize },
    ContactOpened,
    CheckpointReached,
}

pub fn rects_overlap(
    x1: f32,
    y1: f32,
    w1: f32,
    h1: f32,
    x2: f32,
    y2: f32,
    w2: f32,
    h2: f32,
) -> bool {
    x1 < x2 + w2 && x1 + w1 > x2 && y1 < y2 + h2 && y1 + h1 > y2
}

pub fn step(world: &mut WorldState, input: FrameInput, tuning: &PhysicsTuning) -> Vec<GameEvent> {
    let mut events = Vec::new();

    // Split the world into disjoint field borrows for the whole step.
    let WorldState {
        player,
        level,
        camera,
        respawn_anchor,
        viewport,
    } = world;

    // Stage 1: horizontal control. Opposing keys cancel to zero intent.
    player.velocity.x = input.move_x.clamp(-1.0, 1.0) * tuning.run_speed;
    if input.move_x > 0.0 {
        player.facing = Facing::Right;
    } else if input.move_x < 0.0 {
        player.facing = Facing::Left;
    }

    // Stage 2: jump. Grounded presses take the strong impulse; airborne
    // presses take the weaker one while jumps remain; a third press is a
    // no-op.
    if input.jump_pressed {
        if player.on_ground {
            player.velocity.y = tuning.jump_impulse;
            player.on_ground = false;
            player.jump_count = 1;
        } else if player.jump_count < MAX_JUMPS {
            player.velocity.y = tuning.double_jump_impulse;
            player.jump_count += 1;
        }
    }

    // Stage 3: integration.
    player.velocity.y += tuning.gravity;
    player.position += player.velocity;

    // Stage 4: platform resolution, in construction order.
    player.on_ground = false;
    for p in &level.platforms {
        let x_overlap = player.position.x + player.width > p.x && player.position.x < p.x + p.w;
        if !x_overlap {
            continue;
        }

        let walkable = p.walkable_top();
        let bottom = player.bottom();
        let landed = player.velocity.y >= 0.0
            && bottom >= walkable
            && bottom - player.velocity.y <= walkable;

        if landed {
            player.position.y = walkable - player.height;
            player.velocity.y = 0.0;
            player.on_ground = true;
            player.jump_count = 0;
            continue;
        }

        // Side-push against the solid sub-box below the walkable line.
        let inside_body = player.bottom() > walkable && player.position.y < p.y + p.h;
        if inside_body {
            if player.velocity.x > 0.0 {
                player.position.x = p.x - player.width;
                player.velocity.x = 0.0;
            } else if player.velocity.x < 0.0 {
                player.position.x = p.x + p.w;
                player.velocity.x = 0.0;
            }
        }
    }

    // Stage 5: orb collection. One-way, idempotent.
    for orb in &mut level.orbs {
        if orb.collected {
            continue;
        }
        let d = orb.radius;
        if rects_overlap(
            player.position.x,
            player.position.y,
            player.width,
            player.height,
            orb.x - d,
            orb.y - d,
            d * 2.0,
            d * 2.0,
        ) {
            orb.collected = true;
            events.push(GameEvent::SkillUnlocked { skill: orb.skill });
        }
    }

    // Stage 6: terminal interaction. First overlap in construction order
    // wins; at most one per edge; no overlap is a silent no-op.
    if input.interact_pressed {
        for t in &level.terminals {
            if rects_overlap(
                player.position.x,
                player.position.y,
                player.width,
                player.height,
                t.x,
                t.y,
                t.w,
                t.h,
            ) {
                events.push(match t.kind {
                    TerminalKind::Project { repo_index } => GameEvent::ProjectOpened { repo_index },
                    TerminalKind::Contact => GameEvent::ContactOpened,
                });
                break;
            }
        }
    }

    // Stage 7: checkpoints. Activation is one-way and retargets respawn.
    for c in &mut level.checkpoints {
        if c.activated {
            continue;
        }
        if rects_overlap(
            player.position.x,
            player.position.y,
            player.width,
            player.height,
            c.x,
            c.y,
            c.w,
            c.h,
        ) {
            c.activated = true;
            *respawn_anchor = glam::Vec2::new(c.x, c.y - player.height);
            events.push(GameEvent::CheckpointReached);
        }
    }

    // Stage 8: fall recovery.
    if player.position.y > viewport.y + tuning.fall_recovery_margin {
        player.position = *respawn_anchor;
        player.velocity.y = 0.0;
    }

    // Stage 9: camera follows into the dead-zone band.
    camera.follow(player.position.x);

    // Visual state is derived entirely from post-step physics; playback
    // advances one fixed slice.
    let action = select_action(player.on_ground, input.move_x, player.velocity.y);
    player.anim.set_visual(action, player.facing);
    player.anim.tick(FIXED_DT_US);

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{Checkpoint, Orb, Platform, Terminal};
    use crate::world::WorldState;
    use orb_core::animation::Action;

    const VIEW_W: f32 = 800.0;
    const VIEW_H: f32 = 600.0;

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    fn held_right() -> FrameInput {
        FrameInput {
            move_x: 1.0,
            ..Default::default()
        }
    }

    fn jump() -> FrameInput {
        FrameInput {
            jump_pressed: true,
            ..Default::default()
        }
    }

    fn interact() -> FrameInput {
        FrameInput {
            interact_pressed: true,
            ..Default::default()
        }
    }

    /// Fresh world with the player settled onto the ground slab.
    fn grounded_world() -> (WorldState, PhysicsTuning) {
        let mut world = WorldState::new(VIEW_W, VIEW_H);
        let tuning = PhysicsTuning::default();
        for _ in 0..120 {
            step(&mut world, idle(), &tuning);
        }
        assert!(world.player.on_ground, "player should settle on the ground");
        (world, tuning)
    }

    #[test]
    fn settles_exactly_on_the_ground_top() {
        let (world, _) = grounded_world();
        let ground_top = world.level.platforms[0].walkable_top();
        assert_eq!(world.player.bottom(), ground_top);
        assert_eq!(world.player.velocity.y, 0.0);
        assert_eq!(world.player.jump_count, 0);
    }

    #[test]
    fn grounded_bottom_never_penetrates_a_walkable_top() {
        let (mut world, tuning) = grounded_world();
        for i in 0..600 {
            let input = if i % 90 == 0 { jump() } else { held_right() };
            step(&mut world, input, &tuning);
            if world.player.on_ground {
                for p in &world.level.platforms {
                    let overlapping = rects_overlap(
                        world.player.position.x,
                        world.player.position.y,
                        world.player.width,
                        world.player.height,
                        p.x,
                        p.y,
                        p.w,
                        p.h,
                    );
                    if overlapping && world.player.bottom() >= p.walkable_top() {
                        assert!(
                            world.player.bottom() - p.walkable_top() < 1e-3,
                            "bottom {} clipped below walkable top {}",
                            world.player.bottom(),
                            p.walkable_top()
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn jump_count_stays_in_range_and_zero_on_ground() {
        let (mut world, tuning) = grounded_world();
        for i in 0..600 {
            let input = if i % 25 == 0 { jump() } else { held_right() };
            step(&mut world, input, &tuning);
            assert!(world.player.jump_count <= MAX_JUMPS);
            if world.player.on_ground {
                assert_eq!(world.player.jump_count, 0);
            }
        }
    }

    #[test]
    fn double_jump_sequence_and_third_press_no_op() {
        let (mut world, tuning) = grounded_world();

        step(&mut world, jump(), &tuning);
        assert!(!world.player.on_ground);
        assert_eq!(world.player.jump_count, 1);
        // The impulse is applied before gravity integrates on top of it.
        assert_eq!(
            world.player.velocity.y,
            tuning.jump_impulse + tuning.gravity
        );

        step(&mut world, jump(), &tuning);
        assert_eq!(world.player.jump_count, 2);
        assert_eq!(
            world.player.velocity.y,
            tuning.double_jump_impulse + tuning.gravity
        );

        let vy_before = world.player.velocity.y;
        step(&mut world, jump(), &tuning);
        assert_eq!(world.player.jump_count, 2);
        // Third press changes nothing; only gravity acted.
        assert_eq!(world.player.velocity.y, vy_before + tuning.gravity);
    }

    #[test]
    fn holding_right_on_flat_ground_moves_at_run_speed() {
        let (mut world, tuning) = grounded_world();
        let mut last_x = world.player.position.x;
        for _ in 0..60 {
            step(&mut world, held_right(), &tuning);
            let dx = world.player.position.x - last_x;
            assert!((dx - tuning.run_speed).abs() < 1e-3, "dx was {dx}");
            last_x = world.player.position.x;
        }
        assert_eq!(world.player.anim.action, Action::Run);
        assert_eq!(world.player.facing, Facing::Right);
    }

    #[test]
    fn opposing_directions_cancel() {
        let (mut world, tuning) = grounded_world();
        let x = world.player.position.x;
        step(
            &mut world,
            FrameInput {
                move_x: 0.0,
                ..Default::default()
            },
            &tuning,
        );
        assert_eq!(world.player.position.x, x);
        assert_eq!(world.player.anim.action, Action::Idle);
    }

    #[test]
    fn camera_invariants_hold_across_a_long_run() {
        let (mut world, tuning) = grounded_world();
        for i in 0..900 {
            let input = if i % 40 == 0 { jump() } else { held_right() };
            step(&mut world, input, &tuning);
            assert!(world.camera.scroll_x >= 0.0);
            assert!(
                world.player.position.x - world.camera.scroll_x <= 0.55 * VIEW_W + 1e-3,
                "player drifted past the right band edge"
            );
        }
        assert!(world.camera.scroll_x > 0.0, "camera should have scrolled");
    }

    #[test]
    fn orb_collection_is_idempotent() {
        let (mut world, tuning) = grounded_world();
        let ground_top = world.level.platforms[0].walkable_top();
        world.level.orbs.clear();
        world.level.orbs.push(Orb {
            x: world.player.position.x + 10.0,
            y: ground_top - 20.0,
            radius: 8.0,
            collected: false,
            skill: "Rust",
        });

        let events = step(&mut world, idle(), &tuning);
        assert_eq!(events, [GameEvent::SkillUnlocked { skill: "Rust" }]);
        assert!(world.level.orbs[0].collected);

        let events = step(&mut world, idle(), &tuning);
        assert!(events.is_empty(), "a collected orb never re-triggers");
    }

    #[test]
    fn interact_fires_first_overlapping_terminal_only() {
        let (mut world, tuning) = grounded_world();
        let px = world.player.position.x;
        let py = world.player.position.y;
        world.level.terminals.clear();
        world.level.terminals.push(Terminal {
            x: px - 5.0,
            y: py,
            w: 44.0,
            h: 44.0,
            kind: TerminalKind::Project { repo_index: 3 },
        });
        world.level.terminals.push(Terminal {
            x: px,
            y: py,
            w: 44.0,
            h: 44.0,
            kind: TerminalKind::Contact,
        });

        let events = step(&mut world, interact(), &tuning);
        assert_eq!(events, [GameEvent::ProjectOpened { repo_index: 3 }]);
    }

    #[test]
    fn interact_with_nothing_in_range_is_a_no_op() {
        let (mut world, tuning) = grounded_world();
        world.level.terminals.clear();
        let events = step(&mut world, interact(), &tuning);
        assert!(events.is_empty());
    }

    #[test]
    fn interact_without_the_edge_never_fires() {
        let (mut world, tuning) = grounded_world();
        let px = world.player.position.x;
        let py = world.player.position.y;
        world.level.terminals.clear();
        world.level.terminals.push(Terminal {
            x: px,
            y: py,
            w: 44.0,
            h: 44.0,
            kind: TerminalKind::Contact,
        });
        let events = step(&mut world, idle(), &tuning);
        assert!(events.is_empty());
    }

    #[test]
    fn side_collision_pushes_out_and_zeroes_vx() {
        let (mut world, tuning) = grounded_world();
        let wall_x = world.player.position.x + 120.0;
        world.level.platforms.push(Platform {
            x: wall_x,
            y: 400.0,
            w: 40.0,
            h: 200.0,
            collision_offset: 0.0,
        });

        for _ in 0..120 {
            step(&mut world, held_right(), &tuning);
            assert!(
                world.player.position.x + world.player.width <= wall_x + 1e-3,
                "player passed through the wall"
            );
        }
        assert_eq!(world.player.position.x, wall_x - world.player.width);
        assert_eq!(world.player.velocity.x, 0.0);
    }

    #[test]
    fn top_landing_takes_priority_over_side_push() {
        let mut world = WorldState::new(VIEW_W, VIEW_H);
        let tuning = PhysicsTuning::default();
        world.level.platforms.push(Platform {
            x: 300.0,
            y: 400.0,
            w: 40.0,
            h: 200.0,
            collision_offset: 0.0,
        });
        // Drop straight down onto the wall's top.
        world.player.position = glam::Vec2::new(303.0, 300.0);
        world.player.velocity = glam::Vec2::ZERO;

        for _ in 0..60 {
            step(&mut world, idle(), &tuning);
            if world.player.on_ground {
                break;
            }
        }
        assert!(world.player.on_ground);
        assert_eq!(world.player.bottom(), 400.0);
        assert_eq!(world.player.position.x, 303.0, "no side-push on landing");
    }

    #[test]
    fn checkpoint_activates_once_and_retargets_respawn() {
        let (mut world, tuning) = grounded_world();
        let px = world.player.position.x;
        let py = world.player.position.y;
        world.level.checkpoints.clear();
        world.level.checkpoints.push(Checkpoint {
            x: px,
            y: py,
            w: 20.0,
            h: 40.0,
            activated: false,
        });

        let events = step(&mut world, idle(), &tuning);
        assert!(events.contains(&GameEvent::CheckpointReached));
        assert!(world.level.checkpoints[0].activated);
        assert_eq!(
            world.respawn_anchor,
            glam::Vec2::new(px, py - world.player.height)
        );

        let events = step(&mut world, idle(), &tuning);
        assert!(
            !events.contains(&GameEvent::CheckpointReached),
            "activation is one-way"
        );
    }

    #[test]
    fn falling_out_of_the_world_respawns_at_the_anchor() {
        let mut world = WorldState::new(VIEW_W, VIEW_H);
        let tuning = PhysicsTuning::default();
        let spawn = world.respawn_anchor;
        world.player.position = glam::Vec2::new(2000.0, VIEW_H + tuning.fall_recovery_margin + 50.0);

        step(&mut world, idle(), &tuning);
        assert_eq!(world.player.position, spawn);
        assert_eq!(world.player.velocity.y, 0.0);
    }

    #[test]
    fn airborne_animation_tracks_velocity_sign() {
        let (mut world, tuning) = grounded_world();
        step(&mut world, jump(), &tuning);
        assert_eq!(world.player.anim.action, Action::Jump);
        // Let the arc turn over.
        for _ in 0..30 {
            step(&mut world, idle(), &tuning);
            if world.player.velocity.y > 0.0 && !world.player.on_ground {
                break;
            }
        }
        assert_eq!(world.player.anim.action, Action::Fall);
    }
}

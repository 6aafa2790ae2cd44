//! Deterministic level construction.
//!
//! The world is generated from the viewport height and a fixed segment count:
//! one wide ground slab, fourteen floating platforms whose heights oscillate
//! through four tiers, orbs on even segments, project terminals on every
//! third segment, checkpoints midway and late, and one oversized contact
//! terminal past the last segment. No randomness anywhere, so building twice
//! yields structurally identical worlds and tests can assert exact layouts.

use glam::Vec2;

pub const SEGMENT_COUNT: usize = 14;
pub const SEGMENT_SPACING: f32 = 160.0;
pub const SEGMENT_BASE_X: f32 = 140.0;

/// Height of the lighter strip drawn along a floating platform's top edge.
/// The strip renders in front of the player's feet, so the walkable line
/// sits this far below the drawn top.
pub const PLATFORM_TOP_STRIP: f32 = 6.0;

const SKILL_POOL: [&str; 8] = [
    "C++",
    "Java",
    "Python",
    "JavaScript",
    "Lua",
    "Rust",
    "React",
    "Node.js",
];

/// Static collision rectangle. `collision_offset` maps the drawn top edge to
/// the effective walkable surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Platform {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub collision_offset: f32,
}

impl Platform {
    pub fn walkable_top(&self) -> f32 {
        self.y + self.collision_offset
    }
}

/// Collectible skill orb. `collected` flips once and never resets.
#[derive(Debug, Clone, PartialEq)]
pub struct Orb {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub collected: bool,
    pub skill: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalKind {
    Project { repo_index: usize },
    Contact,
}

/// Interactive zone the player activates with the interact key.
#[derive(Debug, Clone, PartialEq)]
pub struct Terminal {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub kind: TerminalKind,
}

/// Respawn flag post. Activation is one-way.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub activated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub platforms: Vec<Platform>,
    pub orbs: Vec<Orb>,
    pub terminals: Vec<Terminal>,
    pub checkpoints: Vec<Checkpoint>,
    pub spawn: Vec2,
}

pub fn build_level(viewport_height: f32) -> Level {
    let mut platforms = Vec::with_capacity(SEGMENT_COUNT + 1);
    let mut orbs = Vec::new();
    let mut terminals = Vec::new();
    let mut checkpoints = Vec::new();

    // Ground slab spanning the whole level, walkable right at its top.
    platforms.push(Platform {
        x: -1000.0,
        y: viewport_height - 60.0,
        w: 6000.0,
        h: 60.0,
        collision_offset: 0.0,
    });

    for i in 0..SEGMENT_COUNT {
        let px = SEGMENT_BASE_X + i as f32 * SEGMENT_SPACING;
        let py = viewport_height - 150.0 - ((i % 4) as f32 * 28.0);

        platforms.push(Platform {
            x: px,
            y: py,
            w: 140.0,
            h: 16.0,
            collision_offset: PLATFORM_TOP_STRIP,
        });

        if i % 2 == 0 {
            orbs.push(Orb {
                x: px + 60.0,
                y: py - 26.0,
                radius: 8.0,
                collected: false,
                skill: SKILL_POOL[i % SKILL_POOL.len()],
            });
        }

        if i % 3 == 0 {
            terminals.push(Terminal {
                x: px + 80.0,
                y: py - 70.0,
                w: 44.0,
                h: 44.0,
                kind: TerminalKind::Project { repo_index: i / 3 },
            });
        }

        if i == 5 || i == 11 {
            checkpoints.push(Checkpoint {
                x: px,
                y: py - 40.0,
                w: 20.0,
                h: 40.0,
                activated: false,
            });
        }
    }

    terminals.push(Terminal {
        x: SEGMENT_BASE_X + SEGMENT_COUNT as f32 * SEGMENT_SPACING + 60.0,
        y: viewport_height - 150.0 - 20.0,
        w: 56.0,
        h: 56.0,
        kind: TerminalKind::Contact,
    });

    Level {
        platforms,
        orbs,
        terminals,
        checkpoints,
        spawn: Vec2::new(60.0, viewport_height - 220.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_counts_for_reference_viewport() {
        let level = build_level(600.0);
        assert_eq!(level.platforms.len(), 15);
        assert_eq!(level.orbs.len(), 7);
        assert_eq!(level.terminals.len(), 6);
        assert_eq!(level.checkpoints.len(), 2);
    }

    #[test]
    fn building_twice_is_structurally_identical() {
        assert_eq!(build_level(600.0), build_level(600.0));
    }

    #[test]
    fn ground_slab_comes_first_and_spans_the_level() {
        let level = build_level(600.0);
        let ground = &level.platforms[0];
        assert_eq!(ground.y, 540.0);
        assert!(ground.x <= 0.0);
        let last_terminal = level.terminals.last().expect("contact terminal");
        assert!(ground.x + ground.w > last_terminal.x + last_terminal.w);
    }

    #[test]
    fn platform_heights_cycle_through_four_tiers() {
        let level = build_level(600.0);
        // Floating platforms start at index 1; segment 0 and segment 4 share
        // a tier, segments 0..4 are all distinct.
        let ys: Vec<f32> = level.platforms[1..].iter().map(|p| p.y).collect();
        assert_eq!(ys[0], ys[4]);
        assert_eq!(ys[1], ys[5]);
        assert_ne!(ys[0], ys[1]);
        assert_ne!(ys[1], ys[2]);
        assert_ne!(ys[2], ys[3]);
        assert_eq!(ys[0] - ys[3], 3.0 * 28.0);
    }

    #[test]
    fn project_terminals_index_the_catalog_in_order() {
        let level = build_level(600.0);
        let repo_indices: Vec<usize> = level
            .terminals
            .iter()
            .filter_map(|t| match t.kind {
                TerminalKind::Project { repo_index } => Some(repo_index),
                TerminalKind::Contact => None,
            })
            .collect();
        assert_eq!(repo_indices, [0, 1, 2, 3, 4]);
        assert_eq!(
            level.terminals.last().map(|t| t.kind),
            Some(TerminalKind::Contact)
        );
    }

    #[test]
    fn orbs_sit_on_even_segments_with_cycled_skills() {
        let level = build_level(600.0);
        let expected_x: Vec<f32> = (0..SEGMENT_COUNT)
            .step_by(2)
            .map(|i| SEGMENT_BASE_X + i as f32 * SEGMENT_SPACING + 60.0)
            .collect();
        let actual_x: Vec<f32> = level.orbs.iter().map(|o| o.x).collect();
        assert_eq!(actual_x, expected_x);
        // Segment 8 wraps around the eight-entry pool.
        assert_eq!(level.orbs[0].skill, level.orbs[4].skill);
    }

    #[test]
    fn floating_platforms_carry_the_top_strip_offset() {
        let level = build_level(600.0);
        assert_eq!(level.platforms[0].collision_offset, 0.0);
        for p in &level.platforms[1..] {
            assert_eq!(p.collision_offset, PLATFORM_TOP_STRIP);
            assert_eq!(p.walkable_top(), p.y + PLATFORM_TOP_STRIP);
        }
    }

    #[test]
    fn nothing_depends_on_viewport_width() {
        // Only the height feeds construction; the x layout is fixed.
        let a = build_level(600.0);
        let b = build_level(900.0);
        assert_eq!(
            a.platforms.iter().map(|p| p.x).collect::<Vec<_>>(),
            b.platforms.iter().map(|p| p.x).collect::<Vec<_>>()
        );
    }
}

//! Decorative cursor-trail particles.
//!
//! Purely cosmetic screen-space effect: particles spawn at the mouse
//! position (a burst on click), drift with a little gravity, and fade out
//! over roughly half a second. Uses an inline xorshift32 so the effect needs
//! no external RNG and stays reproducible from its seed. Nothing here touches
//! simulation state.

const SPAWN_COUNT_MOVE: usize = 4;
const SPAWN_COUNT_BURST: usize = 12;
const PARTICLE_GRAVITY: f32 = 0.06;
const LIFE_DECAY: f32 = 0.03;

#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// 1.0 at spawn, fades to 0; doubles as the render alpha.
    pub life: f32,
    pub size: f32,
    pub hue: f32,
}

pub struct CursorTrail {
    particles: Vec<Particle>,
    rng: u32,
}

impl CursorTrail {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            rng: 0xDEADBEEF,
        }
    }

    // xorshift32
    fn rand(&mut self) -> f32 {
        self.rng ^= self.rng << 13;
        self.rng ^= self.rng >> 17;
        self.rng ^= self.rng << 5;
        (self.rng >> 8) as f32 * (1.0 / 16777216.0)
    }

    pub fn spawn(&mut self, x: f32, y: f32) {
        self.spawn_inner(x, y, SPAWN_COUNT_MOVE, 1.0);
    }

    pub fn burst(&mut self, x: f32, y: f32) {
        self.spawn_inner(x, y, SPAWN_COUNT_BURST, 3.0);
    }

    fn spawn_inner(&mut self, x: f32, y: f32, count: usize, energy: f32) {
        for _ in 0..count {
            let jx = (self.rand() - 0.5) * 8.0;
            let jy = (self.rand() - 0.5) * 8.0;
            let vx = (self.rand() - 0.5) * 2.0 * energy;
            let vy = (self.rand() - 0.8) * 2.0 * energy;
            let size = 4.0 + self.rand() * 8.0;
            let hue = 20.0 + self.rand() * 30.0;
            self.particles.push(Particle {
                x: x + jx,
                y: y + jy,
                vx,
                vy,
                life: 1.0,
                size,
                hue,
            });
        }
    }

    /// Advance one display frame: integrate, fade, drop the dead.
    pub fn update(&mut self) {
        for p in &mut self.particles {
            p.x += p.vx;
            p.y += p.vy;
            p.vy += PARTICLE_GRAVITY;
            p.life -= LIFE_DECAY;
        }
        self.particles.retain(|p| p.life > 0.0);
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }
}

impl Default for CursorTrail {
    fn default() -> Self {
        Self::new()
    }
}

/// Warm glow color for a particle hue, roughly hsl(hue, 100%, 60%).
pub fn hue_to_rgb(hue: f32) -> [f32; 3] {
    let h = (hue.rem_euclid(360.0)) / 60.0;
    let c = 0.8;
    let x = c * (1.0 - (h.rem_euclid(2.0) - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = 0.2;
    [r + m, g + m, b + m]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn particles_fade_out_and_get_dropped() {
        let mut trail = CursorTrail::new();
        trail.spawn(100.0, 100.0);
        assert_eq!(trail.particles().len(), 4);
        for _ in 0..40 {
            trail.update();
        }
        assert!(trail.particles().is_empty());
    }

    #[test]
    fn burst_spawns_more_than_a_move() {
        let mut trail = CursorTrail::new();
        trail.burst(0.0, 0.0);
        assert_eq!(trail.particles().len(), 12);
    }

    #[test]
    fn same_seed_same_stream() {
        let mut a = CursorTrail::new();
        let mut b = CursorTrail::new();
        a.spawn(50.0, 50.0);
        b.spawn(50.0, 50.0);
        for (pa, pb) in a.particles().iter().zip(b.particles()) {
            assert_eq!(pa.x, pb.x);
            assert_eq!(pa.vy, pb.vy);
        }
    }
}

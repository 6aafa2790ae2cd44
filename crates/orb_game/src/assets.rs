//! Sprite asset slots: each logical key is loaded once and is either ready
//! or absent. Absent keys are normal -- the renderer draws a primitive shape
//! for that entity type instead -- so a missing or corrupt file degrades the
//! visuals and nothing else.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use orb_core::animation::{Action, Facing};
use orb_render::{SpritePipeline, Texture};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    Idle,
    IdleLeft,
    Run,
    RunLeft,
    Jump,
    JumpLeft,
    Fall,
    FallLeft,
    Orb,
    Terminal,
    ContactTerminal,
    Platform,
}

impl SpriteKey {
    pub const ALL: &'static [SpriteKey] = &[
        SpriteKey::Idle,
        SpriteKey::IdleLeft,
        SpriteKey::Run,
        SpriteKey::RunLeft,
        SpriteKey::Jump,
        SpriteKey::JumpLeft,
        SpriteKey::Fall,
        SpriteKey::FallLeft,
        SpriteKey::Orb,
        SpriteKey::Terminal,
        SpriteKey::ContactTerminal,
        SpriteKey::Platform,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            SpriteKey::Idle => "warrior/Idle.png",
            SpriteKey::IdleLeft => "warrior/IdleLeft.png",
            SpriteKey::Run => "warrior/Run.png",
            SpriteKey::RunLeft => "warrior/RunLeft.png",
            SpriteKey::Jump => "warrior/Jump.png",
            SpriteKey::JumpLeft => "warrior/JumpLeft.png",
            SpriteKey::Fall => "warrior/Fall.png",
            SpriteKey::FallLeft => "warrior/FallLeft.png",
            SpriteKey::Orb => "orb.png",
            SpriteKey::Terminal => "terminal.png",
            SpriteKey::ContactTerminal => "contact_terminal.png",
            SpriteKey::Platform => "platform.png",
        }
    }
}

/// The player strip for a visual variant. Mirrored facings are separate art,
/// not a runtime flip.
pub fn player_sprite_key(action: Action, facing: Facing) -> SpriteKey {
    match (action, facing) {
        (Action::Idle, Facing::Right) => SpriteKey::Idle,
        (Action::Idle, Facing::Left) => SpriteKey::IdleLeft,
        (Action::Run, Facing::Right) => SpriteKey::Run,
        (Action::Run, Facing::Left) => SpriteKey::RunLeft,
        (Action::Jump, Facing::Right) => SpriteKey::Jump,
        (Action::Jump, Facing::Left) => SpriteKey::JumpLeft,
        (Action::Fall, Facing::Right) => SpriteKey::Fall,
        (Action::Fall, Facing::Left) => SpriteKey::FallLeft,
    }
}

pub struct GpuSprite {
    pub texture: Texture,
    pub bind_group: wgpu::BindGroup,
}

pub struct SpriteSet {
    slots: HashMap<SpriteKey, GpuSprite>,
}

impl SpriteSet {
    /// Attempt every key once. Failures are logged and leave the slot absent.
    pub fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipeline: &SpritePipeline,
        assets_dir: &Path,
    ) -> Self {
        let mut slots = HashMap::new();
        for &key in SpriteKey::ALL {
            let path = assets_dir.join(key.file_name());
            let bytes = match fs::read(&path) {
                Ok(bytes) => bytes,
                Err(err) => {
                    log::warn!(
                        "Sprite '{}' unavailable ({err}), using shape fallback",
                        path.display()
                    );
                    continue;
                }
            };
            match Texture::from_bytes(device, queue, &bytes, key.file_name()) {
                Ok(texture) => {
                    let bind_group = pipeline.create_texture_bind_group(device, &texture);
                    slots.insert(
                        key,
                        GpuSprite {
                            texture,
                            bind_group,
                        },
                    );
                }
                Err(err) => {
                    log::warn!("{err}, using shape fallback");
                }
            }
        }
        log::info!(
            "Sprites ready: {}/{}",
            slots.len(),
            SpriteKey::ALL.len()
        );
        Self { slots }
    }

    pub fn get(&self, key: SpriteKey) -> Option<&GpuSprite> {
        self.slots.get(&key)
    }

    pub fn is_ready(&self, key: SpriteKey) -> bool {
        self.slots.contains_key(&key)
    }

    pub fn ready_count(&self) -> usize {
        self.slots.len()
    }

    /// Rough GPU footprint of the loaded slots (RGBA8).
    pub fn texture_memory_bytes(&self) -> usize {
        self.slots
            .values()
            .map(|s| {
                let (w, h) = s.texture.size;
                w as usize * h as usize * 4
            })
            .sum()
    }
}

//! Orb Runner -- main loop and application entry point.
//!
//! Architecture: winit drives the event loop via `ApplicationHandler`. All
//! simulation runs inside `RedrawRequested` using a **fixed-timestep** model
//! (see `FrameClock`):
//!
//!   1. `begin_frame()` -- measure wall-clock delta, feed accumulator
//!   2. `while should_step()` -- sample input intent, run one physics step,
//!      translate the returned events into toasts and panel content
//!   3. Rebuild the quad mesh from world + trail state
//!   4. Upload camera uniform, issue merged draw calls, composite the egui
//!      overlay (HUD, toasts, panel, debug stats)
//!
//! The render phase only reads simulation state; every mutation happens in
//! the step. Asset and catalog loading degrade instead of failing: a missing
//! sprite renders as its entity's primitive shape, a missing catalog becomes
//! the single fallback project entry.

mod assets;
mod level;
mod physics;
mod player;
mod projects;
#[cfg(test)]
mod replay;
mod trail;
mod world;

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use orb_core::animation::clip_for;
use orb_core::input::{InputState, Key};
use orb_core::notify::NotificationQueue;
use orb_core::time::FrameClock;
use orb_devtools::{DebugStats, GameOverlay, HudStats, PanelContent, ToastLine};
use orb_platform::window::PlatformConfig;
use orb_render::{GpuContext, ScreenCamera, SpritePipeline, SpriteVertex, Texture};

use assets::{player_sprite_key, GpuSprite, SpriteKey, SpriteSet};
use level::{Platform, TerminalKind, PLATFORM_TOP_STRIP};
use physics::{FrameInput, GameEvent, PhysicsTuning};
use projects::ProjectCatalog;
use trail::{hue_to_rgb, CursorTrail};
use world::WorldState;

const ASSETS_DIR: &str = "assets";
const PROJECTS_PATH: &str = "assets/projects.json";
const CONTACT_EMAIL: &str = "hello@orbrunner.dev";
const CONTACT_GITHUB: &str = "orb-runner";

/// Sprites draw larger than the collision box, anchored to its bottom.
const PLAYER_DRAW_SCALE: f32 = 1.8;

const FULL_UV: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const BG_TOP: [f32; 4] = [0.024, 0.071, 0.188, 1.0];
const BG_BOTTOM: [f32; 4] = [0.008, 0.063, 0.145, 1.0];
const GRID_LINE: [f32; 4] = [0.0, 0.702, 1.0, 0.05];
const PLATFORM_BODY: [f32; 4] = [0.039, 0.239, 0.353, 1.0];
const PLATFORM_STRIP: [f32; 4] = [0.102, 0.353, 0.498, 1.0];
const ORB_GLOW: [f32; 4] = [1.0, 0.42, 0.42, 0.15];
const ORB_CORE: [f32; 4] = [1.0, 0.839, 0.659, 0.9];
const TERMINAL_PROJECT: [f32; 4] = [1.0, 0.792, 0.157, 1.0];
const TERMINAL_CONTACT: [f32; 4] = [0.937, 0.424, 0.0, 1.0];
const CHECKPOINT_ACTIVE: [f32; 4] = [1.0, 0.792, 0.157, 1.0];
const CHECKPOINT_IDLE: [f32; 4] = [0.667, 0.667, 0.667, 1.0];
const PLAYER_FALLBACK: [f32; 4] = [0.859, 0.937, 1.0, 1.0];

/// Texture binding for a quad: the shared 1x1 white (vertex color only) or a
/// loaded sprite slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TexKey {
    White,
    Sprite(SpriteKey),
}

/// A contiguous run of indices that share the same texture binding.
/// Consecutive quads with the same binding merge into one call, which keeps
/// the shape-fallback path (everything white) at a handful of draws.
#[derive(Debug, Clone)]
struct DrawCall {
    texture: TexKey,
    index_start: u32,
    index_count: u32,
}

struct QuadSpec {
    texture: TexKey,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    uv: [f32; 4],
    color: [f32; 4],
}

/// All mutable engine state. Constructed lazily in
/// `ApplicationHandler::resumed` once the window and GPU surface exist.
///
/// Ownership is split into three conceptual groups:
///  - **Core systems** (clock, input, camera, overlay) -- updated every frame
///  - **Game state** (world, tuning, notifications, panel, catalog, trail)
///  - **GPU resources** (pipeline, buffers, draw calls) -- rebuilt per frame
struct EngineState {
    window: Arc<Window>,
    gpu: GpuContext,
    clock: FrameClock,
    input: InputState,
    screen_camera: ScreenCamera,
    sprite_pipeline: SpritePipeline,
    overlay: GameOverlay,

    world: WorldState,
    tuning: PhysicsTuning,
    notifications: NotificationQueue,
    panel: Option<PanelContent>,
    catalog: ProjectCatalog,
    catalog_rx: Option<mpsc::Receiver<ProjectCatalog>>,
    sprites: SpriteSet,
    white: GpuSprite,
    trail: CursorTrail,

    // Per-frame GPU mesh state. The quad mesh is rebuilt on the CPU each
    // frame, then streamed into these buffers. Buffers grow (power-of-two)
    // but never shrink.
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    mesh_vertex_capacity: usize,
    mesh_index_capacity: usize,
    draw_calls: Vec<DrawCall>,
    quad_count: usize,
}

impl EngineState {
    fn new(window: Arc<Window>) -> Self {
        let gpu = GpuContext::new(window.clone());
        let clock = FrameClock::new();
        let input = InputState::new();
        let sprite_pipeline = SpritePipeline::new(&gpu.device, gpu.surface_format);
        let overlay = GameOverlay::new(&gpu.device, gpu.surface_format, &window);

        let world = WorldState::new(gpu.size.0 as f32, gpu.size.1 as f32);
        log::info!(
            "Level built: {} platforms, {} orbs, {} terminals",
            world.level.platforms.len(),
            world.level.orbs.len(),
            world.level.terminals.len()
        );

        let sprites = SpriteSet::load(&gpu.device, &gpu.queue, &sprite_pipeline, Path::new(ASSETS_DIR));
        let white_texture =
            Texture::from_rgba8(&gpu.device, &gpu.queue, &[255, 255, 255, 255], 1, 1, "white");
        let white_bind_group =
            sprite_pipeline.create_texture_bind_group(&gpu.device, &white_texture);
        let white = GpuSprite {
            texture: white_texture,
            bind_group: white_bind_group,
        };

        let screen_camera = ScreenCamera::new(gpu.size.0, gpu.size.1);
        let camera_uniform = screen_camera.build_uniform();
        let camera_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Uniform Buffer"),
            size: std::mem::size_of_val(&camera_uniform) as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        gpu.queue
            .write_buffer(&camera_buffer, 0, bytemuck::cast_slice(&[camera_uniform]));
        let camera_bind_group =
            sprite_pipeline.create_camera_bind_group(&gpu.device, &camera_buffer);
        let vertex_buffer = create_vertex_buffer(&gpu.device, 1);
        let index_buffer = create_index_buffer(&gpu.device, 1);

        // The catalog starts as the fallback and is replaced when the
        // background fetch publishes.
        let catalog = ProjectCatalog::fallback();
        let catalog_rx = Some(projects::spawn_fetch(PathBuf::from(PROJECTS_PATH)));

        Self {
            window,
            gpu,
            clock,
            input,
            screen_camera,
            sprite_pipeline,
            overlay,
            world,
            tuning: PhysicsTuning::default(),
            notifications: NotificationQueue::new(),
            panel: None,
            catalog,
            catalog_rx,
            sprites,
            white,
            trail: CursorTrail::new(),
            vertex_buffer,
            index_buffer,
            camera_buffer,
            camera_bind_group,
            mesh_vertex_capacity: 0,
            mesh_index_capacity: 0,
            draw_calls: Vec::new(),
            quad_count: 0,
        }
    }

    fn sample_intent(&self) -> FrameInput {
        let mut move_x = 0.0f32;
        if self.input.is_held(Key::A) || self.input.is_held(Key::Left) {
            move_x -= 1.0;
        }
        if self.input.is_held(Key::D) || self.input.is_held(Key::Right) {
            move_x += 1.0;
        }
        let jump_pressed = self.input.is_just_pressed(Key::Space)
            || self.input.is_just_pressed(Key::W)
            || self.input.is_just_pressed(Key::Up);
        let interact_pressed = self.input.is_just_pressed(Key::E);
        FrameInput {
            move_x,
            jump_pressed,
            interact_pressed,
        }
    }

    fn apply_events(&mut self, events: Vec<GameEvent>) {
        let now = self.clock.total_time;
        for event in events {
            match event {
                GameEvent::SkillUnlocked { skill } => {
                    log::info!("Skill unlocked: {skill}");
                    self.notifications.push(format!("Skill unlocked: {skill}"), now);
                }
                GameEvent::CheckpointReached => {
                    log::info!("Checkpoint reached");
                    self.notifications.push("Checkpoint reached", now);
                }
                GameEvent::ProjectOpened { repo_index } => {
                    let record = self.catalog.project_for(repo_index);
                    self.panel = Some(PanelContent::Project {
                        name: record.name.clone(),
                        description: record.description.clone(),
                        url: record.url.clone(),
                    });
                }
                GameEvent::ContactOpened => {
                    self.panel = Some(PanelContent::Contact {
                        email: CONTACT_EMAIL.to_string(),
                        github: CONTACT_GITHUB.to_string(),
                    });
                }
            }
        }
    }

    fn poll_catalog(&mut self) {
        if let Some(rx) = self.catalog_rx.take() {
            match rx.try_recv() {
                Ok(catalog) => {
                    log::info!("Project catalog resolved ({} entries)", catalog.len());
                    self.catalog = catalog;
                }
                Err(mpsc::TryRecvError::Empty) => {
                    self.catalog_rx = Some(rx);
                }
                Err(mpsc::TryRecvError::Disconnected) => {
                    log::warn!("Project catalog fetch never published, keeping fallback");
                }
            }
        }
    }

    fn rebuild_mesh(&mut self) {
        let (vertices, indices, draw_calls) = self.build_mesh();
        self.ensure_mesh_capacity(vertices.len(), indices.len());
        self.quad_count = vertices.len() / 4;
        self.draw_calls = draw_calls;

        if !vertices.is_empty() {
            self.gpu
                .queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices));
        }
        if !indices.is_empty() {
            self.gpu
                .queue
                .write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(&indices));
        }
    }

    fn build_mesh(&self) -> (Vec<SpriteVertex>, Vec<u32>, Vec<DrawCall>) {
        let w = self.gpu.size.0 as f32;
        let h = self.gpu.size.1 as f32;
        let scroll = self.world.camera.scroll_x;

        let estimate = self.world.level.platforms.len()
            + self.world.level.orbs.len() * 2
            + self.world.level.terminals.len()
            + self.trail.particles().len()
            + 64;
        let mut vertices = Vec::with_capacity(estimate * 4);
        let mut indices = Vec::with_capacity(estimate * 6);
        let mut draw_calls = Vec::with_capacity(16);

        // Background: one quad with a vertical gradient via vertex colors.
        push_gradient_quad(&mut vertices, &mut indices, &mut draw_calls, w, h);

        // Parallax grid: vertical lines over the lower third, scrolling at a
        // fraction of the camera speed.
        let offset = -(scroll * 0.22).rem_euclid(40.0);
        let mut x = offset;
        while x < w + 40.0 {
            add_quad(
                &mut vertices,
                &mut indices,
                &mut draw_calls,
                QuadSpec {
                    texture: TexKey::White,
                    x,
                    y: h * 0.65,
                    w: 1.0,
                    h: h * 0.35,
                    uv: FULL_UV,
                    color: GRID_LINE,
                },
            );
            x += 40.0;
        }

        for p in &self.world.level.platforms {
            self.push_platform(&mut vertices, &mut indices, &mut draw_calls, p, scroll);
        }

        for c in &self.world.level.checkpoints {
            let color = if c.activated {
                CHECKPOINT_ACTIVE
            } else {
                CHECKPOINT_IDLE
            };
            let cx = c.x - scroll;
            // Pole and pennant.
            add_quad(
                &mut vertices,
                &mut indices,
                &mut draw_calls,
                QuadSpec {
                    texture: TexKey::White,
                    x: cx,
                    y: c.y,
                    w: 2.0,
                    h: c.h,
                    uv: FULL_UV,
                    color,
                },
            );
            add_quad(
                &mut vertices,
                &mut indices,
                &mut draw_calls,
                QuadSpec {
                    texture: TexKey::White,
                    x: cx + 2.0,
                    y: c.y + 2.0,
                    w: c.w - 2.0,
                    h: c.h / 4.0,
                    uv: FULL_UV,
                    color,
                },
            );
        }

        for o in &self.world.level.orbs {
            if o.collected {
                continue;
            }
            let ox = o.x - scroll;
            if self.sprites.is_ready(SpriteKey::Orb) {
                add_quad(
                    &mut vertices,
                    &mut indices,
                    &mut draw_calls,
                    QuadSpec {
                        texture: TexKey::Sprite(SpriteKey::Orb),
                        x: ox - 12.0,
                        y: o.y - 12.0,
                        w: 24.0,
                        h: 24.0,
                        uv: FULL_UV,
                        color: WHITE,
                    },
                );
            } else {
                let glow = o.radius * 2.5;
                add_quad(
                    &mut vertices,
                    &mut indices,
                    &mut draw_calls,
                    QuadSpec {
                        texture: TexKey::White,
                        x: ox - glow,
                        y: o.y - glow,
                        w: glow * 2.0,
                        h: glow * 2.0,
                        uv: FULL_UV,
                        color: ORB_GLOW,
                    },
                );
                add_quad(
                    &mut vertices,
                    &mut indices,
                    &mut draw_calls,
                    QuadSpec {
                        texture: TexKey::White,
                        x: ox - o.radius,
                        y: o.y - o.radius,
                        w: o.radius * 2.0,
                        h: o.radius * 2.0,
                        uv: FULL_UV,
                        color: ORB_CORE,
                    },
                );
            }
        }

        for t in &self.world.level.terminals {
            let tx = t.x - scroll;
            let (key, fallback_color) = match t.kind {
                TerminalKind::Project { .. } => (SpriteKey::Terminal, TERMINAL_PROJECT),
                TerminalKind::Contact => (SpriteKey::ContactTerminal, TERMINAL_CONTACT),
            };
            let (texture, color) = if self.sprites.is_ready(key) {
                (TexKey::Sprite(key), WHITE)
            } else {
                (TexKey::White, fallback_color)
            };
            add_quad(
                &mut vertices,
                &mut indices,
                &mut draw_calls,
                QuadSpec {
                    texture,
                    x: tx,
                    y: t.y,
                    w: t.w,
                    h: t.h,
                    uv: FULL_UV,
                    color,
                },
            );
        }

        self.push_player(&mut vertices, &mut indices, &mut draw_calls, scroll);

        // Cursor trail lives in raw screen space, no scroll applied.
        for p in self.trail.particles() {
            let [r, g, b] = hue_to_rgb(p.hue);
            add_quad(
                &mut vertices,
                &mut indices,
                &mut draw_calls,
                QuadSpec {
                    texture: TexKey::White,
                    x: p.x - p.size,
                    y: p.y - p.size,
                    w: p.size * 2.0,
                    h: p.size * 2.0,
                    uv: FULL_UV,
                    color: [r, g, b, p.life.max(0.0) * 0.6],
                },
            );
        }

        (vertices, indices, draw_calls)
    }

    fn push_platform(
        &self,
        vertices: &mut Vec<SpriteVertex>,
        indices: &mut Vec<u32>,
        draw_calls: &mut Vec<DrawCall>,
        p: &Platform,
        scroll: f32,
    ) {
        let px = p.x - scroll;
        if self.sprites.is_ready(SpriteKey::Platform) {
            add_quad(
                vertices,
                indices,
                draw_calls,
                QuadSpec {
                    texture: TexKey::Sprite(SpriteKey::Platform),
                    x: px,
                    y: p.y,
                    w: p.w,
                    h: p.h,
                    uv: FULL_UV,
                    color: WHITE,
                },
            );
            return;
        }
        add_quad(
            vertices,
            indices,
            draw_calls,
            QuadSpec {
                texture: TexKey::White,
                x: px,
                y: p.y + PLATFORM_TOP_STRIP,
                w: p.w,
                h: p.h - PLATFORM_TOP_STRIP,
                uv: FULL_UV,
                color: PLATFORM_BODY,
            },
        );
        add_quad(
            vertices,
            indices,
            draw_calls,
            QuadSpec {
                texture: TexKey::White,
                x: px,
                y: p.y,
                w: p.w,
                h: PLATFORM_TOP_STRIP,
                uv: FULL_UV,
                color: PLATFORM_STRIP,
            },
        );
    }

    fn push_player(
        &self,
        vertices: &mut Vec<SpriteVertex>,
        indices: &mut Vec<u32>,
        draw_calls: &mut Vec<DrawCall>,
        scroll: f32,
    ) {
        let player = &self.world.player;
        let px = player.position.x - scroll;
        let py = player.position.y;
        let key = player_sprite_key(player.anim.action, player.anim.facing);

        if self.sprites.is_ready(key) {
            let clip = clip_for(player.anim.action);
            let frame = player.anim.frame_index.min(clip.frame_count - 1);
            let u0 = frame as f32 / clip.frame_count as f32;
            let u1 = (frame + 1) as f32 / clip.frame_count as f32;
            let dw = player.width * PLAYER_DRAW_SCALE;
            let dh = player.height * PLAYER_DRAW_SCALE;
            add_quad(
                vertices,
                indices,
                draw_calls,
                QuadSpec {
                    texture: TexKey::Sprite(key),
                    x: px - (dw - player.width) / 2.0,
                    y: py - (dh - player.height),
                    w: dw,
                    h: dh,
                    uv: [u0, 0.0, u1, 1.0],
                    color: WHITE,
                },
            );
        } else {
            add_quad(
                vertices,
                indices,
                draw_calls,
                QuadSpec {
                    texture: TexKey::White,
                    x: px,
                    y: py,
                    w: player.width,
                    h: player.height,
                    uv: FULL_UV,
                    color: PLAYER_FALLBACK,
                },
            );
        }
    }

    fn ensure_mesh_capacity(&mut self, vertex_count: usize, index_count: usize) {
        let needed_vertices = vertex_count.max(1);
        if needed_vertices > self.mesh_vertex_capacity {
            self.mesh_vertex_capacity = needed_vertices.next_power_of_two();
            self.vertex_buffer = create_vertex_buffer(&self.gpu.device, self.mesh_vertex_capacity);
        }

        let needed_indices = index_count.max(1);
        if needed_indices > self.mesh_index_capacity {
            self.mesh_index_capacity = needed_indices.next_power_of_two();
            self.index_buffer = create_index_buffer(&self.gpu.device, self.mesh_index_capacity);
        }
    }
}

struct App {
    config: PlatformConfig,
    state: Option<EngineState>,
}

impl App {
    fn new() -> Self {
        Self {
            config: PlatformConfig::default(),
            state: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let window = orb_platform::window::create_window(event_loop, &self.config);
        log::info!(
            "Window created: {}x{}",
            self.config.width,
            self.config.height
        );
        self.state = Some(EngineState::new(window));
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        let egui_consumed = state.overlay.handle_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    state.gpu.resize(w, h);
                    state.screen_camera.viewport = (w, h);
                    state.world.camera.viewport_width = w as f32;
                    state.world.viewport = glam::Vec2::new(w as f32, h as f32);
                    log::info!("Resized to {}x{}", w, h);
                }
            }

            WindowEvent::KeyboardInput { event, .. } if !egui_consumed => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    // One-shot app-level keys resolve at event time so a
                    // single press never spans multiple fixed steps.
                    if event.state == ElementState::Pressed && !event.repeat {
                        match key_code {
                            KeyCode::Escape => {
                                if state.panel.is_some() {
                                    state.panel = None;
                                } else {
                                    log::info!("Escape pressed, exiting.");
                                    event_loop.exit();
                                    return;
                                }
                            }
                            KeyCode::F3 => state.overlay.toggle_debug(),
                            _ => {}
                        }
                    }
                    if let Some(engine_key) = map_key(key_code) {
                        match event.state {
                            ElementState::Pressed => state.input.key_down(engine_key),
                            ElementState::Released => state.input.key_up(engine_key),
                        }
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                state.input.mouse_position = (position.x, position.y);
                state.trail.spawn(position.x as f32, position.y as f32);
            }

            WindowEvent::MouseInput {
                state: button_state,
                ..
            } if !egui_consumed => match button_state {
                ElementState::Pressed => {
                    state.input.mouse_button_down();
                    let (mx, my) = state.input.mouse_position;
                    state.trail.burst(mx as f32, my as f32);
                }
                ElementState::Released => state.input.mouse_button_up(),
            },

            WindowEvent::RedrawRequested => {
                if state.gpu.size.0 == 0 || state.gpu.size.1 == 0 {
                    return;
                }

                // Fixed-step simulation phase.
                state.clock.begin_frame();
                while state.clock.should_step() {
                    let intent = state.sample_intent();
                    let events = physics::step(&mut state.world, intent, &state.tuning);
                    state.apply_events(events);
                }
                state.notifications.prune(state.clock.total_time);
                state.poll_catalog();
                state.trail.update();

                state.rebuild_mesh();

                // Render phase reads finalized simulation state.
                let camera_uniform = state.screen_camera.build_uniform();
                state.gpu.queue.write_buffer(
                    &state.camera_buffer,
                    0,
                    bytemuck::cast_slice(&[camera_uniform]),
                );

                let Some((output, view)) = state.gpu.begin_frame() else {
                    return;
                };

                let now = state.clock.total_time;
                let hud = HudStats {
                    orbs_collected: state.world.orbs_collected(),
                    orbs_total: state.world.level.orbs.len(),
                    jump_count: state.world.player.jump_count,
                };
                let toasts: Vec<ToastLine> = state
                    .notifications
                    .iter()
                    .map(|n| ToastLine {
                        message: n.message.clone(),
                        age: n.age(now),
                    })
                    .collect();
                let texture_bytes = state.sprites.texture_memory_bytes()
                    + {
                        let (w, h) = state.white.texture.size;
                        w as usize * h as usize * 4
                    };
                let debug = DebugStats {
                    draw_calls: state.draw_calls.len() as u32,
                    sprite_count: state.quad_count as u32,
                    particle_count: state.trail.particles().len() as u32,
                    texture_memory_mb: texture_bytes as f32 / (1024.0 * 1024.0),
                    project_names: state
                        .catalog
                        .records()
                        .iter()
                        .map(|r| r.name.clone())
                        .collect(),
                    sprites_ready: state.sprites.ready_count(),
                    sprites_total: SpriteKey::ALL.len(),
                    scroll_x: state.world.camera.scroll_x,
                };
                let (egui_primitives, egui_textures_delta, overlay_actions) =
                    state.overlay.prepare(
                        &state.window,
                        &state.clock,
                        &hud,
                        &toasts,
                        state.panel.as_ref(),
                        Some(debug),
                    );
                if overlay_actions.close_panel {
                    state.panel = None;
                }

                let screen_descriptor = egui_wgpu::ScreenDescriptor {
                    size_in_pixels: [state.gpu.size.0, state.gpu.size.1],
                    pixels_per_point: state.window.scale_factor() as f32,
                };

                let mut encoder =
                    state
                        .gpu
                        .device
                        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                            label: Some("Render Encoder"),
                        });

                {
                    let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("Scene Render Pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: &view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                                store: wgpu::StoreOp::Store,
                            },
                        })],
                        depth_stencil_attachment: None,
                        ..Default::default()
                    });

                    render_pass.set_pipeline(&state.sprite_pipeline.render_pipeline);
                    render_pass.set_bind_group(0, &state.camera_bind_group, &[]);
                    render_pass.set_vertex_buffer(0, state.vertex_buffer.slice(..));
                    render_pass
                        .set_index_buffer(state.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

                    let mut last_bound: Option<TexKey> = None;
                    for draw in &state.draw_calls {
                        let bind_group = match draw.texture {
                            TexKey::White => Some(&state.white.bind_group),
                            TexKey::Sprite(key) => state.sprites.get(key).map(|s| &s.bind_group),
                        };
                        let Some(bind_group) = bind_group else {
                            continue;
                        };
                        if last_bound != Some(draw.texture) {
                            render_pass.set_bind_group(1, bind_group, &[]);
                            last_bound = Some(draw.texture);
                        }
                        render_pass.draw_indexed(
                            draw.index_start..(draw.index_start + draw.index_count),
                            0,
                            0..1,
                        );
                    }
                }

                state.overlay.upload(
                    &state.gpu.device,
                    &state.gpu.queue,
                    &mut encoder,
                    &egui_primitives,
                    &egui_textures_delta,
                    &screen_descriptor,
                );

                {
                    let mut egui_pass = encoder
                        .begin_render_pass(&wgpu::RenderPassDescriptor {
                            label: Some("Overlay Render Pass"),
                            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                                view: &view,
                                resolve_target: None,
                                ops: wgpu::Operations {
                                    load: wgpu::LoadOp::Load,
                                    store: wgpu::StoreOp::Store,
                                },
                            })],
                            depth_stencil_attachment: None,
                            ..Default::default()
                        })
                        .forget_lifetime();

                    state
                        .overlay
                        .paint(&mut egui_pass, &egui_primitives, &screen_descriptor);
                }

                state.overlay.cleanup(&egui_textures_delta);

                state.gpu.queue.submit(std::iter::once(encoder.finish()));
                output.present();

                // Only clear edge-triggered input (just_pressed / just_released)
                // after at least one fixed step consumed it. Otherwise a press
                // that lands on a frame with 0 simulation steps is silently lost.
                if state.clock.steps_this_frame > 0 {
                    state.input.end_frame();
                }
            }

            _ => {}
        }
    }
}

fn create_vertex_buffer(device: &wgpu::Device, vertex_capacity: usize) -> wgpu::Buffer {
    let byte_len = (vertex_capacity * std::mem::size_of::<SpriteVertex>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Scene Vertex Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_index_buffer(device: &wgpu::Device, index_capacity: usize) -> wgpu::Buffer {
    let byte_len = (index_capacity * std::mem::size_of::<u32>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Scene Index Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Background gradient as one quad: top vertices dark blue, bottom darker.
fn push_gradient_quad(
    vertices: &mut Vec<SpriteVertex>,
    indices: &mut Vec<u32>,
    draw_calls: &mut Vec<DrawCall>,
    w: f32,
    h: f32,
) {
    let base_index = vertices.len() as u32;
    vertices.push(SpriteVertex {
        position: [0.0, 0.0],
        tex_coords: [0.0, 0.0],
        color: BG_TOP,
    });
    vertices.push(SpriteVertex {
        position: [w, 0.0],
        tex_coords: [1.0, 0.0],
        color: BG_TOP,
    });
    vertices.push(SpriteVertex {
        position: [w, h],
        tex_coords: [1.0, 1.0],
        color: BG_BOTTOM,
    });
    vertices.push(SpriteVertex {
        position: [0.0, h],
        tex_coords: [0.0, 1.0],
        color: BG_BOTTOM,
    });

    let draw_start = indices.len() as u32;
    indices.extend_from_slice(&[
        base_index,
        base_index + 1,
        base_index + 2,
        base_index,
        base_index + 2,
        base_index + 3,
    ]);
    push_draw_call(draw_calls, TexKey::White, draw_start, 6);
}

fn add_quad(
    vertices: &mut Vec<SpriteVertex>,
    indices: &mut Vec<u32>,
    draw_calls: &mut Vec<DrawCall>,
    spec: QuadSpec,
) {
    let [u0, v0, u1, v1] = spec.uv;
    let base_index = vertices.len() as u32;

    vertices.push(SpriteVertex {
        position: [spec.x, spec.y],
        tex_coords: [u0, v0],
        color: spec.color,
    });
    vertices.push(SpriteVertex {
        position: [spec.x + spec.w, spec.y],
        tex_coords: [u1, v0],
        color: spec.color,
    });
    vertices.push(SpriteVertex {
        position: [spec.x + spec.w, spec.y + spec.h],
        tex_coords: [u1, v1],
        color: spec.color,
    });
    vertices.push(SpriteVertex {
        position: [spec.x, spec.y + spec.h],
        tex_coords: [u0, v1],
        color: spec.color,
    });

    let draw_start = indices.len() as u32;
    indices.extend_from_slice(&[
        base_index,
        base_index + 1,
        base_index + 2,
        base_index,
        base_index + 2,
        base_index + 3,
    ]);

    push_draw_call(draw_calls, spec.texture, draw_start, 6);
}

/// Append a draw call, merging with the previous one when the texture matches
/// and indices are contiguous.
fn push_draw_call(
    draw_calls: &mut Vec<DrawCall>,
    texture: TexKey,
    index_start: u32,
    index_count: u32,
) {
    if let Some(last) = draw_calls.last_mut() {
        let contiguous = last.index_start + last.index_count == index_start;
        if last.texture == texture && contiguous {
            last.index_count += index_count;
            return;
        }
    }
    draw_calls.push(DrawCall {
        texture,
        index_start,
        index_count,
    });
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::ArrowDown => Some(Key::Down),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::Space => Some(Key::Space),
        KeyCode::F3 => Some(Key::F3),
        KeyCode::KeyW => Some(Key::W),
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyS => Some(Key::S),
        KeyCode::KeyD => Some(Key::D),
        KeyCode::KeyE => Some(Key::E),
        _ => None,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Orb Runner starting...");

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    event_loop.run_app(&mut app).expect("Event loop error");
}

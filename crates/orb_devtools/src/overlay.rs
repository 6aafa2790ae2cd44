//! Text UI composited over the game scene via egui.
//!
//! Four surfaces share one egui context: the always-on HUD (orb and jump
//! counters), the toast stack (transient notifications, faded by age), the
//! info panel (project/contact content opened by terminals), and an
//! F3-toggled debug stats window.
//!
//! Integration pattern: egui requires a three-phase render split because
//! `egui_wgpu::Renderer::render()` needs a `RenderPass<'static>`, while
//! `begin_render_pass` borrows the encoder. The phases are:
//!
//!   1. `prepare()` -- run egui UI logic, produce tessellated primitives
//!   2. `upload()`  -- upload textures and update GPU buffers (borrows encoder mutably)
//!   3. `paint()`   -- render into a new render pass with `forget_lifetime()`
//!   4. `cleanup()` -- free textures egui no longer references

use orb_core::notify::NOTIFICATION_TTL;
use orb_core::time::FrameClock;
use winit::window::Window;

#[derive(Debug, Clone, Default)]
pub struct HudStats {
    pub orbs_collected: usize,
    pub orbs_total: usize,
    pub jump_count: u8,
}

/// One toast line, already aged by the caller.
#[derive(Debug, Clone)]
pub struct ToastLine {
    pub message: String,
    pub age: f64,
}

/// Content of the info panel a terminal opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelContent {
    Project {
        name: String,
        description: String,
        url: String,
    },
    Contact {
        email: String,
        github: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct DebugStats {
    pub draw_calls: u32,
    pub sprite_count: u32,
    pub particle_count: u32,
    /// Estimated texture memory in megabytes.
    pub texture_memory_mb: f32,
    pub project_names: Vec<String>,
    pub sprites_ready: usize,
    pub sprites_total: usize,
    pub scroll_x: f32,
}

#[derive(Debug, Clone, Default)]
pub struct OverlayActions {
    /// User clicked the panel's close button.
    pub close_panel: bool,
}

pub struct GameOverlay {
    pub egui_ctx: egui::Context,
    pub egui_winit_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
    pub debug_visible: bool,
}

impl GameOverlay {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        window: &Window,
    ) -> Self {
        let egui_ctx = egui::Context::default();
        let egui_winit_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);

        Self {
            egui_ctx,
            egui_winit_state,
            egui_renderer,
            debug_visible: false,
        }
    }

    pub fn handle_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        let response = self.egui_winit_state.on_window_event(window, event);
        response.consumed
    }

    pub fn toggle_debug(&mut self) {
        self.debug_visible = !self.debug_visible;
        log::info!(
            "Debug overlay: {}",
            if self.debug_visible { "ON" } else { "OFF" }
        );
    }

    pub fn prepare(
        &mut self,
        window: &Window,
        clock: &FrameClock,
        hud: &HudStats,
        toasts: &[ToastLine],
        panel: Option<&PanelContent>,
        debug: Option<DebugStats>,
    ) -> (
        Vec<egui::ClippedPrimitive>,
        egui::TexturesDelta,
        OverlayActions,
    ) {
        let mut actions = OverlayActions::default();
        let raw_input = self.egui_winit_state.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            draw_hud(ctx, hud);
            draw_toasts(ctx, toasts);
            if let Some(content) = panel {
                draw_panel(ctx, content, &mut actions);
            }
            if self.debug_visible {
                if let Some(ref stats) = debug {
                    draw_debug(ctx, clock, stats);
                }
            }
        });

        self.egui_winit_state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        (primitives, full_output.textures_delta, actions)
    }

    /// Upload textures and update buffers. Call before creating the egui render pass.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor);
    }

    /// Render into an existing render pass. Call after `upload()`.
    pub fn paint(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    /// Free textures that egui no longer needs. Call after rendering.
    pub fn cleanup(&mut self, textures_delta: &egui::TexturesDelta) {
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

fn draw_hud(ctx: &egui::Context, hud: &HudStats) {
    egui::Area::new(egui::Id::new("hud"))
        .anchor(egui::Align2::LEFT_TOP, [12.0, 12.0])
        .show(ctx, |ui| {
            egui::Frame::NONE
                .fill(egui::Color32::from_black_alpha(64))
                .inner_margin(egui::Margin::same(8))
                .show(ui, |ui| {
                    ui.monospace(format!(
                        "Skill Orbs: {} / {}",
                        hud.orbs_collected, hud.orbs_total
                    ));
                    ui.monospace(format!("Double jumps used: {} / 2", hud.jump_count));
                });
        });
}

fn draw_toasts(ctx: &egui::Context, toasts: &[ToastLine]) {
    if toasts.is_empty() {
        return;
    }
    egui::Area::new(egui::Id::new("toasts"))
        .anchor(egui::Align2::LEFT_TOP, [12.0, 76.0])
        .show(ctx, |ui| {
            // Newest sits closest to the HUD.
            for toast in toasts.iter().rev() {
                let fade = 1.0 - (toast.age / NOTIFICATION_TTL).clamp(0.0, 1.0);
                let alpha = (fade * 255.0) as u8;
                ui.label(
                    egui::RichText::new(&toast.message)
                        .color(egui::Color32::from_rgba_unmultiplied(255, 240, 214, alpha))
                        .monospace(),
                );
            }
        });
}

fn draw_panel(ctx: &egui::Context, content: &PanelContent, actions: &mut OverlayActions) {
    let title = match content {
        PanelContent::Project { .. } => "Project",
        PanelContent::Contact { .. } => "Contact",
    };
    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            match content {
                PanelContent::Project {
                    name,
                    description,
                    url,
                } => {
                    ui.heading(name);
                    if !description.is_empty() {
                        ui.label(description);
                    }
                    ui.hyperlink_to("View on GitHub", url);
                }
                PanelContent::Contact { email, github } => {
                    ui.label(format!("Email: {email}"));
                    ui.hyperlink_to(
                        format!("GitHub: {github}"),
                        format!("https://github.com/{github}"),
                    );
                }
            }
            ui.separator();
            if ui.button("Close").clicked() {
                actions.close_panel = true;
            }
        });
}

fn draw_debug(ctx: &egui::Context, clock: &FrameClock, stats: &DebugStats) {
    egui::Window::new("Debug")
        .default_pos([10.0, 120.0])
        .show(ctx, |ui| {
            ui.label(format!("FPS: {:.1}", clock.smoothed_fps));
            ui.label(format!("Steps this frame: {}", clock.steps_this_frame));
            ui.label(format!("Total steps: {}", clock.fixed_step_count));
            ui.label(format!("Frame: {}", clock.frame_count));
            ui.separator();
            ui.label(format!("Draw calls: {}", stats.draw_calls));
            ui.label(format!("Quads: {}", stats.sprite_count));
            ui.label(format!("Trail particles: {}", stats.particle_count));
            ui.label(format!("Texture memory: {:.1} MB", stats.texture_memory_mb));
            ui.label(format!("Scroll x: {:.1}", stats.scroll_x));
            ui.separator();
            ui.label(format!(
                "Sprites ready: {}/{}",
                stats.sprites_ready, stats.sprites_total
            ));
            ui.collapsing(
                format!("Catalog ({} entries)", stats.project_names.len()),
                |ui| {
                    for name in &stats.project_names {
                        ui.label(name);
                    }
                },
            );
        });
}

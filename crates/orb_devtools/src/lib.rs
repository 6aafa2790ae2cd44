pub mod overlay;

pub use overlay::{
    DebugStats, GameOverlay, HudStats, OverlayActions, PanelContent, ToastLine,
};

use glam::Mat4;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

/// Screen-space camera: world quads are authored in canvas-style pixel
/// coordinates (origin top-left, y grows downward) with horizontal scroll
/// already subtracted, so the projection only maps pixels to clip space.
pub struct ScreenCamera {
    pub viewport: (u32, u32),
}

impl ScreenCamera {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            viewport: (viewport_width, viewport_height),
        }
    }

    pub fn build_uniform(&self) -> CameraUniform {
        let w = self.viewport.0 as f32;
        let h = self.viewport.1 as f32;

        // bottom = h, top = 0 flips the y axis into y-down pixel space.
        let proj = Mat4::orthographic_rh(0.0, w, h, 0.0, -1.0, 1.0);

        CameraUniform {
            view_proj: proj.to_cols_array_2d(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec4};

    #[test]
    fn origin_maps_to_top_left_of_clip_space() {
        let camera = ScreenCamera::new(800, 600);
        let proj = Mat4::from_cols_array_2d(&camera.build_uniform().view_proj);
        let top_left = proj * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!((top_left.x - -1.0).abs() < 1e-6);
        assert!((top_left.y - 1.0).abs() < 1e-6);
        let bottom_right = proj * Vec4::new(800.0, 600.0, 0.0, 1.0);
        assert!((bottom_right.x - 1.0).abs() < 1e-6);
        assert!((bottom_right.y - -1.0).abs() < 1e-6);
    }
}

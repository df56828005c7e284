mod transform;

use serde::{Deserialize, Serialize};

use crate::geom::Vec2;

pub use transform::{
    clamp_to_grid, grid_to_screen, grid_to_world, screen_to_world, world_to_grid,
    world_to_screen, CellRect, CoordinateTransformer,
};

pub const CAMERA_SCALE_DEFAULT: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomLimits {
    pub min_scale: f32,
    pub max_scale: f32,
    pub step: f32,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min_scale: 0.5,
            max_scale: 4.0,
            step: 0.1,
        }
    }
}

impl ZoomLimits {
    pub fn clamp(&self, scale: f32) -> f32 {
        if !scale.is_finite() {
            return CAMERA_SCALE_DEFAULT.clamp(self.min_scale, self.max_scale);
        }
        scale.clamp(self.min_scale, self.max_scale)
    }
}

/// Camera translation (screen pixels) and zoom.
///
/// `screen = world * scale + offset`. The scale must stay positive; the
/// transform functions do not guard against zero or negative values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTransform {
    pub offset: Vec2,
    pub scale: f32,
}

impl Default for CameraTransform {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: CAMERA_SCALE_DEFAULT,
        }
    }
}

impl CameraTransform {
    pub fn new(offset: Vec2, scale: f32) -> Self {
        Self { offset, scale }
    }

    /// Centres the viewport on `center_world` at the current scale.
    pub fn follow(&mut self, center_world: Vec2, viewport: Viewport) {
        self.offset = Vec2 {
            x: viewport.width as f32 * 0.5 - center_world.x * self.scale,
            y: viewport.height as f32 * 0.5 - center_world.y * self.scale,
        };
    }

    pub fn apply_zoom_steps(&mut self, steps: i32, limits: &ZoomLimits) {
        if steps == 0 {
            return;
        }
        self.scale = limits.clamp(self.scale + steps as f32 * limits.step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follow_puts_target_at_viewport_center() {
        let mut camera = CameraTransform::new(Vec2::ZERO, 2.0);
        let viewport = Viewport {
            width: 800,
            height: 600,
        };
        let center = Vec2::new(320.0, 96.0);
        camera.follow(center, viewport);
        let screen = world_to_screen(center, camera);
        assert!((screen.x - 400.0).abs() < 1e-4);
        assert!((screen.y - 300.0).abs() < 1e-4);
    }

    #[test]
    fn zoom_steps_clamp_at_bounds() {
        let limits = ZoomLimits::default();
        let mut camera = CameraTransform::default();
        camera.apply_zoom_steps(100, &limits);
        assert_eq!(camera.scale, limits.max_scale);
        camera.apply_zoom_steps(-100, &limits);
        assert_eq!(camera.scale, limits.min_scale);
    }

    #[test]
    fn non_finite_scale_resets_to_default() {
        let limits = ZoomLimits::default();
        assert_eq!(limits.clamp(f32::NAN), CAMERA_SCALE_DEFAULT);
        assert_eq!(limits.clamp(f32::INFINITY), CAMERA_SCALE_DEFAULT);
    }
}

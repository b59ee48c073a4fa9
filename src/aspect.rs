use glam::{UVec2, Vec3};

/// Visible area of the host camera in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub aspect: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        let aspect = if height > 0.0 { width / height } else { 1.0 };
        Self { width, height, aspect }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

/// Display scale for a frame of `source_size` that keeps its aspect ratio.
///
/// The viewport dimension that constrains the frame decides the fit; `factor`
/// then shrinks or grows the result. Depth is always 1.
pub fn compute_scale(source_size: UVec2, viewport: &Viewport, factor: f32) -> Vec3 {
    if source_size.x == 0 || source_size.y == 0 {
        return Vec3::ONE;
    }
    let width = source_size.x as f32;
    let height = source_size.y as f32;
    let fit = if viewport.aspect > width / height { viewport.width / width } else { viewport.height / height };
    Vec3::new(width * fit * factor, height * fit * factor, 1.0)
}

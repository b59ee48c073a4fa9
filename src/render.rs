use crate::uv::TextureWindow;
use glam::Vec3;

/// Material flags the host should apply to the sprite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialHints {
    pub alpha_test: f32,
    pub premultiplied_alpha: bool,
    pub transparent: bool,
}

impl Default for MaterialHints {
    fn default() -> Self {
        Self { alpha_test: 0.0, premultiplied_alpha: false, transparent: true }
    }
}

/// What the host copies onto its sprite after a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderParams {
    /// `None` until the first frame has been addressed.
    pub window: Option<TextureWindow>,
    pub scale: Vec3,
    pub material: MaterialHints,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self { window: None, scale: Vec3::ONE, material: MaterialHints::default() }
    }
}

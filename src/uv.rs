use crate::atlas::{Frame, Rect};
use glam::{UVec2, Vec2};

/// Border the classic exporters leave around the sheet, in pixels.
pub const DEFAULT_ATLAS_BORDER_PX: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    #[default]
    Repeat,
}

/// Offset/repeat pair selecting one frame of the atlas texture.
///
/// Texture space has its origin at the bottom-left, so `offset.y` addresses
/// the bottom edge of the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureWindow {
    pub offset: Vec2,
    pub repeat: Vec2,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
}

impl TextureWindow {
    /// Maps the window back to atlas pixels (top-left origin) as `(min, max)`.
    pub fn pixel_bounds(&self, image_size: UVec2) -> (Vec2, Vec2) {
        let size = image_size.as_vec2();
        let min_x = self.offset.x * size.x;
        let max_x = (self.offset.x + self.repeat.x) * size.x;
        let min_y = (1.0 - self.offset.y - self.repeat.y) * size.y;
        let max_y = (1.0 - self.offset.y) * size.y;
        (Vec2::new(min_x, min_y), Vec2::new(max_x, max_y))
    }
}

/// Computes the texture window that isolates `frame` inside an atlas of `image_size`.
///
/// `repeat` is the frame's share of the image. The offset steps are measured
/// against `image_size - border_px`; with the default one pixel border this
/// reproduces sheets exported with a trailing separator row/column, with `0`
/// the window lands exactly on the frame rect.
pub fn map_frame(image_size: UVec2, frame: &Frame, border_px: u32) -> TextureWindow {
    let image = image_size.as_vec2();
    let source = frame.source_size.as_vec2();
    let repeat = source / image;

    let usable = UVec2::new(
        image_size.x.saturating_sub(border_px).max(1),
        image_size.y.saturating_sub(border_px).max(1),
    )
    .as_vec2();
    let step = source / usable;
    let Rect { x, y, .. } = frame.rect;
    let offset_x = step.x * (x as f32 / source.x);
    let offset_y = (1.0 - step.y).abs() - step.y * (y as f32 / source.y);

    TextureWindow {
        offset: Vec2::new(offset_x, offset_y),
        repeat,
        wrap_s: WrapMode::Repeat,
        wrap_t: WrapMode::Repeat,
    }
}

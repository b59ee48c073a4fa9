use crate::playback::{PlaybackSettings, DEFAULT_FPS};
use crate::uv::DEFAULT_ATLAS_BORDER_PX;
use anyhow::{Context, Result};
use log::warn;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Per-animator options. Every field is optional in the JSON form; camelCase
/// spellings are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnimatorConfig {
    #[serde(default, alias = "startFrame")]
    pub start_frame: usize,
    #[serde(default, alias = "endFrame")]
    pub end_frame: Option<usize>,
    #[serde(default = "AnimatorConfig::default_fps")]
    pub fps: f32,
    #[serde(default, alias = "activeClip", alias = "frameName")]
    pub active_clip: Option<String>,
    #[serde(default = "AnimatorConfig::default_scale_factor", alias = "scaleFactor")]
    pub scale_factor: f32,
    #[serde(default, rename = "loop", alias = "looped")]
    pub looped: bool,
    /// Column count for atlases given as a bare strip image.
    #[serde(default, alias = "numberOfFrames")]
    pub number_of_frames: Option<u32>,
    /// Clip names matched against frame keys of hash atlases.
    #[serde(default, alias = "clipNames", alias = "animationNames")]
    pub clip_names: Vec<String>,
    #[serde(default, alias = "autoPlay")]
    pub auto_play: bool,
    #[serde(default, alias = "alphaTest")]
    pub alpha_test: f32,
    #[serde(default = "AnimatorConfig::default_atlas_border_px", alias = "atlasBorderPx")]
    pub atlas_border_px: u32,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            start_frame: 0,
            end_frame: None,
            fps: Self::default_fps(),
            active_clip: None,
            scale_factor: Self::default_scale_factor(),
            looped: false,
            number_of_frames: None,
            clip_names: Vec::new(),
            auto_play: false,
            alpha_test: 0.0,
            atlas_border_px: Self::default_atlas_border_px(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimatorConfigOverrides {
    pub fps: Option<f32>,
    pub looped: Option<bool>,
    pub active_clip: Option<String>,
    pub scale_factor: Option<f32>,
    pub start_frame: Option<usize>,
    pub end_frame: Option<usize>,
    pub number_of_frames: Option<u32>,
    pub auto_play: Option<bool>,
}

impl AnimatorConfig {
    const fn default_fps() -> f32 {
        DEFAULT_FPS
    }

    const fn default_scale_factor() -> f32 {
        0.1
    }

    const fn default_atlas_border_px() -> u32 {
        DEFAULT_ATLAS_BORDER_PX
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read animator config {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse animator config {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!("[config] {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &AnimatorConfigOverrides) {
        if let Some(fps) = overrides.fps {
            self.fps = fps;
        }
        if let Some(looped) = overrides.looped {
            self.looped = looped;
        }
        if let Some(clip) = &overrides.active_clip {
            self.active_clip = Some(clip.clone());
            if !self.clip_names.iter().any(|name| name == clip) {
                self.clip_names.push(clip.clone());
            }
        }
        if let Some(scale) = overrides.scale_factor {
            self.scale_factor = scale;
        }
        if let Some(start) = overrides.start_frame {
            self.start_frame = start;
        }
        if let Some(end) = overrides.end_frame {
            self.end_frame = Some(end);
        }
        if let Some(count) = overrides.number_of_frames {
            self.number_of_frames = Some(count);
        }
        if let Some(auto_play) = overrides.auto_play {
            self.auto_play = auto_play;
        }
    }

    pub fn playback_settings(&self) -> PlaybackSettings {
        let fps = if self.fps.is_finite() && self.fps > 0.0 {
            self.fps
        } else {
            warn!("[config] fps {} is not usable; playing at {DEFAULT_FPS}.", self.fps);
            DEFAULT_FPS
        };
        PlaybackSettings { start_frame: self.start_frame, end_frame: self.end_frame, fps, looped: self.looped }
    }
}

impl AnimatorConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.applied_fields().is_empty()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.fps.is_some() {
            fields.push("fps");
        }
        if self.looped.is_some() {
            fields.push("loop");
        }
        if self.active_clip.is_some() {
            fields.push("clip");
        }
        if self.scale_factor.is_some() {
            fields.push("scale");
        }
        if self.start_frame.is_some() {
            fields.push("start");
        }
        if self.end_frame.is_some() {
            fields.push("end");
        }
        if self.number_of_frames.is_some() {
            fields.push("frames");
        }
        if self.auto_play.is_some() {
            fields.push("autoplay");
        }
        fields
    }
}

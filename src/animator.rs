//! Per-sprite facade tying the atlas, clips and playback clock together.
//!
//! A host owns one [`SpriteAnimator`] per animated sprite. It feeds in the
//! resolved atlas once, calls [`SpriteAnimator::tick`] from its render loop,
//! then reads [`SpriteAnimator::render_params`] and drains the events.

use crate::aspect::{compute_scale, Viewport};
use crate::atlas::{normalize, parse_atlas_json, AtlasDescription, AtlasFrames, Frame};
use crate::clips::{group_clips, ClipSet};
use crate::config::AnimatorConfig;
use crate::error::AtlasError;
use crate::events::{AnimationEvent, EventBus};
use crate::playback::{FrameSource, PlaybackClock, PlaybackPhase, PlaybackSignals, Tick, TickOutcome};
pub use crate::render::{MaterialHints, RenderParams};
use crate::uv::map_frame;
use glam::UVec2;
use log::{info, warn};
use serde_json::Value;
use std::sync::Arc;

pub struct SpriteAnimator {
    config: AnimatorConfig,
    atlas: Option<Arc<AtlasDescription>>,
    clips: ClipSet,
    clock: PlaybackClock,
    viewport: Viewport,
    params: RenderParams,
    events: EventBus,
    started: bool,
}

impl SpriteAnimator {
    /// Creates an animator whose frame timer starts at `now_ms`.
    pub fn new(config: AnimatorConfig, now_ms: f64) -> Self {
        let clock = PlaybackClock::new(config.playback_settings(), config.active_clip.as_deref(), now_ms);
        let params = RenderParams {
            material: MaterialHints { alpha_test: config.alpha_test, ..MaterialHints::default() },
            ..RenderParams::default()
        };
        Self {
            config,
            atlas: None,
            clips: ClipSet::default(),
            clock,
            viewport: Viewport::default(),
            params,
            events: EventBus::default(),
            started: false,
        }
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Normalizes already-loaded atlas data and prepares the first frame.
    ///
    /// `raw` is the parsed atlas JSON, or `None` for a plain strip image cut into
    /// `number_of_frames` columns. On error the animator stays not ready.
    pub fn setup(&mut self, raw: Option<&Value>, image_size: Option<UVec2>) -> Result<(), AtlasError> {
        let atlas = normalize(raw, image_size, self.config.number_of_frames).map_err(|err| {
            warn!("[animator] setup failed: {err}");
            err
        })?;
        self.attach_atlas(Arc::new(atlas));
        Ok(())
    }

    pub fn setup_json(&mut self, text: &str) -> Result<(), AtlasError> {
        let atlas = parse_atlas_json(text).map_err(|err| {
            warn!("[animator] setup failed: {err}");
            err
        })?;
        self.attach_atlas(Arc::new(atlas));
        Ok(())
    }

    /// Attaches an atlas that may be shared with other animators.
    pub fn attach_atlas(&mut self, atlas: Arc<AtlasDescription>) {
        self.clips = group_clips(&atlas, &self.config.clip_names);
        info!(
            "[animator] atlas ready: {} frames, {} clips, image {}x{}",
            atlas.frame_count(),
            self.clips.len(),
            atlas.image_size.x,
            atlas.image_size.y
        );
        self.atlas = Some(atlas);
        self.prepare_first_frame();
    }

    /// Computes the initial texture window and scale, emitting `Start` the first
    /// time the sequence has something to show.
    fn prepare_first_frame(&mut self) {
        if self.started {
            return;
        }
        let Some(atlas) = self.atlas.as_deref() else {
            return;
        };
        let Some(frame) = active_sequence(atlas, &self.clips, self.clock.active_clip()).first() else {
            return;
        };
        self.params.window = Some(map_frame(atlas.image_size, frame, self.config.atlas_border_px));
        self.params.scale = compute_scale(frame.source_size, &self.viewport, self.config.scale_factor);
        self.started = true;
        self.events.push(AnimationEvent::Start);
    }

    pub fn tick(&mut self, tick: &Tick) -> TickOutcome {
        let Some(atlas) = self.atlas.as_deref() else {
            return TickOutcome::Idle;
        };
        let source = FrameSource {
            frames: active_sequence(atlas, &self.clips, self.clock.active_clip()),
            image_size: atlas.image_size,
            viewport: self.viewport,
            scale_factor: self.config.scale_factor,
            border_px: self.config.atlas_border_px,
        };
        self.clock.advance(tick, &source, &mut self.params, &mut self.events)
    }

    /// Selects another clip; the cursor rewinds to 0 on change.
    pub fn set_active_clip(&mut self, name: &str) -> bool {
        let changed = self.clock.set_active_clip(name);
        if changed {
            self.prepare_first_frame();
        }
        changed
    }

    pub fn restart(&mut self) {
        self.clock.restart();
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn render_params(&self) -> &RenderParams {
        &self.params
    }

    pub fn drain_events(&mut self) -> Vec<AnimationEvent> {
        self.events.drain()
    }

    /// True once an atlas is attached and the active sequence has frames.
    pub fn is_ready(&self) -> bool {
        !self.active_frames().is_empty()
    }

    pub fn active_frames(&self) -> &[Frame] {
        match self.atlas.as_deref() {
            Some(atlas) => active_sequence(atlas, &self.clips, self.clock.active_clip()),
            None => &[],
        }
    }

    pub fn atlas(&self) -> Option<&Arc<AtlasDescription>> {
        self.atlas.as_ref()
    }

    pub fn clips(&self) -> &ClipSet {
        &self.clips
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    /// Signals for a host that only relies on the configured autoplay flag.
    pub fn default_signals(&self) -> PlaybackSignals {
        PlaybackSignals { auto_play: self.config.auto_play, ..PlaybackSignals::default() }
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.clock.phase()
    }

    pub fn config(&self) -> &AnimatorConfig {
        &self.config
    }
}

fn active_sequence<'a>(atlas: &'a AtlasDescription, clips: &'a ClipSet, clip: &str) -> &'a [Frame] {
    match &atlas.frames {
        AtlasFrames::Flat(frames) => frames,
        AtlasFrames::Keyed(_) => clips.get(clip).map(|clip| clip.frames.as_slice()).unwrap_or(&[]),
    }
}

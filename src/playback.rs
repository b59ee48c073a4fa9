use crate::aspect::{compute_scale, Viewport};
use crate::atlas::Frame;
use crate::events::{AnimationEvent, EventBus};
use crate::render::RenderParams;
use crate::uv::map_frame;
use glam::UVec2;
use log::{debug, warn};
use std::sync::Arc;

pub const DEFAULT_FPS: f32 = 30.0;

/// Host-side play controls sampled on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackSignals {
    pub auto_play: bool,
    pub play: bool,
    pub pause: bool,
}

impl PlaybackSignals {
    pub const fn autoplay() -> Self {
        Self { auto_play: true, play: false, pause: false }
    }

    pub const fn paused() -> Self {
        Self { auto_play: false, play: false, pause: true }
    }
}

/// One invocation of the host render loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Host timestamp in milliseconds.
    pub now_ms: f64,
    /// Seconds since the previous host frame; reported back through `Frame` events.
    pub delta_secs: f32,
    pub signals: PlaybackSignals,
}

impl Tick {
    pub const fn new(now_ms: f64, delta_secs: f32, signals: PlaybackSignals) -> Self {
        Self { now_ms, delta_secs, signals }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackPhase {
    #[default]
    Stopped,
    Playing,
    Paused,
    /// A one-shot sequence reached its end; only a restart or clip change leaves this.
    Ended,
}

impl PlaybackPhase {
    fn from_signals(signals: PlaybackSignals) -> Self {
        if signals.pause {
            Self::Paused
        } else if signals.auto_play || signals.play {
            Self::Playing
        } else {
            Self::Stopped
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Ended => "ended",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSettings {
    pub start_frame: usize,
    /// Last frame to show; `None` means the last frame of the active sequence.
    pub end_frame: Option<usize>,
    pub fps: f32,
    pub looped: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self { start_frame: 0, end_frame: None, fps: DEFAULT_FPS, looped: false }
    }
}

impl PlaybackSettings {
    /// Milliseconds between frame changes.
    pub fn fps_interval_ms(&self) -> f64 {
        let fps = if self.fps.is_finite() && self.fps > 0.0 { self.fps } else { DEFAULT_FPS };
        1000.0 / fps as f64
    }

    fn resolve_end(&self, len: usize) -> usize {
        let last = len - 1;
        self.end_frame.map_or(last, |end| end.min(last))
    }
}

/// Everything the clock owns between ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub current_frame: usize,
    /// Empty while playing a flat atlas.
    pub active_clip: Arc<str>,
    pub last_tick_ms: f64,
    /// Remainder of the last advancing interval, carried into the next one.
    pub accumulated_drift_ms: f64,
    pub phase: PlaybackPhase,
}

/// Read-only view of what the clock is playing.
pub struct FrameSource<'a> {
    pub frames: &'a [Frame],
    pub image_size: UVec2,
    pub viewport: Viewport,
    pub scale_factor: f32,
    pub border_px: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing changed: not playing, nothing to play, or the interval has not elapsed.
    Idle,
    /// A frame was addressed and the cursor moved on.
    Advanced,
    /// A one-shot sequence finished on this tick.
    Ended,
}

#[derive(Debug, Clone)]
pub struct PlaybackClock {
    settings: PlaybackSettings,
    state: PlaybackState,
}

impl PlaybackClock {
    pub fn new(settings: PlaybackSettings, active_clip: Option<&str>, started_at_ms: f64) -> Self {
        Self {
            settings,
            state: PlaybackState {
                current_frame: settings.start_frame,
                active_clip: Arc::from(active_clip.unwrap_or_default()),
                last_tick_ms: started_at_ms,
                accumulated_drift_ms: 0.0,
                phase: PlaybackPhase::Stopped,
            },
        }
    }

    pub fn settings(&self) -> &PlaybackSettings {
        &self.settings
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.state.phase
    }

    pub fn current_frame(&self) -> usize {
        self.state.current_frame
    }

    pub fn active_clip(&self) -> &str {
        &self.state.active_clip
    }

    /// Switches to another clip and rewinds to frame 0. Emits nothing.
    ///
    /// Returns `false` when `name` is empty or already active.
    pub fn set_active_clip(&mut self, name: &str) -> bool {
        if name.is_empty() || self.state.active_clip.as_ref() == name {
            return false;
        }
        debug!("[playback] clip '{}' -> '{name}'", self.state.active_clip);
        self.state.active_clip = Arc::from(name);
        self.state.current_frame = 0;
        if self.state.phase == PlaybackPhase::Ended {
            self.state.phase = PlaybackPhase::Stopped;
        }
        true
    }

    /// Rewinds to the start frame and leaves the `Ended` phase.
    pub fn restart(&mut self) {
        self.state.current_frame = self.settings.start_frame;
        if self.state.phase == PlaybackPhase::Ended {
            self.state.phase = PlaybackPhase::Stopped;
        }
    }

    /// Runs one host tick against `source`.
    ///
    /// When the frame interval has elapsed the frame under the cursor is
    /// addressed into `params` and the cursor moves on, so the frame on screen
    /// trails the cursor by one. Events land in `events` before this returns.
    pub fn advance(
        &mut self,
        tick: &Tick,
        source: &FrameSource<'_>,
        params: &mut RenderParams,
        events: &mut EventBus,
    ) -> TickOutcome {
        if source.frames.is_empty() || self.state.phase == PlaybackPhase::Ended {
            return TickOutcome::Idle;
        }
        self.state.phase = PlaybackPhase::from_signals(tick.signals);
        if self.state.phase != PlaybackPhase::Playing {
            return TickOutcome::Idle;
        }

        let interval = self.settings.fps_interval_ms();
        let diff = tick.now_ms - self.state.last_tick_ms;
        if diff <= interval {
            return TickOutcome::Idle;
        }
        let drift = diff % interval;
        self.state.last_tick_ms = tick.now_ms - drift;
        self.state.accumulated_drift_ms = drift;

        let end = self.settings.resolve_end(source.frames.len());
        if self.state.current_frame > end {
            if self.settings.looped {
                let start = self.settings.start_frame;
                if start > end {
                    warn!("[playback] start frame {start} is past end frame {end}; wrapping to 0.");
                }
                self.state.current_frame = if start <= end { start } else { 0 };
                events.push(AnimationEvent::LoopEnd {
                    clip: Arc::clone(&self.state.active_clip),
                    index: self.state.current_frame,
                });
            } else {
                self.state.current_frame = end;
                self.state.phase = PlaybackPhase::Ended;
                events.push(AnimationEvent::End {
                    clip: Arc::clone(&self.state.active_clip),
                    index: self.state.current_frame,
                });
                return TickOutcome::Ended;
            }
        }

        let frame = &source.frames[self.state.current_frame];
        params.scale = compute_scale(frame.source_size, &source.viewport, source.scale_factor);
        params.window = Some(map_frame(source.image_size, frame, source.border_px));

        self.state.current_frame += 1;
        events.push(AnimationEvent::Frame { delta: tick.delta_secs, index: self.state.current_frame });
        TickOutcome::Advanced
    }
}

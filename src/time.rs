use crate::playback::{PlaybackSignals, Tick};
use std::time::{Duration, Instant};

/// Wall-clock tick source for hosts without a render-loop timestamp.
pub struct FrameClock {
    start: Instant,
    last: Instant,
    pub delta: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self { start: now, last: now, delta: Duration::ZERO }
    }

    pub fn tick(&mut self, signals: PlaybackSignals) -> Tick {
        let now = Instant::now();
        self.delta = now - self.last;
        self.last = now;
        Tick::new(self.elapsed_ms(), self.delta_seconds(), signals)
    }

    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.last.duration_since(self.start).as_secs_f64() * 1000.0
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic tick source advancing by a fixed step, for previews and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedStepClock {
    now_ms: f64,
    step_ms: f64,
}

impl FixedStepClock {
    pub fn new(start_ms: f64, step_ms: f64) -> Self {
        Self { now_ms: start_ms, step_ms: step_ms.max(0.0) }
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn tick(&mut self, signals: PlaybackSignals) -> Tick {
        self.now_ms += self.step_ms;
        Tick::new(self.now_ms, (self.step_ms / 1000.0) as f32, signals)
    }
}

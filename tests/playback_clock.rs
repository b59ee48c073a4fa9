use glam::UVec2;
use kestrel_sprite_anim::aspect::Viewport;
use kestrel_sprite_anim::atlas::{strip_atlas, Frame};
use kestrel_sprite_anim::playback::{FrameSource, PlaybackClock, PlaybackSettings};
use kestrel_sprite_anim::render::RenderParams;
use kestrel_sprite_anim::{AnimationEvent, EventBus, PlaybackPhase, PlaybackSignals, Tick, TickOutcome};

struct Harness {
    frames: Vec<Frame>,
    clock: PlaybackClock,
    params: RenderParams,
    events: EventBus,
}

impl Harness {
    fn new(frame_count: u32, settings: PlaybackSettings) -> Self {
        let atlas = strip_atlas(UVec2::new(frame_count * 16, 16), frame_count);
        Self {
            frames: atlas.flat_frames().expect("flat").to_vec(),
            clock: PlaybackClock::new(settings, None, 0.0),
            params: RenderParams::default(),
            events: EventBus::default(),
        }
    }

    fn tick_with(&mut self, now_ms: f64, signals: PlaybackSignals) -> TickOutcome {
        let source = FrameSource {
            frames: &self.frames,
            image_size: UVec2::new(self.frames.len() as u32 * 16, 16),
            viewport: Viewport::default(),
            scale_factor: 1.0,
            border_px: 0,
        };
        self.clock.advance(&Tick::new(now_ms, 0.016, signals), &source, &mut self.params, &mut self.events)
    }

    fn tick(&mut self, now_ms: f64) -> TickOutcome {
        self.tick_with(now_ms, PlaybackSignals::autoplay())
    }

    fn shown_x(&self) -> f32 {
        self.params.window.expect("a frame was addressed").offset.x
    }
}

fn settings(fps: f32, looped: bool) -> PlaybackSettings {
    PlaybackSettings { fps, looped, ..PlaybackSettings::default() }
}

#[test]
fn ticks_inside_the_interval_do_nothing() {
    let mut harness = Harness::new(4, settings(10.0, true));
    assert_eq!(harness.tick(50.0), TickOutcome::Idle);
    assert_eq!(harness.tick(100.0), TickOutcome::Idle, "exactly one interval is not enough");
    assert_eq!(harness.clock.current_frame(), 0);
    assert!(harness.params.window.is_none());
    assert!(harness.events.is_empty());
    assert_eq!(harness.clock.state().last_tick_ms, 0.0);
}

#[test]
fn late_tick_advances_once_and_carries_drift() {
    let mut harness = Harness::new(4, settings(10.0, true));
    assert_eq!(harness.tick(250.0), TickOutcome::Advanced);
    assert_eq!(harness.clock.current_frame(), 1, "a late tick never skips frames");
    let state = harness.clock.state();
    assert!((state.accumulated_drift_ms - 50.0).abs() < 1e-9);
    assert!((state.last_tick_ms - 200.0).abs() < 1e-9);

    let events = harness.events.drain();
    assert_eq!(events, vec![AnimationEvent::Frame { delta: 0.016, index: 1 }]);
}

#[test]
fn display_trails_the_cursor() {
    let mut harness = Harness::new(4, settings(10.0, true));
    harness.tick(200.0);
    assert_eq!(harness.clock.current_frame(), 1);
    assert!(harness.shown_x().abs() < 1e-6, "first advance addresses frame 0");
    harness.tick(400.0);
    assert_eq!(harness.clock.current_frame(), 2);
    assert!((harness.shown_x() - 0.25).abs() < 1e-6, "second advance addresses frame 1");
}

#[test]
fn looping_sequence_wraps_with_a_single_loop_end() {
    let mut harness = Harness::new(4, settings(10.0, true));
    let mut now = 0.0;
    for _ in 0..4 {
        now += 200.0;
        assert_eq!(harness.tick(now), TickOutcome::Advanced);
    }
    assert_eq!(harness.clock.current_frame(), 4);
    assert!(!harness.events.drain().iter().any(|event| matches!(event, AnimationEvent::LoopEnd { .. })));

    now += 200.0;
    assert_eq!(harness.tick(now), TickOutcome::Advanced);
    let events = harness.events.drain();
    let loop_ends: Vec<_> = events.iter().filter(|event| matches!(event, AnimationEvent::LoopEnd { .. })).collect();
    assert_eq!(loop_ends.len(), 1);
    assert_eq!(loop_ends[0], &AnimationEvent::LoopEnd { clip: "".into(), index: 0 });
    assert!(harness.shown_x().abs() < 1e-6, "wrap addresses the start frame");
    assert_eq!(harness.clock.current_frame(), 1);
}

#[test]
fn one_shot_sequence_ends_and_freezes() {
    let mut harness = Harness::new(4, settings(10.0, false));
    let mut now = 0.0;
    for _ in 0..4 {
        now += 200.0;
        harness.tick(now);
    }
    let last_window = harness.params.window;
    harness.events.drain();

    now += 200.0;
    assert_eq!(harness.tick(now), TickOutcome::Ended);
    assert_eq!(harness.events.drain(), vec![AnimationEvent::End { clip: "".into(), index: 3 }]);
    assert_eq!(harness.clock.phase(), PlaybackPhase::Ended);
    assert_eq!(harness.params.window, last_window, "the last frame stays on screen");

    for _ in 0..3 {
        now += 200.0;
        assert_eq!(harness.tick(now), TickOutcome::Idle);
    }
    assert!(harness.events.is_empty(), "End fires only once");
    assert_eq!(harness.clock.current_frame(), 3);
}

#[test]
fn restart_leaves_the_ended_phase() {
    let mut harness = Harness::new(2, settings(10.0, false));
    for step in 1..=3 {
        harness.tick(step as f64 * 200.0);
    }
    assert_eq!(harness.clock.phase(), PlaybackPhase::Ended);
    harness.clock.restart();
    assert_eq!(harness.clock.current_frame(), 0);
    assert_ne!(harness.clock.phase(), PlaybackPhase::Ended);
    assert_eq!(harness.tick(800.0), TickOutcome::Advanced);
}

#[test]
fn end_frame_bounds_the_loop() {
    let settings = PlaybackSettings { start_frame: 1, end_frame: Some(2), fps: 10.0, looped: true };
    let mut harness = Harness::new(4, settings);
    assert_eq!(harness.clock.current_frame(), 1);
    harness.tick(200.0);
    harness.tick(400.0);
    assert_eq!(harness.clock.current_frame(), 3);
    harness.events.drain();
    harness.tick(600.0);
    let events = harness.events.drain();
    assert!(events.contains(&AnimationEvent::LoopEnd { clip: "".into(), index: 1 }));
    assert!((harness.shown_x() - 0.25).abs() < 1e-6, "loop restarts at the start frame");
}

#[test]
fn start_past_end_wraps_to_zero() {
    let settings = PlaybackSettings { start_frame: 9, end_frame: None, fps: 10.0, looped: true };
    let mut harness = Harness::new(3, settings);
    assert_eq!(harness.tick(200.0), TickOutcome::Advanced);
    assert!(harness.events.drain().contains(&AnimationEvent::LoopEnd { clip: "".into(), index: 0 }));
    assert!(harness.shown_x().abs() < 1e-6);
}

#[test]
fn out_of_range_end_frame_is_clamped() {
    let settings = PlaybackSettings { start_frame: 0, end_frame: Some(50), fps: 10.0, looped: false };
    let mut harness = Harness::new(2, settings);
    harness.tick(200.0);
    harness.tick(400.0);
    assert_eq!(harness.tick(600.0), TickOutcome::Ended);
    assert_eq!(harness.events.drain().last(), Some(&AnimationEvent::End { clip: "".into(), index: 1 }));
}

#[test]
fn pause_and_stop_keep_the_timer() {
    let mut harness = Harness::new(4, settings(10.0, true));
    assert_eq!(harness.tick_with(500.0, PlaybackSignals::paused()), TickOutcome::Idle);
    assert_eq!(harness.clock.phase(), PlaybackPhase::Paused);
    assert_eq!(harness.tick_with(600.0, PlaybackSignals::default()), TickOutcome::Idle);
    assert_eq!(harness.clock.phase(), PlaybackPhase::Stopped);
    assert_eq!(harness.clock.state().last_tick_ms, 0.0);

    let play = PlaybackSignals { play: true, ..PlaybackSignals::default() };
    assert_eq!(harness.tick_with(650.0, play), TickOutcome::Advanced, "resume advances immediately");
    assert_eq!(harness.clock.phase(), PlaybackPhase::Playing);
    assert_eq!(harness.clock.current_frame(), 1);
}

#[test]
fn clip_change_rewinds_silently() {
    let mut harness = Harness::new(4, settings(10.0, true));
    harness.tick(200.0);
    harness.tick(400.0);
    harness.events.drain();
    assert!(harness.clock.set_active_clip("run"));
    assert!(!harness.clock.set_active_clip("run"), "same clip is not a change");
    assert!(!harness.clock.set_active_clip(""), "empty names are ignored");
    assert_eq!(harness.clock.current_frame(), 0);
    assert_eq!(harness.clock.active_clip(), "run");
    assert!(harness.events.is_empty());
}

#[test]
fn empty_sequence_is_a_no_op() {
    let mut harness = Harness::new(4, settings(10.0, true));
    harness.frames.clear();
    assert_eq!(harness.tick(10_000.0), TickOutcome::Idle);
    assert!(harness.events.is_empty());
    assert!(harness.params.window.is_none());
}

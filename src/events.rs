use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Lifecycle notifications emitted by an animator.
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationEvent {
    /// The first frame became displayable. Emitted once per animator.
    Start,
    /// The clock advanced; `index` is the cursor after the advance.
    Frame { delta: f32, index: usize },
    /// A looping sequence ran past its end frame and wrapped to `index`.
    LoopEnd { clip: Arc<str>, index: usize },
    /// A one-shot sequence finished and froze at `index`.
    End { clip: Arc<str>, index: usize },
}

impl AnimationEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            AnimationEvent::Start => "start",
            AnimationEvent::Frame { .. } => "frame",
            AnimationEvent::LoopEnd { .. } => "loop_end",
            AnimationEvent::End { .. } => "end",
        }
    }
}

impl fmt::Display for AnimationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnimationEvent::Start => write!(f, "Start"),
            AnimationEvent::Frame { delta, index } => write!(f, "Frame index={index} delta={delta:.4}"),
            AnimationEvent::LoopEnd { clip, index } => write!(f, "LoopEnd clip={clip} index={index}"),
            AnimationEvent::End { clip, index } => write!(f, "End clip={clip} index={index}"),
        }
    }
}

/// Buffer the animator pushes into and the host drains after each tick.
#[derive(Debug, Default)]
pub struct EventBus {
    events: SmallVec<[AnimationEvent; 4]>,
}

impl EventBus {
    pub fn push(&mut self, event: AnimationEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<AnimationEvent> {
        self.events.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

pub mod animator;
pub mod aspect;
pub mod atlas;
pub mod cli;
pub mod clips;
pub mod config;
pub mod error;
pub mod events;
pub mod playback;
pub mod render;
pub mod time;
pub mod uv;

pub use animator::SpriteAnimator;
pub use atlas::{AtlasDescription, AtlasFrames, Frame, Rect};
pub use config::AnimatorConfig;
pub use error::AtlasError;
pub use events::{AnimationEvent, EventBus};
pub use playback::{PlaybackPhase, PlaybackSignals, Tick, TickOutcome};
pub use render::{MaterialHints, RenderParams};

use crate::atlas::{AtlasDescription, AtlasFrames, Frame};
use log::{debug, warn};
use std::sync::Arc;

/// A named run of frames picked out of a hash atlas.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: Arc<str>,
    pub frames: Vec<Frame>,
}

impl AnimationClip {
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Names of the member frames, in playback order.
    pub fn frame_names(&self) -> Vec<&str> {
        self.frames.iter().filter_map(|frame| frame.name.as_deref()).collect()
    }
}

/// Clips in the order they were requested.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipSet {
    clips: Vec<AnimationClip>,
}

impl ClipSet {
    pub fn get(&self, name: &str) -> Option<&AnimationClip> {
        self.clips.iter().find(|clip| clip.name.as_ref() == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.clips.iter().map(|clip| clip.name.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnimationClip> {
        self.clips.iter()
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

/// Builds clips from a hash atlas by case-insensitive substring match on frame keys.
///
/// Membership is not exclusive: `"run"` and `"fast_run"` both claim a
/// `"fast_run_0"` key. Frames keep the key order of the atlas file; numeric
/// suffixes are never sorted. Flat atlases have no keys and produce no clips.
pub fn group_clips<S: AsRef<str>>(atlas: &AtlasDescription, clip_names: &[S]) -> ClipSet {
    let entries = match &atlas.frames {
        AtlasFrames::Keyed(entries) => entries,
        AtlasFrames::Flat(_) => {
            if !clip_names.is_empty() {
                debug!("[clips] atlas is flat; ignoring {} clip name(s)", clip_names.len());
            }
            return ClipSet::default();
        }
    };

    let mut clips: Vec<AnimationClip> = Vec::with_capacity(clip_names.len());
    for requested in clip_names {
        let requested = requested.as_ref();
        if clips.iter().any(|clip| clip.name.as_ref() == requested) {
            continue;
        }
        let needle = requested.to_lowercase();
        let frames: Vec<Frame> = entries
            .iter()
            .filter(|entry| entry.key.to_lowercase().contains(&needle))
            .flat_map(|entry| entry.frames.iter().cloned())
            .collect();
        if frames.is_empty() {
            warn!("[clips] clip '{requested}' matches no frame keys; it will not play.");
        }
        clips.push(AnimationClip { name: Arc::from(requested), frames });
    }
    ClipSet { clips }
}

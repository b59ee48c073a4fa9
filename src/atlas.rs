use crate::error::AtlasError;
use glam::UVec2;
use log::{debug, warn};
use serde::de::{Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Pixel rectangle inside the atlas image, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Bottom-right corner, or `None` when it does not fit in `u32`.
    pub fn max(&self) -> Option<UVec2> {
        Some(UVec2::new(self.x.checked_add(self.w)?, self.y.checked_add(self.h)?))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Key (hash atlases) or `filename` (array atlases) the frame was exported under.
    pub name: Option<Arc<str>>,
    pub rect: Rect,
    /// Untrimmed size of the sprite; drives both UV and aspect math.
    pub source_size: UVec2,
    pub rotated: bool,
    pub trimmed: bool,
}

impl Frame {
    pub fn new(rect: Rect, source_size: UVec2) -> Self {
        Self { name: None, rect, source_size, rotated: false, trimmed: false }
    }

    pub fn named(name: &str, rect: Rect, source_size: UVec2) -> Self {
        Self { name: Some(Arc::from(name)), ..Self::new(rect, source_size) }
    }
}

/// Frames under one key of a hash atlas, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedFrames {
    pub key: Arc<str>,
    pub frames: Vec<Frame>,
}

/// The two atlas shapes. Which one applies is decided once, at normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum AtlasFrames {
    /// Strip or array atlas: frames are played in index order.
    Flat(Vec<Frame>),
    /// Hash atlas: frames are addressed through clips built by [`crate::clips::group_clips`].
    Keyed(Vec<KeyedFrames>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AtlasMeta {
    pub image: Option<String>,
    pub version: Option<String>,
    pub scale: Option<String>,
}

/// Normalized atlas, immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct AtlasDescription {
    pub image_size: UVec2,
    pub frames: AtlasFrames,
    pub meta: AtlasMeta,
}

impl AtlasDescription {
    pub fn is_flat(&self) -> bool {
        matches!(self.frames, AtlasFrames::Flat(_))
    }

    pub fn flat_frames(&self) -> Option<&[Frame]> {
        match &self.frames {
            AtlasFrames::Flat(frames) => Some(frames.as_slice()),
            AtlasFrames::Keyed(_) => None,
        }
    }

    pub fn keyed_frames(&self) -> Option<&[KeyedFrames]> {
        match &self.frames {
            AtlasFrames::Flat(_) => None,
            AtlasFrames::Keyed(entries) => Some(entries.as_slice()),
        }
    }

    /// Total number of frames across both shapes.
    pub fn frame_count(&self) -> usize {
        match &self.frames {
            AtlasFrames::Flat(frames) => frames.len(),
            AtlasFrames::Keyed(entries) => entries.iter().map(|entry| entry.frames.len()).sum(),
        }
    }

    pub fn first_frame(&self) -> Option<&Frame> {
        match &self.frames {
            AtlasFrames::Flat(frames) => frames.first(),
            AtlasFrames::Keyed(entries) => entries.iter().find_map(|entry| entry.frames.first()),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct SizeFile {
    w: u32,
    h: u32,
}

#[derive(Debug, Deserialize)]
struct AtlasFile {
    frames: FramesFile,
    #[serde(default)]
    meta: Option<MetaFile>,
}

#[derive(Debug, Deserialize)]
struct MetaFile {
    #[serde(default)]
    size: Option<SizeFile>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    scale: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FrameFile {
    #[serde(default)]
    filename: Option<String>,
    frame: Rect,
    #[serde(default)]
    source_size: Option<SizeFile>,
    #[serde(default)]
    rotated: bool,
    #[serde(default)]
    trimmed: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum KeyedFrameFile {
    One(FrameFile),
    Many(Vec<FrameFile>),
}

#[derive(Debug)]
enum FramesFile {
    Array(Vec<FrameFile>),
    Keyed(Vec<(String, KeyedFrameFile)>),
}

impl<'de> Deserialize<'de> for FramesFile {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FramesVisitor;

        impl<'de> Visitor<'de> for FramesVisitor {
            type Value = FramesFile;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an array of frames or an object keyed by frame name")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut frames = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(frame) = seq.next_element::<FrameFile>()? {
                    frames.push(frame);
                }
                Ok(FramesFile::Array(frames))
            }

            // Entries are collected in document order; clip membership depends on it.
            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, KeyedFrameFile>()? {
                    entries.push(entry);
                }
                Ok(FramesFile::Keyed(entries))
            }
        }

        deserializer.deserialize_any(FramesVisitor)
    }
}

/// Normalizes whatever atlas data the host resolved into an [`AtlasDescription`].
///
/// With a JSON atlas the image size is taken from `meta.size`; without one the
/// image is treated as a horizontal strip of `frame_count_hint` equal frames.
pub fn normalize(
    raw: Option<&Value>,
    image_size: Option<UVec2>,
    frame_count_hint: Option<u32>,
) -> Result<AtlasDescription, AtlasError> {
    match (raw, image_size, frame_count_hint) {
        (Some(value), _, _) => {
            let file = AtlasFile::deserialize(value)?;
            build_description(file)
        }
        (None, Some(size), Some(count)) if count > 0 && size.x > 0 && size.y > 0 => {
            Ok(strip_atlas(size, count))
        }
        _ => Err(AtlasError::MissingInput),
    }
}

/// Parses atlas JSON text, keeping the key order of hash atlases.
pub fn parse_atlas_json(text: &str) -> Result<AtlasDescription, AtlasError> {
    let file: AtlasFile = serde_json::from_str(text)?;
    build_description(file)
}

pub fn parse_atlas_slice(bytes: &[u8]) -> Result<AtlasDescription, AtlasError> {
    let file: AtlasFile = serde_json::from_slice(bytes)?;
    build_description(file)
}

/// Cuts a full-height strip into `frame_count` equal columns.
///
/// A width that does not divide evenly yields no frames at all; playback then
/// stays idle instead of addressing half pixels.
pub fn strip_atlas(image_size: UVec2, frame_count: u32) -> AtlasDescription {
    let meta =
        AtlasMeta { image: None, version: Some("1.0".to_string()), scale: Some("1".to_string()) };
    let mut frames = Vec::new();
    if frame_count == 0 || image_size.x % frame_count != 0 {
        warn!(
            "[atlas] strip of width {} cannot be split into {} equal frames; no frames generated.",
            image_size.x, frame_count
        );
    } else {
        let frame_width = image_size.x / frame_count;
        frames.reserve(frame_count as usize);
        for index in 0..frame_count {
            frames.push(Frame::new(
                Rect::new(index * frame_width, 0, frame_width, image_size.y),
                UVec2::new(frame_width, image_size.y),
            ));
        }
    }
    AtlasDescription { image_size, frames: AtlasFrames::Flat(frames), meta }
}

fn build_description(file: AtlasFile) -> Result<AtlasDescription, AtlasError> {
    let meta = file.meta.ok_or_else(|| AtlasError::malformed("atlas has no 'meta' section"))?;
    let size = meta.size.ok_or_else(|| AtlasError::malformed("atlas meta has no 'size'"))?;
    if size.w == 0 || size.h == 0 {
        return Err(AtlasError::malformed(format!("atlas size {}x{} must be non-zero", size.w, size.h)));
    }
    let image_size = UVec2::new(size.w, size.h);

    let frames = match file.frames {
        FramesFile::Array(raw_frames) => {
            let mut frames = Vec::with_capacity(raw_frames.len());
            for (index, raw) in raw_frames.into_iter().enumerate() {
                frames.push(convert_frame(raw, None, image_size, &format!("frame #{index}"))?);
            }
            AtlasFrames::Flat(frames)
        }
        FramesFile::Keyed(entries) => {
            let mut keyed = Vec::with_capacity(entries.len());
            for (key, value) in entries {
                let key: Arc<str> = Arc::from(key);
                let raw_frames = match value {
                    KeyedFrameFile::One(frame) => vec![frame],
                    KeyedFrameFile::Many(frames) => frames,
                };
                let mut frames = Vec::with_capacity(raw_frames.len());
                for raw in raw_frames {
                    frames.push(convert_frame(raw, Some(&key), image_size, &format!("frame '{key}'"))?);
                }
                keyed.push(KeyedFrames { key, frames });
            }
            AtlasFrames::Keyed(keyed)
        }
    };

    let scale = meta.scale.map(|value| match value {
        Value::String(text) => text,
        other => other.to_string(),
    });
    let description = AtlasDescription {
        image_size,
        frames,
        meta: AtlasMeta { image: meta.image, version: meta.version, scale },
    };
    debug!(
        "[atlas] normalized {} frames ({}) for a {}x{} image",
        description.frame_count(),
        if description.is_flat() { "flat" } else { "keyed" },
        image_size.x,
        image_size.y
    );
    Ok(description)
}

fn convert_frame(
    raw: FrameFile,
    key: Option<&Arc<str>>,
    image_size: UVec2,
    label: &str,
) -> Result<Frame, AtlasError> {
    let source = raw
        .source_size
        .ok_or_else(|| AtlasError::malformed(format!("{label} has no 'sourceSize'")))?;
    if raw.frame.w == 0 || raw.frame.h == 0 {
        return Err(AtlasError::malformed(format!(
            "{label} has an empty rect {}x{}",
            raw.frame.w, raw.frame.h
        )));
    }
    if source.w == 0 || source.h == 0 {
        return Err(AtlasError::malformed(format!(
            "{label} has an empty sourceSize {}x{}",
            source.w, source.h
        )));
    }
    let max = raw.frame.max().ok_or_else(|| {
        AtlasError::malformed(format!(
            "{label} rect at ({}, {}) size {}x{} overflows pixel coordinates",
            raw.frame.x, raw.frame.y, raw.frame.w, raw.frame.h
        ))
    })?;
    if max.x > image_size.x || max.y > image_size.y {
        warn!(
            "[atlas] {label} extends to {}x{}, outside the {}x{} image.",
            max.x, max.y, image_size.x, image_size.y
        );
    }
    let name = match key {
        Some(key) => Some(Arc::clone(key)),
        None => raw.filename.map(Arc::<str>::from),
    };
    Ok(Frame {
        name,
        rect: raw.frame,
        source_size: UVec2::new(source.w, source.h),
        rotated: raw.rotated,
        trimmed: raw.trimmed,
    })
}

use thiserror::Error;

/// Setup failures surfaced by atlas normalization.
///
/// Everything that goes wrong after setup (empty clips, out-of-range frames) is
/// tolerated by the playback clock and never shows up here.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AtlasError {
    /// Neither an atlas JSON nor an image with a frame count was supplied.
    #[error("No atlas data: expected an atlas JSON or an image size with a frame count")]
    MissingInput,
    /// The atlas JSON parsed but violates the atlas schema.
    #[error("Malformed atlas: {0}")]
    MalformedAtlas(String),
    /// The atlas JSON could not be parsed at all.
    #[error("Could not parse atlas JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl AtlasError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedAtlas(message.into())
    }
}

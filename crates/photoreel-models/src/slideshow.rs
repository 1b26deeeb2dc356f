//! Slideshow generation request and settings.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use validator::Validate;

use crate::photo::PhotoId;

/// Seconds each photo stays on screen.
pub const DEFAULT_FRAME_DURATION_SECS: u32 = 3;

/// Length of the fade-in at the start and the fade-out at the end.
pub const DEFAULT_FADE_DURATION_SECS: f64 = 1.0;

/// Response content type for a generated slideshow.
pub const SLIDESHOW_CONTENT_TYPE: &str = "video/mp4";

/// Suggested download filename.
pub const SLIDESHOW_FILENAME: &str = "slideshow.mp4";

/// Request body for `POST /api/generate-video`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Validate)]
pub struct GenerateVideoRequest {
    /// Photo identifiers in slide order. Duplicates are allowed.
    #[validate(length(min = 1, message = "At least one photo must be selected"))]
    pub photos: Vec<PhotoId>,
}

impl GenerateVideoRequest {
    pub fn new(photos: impl IntoIterator<Item = PhotoId>) -> Self {
        Self {
            photos: photos.into_iter().collect(),
        }
    }
}

/// What to do when a requested photo id has no stored image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingPhotoPolicy {
    /// Drop the id; later frames keep contiguous indices.
    #[default]
    Skip,
    /// Reject the whole request.
    Fail,
}

impl MissingPhotoPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingPhotoPolicy::Skip => "skip",
            MissingPhotoPolicy::Fail => "fail",
        }
    }
}

impl fmt::Display for MissingPhotoPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown missing-photo policy: {0}")]
pub struct UnknownPolicy(pub String);

impl FromStr for MissingPhotoPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "fail" => Ok(Self::Fail),
            other => Err(UnknownPolicy(other.to_string())),
        }
    }
}

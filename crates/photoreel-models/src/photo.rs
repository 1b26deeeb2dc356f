//! Photo models.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::album::AlbumId;

/// Unique identifier for a photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct PhotoId(pub i64);

impl PhotoId {
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for PhotoId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl FromStr for PhotoId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// A stored photo. Image bytes live beside the record, not in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: PhotoId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub album_id: Option<AlbumId>,
    pub created_at: DateTime<Utc>,
}

impl Photo {
    /// Case-insensitive match against the title or any tag.
    ///
    /// `needle` must already be lowercase.
    pub fn matches_query(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.tags.iter().any(|tag| tag.to_lowercase().contains(needle))
    }
}

/// Payload for creating a photo.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewPhoto {
    #[validate(length(min = 1, max = 500))]
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[validate(url)]
    pub url: String,

    #[serde(default)]
    #[validate(length(max = 64))]
    pub tags: Vec<String>,

    #[serde(default)]
    pub album_id: Option<AlbumId>,

    /// Base64-encoded image content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
}

impl NewPhoto {
    /// Decode the optional base64 image payload.
    pub fn decode_image_data(&self) -> Result<Option<Vec<u8>>, base64::DecodeError> {
        self.image_data
            .as_deref()
            .map(|data| STANDARD.decode(data.trim()))
            .transpose()
    }

    /// Build the stored record for this payload.
    pub fn into_photo(self, id: PhotoId, created_at: DateTime<Utc>) -> Photo {
        Photo {
            id,
            title: self.title,
            description: self.description,
            url: self.url,
            tags: self.tags,
            album_id: self.album_id,
            created_at,
        }
    }
}

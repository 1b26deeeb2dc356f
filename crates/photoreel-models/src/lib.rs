//! Shared data models for the PhotoReel backend.
//!
//! This crate provides Serde-serializable types for:
//! - Photos and albums
//! - Slideshow generation requests and settings

pub mod album;
pub mod photo;
pub mod slideshow;

// Re-export common types
pub use album::{Album, AlbumId, AlbumWithPhotos, NewAlbum};
pub use photo::{NewPhoto, Photo, PhotoId};
pub use slideshow::{
    GenerateVideoRequest, MissingPhotoPolicy, DEFAULT_FADE_DURATION_SECS,
    DEFAULT_FRAME_DURATION_SECS, SLIDESHOW_CONTENT_TYPE, SLIDESHOW_FILENAME,
};

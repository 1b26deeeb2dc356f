//! FFmpeg CLI wrapper for slideshow rendering.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building (argument vectors, never shell strings)
//! - A runner with stderr capture and a hard timeout
//! - Per-request staging directories with guaranteed cleanup
//! - Concat-demuxer manifests and fade filter graphs

pub mod command;
pub mod encoder;
pub mod error;
pub mod filters;
pub mod manifest;
pub mod staging;

pub use command::{FfmpegCommand, FfmpegRunner};
pub use encoder::{EncoderSettings, FfmpegEncoder, SlideshowEncoder};
pub use error::{MediaError, MediaResult};
pub use filters::FadeTiming;
pub use manifest::{frame_file_name, Manifest, StagedFrame};
pub use staging::{StagingArea, StagingSession};

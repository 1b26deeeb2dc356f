//! Slideshow encoder.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info};

use photoreel_models::{DEFAULT_FADE_DURATION_SECS, DEFAULT_FRAME_DURATION_SECS};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::filters::{FadeTiming, PIXEL_FORMAT_COMPAT};

/// Turns a staged manifest into a video file.
#[async_trait]
pub trait SlideshowEncoder: Send + Sync {
    /// Encode the frames listed in `manifest_path` into `output_path`.
    ///
    /// On `Ok`, `output_path` holds a complete artifact.
    async fn encode(
        &self,
        manifest_path: &Path,
        output_path: &Path,
        frame_count: usize,
    ) -> MediaResult<()>;

    /// Short name for logs and metrics.
    fn name(&self) -> &'static str;

    /// Verify the encoder can run at all.
    async fn check(&self) -> MediaResult<()> {
        Ok(())
    }
}

/// Settings for [`FfmpegEncoder`].
#[derive(Debug, Clone)]
pub struct EncoderSettings {
    /// FFmpeg binary (bare name or path)
    pub ffmpeg_path: PathBuf,
    /// Hard limit on one encode
    pub timeout_secs: u64,
    /// Seconds per slide, must match the manifest
    pub frame_duration: f64,
    /// Fade-in / fade-out length
    pub fade_duration: f64,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            timeout_secs: 120,
            frame_duration: DEFAULT_FRAME_DURATION_SECS as f64,
            fade_duration: DEFAULT_FADE_DURATION_SECS,
        }
    }
}

/// Encoder backed by the FFmpeg CLI and its concat demuxer.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    settings: EncoderSettings,
    runner: FfmpegRunner,
}

impl FfmpegEncoder {
    pub fn new(settings: EncoderSettings) -> Self {
        let runner = FfmpegRunner::new()
            .with_program(settings.ffmpeg_path.clone())
            .with_timeout(settings.timeout_secs);
        Self { settings, runner }
    }

    pub fn settings(&self) -> &EncoderSettings {
        &self.settings
    }

    /// Build the FFmpeg invocation for a manifest.
    pub fn build_command(
        &self,
        manifest_path: &Path,
        output_path: &Path,
        frame_count: usize,
    ) -> FfmpegCommand {
        let fade = FadeTiming::for_slideshow(
            frame_count,
            self.settings.frame_duration,
            self.settings.fade_duration,
        );

        FfmpegCommand::new(manifest_path, output_path)
            .concat_input()
            .video_filter(fade.to_filter())
            .pixel_format(PIXEL_FORMAT_COMPAT)
            .log_level("error")
    }
}

#[async_trait]
impl SlideshowEncoder for FfmpegEncoder {
    async fn encode(
        &self,
        manifest_path: &Path,
        output_path: &Path,
        frame_count: usize,
    ) -> MediaResult<()> {
        let cmd = self.build_command(manifest_path, output_path, frame_count);
        debug!(frames = frame_count, "Encoding slideshow");

        self.runner.run(&cmd).await?;

        // FFmpeg writes the container trailer before exiting; anything
        // missing or empty here means it bailed out without an error code.
        match fs::metadata(output_path).await {
            Ok(meta) if meta.len() > 0 => {
                info!(frames = frame_count, bytes = meta.len(), "Slideshow encoded");
                Ok(())
            }
            _ => Err(MediaError::MissingOutput(output_path.to_path_buf())),
        }
    }

    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    async fn check(&self) -> MediaResult<()> {
        self.runner.check().map(|_| ())
    }
}

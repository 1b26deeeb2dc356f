//! API configuration.

use std::path::PathBuf;

use photoreel_media::EncoderSettings;
use photoreel_models::{MissingPhotoPolicy, DEFAULT_FADE_DURATION_SECS, DEFAULT_FRAME_DURATION_SECS};

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Rate limit requests per second
    pub rate_limit_rps: u32,
    /// Rate limit burst
    pub rate_limit_burst: u32,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Slideshow pipeline settings
    pub slideshow: SlideshowConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            rate_limit_rps: 10,
            rate_limit_burst: 20,
            max_body_size: 25 * 1024 * 1024, // 25MB, base64 photo uploads
            environment: "development".to_string(),
            slideshow: SlideshowConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8000),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|_| vec!["*".to_string()]),
            rate_limit_rps: std::env::var("RATE_LIMIT_RPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            rate_limit_burst: std::env::var("RATE_LIMIT_BURST")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(20),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(25 * 1024 * 1024),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            slideshow: SlideshowConfig::from_env(),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

/// Slideshow pipeline configuration.
#[derive(Debug, Clone)]
pub struct SlideshowConfig {
    /// Parent directory for per-request staging sessions
    pub staging_dir: PathBuf,
    /// FFmpeg binary (bare name or path)
    pub ffmpeg_path: PathBuf,
    /// Hard limit on one encoder run
    pub encode_timeout_secs: u64,
    /// Seconds each photo stays on screen
    pub frame_duration_secs: u32,
    /// Fade-in / fade-out length
    pub fade_duration_secs: f64,
    /// Handling of ids without stored image data
    pub missing_photos: MissingPhotoPolicy,
    /// Max encoder processes running at once
    pub max_concurrent: usize,
}

impl Default for SlideshowConfig {
    fn default() -> Self {
        Self {
            staging_dir: std::env::temp_dir().join("photoreel"),
            ffmpeg_path: PathBuf::from("ffmpeg"),
            encode_timeout_secs: 120,
            frame_duration_secs: DEFAULT_FRAME_DURATION_SECS,
            fade_duration_secs: DEFAULT_FADE_DURATION_SECS,
            missing_photos: MissingPhotoPolicy::Skip,
            max_concurrent: 2,
        }
    }
}

impl SlideshowConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            staging_dir: std::env::var("SLIDESHOW_STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.staging_dir),
            ffmpeg_path: std::env::var("SLIDESHOW_FFMPEG_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.ffmpeg_path),
            encode_timeout_secs: std::env::var("SLIDESHOW_ENCODE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.encode_timeout_secs),
            frame_duration_secs: std::env::var("SLIDESHOW_FRAME_DURATION_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.frame_duration_secs),
            fade_duration_secs: std::env::var("SLIDESHOW_FADE_DURATION_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|secs: &f64| secs.is_finite() && *secs >= 0.0)
                .unwrap_or(defaults.fade_duration_secs),
            missing_photos: std::env::var("SLIDESHOW_MISSING_PHOTOS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.missing_photos),
            max_concurrent: std::env::var("SLIDESHOW_MAX_CONCURRENT")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_concurrent),
        }
    }

    /// Settings for the FFmpeg-backed encoder.
    pub fn encoder_settings(&self) -> EncoderSettings {
        EncoderSettings {
            ffmpeg_path: self.ffmpeg_path.clone(),
            timeout_secs: self.encode_timeout_secs,
            frame_duration: self.frame_duration_secs as f64,
            fade_duration: self.fade_duration_secs,
        }
    }
}

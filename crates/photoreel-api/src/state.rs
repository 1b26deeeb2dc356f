//! Application state.

use std::sync::Arc;

use photoreel_media::{FfmpegEncoder, SlideshowEncoder, StagingArea};
use photoreel_storage::{PhotoStore, StorageConfig};

use crate::config::ApiConfig;
use crate::services::SlideshowService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<dyn PhotoStore>,
    pub slideshow: Arc<SlideshowService>,
}

impl AppState {
    /// Create application state from the environment.
    pub async fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let store = StorageConfig::from_env()?.open().await?;
        Ok(Self::with_store(config, store))
    }

    /// Build state around an existing store, encoding with FFmpeg.
    pub fn with_store(config: ApiConfig, store: Arc<dyn PhotoStore>) -> Self {
        let encoder = Arc::new(FfmpegEncoder::new(config.slideshow.encoder_settings()));
        Self::with_encoder(config, store, encoder)
    }

    /// Build state around an existing store and encoder.
    pub fn with_encoder(
        config: ApiConfig,
        store: Arc<dyn PhotoStore>,
        encoder: Arc<dyn SlideshowEncoder>,
    ) -> Self {
        let slideshow = &config.slideshow;
        let service = SlideshowService::new(
            Arc::clone(&store),
            encoder,
            StagingArea::new(&slideshow.staging_dir, slideshow.frame_duration_secs as f64),
            slideshow.missing_photos,
            slideshow.max_concurrent,
        );

        Self {
            config,
            store,
            slideshow: Arc::new(service),
        }
    }
}

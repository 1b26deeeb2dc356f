//! Slideshow generation pipeline.
//!
//! One request moves through these stages:
//!
//! ```text
//! validating -> fetching -> staging -> encoding -> streaming -> cleaning_up
//! ```
//!
//! Every stage after `staging` runs with a live [`StagingSession`], and the
//! session is ended before the result is handed back, whatever the outcome.
//! The work itself runs on its own task so a dropped client connection never
//! interrupts cleanup.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tokio::fs;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, info_span, warn, Instrument};
use validator::Validate;

use photoreel_media::{MediaError, SlideshowEncoder, StagedFrame, StagingArea, StagingSession};
use photoreel_models::{GenerateVideoRequest, MissingPhotoPolicy, PhotoId};
use photoreel_storage::{PhotoStore, StorageError};

use crate::metrics;

/// Errors from the slideshow pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The caller sent something unusable. Raised before any directory exists.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("photo {0} not found")]
    PhotoNotFound(PhotoId),

    #[error("staging failed: {0}")]
    Staging(#[source] MediaError),

    #[error("encoding failed: {0}")]
    Encode(#[source] MediaError),

    #[error("photo store error: {0}")]
    Store(#[from] StorageError),

    #[error("slideshow task aborted")]
    Aborted,
}

impl PipelineError {
    /// Outcome label for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            PipelineError::InvalidRequest(_) => "invalid",
            PipelineError::PhotoNotFound(_) => "not_found",
            PipelineError::Staging(_) => "staging_failed",
            PipelineError::Encode(_) => "encode_failed",
            PipelineError::Store(_) => "store_failed",
            PipelineError::Aborted => "aborted",
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// An encoded slideshow, already read out of its staging session.
#[derive(Debug)]
pub struct RenderedSlideshow {
    pub bytes: Vec<u8>,
    pub frame_count: usize,
}

/// Runs slideshow requests against the photo store and the encoder.
pub struct SlideshowService {
    store: Arc<dyn PhotoStore>,
    encoder: Arc<dyn SlideshowEncoder>,
    staging: StagingArea,
    missing_photos: MissingPhotoPolicy,
    permits: Semaphore,
}

impl SlideshowService {
    pub fn new(
        store: Arc<dyn PhotoStore>,
        encoder: Arc<dyn SlideshowEncoder>,
        staging: StagingArea,
        missing_photos: MissingPhotoPolicy,
        max_concurrent: usize,
    ) -> Self {
        Self {
            store,
            encoder,
            staging,
            missing_photos,
            permits: Semaphore::new(max_concurrent.max(1)),
        }
    }

    pub fn encoder(&self) -> &dyn SlideshowEncoder {
        self.encoder.as_ref()
    }

    /// Generate a slideshow for `request`.
    ///
    /// Validation happens inline; everything after it runs on a spawned task
    /// that owns the staging session until cleanup has finished.
    pub async fn generate(
        self: &Arc<Self>,
        request: GenerateVideoRequest,
        request_id: &str,
    ) -> PipelineResult<RenderedSlideshow> {
        let span = info_span!("slideshow", request_id = %request_id);

        if let Err(e) = request.validate() {
            span.in_scope(|| debug!(stage = "validating", error = %e, "Rejected photo selection"));
            metrics::record_slideshow("invalid", 0.0);
            return Err(PipelineError::InvalidRequest("Invalid photos array".to_string()));
        }

        let service = Arc::clone(self);
        let task = tokio::spawn(async move { service.run(request).await }.instrument(span.clone()));

        match task.await {
            Ok(result) => result,
            Err(e) => {
                span.in_scope(|| error!(error = %e, "Slideshow task did not complete"));
                metrics::record_slideshow(PipelineError::Aborted.outcome(), 0.0);
                Err(PipelineError::Aborted)
            }
        }
    }

    async fn run(&self, request: GenerateVideoRequest) -> PipelineResult<RenderedSlideshow> {
        let started = Instant::now();
        info!(photos = request.photos.len(), "Slideshow requested");

        let result = self.render(&request.photos).await;
        let elapsed = started.elapsed().as_secs_f64();

        match &result {
            Ok(rendered) => {
                metrics::record_slideshow("success", elapsed);
                metrics::record_slideshow_frames(rendered.frame_count);
                info!(
                    frames = rendered.frame_count,
                    bytes = rendered.bytes.len(),
                    elapsed_ms = (elapsed * 1000.0) as u64,
                    "Slideshow generated"
                );
            }
            Err(e) => {
                metrics::record_slideshow(e.outcome(), elapsed);
                warn!(error = %e, outcome = e.outcome(), "Slideshow failed");
            }
        }

        result
    }

    async fn render(&self, ids: &[PhotoId]) -> PipelineResult<RenderedSlideshow> {
        debug!(stage = "fetching");
        let images = self.fetch(ids).await?;
        if images.is_empty() {
            return Err(PipelineError::InvalidRequest(
                "No photos could be resolved".to_string(),
            ));
        }

        let _permit = self.permits.acquire().await.map_err(|_| PipelineError::Aborted)?;

        debug!(stage = "staging", frames = images.len());
        let mut session = self
            .staging
            .begin_session()
            .await
            .map_err(PipelineError::Staging)?;

        let result = self.encode_in(&session, &images).await;

        debug!(stage = "cleaning_up", dir = %session.dir().display());
        if let Err(e) = session.end().await {
            warn!(error = %e, "Failed to remove staging session");
        }

        result
    }

    /// Resolve ids to image bytes, in request order.
    async fn fetch(&self, ids: &[PhotoId]) -> PipelineResult<Vec<Vec<u8>>> {
        let mut images = Vec::with_capacity(ids.len());
        for &id in ids {
            match self.store.get_photo_data(id).await? {
                Some(bytes) => images.push(bytes),
                None => match self.missing_photos {
                    MissingPhotoPolicy::Skip => {
                        warn!(photo_id = %id, "Skipping photo without image data");
                    }
                    MissingPhotoPolicy::Fail => return Err(PipelineError::PhotoNotFound(id)),
                },
            }
        }
        Ok(images)
    }

    async fn encode_in(
        &self,
        session: &StagingSession,
        images: &[Vec<u8>],
    ) -> PipelineResult<RenderedSlideshow> {
        let mut frames: Vec<StagedFrame> = Vec::with_capacity(images.len());
        for (index, bytes) in images.iter().enumerate() {
            let frame = session
                .write_frame(index, bytes)
                .await
                .map_err(PipelineError::Staging)?;
            frames.push(frame);
        }
        let manifest_path = session
            .write_manifest(&frames)
            .await
            .map_err(PipelineError::Staging)?;

        debug!(stage = "encoding", encoder = self.encoder.name(), frames = frames.len());
        let output_path = session.output_path();
        if let Err(e) = self
            .encoder
            .encode(&manifest_path, &output_path, frames.len())
            .await
        {
            error!(
                encoder = self.encoder.name(),
                error = %e,
                stderr = e.stderr().unwrap_or_default(),
                "Slideshow encoding failed"
            );
            return Err(PipelineError::Encode(e));
        }

        debug!(stage = "streaming");
        let bytes = fs::read(&output_path)
            .await
            .map_err(|e| PipelineError::Staging(MediaError::staging(&output_path, e)))?;

        Ok(RenderedSlideshow {
            bytes,
            frame_count: frames.len(),
        })
    }
}

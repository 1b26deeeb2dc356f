//! Shared fixtures for API integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use photoreel_api::{create_router, ApiConfig, AppState};
use photoreel_media::{Manifest, MediaError, MediaResult, SlideshowEncoder};
use photoreel_models::NewPhoto;
use photoreel_storage::{MemStorage, PhotoStore};

/// Encoder stand-in: concatenates the staged frames listed in the manifest.
#[derive(Default)]
pub struct ConcatEncoder {
    pub manifests: Mutex<Vec<String>>,
    pub session_dirs: Mutex<Vec<PathBuf>>,
    pub fail: bool,
    pub delay: Option<Duration>,
}

impl ConcatEncoder {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }
}

#[async_trait]
impl SlideshowEncoder for ConcatEncoder {
    async fn encode(
        &self,
        manifest_path: &Path,
        output_path: &Path,
        _frame_count: usize,
    ) -> MediaResult<()> {
        let dir = manifest_path.parent().unwrap().to_path_buf();
        let text = tokio::fs::read_to_string(manifest_path).await?;
        self.manifests.lock().unwrap().push(text.clone());
        self.session_dirs.lock().unwrap().push(dir.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(MediaError::encode_failed(
                "ffmpeg exited with status 1",
                Some(format!("{}: Invalid data found when processing input", dir.display())),
                Some(1),
            ));
        }

        let mut out = Vec::new();
        for frame in Manifest::parse(&text, &dir).frames() {
            out.extend(tokio::fs::read(&frame.path).await?);
        }
        tokio::fs::write(output_path, out).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "concat"
    }
}

/// Router plus the handles a test needs to inspect side effects.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemStorage>,
    pub encoder: Arc<ConcatEncoder>,
    pub staging: TempDir,
}

impl TestApp {
    pub fn staging_root(&self) -> PathBuf {
        self.staging.path().join("sessions")
    }

    /// Number of entries left under the staging root.
    pub fn leftover_sessions(&self) -> usize {
        match std::fs::read_dir(self.staging_root()) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub fn test_config(staging_root: &Path) -> ApiConfig {
    let mut config = ApiConfig::default();
    config.slideshow.staging_dir = staging_root.to_path_buf();
    config
}

pub async fn test_app(encoder: ConcatEncoder) -> TestApp {
    let staging = TempDir::new().unwrap();
    let store = Arc::new(MemStorage::new());
    let encoder = Arc::new(encoder);
    let config = test_config(&staging.path().join("sessions"));

    let state = AppState::with_encoder(config, store.clone(), encoder.clone());
    TestApp {
        router: create_router(state, None),
        store,
        encoder,
        staging,
    }
}

/// Store a photo with the given image bytes and return its id.
pub async fn add_photo(store: &MemStorage, data: &[u8]) -> i64 {
    let photo = store
        .create_photo(
            NewPhoto {
                title: "photo".to_string(),
                description: None,
                url: "https://example.com/photo.jpg".to_string(),
                tags: vec![],
                album_id: None,
                image_data: None,
            },
            Some(data.to_vec()),
        )
        .await
        .unwrap();
    photo.id.as_i64()
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

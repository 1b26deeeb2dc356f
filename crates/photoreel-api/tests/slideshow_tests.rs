//! Slideshow endpoint integration tests.

mod common;

use std::time::Duration;

use axum::http::{header, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use common::*;

#[tokio::test]
async fn test_three_photos_produce_video() {
    let app = test_app(ConcatEncoder::default()).await;
    let a = add_photo(&app.store, b"img1").await;
    let b = add_photo(&app.store, b"img2").await;
    let c = add_photo(&app.store, b"img3").await;

    let response = app
        .send(json_request("POST", "/api/generate-video", json!({ "photos": [a, b, c] })))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "video/mp4");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"slideshow.mp4\""
    );
    assert_eq!(body_bytes(response).await, b"img1img2img3");

    let manifests = app.encoder.manifests.lock().unwrap();
    let manifest = &manifests[0];
    assert_eq!(
        manifest.as_str(),
        "file 'photo-0.jpg'\nduration 3\n\
         file 'photo-1.jpg'\nduration 3\n\
         file 'photo-2.jpg'\nduration 3\n"
    );
    drop(manifests);

    assert_eq!(app.leftover_sessions(), 0);
}

#[tokio::test]
async fn test_frame_order_follows_request_with_duplicates() {
    let app = test_app(ConcatEncoder::default()).await;
    let a = add_photo(&app.store, b"A").await;
    let b = add_photo(&app.store, b"B").await;

    let response = app
        .send(json_request("POST", "/api/generate-video", json!({ "photos": [b, a, b] })))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"BAB");
}

#[tokio::test]
async fn test_empty_selection_is_rejected_before_staging() {
    let app = test_app(ConcatEncoder::default()).await;

    let response = app
        .send(json_request("POST", "/api/generate-video", json!({ "photos": [] })))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({ "message": "Invalid photos array" }));
    assert!(!app.staging_root().exists());
    assert!(app.encoder.manifests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let app = test_app(ConcatEncoder::default()).await;

    for body in [json!({}), json!({ "photos": "1,2" }), json!({ "photos": ["a"] })] {
        let response = app
            .send(json_request("POST", "/api/generate-video", body))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["message"], "Invalid photos array");
    }
    assert!(!app.staging_root().exists());
}

#[tokio::test]
async fn test_missing_photo_is_skipped() {
    let app = test_app(ConcatEncoder::default()).await;
    let a = add_photo(&app.store, b"img1").await;
    let b = add_photo(&app.store, b"img2").await;

    let response = app
        .send(json_request("POST", "/api/generate-video", json!({ "photos": [a, 999, b] })))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"img1img2");

    // Indices stay contiguous across the skipped id.
    let manifests = app.encoder.manifests.lock().unwrap();
    assert_eq!(manifests[0].matches("file '").count(), 2);
    assert!(manifests[0].contains("photo-1.jpg"));
    assert!(!manifests[0].contains("photo-2.jpg"));
}

#[tokio::test]
async fn test_no_resolvable_photos_is_bad_request() {
    let app = test_app(ConcatEncoder::default()).await;

    let response = app
        .send(json_request("POST", "/api/generate-video", json!({ "photos": [41, 42] })))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({ "message": "No photos could be resolved" })
    );
    assert_eq!(app.leftover_sessions(), 0);
}

#[tokio::test]
async fn test_encoder_failure_cleans_up_and_hides_details() {
    let app = test_app(ConcatEncoder::failing()).await;
    let a = add_photo(&app.store, b"img1").await;

    let response = app
        .send(json_request("POST", "/api/generate-video", json!({ "photos": [a] })))
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body, json!({ "message": "Failed to generate video" }));

    // The encoder did run inside a session, and that session is gone.
    let dirs = app.encoder.session_dirs.lock().unwrap().clone();
    assert_eq!(dirs.len(), 1);
    assert!(!dirs[0].exists());
    assert_eq!(app.leftover_sessions(), 0);
}

#[tokio::test]
async fn test_concurrent_requests_use_distinct_sessions() {
    let app = test_app(ConcatEncoder::slow(Duration::from_millis(50))).await;
    let a = add_photo(&app.store, b"x").await;
    let b = add_photo(&app.store, b"y").await;

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let photos = if i % 2 == 0 { vec![a, b] } else { vec![b, a] };
            let request = json_request("POST", "/api/generate-video", json!({ "photos": photos }));
            let router = app.router.clone();
            tokio::spawn(async move { router.oneshot(request).await.unwrap() })
        })
        .collect();

    let mut responses = Vec::new();
    for handle in handles {
        responses.push(handle.await.unwrap());
    }

    for (i, response) in responses.into_iter().enumerate() {
        assert_eq!(response.status(), StatusCode::OK);
        let expected: &[u8] = if i % 2 == 0 { b"xy" } else { b"yx" };
        assert_eq!(body_bytes(response).await, expected);
    }

    let mut dirs = app.encoder.session_dirs.lock().unwrap().clone();
    dirs.sort();
    dirs.dedup();
    assert_eq!(dirs.len(), 4);
    assert_eq!(app.leftover_sessions(), 0);
}

#[tokio::test]
async fn test_client_disconnect_still_cleans_up() {
    let app = test_app(ConcatEncoder::slow(Duration::from_millis(300))).await;
    let a = add_photo(&app.store, b"x").await;
    let b = add_photo(&app.store, b"y").await;

    let request = json_request("POST", "/api/generate-video", json!({ "photos": [a, b] }));
    let dropped = tokio::time::timeout(Duration::from_millis(100), app.send(request)).await;
    assert!(dropped.is_err());

    assert_eq!(app.encoder.session_dirs.lock().unwrap().len(), 1);
    assert_eq!(app.leftover_sessions(), 1);

    for _ in 0..200 {
        if app.leftover_sessions() == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("staging session left behind after the client went away");
}

#[tokio::test]
async fn test_staging_failure_cleans_up() {
    let app = test_app(ConcatEncoder::default()).await;
    let a = add_photo(&app.store, b"x").await;
    let empty = add_photo(&app.store, b"").await;

    let response = app
        .send(json_request("POST", "/api/generate-video", json!({ "photos": [a, empty] })))
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["message"], "Failed to generate video");
    assert!(app.encoder.manifests.lock().unwrap().is_empty());
    assert_eq!(app.leftover_sessions(), 0);
}

#[cfg(unix)]
#[tokio::test]
async fn test_ffmpeg_encoder_end_to_end() {
    use std::os::unix::fs::PermissionsExt;
    use std::sync::Arc;

    use photoreel_api::{create_router, AppState};
    use photoreel_storage::MemStorage;
    use tempfile::TempDir;

    let dir = TempDir::new().unwrap();
    let ffmpeg = dir.path().join("ffmpeg");
    // Copies the argument list into the output file, which is the last argument.
    std::fs::write(
        &ffmpeg,
        "#!/bin/sh\nfor last; do :; done\necho \"$@\" > \"$last\"\n",
    )
    .unwrap();
    std::fs::set_permissions(&ffmpeg, std::fs::Permissions::from_mode(0o755)).unwrap();

    let store = Arc::new(MemStorage::new());
    let a = add_photo(&store, b"img1").await;
    let b = add_photo(&store, b"img2").await;

    let mut config = test_config(&dir.path().join("sessions"));
    config.slideshow.ffmpeg_path = ffmpeg;
    let router = create_router(AppState::with_store(config, store), None);

    let response = router
        .oneshot(json_request("POST", "/api/generate-video", json!({ "photos": [a, b] })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let args = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(args.contains("-f concat -safe 0 -i"));
    assert!(args.contains("fade=t=in:st=0:d=1,fade=t=out:st=5:d=1"));
    assert!(args.contains("-pix_fmt yuv420p"));
    assert_eq!(std::fs::read_dir(dir.path().join("sessions")).unwrap().count(), 0);
}

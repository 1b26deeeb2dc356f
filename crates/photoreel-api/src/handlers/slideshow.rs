//! Slideshow generation handler.

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::{Extension, Json};
use tracing::debug;

use photoreel_models::{GenerateVideoRequest, SLIDESHOW_CONTENT_TYPE, SLIDESHOW_FILENAME};

use crate::error::{ApiError, ApiResult};
use crate::middleware::RequestId;
use crate::state::AppState;

/// Render the selected photos into an MP4 and return it as a download.
///
/// A body whose `photos` field is missing or not an array of ids is treated
/// the same as an empty selection.
pub async fn generate_video(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    payload: Result<Json<GenerateVideoRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(request) = payload.map_err(|e| {
        debug!(error = %e, "Rejected slideshow payload");
        ApiError::bad_request("Invalid photos array")
    })?;

    let request_id = request_id
        .map(|Extension(id)| id.0)
        .unwrap_or_default();
    let rendered = state.slideshow.generate(request, &request_id).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, SLIDESHOW_CONTENT_TYPE)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", SLIDESHOW_FILENAME),
        )
        .header(header::CONTENT_LENGTH, rendered.bytes.len())
        .body(Body::from(rendered.bytes))
        .map_err(|e| ApiError::internal(e.to_string()))
}

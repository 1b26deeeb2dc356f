//! Photo API handlers.

use axum::body::{Body, Bytes};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use tracing::{debug, info};
use validator::Validate;

use photoreel_models::{NewPhoto, Photo, PhotoId};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Stored frames are served as-is; the pipeline never re-encodes them.
const IMAGE_CONTENT_TYPE: &str = "image/jpeg";

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Parse a photo id path segment.
fn parse_photo_id(raw: &str) -> ApiResult<PhotoId> {
    raw.parse()
        .map_err(|_| ApiError::bad_request("Invalid photo ID"))
}

/// List every photo.
pub async fn list_photos(State(state): State<AppState>) -> ApiResult<Json<Vec<Photo>>> {
    Ok(Json(state.store.get_photos().await?))
}

/// Case-insensitive search over titles and tags.
pub async fn search_photos(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Photo>>> {
    let q = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::bad_request("Search query required"))?;

    Ok(Json(state.store.search_photos(q).await?))
}

/// Create a photo, optionally with base64 image data.
pub async fn create_photo(
    State(state): State<AppState>,
    payload: Result<Json<NewPhoto>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Photo>)> {
    let invalid = || ApiError::bad_request("Invalid photo data");

    let Json(mut photo) = payload.map_err(|e| {
        debug!(error = %e, "Rejected photo payload");
        invalid()
    })?;
    photo.validate().map_err(|e| {
        debug!(error = %e, "Photo failed validation");
        invalid()
    })?;
    let data = photo.decode_image_data().map_err(|e| {
        debug!(error = %e, "Photo image data is not valid base64");
        invalid()
    })?;

    if let Some(album_id) = photo.album_id {
        if state.store.get_album(album_id).await?.is_none() {
            return Err(invalid());
        }
    }

    // Bytes are stored beside the record, not in it.
    photo.image_data = None;
    let created = state.store.create_photo(photo, data).await?;
    info!(photo_id = %created.id, "Photo created");

    Ok((StatusCode::CREATED, Json(created)))
}

/// Raw image bytes for a photo.
pub async fn get_photo_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let id = parse_photo_id(&id)?;
    let bytes = state
        .store
        .get_photo_data(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Image not found"))?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, IMAGE_CONTENT_TYPE)
        .header(header::CONTENT_LENGTH, bytes.len())
        .body(Body::from(bytes))
        .map_err(|e| ApiError::internal(e.to_string()))
}

/// Replace a photo's image bytes with the raw request body.
pub async fn put_photo_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let id = parse_photo_id(&id)?;
    if body.is_empty() {
        return Err(ApiError::bad_request("Image data required"));
    }
    if state.store.get_photo(id).await?.is_none() {
        return Err(ApiError::not_found("Photo not found"));
    }

    state.store.set_photo_data(id, body.to_vec()).await?;
    debug!(photo_id = %id, bytes = body.len(), "Photo image replaced");

    Ok(StatusCode::NO_CONTENT)
}

/// Delete a photo. Unknown ids are not an error.
pub async fn delete_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_photo_id(&id)?;
    state.store.delete_photo(id).await?;
    info!(photo_id = %id, "Photo deleted");
    Ok(StatusCode::NO_CONTENT)
}

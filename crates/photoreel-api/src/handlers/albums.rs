//! Album API handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::{debug, info};
use validator::Validate;

use photoreel_models::{Album, AlbumId, AlbumWithPhotos, NewAlbum};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

fn parse_album_id(raw: &str) -> ApiResult<AlbumId> {
    raw.parse()
        .map_err(|_| ApiError::bad_request("Invalid album ID"))
}

/// List every album.
pub async fn list_albums(State(state): State<AppState>) -> ApiResult<Json<Vec<Album>>> {
    Ok(Json(state.store.get_albums().await?))
}

/// An album together with its photos.
pub async fn get_album(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<AlbumWithPhotos>> {
    let id = parse_album_id(&id)?;
    let album = state
        .store
        .get_album(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Album not found"))?;
    let photos = state.store.get_photos_by_album(id).await?;

    Ok(Json(AlbumWithPhotos { album, photos }))
}

pub async fn create_album(
    State(state): State<AppState>,
    payload: Result<Json<NewAlbum>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Album>)> {
    let Json(album) = payload.map_err(|e| {
        debug!(error = %e, "Rejected album payload");
        ApiError::bad_request("Invalid album data")
    })?;
    album
        .validate()
        .map_err(|_| ApiError::bad_request("Invalid album data"))?;

    let created = state.store.create_album(album).await?;
    info!(album_id = %created.id, "Album created");

    Ok((StatusCode::CREATED, Json(created)))
}

/// Delete an album. Its photos stay, detached from any album.
pub async fn delete_album(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_album_id(&id)?;
    state.store.delete_album(id).await?;
    info!(album_id = %id, "Album deleted");
    Ok(StatusCode::NO_CONTENT)
}

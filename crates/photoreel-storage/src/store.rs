//! Storage capability shared by every backend.

use async_trait::async_trait;

use photoreel_models::{Album, AlbumId, NewAlbum, NewPhoto, Photo, PhotoId};

use crate::error::StorageResult;

/// Photo and album storage.
///
/// Handlers and the slideshow pipeline only see this trait; the concrete
/// backend is picked once at startup.
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Backend name for logs and readiness checks.
    fn backend_name(&self) -> &'static str;

    /// Verify the backend is usable.
    async fn check_health(&self) -> StorageResult<()> {
        Ok(())
    }

    // Photo operations

    async fn get_photos(&self) -> StorageResult<Vec<Photo>>;

    async fn get_photo(&self, id: PhotoId) -> StorageResult<Option<Photo>>;

    /// Image bytes for a photo. `None` if the photo or its image is absent.
    async fn get_photo_data(&self, id: PhotoId) -> StorageResult<Option<Vec<u8>>>;

    /// Replace a photo's image bytes. Fails with `NotFound` for unknown ids.
    async fn set_photo_data(&self, id: PhotoId, data: Vec<u8>) -> StorageResult<()>;

    async fn get_photos_by_album(&self, album_id: AlbumId) -> StorageResult<Vec<Photo>>;

    async fn create_photo(&self, photo: NewPhoto, data: Option<Vec<u8>>) -> StorageResult<Photo>;

    /// Delete a photo and its image. Unknown ids are ignored.
    async fn delete_photo(&self, id: PhotoId) -> StorageResult<()>;

    /// Case-insensitive substring match on title or any tag.
    async fn search_photos(&self, query: &str) -> StorageResult<Vec<Photo>>;

    // Album operations

    async fn get_albums(&self) -> StorageResult<Vec<Album>>;

    async fn get_album(&self, id: AlbumId) -> StorageResult<Option<Album>>;

    async fn create_album(&self, album: NewAlbum) -> StorageResult<Album>;

    /// Delete an album; its photos stay but lose their album reference.
    async fn delete_album(&self, id: AlbumId) -> StorageResult<()>;
}

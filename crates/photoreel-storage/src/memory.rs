//! Process-lifetime in-memory backend.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use photoreel_models::{Album, AlbumId, NewAlbum, NewPhoto, Photo, PhotoId};

use crate::catalog::Catalog;
use crate::error::{StorageError, StorageResult};
use crate::store::PhotoStore;

#[derive(Debug, Default)]
struct MemState {
    catalog: Catalog,
    images: HashMap<PhotoId, Vec<u8>>,
}

/// Store that keeps everything in memory. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemStorage {
    state: RwLock<MemState>,
}

impl MemStorage {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with the sample photos (no image bytes).
    pub fn with_samples() -> Self {
        Self {
            state: RwLock::new(MemState {
                catalog: Catalog::with_samples(),
                images: HashMap::new(),
            }),
        }
    }
}

#[async_trait]
impl PhotoStore for MemStorage {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get_photos(&self) -> StorageResult<Vec<Photo>> {
        Ok(self.state.read().await.catalog.photos())
    }

    async fn get_photo(&self, id: PhotoId) -> StorageResult<Option<Photo>> {
        Ok(self.state.read().await.catalog.photo(id))
    }

    async fn get_photo_data(&self, id: PhotoId) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.state.read().await.images.get(&id).cloned())
    }

    async fn set_photo_data(&self, id: PhotoId, data: Vec<u8>) -> StorageResult<()> {
        let mut state = self.state.write().await;
        if !state.catalog.contains_photo(id) {
            return Err(StorageError::not_found(format!("photo {}", id)));
        }
        state.images.insert(id, data);
        Ok(())
    }

    async fn get_photos_by_album(&self, album_id: AlbumId) -> StorageResult<Vec<Photo>> {
        Ok(self.state.read().await.catalog.photos_by_album(album_id))
    }

    async fn create_photo(&self, photo: NewPhoto, data: Option<Vec<u8>>) -> StorageResult<Photo> {
        let mut state = self.state.write().await;
        let photo = state.catalog.insert_photo(photo);
        if let Some(data) = data {
            state.images.insert(photo.id, data);
        }
        Ok(photo)
    }

    async fn delete_photo(&self, id: PhotoId) -> StorageResult<()> {
        let mut state = self.state.write().await;
        state.catalog.remove_photo(id);
        state.images.remove(&id);
        Ok(())
    }

    async fn search_photos(&self, query: &str) -> StorageResult<Vec<Photo>> {
        Ok(self.state.read().await.catalog.search(query))
    }

    async fn get_albums(&self) -> StorageResult<Vec<Album>> {
        Ok(self.state.read().await.catalog.albums())
    }

    async fn get_album(&self, id: AlbumId) -> StorageResult<Option<Album>> {
        Ok(self.state.read().await.catalog.album(id))
    }

    async fn create_album(&self, album: NewAlbum) -> StorageResult<Album> {
        Ok(self.state.write().await.catalog.insert_album(album))
    }

    async fn delete_album(&self, id: AlbumId) -> StorageResult<()> {
        self.state.write().await.catalog.remove_album(id);
        Ok(())
    }
}

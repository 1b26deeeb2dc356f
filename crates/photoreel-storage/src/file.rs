//! File-backed backend.
//!
//! Layout under the data directory:
//!
//! ```text
//! <root>/catalog.json      photo and album records
//! <root>/images/<id>.bin   image bytes, one file per photo
//! ```
//!
//! Every write goes to a temporary sibling first and is renamed into place.
//! Catalog changes are made on a copy and only replace the in-memory catalog
//! once the copy has been persisted.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use photoreel_models::{Album, AlbumId, NewAlbum, NewPhoto, Photo, PhotoId};

use crate::catalog::{Catalog, CatalogSnapshot};
use crate::error::{StorageError, StorageResult};
use crate::store::PhotoStore;

const CATALOG_FILE: &str = "catalog.json";
const IMAGES_DIR: &str = "images";

/// Store persisted to a local directory.
#[derive(Debug)]
pub struct FileStorage {
    root: PathBuf,
    catalog: RwLock<Catalog>,
}

impl FileStorage {
    /// Open (or initialise) a store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(root.join(IMAGES_DIR)).await?;

        let catalog_path = root.join(CATALOG_FILE);
        let catalog = match fs::read(&catalog_path).await {
            Ok(bytes) => {
                let snapshot: CatalogSnapshot = serde_json::from_slice(&bytes).map_err(|e| {
                    StorageError::Corrupt(format!("{}: {}", catalog_path.display(), e))
                })?;
                Catalog::from_snapshot(snapshot)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Catalog::default(),
            Err(e) => return Err(e.into()),
        };

        info!(
            root = %root.display(),
            photos = catalog.photos().len(),
            albums = catalog.albums().len(),
            "Opened file storage"
        );

        Ok(Self {
            root,
            catalog: RwLock::new(catalog),
        })
    }

    fn image_path(&self, id: PhotoId) -> PathBuf {
        self.root.join(IMAGES_DIR).join(format!("{}.bin", id))
    }

    async fn persist(&self, catalog: &Catalog) -> StorageResult<()> {
        let body = serde_json::to_vec_pretty(&catalog.snapshot())?;
        write_atomic(&self.root.join(CATALOG_FILE), &body).await
    }
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> StorageResult<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes).await?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

#[async_trait]
impl PhotoStore for FileStorage {
    fn backend_name(&self) -> &'static str {
        "file"
    }

    async fn check_health(&self) -> StorageResult<()> {
        let meta = fs::metadata(&self.root).await?;
        if meta.is_dir() {
            Ok(())
        } else {
            Err(StorageError::config_error(format!(
                "{} is not a directory",
                self.root.display()
            )))
        }
    }

    async fn get_photos(&self) -> StorageResult<Vec<Photo>> {
        Ok(self.catalog.read().await.photos())
    }

    async fn get_photo(&self, id: PhotoId) -> StorageResult<Option<Photo>> {
        Ok(self.catalog.read().await.photo(id))
    }

    async fn get_photo_data(&self, id: PhotoId) -> StorageResult<Option<Vec<u8>>> {
        if !self.catalog.read().await.contains_photo(id) {
            return Ok(None);
        }
        match fs::read(self.image_path(id)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_photo_data(&self, id: PhotoId, data: Vec<u8>) -> StorageResult<()> {
        // Write lock: image writes for one id share a temporary path.
        let catalog = self.catalog.write().await;
        if !catalog.contains_photo(id) {
            return Err(StorageError::not_found(format!("photo {}", id)));
        }
        write_atomic(&self.image_path(id), &data).await?;
        debug!(photo_id = %id, bytes = data.len(), "Stored image data");
        Ok(())
    }

    async fn get_photos_by_album(&self, album_id: AlbumId) -> StorageResult<Vec<Photo>> {
        Ok(self.catalog.read().await.photos_by_album(album_id))
    }

    async fn create_photo(&self, photo: NewPhoto, data: Option<Vec<u8>>) -> StorageResult<Photo> {
        let mut catalog = self.catalog.write().await;
        let mut next = catalog.clone();
        let photo = next.insert_photo(photo);
        let image = self.image_path(photo.id);

        if let Some(data) = data {
            write_atomic(&image, &data).await?;
        }
        if let Err(e) = self.persist(&next).await {
            let _ = fs::remove_file(&image).await;
            return Err(e);
        }

        *catalog = next;
        Ok(photo)
    }

    async fn delete_photo(&self, id: PhotoId) -> StorageResult<()> {
        let mut catalog = self.catalog.write().await;
        let mut next = catalog.clone();
        if next.remove_photo(id).is_none() {
            return Ok(());
        }
        self.persist(&next).await?;
        *catalog = next;

        if let Err(e) = fs::remove_file(self.image_path(id)).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(photo_id = %id, error = %e, "Failed to remove image data");
            }
        }
        Ok(())
    }

    async fn search_photos(&self, query: &str) -> StorageResult<Vec<Photo>> {
        Ok(self.catalog.read().await.search(query))
    }

    async fn get_albums(&self) -> StorageResult<Vec<Album>> {
        Ok(self.catalog.read().await.albums())
    }

    async fn get_album(&self, id: AlbumId) -> StorageResult<Option<Album>> {
        Ok(self.catalog.read().await.album(id))
    }

    async fn create_album(&self, album: NewAlbum) -> StorageResult<Album> {
        let mut catalog = self.catalog.write().await;
        let mut next = catalog.clone();
        let album = next.insert_album(album);
        self.persist(&next).await?;
        *catalog = next;
        Ok(album)
    }

    async fn delete_album(&self, id: AlbumId) -> StorageResult<()> {
        let mut catalog = self.catalog.write().await;
        let mut next = catalog.clone();
        if next.remove_album(id).is_none() {
            return Ok(());
        }
        self.persist(&next).await?;
        *catalog = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn new_photo(title: &str, album_id: Option<AlbumId>) -> NewPhoto {
        NewPhoto {
            title: title.to_string(),
            description: None,
            url: "https://example.com/p.jpg".to_string(),
            tags: vec!["tag".to_string()],
            album_id,
            image_data: None,
        }
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = FileStorage::open(dir.path()).await.unwrap();
            let album = store
                .create_album(NewAlbum {
                    name: "Trip".to_string(),
                    description: None,
                })
                .await
                .unwrap();
            store
                .create_photo(new_photo("a", Some(album.id)), Some(b"jpeg".to_vec()))
                .await
                .unwrap();
        }

        let store = FileStorage::open(dir.path()).await.unwrap();
        let photos = store.get_photos().await.unwrap();
        assert_eq!(photos.len(), 1);
        assert_eq!(store.get_albums().await.unwrap().len(), 1);
        assert_eq!(
            store.get_photo_data(photos[0].id).await.unwrap(),
            Some(b"jpeg".to_vec())
        );

        let next = store.create_photo(new_photo("b", None), None).await.unwrap();
        assert_eq!(next.id, PhotoId(2));
    }

    #[tokio::test]
    async fn test_delete_photo_removes_image() {
        let dir = TempDir::new().unwrap();
        let store = FileStorage::open(dir.path()).await.unwrap();
        let photo = store
            .create_photo(new_photo("a", None), Some(vec![1, 2]))
            .await
            .unwrap();
        let image = store.image_path(photo.id);
        assert!(image.exists());

        store.delete_photo(photo.id).await.unwrap();
        assert!(!image.exists());
        assert_eq!(store.get_photo_data(photo.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_album_persists_detached_photos() {
        let dir = TempDir::new().unwrap();
        let store = FileStorage::open(dir.path()).await.unwrap();
        let album = store
            .create_album(NewAlbum {
                name: "x".to_string(),
                description: None,
            })
            .await
            .unwrap();
        let photo = store.create_photo(new_photo("a", Some(album.id)), None).await.unwrap();
        store.delete_album(album.id).await.unwrap();

        let reopened = FileStorage::open(dir.path()).await.unwrap();
        assert_eq!(reopened.get_photo(photo.id).await.unwrap().unwrap().album_id, None);
    }

    #[tokio::test]
    async fn test_corrupt_catalog_is_reported() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CATALOG_FILE), b"{not json").unwrap();

        let err = FileStorage::open(dir.path()).await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt(_)));
    }

    #[tokio::test]
    async fn test_set_data_requires_photo() {
        let dir = TempDir::new().unwrap();
        let store = FileStorage::open(dir.path()).await.unwrap();
        assert!(store.check_health().await.is_ok());
        let err = store.set_photo_data(PhotoId(5), vec![1]).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_failed_image_write_leaves_catalog_unchanged() {
        let dir = TempDir::new().unwrap();
        let store = FileStorage::open(dir.path()).await.unwrap();
        let images = dir.path().join(IMAGES_DIR);
        std::fs::remove_dir_all(&images).unwrap();
        std::fs::write(&images, b"not a dir").unwrap();

        assert!(store.create_photo(new_photo("a", None), Some(vec![1])).await.is_err());
        assert!(store.get_photos().await.unwrap().is_empty());

        let next = store.create_photo(new_photo("b", None), None).await.unwrap();
        assert_eq!(next.id, PhotoId(1));
        let on_disk: CatalogSnapshot =
            serde_json::from_slice(&std::fs::read(dir.path().join(CATALOG_FILE)).unwrap()).unwrap();
        assert_eq!(on_disk.photos.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_catalog_write_leaves_catalog_unchanged() {
        let dir = TempDir::new().unwrap();
        let store = FileStorage::open(dir.path()).await.unwrap();
        let album = store
            .create_album(NewAlbum {
                name: "kept".to_string(),
                description: None,
            })
            .await
            .unwrap();

        let catalog = dir.path().join(CATALOG_FILE);
        std::fs::remove_file(&catalog).unwrap();
        std::fs::create_dir(&catalog).unwrap();

        let new_album = NewAlbum {
            name: "lost".to_string(),
            description: None,
        };
        assert!(store.create_album(new_album).await.is_err());
        assert!(store.delete_album(album.id).await.is_err());
        assert!(store.create_photo(new_photo("a", None), Some(vec![1])).await.is_err());

        let albums = store.get_albums().await.unwrap();
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].id, album.id);
        assert!(store.get_photos().await.unwrap().is_empty());
        assert!(!store.image_path(PhotoId(1)).exists());
    }

    #[tokio::test]
    async fn test_concurrent_image_writes_for_one_photo() {
        let dir = TempDir::new().unwrap();
        let store = std::sync::Arc::new(FileStorage::open(dir.path()).await.unwrap());
        let photo = store.create_photo(new_photo("a", None), None).await.unwrap();

        let writes = (0..8u8).map(|i| {
            let store = store.clone();
            tokio::spawn(async move { store.set_photo_data(photo.id, vec![i; 16]).await })
        });
        for write in writes.collect::<Vec<_>>() {
            write.await.unwrap().unwrap();
        }

        let data = store.get_photo_data(photo.id).await.unwrap().unwrap();
        assert_eq!(data.len(), 16);
    }
}

//! In-memory catalog of photo and album records.
//!
//! Both backends keep their records in a [`Catalog`]; they differ only in
//! where image bytes live and whether the catalog is persisted.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use photoreel_models::{Album, AlbumId, NewAlbum, NewPhoto, Photo, PhotoId};

/// Remote sample images seeded into a fresh memory store.
const SAMPLE_PHOTO_URLS: [&str; 10] = [
    "https://images.unsplash.com/photo-1518998053901-5348d3961a04",
    "https://images.unsplash.com/photo-1578496479914-7ef3b0193be3",
    "https://images.unsplash.com/photo-1583912267382-49a82d19bd94",
    "https://images.unsplash.com/photo-1576086476234-1103be98f096",
    "https://images.unsplash.com/photo-1579165466741-7f35e4755660",
    "https://images.unsplash.com/photo-1576669801838-1b1c52121e6a",
    "https://images.unsplash.com/photo-1583911860367-8b9fa77c6f4c",
    "https://images.unsplash.com/photo-1583911860205-72f8ac8ddcbe",
    "https://images.unsplash.com/photo-1576086671120-8cf1f46d1373",
    "https://images.unsplash.com/photo-1578496479939-722d9dd1cc5b",
];

#[derive(Debug, Clone)]
pub struct Catalog {
    photos: BTreeMap<PhotoId, Photo>,
    albums: BTreeMap<AlbumId, Album>,
    next_photo_id: i64,
    next_album_id: i64,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            photos: BTreeMap::new(),
            albums: BTreeMap::new(),
            next_photo_id: 1,
            next_album_id: 1,
        }
    }
}

/// Serialized form of a catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSnapshot {
    pub next_photo_id: i64,
    pub next_album_id: i64,
    pub photos: Vec<Photo>,
    pub albums: Vec<Album>,
}

impl Catalog {
    /// Catalog pre-filled with the sample photos.
    pub fn with_samples() -> Self {
        let mut catalog = Self::default();
        for (i, url) in SAMPLE_PHOTO_URLS.iter().enumerate() {
            catalog.insert_photo(NewPhoto {
                title: format!("Sample Photo {}", i + 1),
                description: Some("A sample photo".to_string()),
                url: url.to_string(),
                tags: vec!["sample".to_string()],
                album_id: None,
                image_data: None,
            });
        }
        catalog
    }

    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Self {
        let photos: BTreeMap<_, _> = snapshot.photos.into_iter().map(|p| (p.id, p)).collect();
        let albums: BTreeMap<_, _> = snapshot.albums.into_iter().map(|a| (a.id, a)).collect();

        // Never hand out an id that is already taken, even if the counters are stale.
        let max_photo = photos.keys().map(|id| id.0).max().unwrap_or(0);
        let max_album = albums.keys().map(|id| id.0).max().unwrap_or(0);

        Self {
            photos,
            albums,
            next_photo_id: snapshot.next_photo_id.max(max_photo + 1),
            next_album_id: snapshot.next_album_id.max(max_album + 1),
        }
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            next_photo_id: self.next_photo_id,
            next_album_id: self.next_album_id,
            photos: self.photos.values().cloned().collect(),
            albums: self.albums.values().cloned().collect(),
        }
    }

    pub fn photos(&self) -> Vec<Photo> {
        self.photos.values().cloned().collect()
    }

    pub fn photo(&self, id: PhotoId) -> Option<Photo> {
        self.photos.get(&id).cloned()
    }

    pub fn contains_photo(&self, id: PhotoId) -> bool {
        self.photos.contains_key(&id)
    }

    pub fn photos_by_album(&self, album_id: AlbumId) -> Vec<Photo> {
        self.photos
            .values()
            .filter(|p| p.album_id == Some(album_id))
            .cloned()
            .collect()
    }

    pub fn search(&self, query: &str) -> Vec<Photo> {
        let needle = query.to_lowercase();
        self.photos
            .values()
            .filter(|p| p.matches_query(&needle))
            .cloned()
            .collect()
    }

    pub fn insert_photo(&mut self, photo: NewPhoto) -> Photo {
        let id = PhotoId(self.next_photo_id);
        self.next_photo_id += 1;
        let photo = photo.into_photo(id, Utc::now());
        self.photos.insert(id, photo.clone());
        photo
    }

    pub fn remove_photo(&mut self, id: PhotoId) -> Option<Photo> {
        self.photos.remove(&id)
    }

    pub fn albums(&self) -> Vec<Album> {
        self.albums.values().cloned().collect()
    }

    pub fn album(&self, id: AlbumId) -> Option<Album> {
        self.albums.get(&id).cloned()
    }

    pub fn insert_album(&mut self, album: NewAlbum) -> Album {
        let id = AlbumId(self.next_album_id);
        self.next_album_id += 1;
        let album = album.into_album(id, Utc::now());
        self.albums.insert(id, album.clone());
        album
    }

    /// Remove an album and detach its photos.
    pub fn remove_album(&mut self, id: AlbumId) -> Option<Album> {
        let removed = self.albums.remove(&id);
        for photo in self.photos.values_mut() {
            if photo.album_id == Some(id) {
                photo.album_id = None;
            }
        }
        removed
    }
}

//! Photo and album storage.
//!
//! This crate provides:
//! - The `PhotoStore` trait every backend implements
//! - An in-memory backend (optionally seeded with sample photos)
//! - A file-backed backend persisting records and image bytes to disk
//! - Backend selection from configuration

pub mod catalog;
pub mod config;
pub mod error;
pub mod file;
pub mod memory;
pub mod store;

pub use config::{StorageBackend, StorageConfig};
pub use error::{StorageError, StorageResult};
pub use file::FileStorage;
pub use memory::MemStorage;
pub use store::PhotoStore;

//! Per-request staging directories.
//!
//! Every slideshow render gets its own directory under the staging root.
//! Frames, the manifest and the encoded output all live inside it, and the
//! whole tree is removed when the session ends.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{MediaError, MediaResult};
use crate::manifest::{frame_file_name, Manifest, StagedFrame};

/// Manifest file name inside a session directory.
pub const MANIFEST_FILE_NAME: &str = "manifest.txt";

/// Encoded output file name inside a session directory.
pub const OUTPUT_FILE_NAME: &str = "output.mp4";

/// Prefix of every session directory name.
pub const SESSION_DIR_PREFIX: &str = "slideshow-";

/// Creates staging sessions under a root directory.
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
    frame_duration: f64,
}

impl StagingArea {
    pub fn new(root: impl Into<PathBuf>, frame_duration: f64) -> Self {
        Self {
            root: root.into(),
            frame_duration,
        }
    }

    /// Create a fresh, uniquely named session directory.
    ///
    /// The name carries the creation time in milliseconds plus a random
    /// suffix, so sessions started in the same millisecond never collide.
    pub async fn begin_session(&self) -> MediaResult<StagingSession> {
        let name = format!(
            "{}{}-{}",
            SESSION_DIR_PREFIX,
            Utc::now().timestamp_millis(),
            Uuid::new_v4().simple()
        );
        let dir = self.root.join(name);

        fs::create_dir_all(&dir)
            .await
            .map_err(|e| MediaError::staging(&dir, e))?;

        debug!(dir = %dir.display(), "Staging session created");

        Ok(StagingSession {
            dir,
            frame_duration: self.frame_duration,
            ended: false,
        })
    }
}

/// One request's working directory.
///
/// Call [`StagingSession::end`] on every exit path. If the session is
/// dropped without it (for example when the request task is cancelled),
/// the directory is removed synchronously in `Drop`.
#[derive(Debug)]
pub struct StagingSession {
    dir: PathBuf,
    frame_duration: f64,
    ended: bool,
}

impl StagingSession {
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where the encoder should write its output.
    pub fn output_path(&self) -> PathBuf {
        self.dir.join(OUTPUT_FILE_NAME)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILE_NAME)
    }

    /// Write raw image bytes as frame `index`.
    ///
    /// The bytes are written as-is; callers supply data the encoder can read.
    /// An empty image is rejected since no decoder accepts it.
    pub async fn write_frame(&self, index: usize, bytes: &[u8]) -> MediaResult<StagedFrame> {
        if bytes.is_empty() {
            return Err(MediaError::EmptyFrame(index));
        }
        let path = self.dir.join(frame_file_name(index));
        fs::write(&path, bytes)
            .await
            .map_err(|e| MediaError::staging(&path, e))?;

        Ok(StagedFrame {
            index,
            path,
            duration: self.frame_duration,
        })
    }

    /// Write the concat manifest for `frames`, in the order given.
    pub async fn write_manifest(&self, frames: &[StagedFrame]) -> MediaResult<PathBuf> {
        let path = self.manifest_path();
        let body = Manifest::new(frames.iter().cloned()).render();
        fs::write(&path, body)
            .await
            .map_err(|e| MediaError::staging(&path, e))?;
        Ok(path)
    }

    /// Recursively remove the session directory.
    ///
    /// Safe to call more than once; a directory that is already gone is not
    /// an error.
    pub async fn end(&mut self) -> MediaResult<()> {
        if self.ended {
            return Ok(());
        }
        self.ended = true;

        match fs::remove_dir_all(&self.dir).await {
            Ok(()) => {
                debug!(dir = %self.dir.display(), "Staging session removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                metrics::counter!("photoreel_staging_cleanup_failures_total").increment(1);
                Err(MediaError::staging(&self.dir, e))
            }
        }
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl Drop for StagingSession {
    fn drop(&mut self) {
        if self.ended {
            return;
        }
        // Only reached on panic or task cancellation, so blocking here is rare.
        match std::fs::remove_dir_all(&self.dir) {
            Ok(()) => warn!(
                dir = %self.dir.display(),
                "Staging session dropped without end(); removed directory"
            ),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                metrics::counter!("photoreel_staging_cleanup_failures_total").increment(1);
                warn!(
                    dir = %self.dir.display(),
                    error = %e,
                    "Failed to remove dropped staging session"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn area(root: &TempDir) -> StagingArea {
        StagingArea::new(root.path().join("staging"), 3.0)
    }

    #[tokio::test]
    async fn test_begin_session_creates_nested_root() {
        let root = TempDir::new().unwrap();
        let mut session = area(&root).begin_session().await.unwrap();

        assert!(session.dir().is_dir());
        assert!(session.dir().starts_with(root.path().join("staging")));
        let name = session.dir().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(SESSION_DIR_PREFIX));

        session.end().await.unwrap();
    }

    #[tokio::test]
    async fn test_sessions_get_distinct_directories() {
        let root = TempDir::new().unwrap();
        let area = area(&root);
        let (mut a, mut b) = tokio::join!(area.begin_session(), area.begin_session());
        let (a, b) = (a.as_mut().unwrap(), b.as_mut().unwrap());

        assert_ne!(a.dir(), b.dir());

        a.write_frame(0, b"frame-a").await.unwrap();
        b.write_frame(0, b"frame-b").await.unwrap();
        assert_eq!(std::fs::read(a.dir().join("photo-0.jpg")).unwrap(), b"frame-a");
        assert_eq!(std::fs::read(b.dir().join("photo-0.jpg")).unwrap(), b"frame-b");

        a.end().await.unwrap();
        b.end().await.unwrap();
    }

    #[tokio::test]
    async fn test_write_frame_and_manifest() {
        let root = TempDir::new().unwrap();
        let mut session = area(&root).begin_session().await.unwrap();

        let mut frames = Vec::new();
        for (index, bytes) in [b"one".as_slice(), b"two".as_slice()].into_iter().enumerate() {
            frames.push(session.write_frame(index, bytes).await.unwrap());
        }
        assert_eq!(frames[1].path, session.dir().join("photo-1.jpg"));
        assert_eq!(frames[1].duration, 3.0);

        let manifest_path = session.write_manifest(&frames).await.unwrap();
        let text = std::fs::read_to_string(&manifest_path).unwrap();
        assert_eq!(
            text,
            "file 'photo-0.jpg'\nduration 3\nfile 'photo-1.jpg'\nduration 3\n"
        );

        session.end().await.unwrap();
    }

    #[tokio::test]
    async fn test_end_removes_everything_and_is_idempotent() {
        let root = TempDir::new().unwrap();
        let mut session = area(&root).begin_session().await.unwrap();
        session.write_frame(0, b"x").await.unwrap();
        let dir = session.dir().to_path_buf();

        session.end().await.unwrap();
        assert!(!dir.exists());
        assert!(session.is_ended());

        session.end().await.unwrap();
    }

    #[tokio::test]
    async fn test_end_tolerates_externally_removed_directory() {
        let root = TempDir::new().unwrap();
        let mut session = area(&root).begin_session().await.unwrap();
        std::fs::remove_dir_all(session.dir()).unwrap();

        session.end().await.unwrap();
    }

    #[tokio::test]
    async fn test_drop_without_end_removes_directory() {
        let root = TempDir::new().unwrap();
        let session = area(&root).begin_session().await.unwrap();
        session.write_frame(0, b"x").await.unwrap();
        let dir = session.dir().to_path_buf();

        drop(session);
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_empty_frame_is_rejected() {
        let root = TempDir::new().unwrap();
        let mut session = area(&root).begin_session().await.unwrap();

        let err = session.write_frame(2, b"").await.unwrap_err();
        assert!(matches!(err, MediaError::EmptyFrame(2)));
        assert!(!session.dir().join("photo-2.jpg").exists());

        session.end().await.unwrap();
    }

    #[tokio::test]
    async fn test_unwritable_root_is_staging_error() {
        let root = TempDir::new().unwrap();
        let blocker = root.path().join("file");
        std::fs::write(&blocker, b"not a dir").unwrap();

        let err = StagingArea::new(blocker.join("staging"), 3.0)
            .begin_session()
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Staging { .. }));
    }
}

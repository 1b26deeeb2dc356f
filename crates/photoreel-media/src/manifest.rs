//! Concat-demuxer manifest for slideshow frames.
//!
//! The manifest is the text file FFmpeg's `concat` input reads:
//!
//! ```text
//! file 'photo-0.jpg'
//! duration 3
//! file 'photo-1.jpg'
//! duration 3
//! ```

use std::path::{Path, PathBuf};

use crate::filters::format_seconds;

/// One photo written into a staging session.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedFrame {
    /// Position in the slideshow, 0-based and gapless
    pub index: usize,
    /// Location of the image file
    pub path: PathBuf,
    /// Seconds on screen
    pub duration: f64,
}

impl StagedFrame {
    /// Name of the frame file, as referenced from the manifest.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| frame_file_name(self.index))
    }
}

/// File name used for the frame at `index`.
pub fn frame_file_name(index: usize) -> String {
    format!("photo-{}.jpg", index)
}

/// Ordered list of frames.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    frames: Vec<StagedFrame>,
}

impl Manifest {
    pub fn new(frames: impl IntoIterator<Item = StagedFrame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    pub fn frames(&self) -> &[StagedFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Sum of all frame durations in seconds.
    pub fn total_duration(&self) -> f64 {
        self.frames.iter().map(|f| f.duration).sum()
    }

    /// Serialize in concat-demuxer syntax, in the order frames were given.
    ///
    /// Entries are written relative to the manifest's own directory, which
    /// is where FFmpeg resolves relative `file` lines.
    pub fn render(&self) -> String {
        let mut body = String::new();
        for frame in &self.frames {
            body.push_str("file '");
            body.push_str(&escape_concat_path(&frame.file_name()));
            body.push_str("'\n");
            body.push_str("duration ");
            body.push_str(&format_seconds(frame.duration));
            body.push('\n');
        }
        body
    }

    /// Parse a manifest previously produced by [`Manifest::render`].
    ///
    /// Frame paths are resolved against `dir`. Unknown directives are ignored.
    pub fn parse(text: &str, dir: &Path) -> Self {
        let mut frames: Vec<StagedFrame> = Vec::new();
        for line in text.lines().map(str::trim) {
            if let Some(rest) = line.strip_prefix("file ") {
                let name = unescape_concat_path(rest.trim().trim_matches('\''));
                frames.push(StagedFrame {
                    index: frames.len(),
                    path: dir.join(name),
                    duration: 0.0,
                });
            } else if let Some(rest) = line.strip_prefix("duration ") {
                if let (Some(frame), Ok(secs)) = (frames.last_mut(), rest.trim().parse::<f64>()) {
                    frame.duration = secs;
                }
            }
        }
        Self { frames }
    }
}

/// Escape a path for a single-quoted concat `file` directive.
fn escape_concat_path(name: &str) -> String {
    name.replace('\'', r"'\''")
}

fn unescape_concat_path(name: &str) -> String {
    name.replace(r"'\''", "'")
}

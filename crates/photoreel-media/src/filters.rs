//! FFmpeg video filter definitions for slideshows.

/// Pixel format that plays back everywhere (browsers, QuickTime, phones).
pub const PIXEL_FORMAT_COMPAT: &str = "yuv420p";

/// Fade-in/fade-out placement for a whole slideshow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeTiming {
    /// Fade-in start (always 0)
    pub fade_in_start: f64,
    /// Fade-out start, measured from the beginning of the video
    pub fade_out_start: f64,
    /// Length of each fade
    pub duration: f64,
}

impl FadeTiming {
    /// Compute fades for `frame_count` slides of `frame_duration` seconds each.
    ///
    /// The fade-out ends exactly at the end of the video, and neither fade
    /// is longer than half the video so they never overlap.
    pub fn for_slideshow(frame_count: usize, frame_duration: f64, fade_duration: f64) -> Self {
        let total = frame_count as f64 * frame_duration.max(0.0);
        let duration = fade_duration.max(0.0).min(total / 2.0);
        Self {
            fade_in_start: 0.0,
            fade_out_start: (total - duration).max(0.0),
            duration,
        }
    }

    /// Render as an FFmpeg `-vf` filter graph.
    pub fn to_filter(&self) -> String {
        format!(
            "fade=t=in:st={}:d={},fade=t=out:st={}:d={}",
            format_seconds(self.fade_in_start),
            format_seconds(self.duration),
            format_seconds(self.fade_out_start),
            format_seconds(self.duration),
        )
    }
}

/// Format seconds without trailing zeros (`2`, `0.5`, `1.25`).
pub fn format_seconds(seconds: f64) -> String {
    let rendered = format!("{:.3}", seconds);
    let trimmed = rendered.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

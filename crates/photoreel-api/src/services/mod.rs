//! Business logic services.

pub mod slideshow;

pub use slideshow::{PipelineError, PipelineResult, RenderedSlideshow, SlideshowService};

//! Request handlers.

pub mod albums;
pub mod health;
pub mod photos;
pub mod slideshow;

pub use albums::*;
pub use health::*;
pub use photos::*;
pub use slideshow::*;

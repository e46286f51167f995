//! Hybrid single-object tracking: a cheap local tracker runs every frame and
//! an expensive re-detector takes over whenever the tracked region changes
//! too much between frames.

pub mod evaluation;
pub mod pipeline;
pub mod shared;
pub mod tracking;
pub mod video;

use crate::shared::bbox::BBox;
use crate::shared::tracking_error::TrackingError;
use crate::video::domain::frame_source::FrameSource;

/// One labelled benchmark sequence: its frames plus the initial target box.
pub trait SequenceSource: Send + Sync {
    fn label(&self) -> &str;

    /// Opens the frames and reads the initial box. Errors mean the sequence
    /// cannot be evaluated and is skipped.
    fn open(&self) -> Result<(Box<dyn FrameSource>, BBox), TrackingError>;
}

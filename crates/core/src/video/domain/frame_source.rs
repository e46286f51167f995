use crate::shared::frame::Frame;
use crate::shared::tracking_error::TrackingError;

/// Pull-based supplier of decoded frames for one sequence.
///
/// `Ok(None)` marks the end of the sequence. Frames carry their 0-based
/// index in the sequence.
pub trait FrameSource: Send {
    /// Number of frames the sequence is expected to hold, when known.
    /// Used to backfill records after an early termination.
    fn total_frames(&self) -> Option<usize>;

    fn next_frame(&mut self) -> Result<Option<Frame>, TrackingError>;
}

use crate::shared::bbox::Corners;
use crate::shared::frame::Frame;

/// Costly, globally-searching tracker that recovers the target from a
/// fresh frame. Always answers with a box; there is no success flag.
///
/// Works in corner form; conversion from [`BBox`](crate::shared::bbox::BBox)
/// happens in the arbiter.
pub trait ReDetector: Send {
    fn init(&mut self, frame: &Frame, corners: &Corners) -> Result<(), Box<dyn std::error::Error>>;

    fn track(&mut self, frame: &Frame) -> Result<Corners, Box<dyn std::error::Error>>;
}

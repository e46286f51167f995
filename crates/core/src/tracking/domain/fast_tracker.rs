use crate::shared::bbox::BBox;
use crate::shared::frame::Frame;

/// Cheap, locally-adapting single-object tracker.
///
/// Implementations hold an appearance model that drifts with each update,
/// hence `&mut self`. `update` reports whether it still believes it has the
/// target; the returned box is only meaningful when that flag is `true`.
pub trait FastTracker: Send {
    fn init(&mut self, frame: &Frame, bbox: &BBox) -> Result<(), Box<dyn std::error::Error>>;

    fn update(&mut self, frame: &Frame) -> Result<(BBox, bool), Box<dyn std::error::Error>>;
}

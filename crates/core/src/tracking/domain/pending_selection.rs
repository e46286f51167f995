use crate::shared::bbox::BBox;

/// Initial target box handed to [`TrackerArbiter::start`].
///
/// Replaces any process-wide "current selection" state: whoever picks the
/// target (ground truth file, command line, pointer drag) builds one of these
/// and passes it in.
///
/// [`TrackerArbiter::start`]: super::tracker_arbiter::TrackerArbiter::start
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingSelection {
    bbox: BBox,
}

impl PendingSelection {
    pub fn new(bbox: BBox) -> Self {
        Self { bbox }
    }

    /// Builds a selection from two drag endpoints given in any order.
    pub fn from_drag(start: (f64, f64), end: (f64, f64)) -> Self {
        let x = start.0.min(end.0);
        let y = start.1.min(end.1);
        Self::new(BBox::new(
            x,
            y,
            (start.0 - end.0).abs(),
            (start.1 - end.1).abs(),
        ))
    }

    pub fn bbox(&self) -> BBox {
        self.bbox
    }
}

impl From<BBox> for PendingSelection {
    fn from(bbox: BBox) -> Self {
        Self::new(bbox)
    }
}

use std::path::PathBuf;

use thiserror::Error;

use super::tracker_kind::TrackerKind;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackingError {
    #[error("cannot fingerprint an empty region")]
    InvalidRegion,
    #[error("initial box has zero area after sanitization")]
    InvalidInitialBox,
    #[error("{tracker} lost the target: {reason}")]
    TrackLost { tracker: TrackerKind, reason: String },
    #[error("tracked box collapsed to zero area on consecutive frames")]
    BoxCollapsed,
    #[error("failed to initialize {tracker}: {reason}")]
    TrackerInit { tracker: TrackerKind, reason: String },
    #[error("frame {index} unavailable: {reason}")]
    FrameUnavailable { index: usize, reason: String },
    #[error("no active track; call start first")]
    NotTracking,
    #[error("unreadable ground truth {path}: {reason}")]
    GroundTruth { path: PathBuf, reason: String },
}

impl TrackingError {
    /// Per-frame failures that leave the run alive (the next frame can recover).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TrackingError::TrackLost { .. } | TrackingError::BoxCollapsed
        )
    }

    /// Tracker named by the failure, if any. A collapsed box carries none:
    /// it only fails once the re-detector has been forced.
    pub fn failed_tracker(&self) -> Option<TrackerKind> {
        match self {
            TrackingError::TrackLost { tracker, .. }
            | TrackingError::TrackerInit { tracker, .. } => Some(*tracker),
            _ => None,
        }
    }
}

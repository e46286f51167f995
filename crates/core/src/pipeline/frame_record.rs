use crate::shared::bbox::BBox;
use crate::shared::constants::INVALID_RECORD_LINE;
use crate::shared::tracker_kind::TrackerKind;

/// Outcome of one frame of a sequence run.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameRecord {
    pub frame_index: usize,
    /// `None` when the frame produced no usable box.
    pub bbox: Option<BBox>,
    pub fps: f64,
    /// Tracker that produced (or failed to produce) the box; `None` for
    /// frames that were never processed.
    pub selected: Option<TrackerKind>,
}

impl FrameRecord {
    /// Placeholder for a frame skipped after early termination.
    pub fn skipped(frame_index: usize) -> Self {
        Self {
            frame_index,
            bbox: None,
            fps: 0.0,
            selected: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.bbox.is_some()
    }

    /// `x,y,width,height`, or all-NaN for invalid frames.
    pub fn result_line(&self) -> String {
        match &self.bbox {
            Some(bbox) => bbox.to_string(),
            None => INVALID_RECORD_LINE.to_string(),
        }
    }
}

/// How a sequence run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    Completed,
    /// A frame ran below the stall fps floor; the rest was backfilled.
    Stalled,
    /// A frame could not be decoded; the rest was backfilled.
    FrameUnavailable,
    /// Stopped on request; nothing was backfilled.
    Cancelled,
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::Completed => write!(f, "completed"),
            Termination::Stalled => write!(f, "stalled"),
            Termination::FrameUnavailable => write!(f, "frame unavailable"),
            Termination::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SequenceSummary {
    /// Number of records, backfilled ones included.
    pub frames: usize,
    pub processed_frames: usize,
    pub invalid_frames: usize,
    pub mean_fps: f64,
    pub re_detector_triggers: usize,
    /// `re_detector_triggers / frames`.
    pub re_detector_trigger_rate: f64,
    pub termination: Termination,
}

impl SequenceSummary {
    pub fn from_records(
        records: &[FrameRecord],
        processed_frames: usize,
        termination: Termination,
    ) -> Self {
        let frames = records.len();
        let re_detector_triggers = records
            .iter()
            .filter(|r| r.selected == Some(TrackerKind::ReDetector))
            .count();
        let (mean_fps, re_detector_trigger_rate) = if frames == 0 {
            (0.0, 0.0)
        } else {
            (
                records.iter().map(|r| r.fps).sum::<f64>() / frames as f64,
                re_detector_triggers as f64 / frames as f64,
            )
        };

        Self {
            frames,
            processed_frames,
            invalid_frames: records.iter().filter(|r| !r.is_valid()).count(),
            mean_fps,
            re_detector_triggers,
            re_detector_trigger_rate,
            termination,
        }
    }

    pub fn terminated_early(&self) -> bool {
        matches!(
            self.termination,
            Termination::Stalled | Termination::FrameUnavailable
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn record(index: usize, fps: f64, selected: Option<TrackerKind>) -> FrameRecord {
        FrameRecord {
            frame_index: index,
            bbox: selected.map(|_| BBox::new(1.0, 2.0, 3.0, 4.0)),
            fps,
            selected,
        }
    }

    #[test]
    fn test_result_line_for_valid_record() {
        let r = FrameRecord {
            frame_index: 0,
            bbox: Some(BBox::new(12.0, 0.0, 20.5, 20.0)),
            fps: 100.0,
            selected: Some(TrackerKind::Fast),
        };
        assert_eq!(r.result_line(), "12,0,20.5,20");
    }

    #[test]
    fn test_result_line_for_invalid_record() {
        assert_eq!(FrameRecord::skipped(3).result_line(), "NaN,NaN,NaN,NaN");
    }

    #[test]
    fn test_summary_counts_over_all_records() {
        let records = vec![
            record(0, 100.0, Some(TrackerKind::Fast)),
            record(1, 50.0, Some(TrackerKind::ReDetector)),
            record(2, 30.0, Some(TrackerKind::Fast)),
            FrameRecord::skipped(3),
        ];

        let summary = SequenceSummary::from_records(&records, 3, Termination::Stalled);

        assert_eq!(summary.frames, 4);
        assert_eq!(summary.processed_frames, 3);
        assert_eq!(summary.invalid_frames, 1);
        assert_eq!(summary.re_detector_triggers, 1);
        assert_relative_eq!(summary.mean_fps, 45.0);
        assert_relative_eq!(summary.re_detector_trigger_rate, 0.25);
        assert!(summary.terminated_early());
    }

    #[test]
    fn test_empty_summary_is_zero() {
        let summary = SequenceSummary::from_records(&[], 0, Termination::Cancelled);
        assert_eq!(summary.frames, 0);
        assert_relative_eq!(summary.mean_fps, 0.0);
        assert_relative_eq!(summary.re_detector_trigger_rate, 0.0);
        assert!(!summary.terminated_early());
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, warn};

use crate::shared::frame::Frame;
use crate::shared::tracker_kind::TrackerKind;
use crate::shared::tracking_config::TrackingConfig;
use crate::shared::tracking_error::TrackingError;
use crate::tracking::domain::pending_selection::PendingSelection;
use crate::tracking::domain::tracker_arbiter::{ArbiterState, TrackerArbiter};
use crate::video::domain::frame_source::FrameSource;

use super::clock::{Clock, SystemClock};
use super::frame_record::{FrameRecord, SequenceSummary, Termination};
use super::run_logger::{NullRunLogger, RunLogger};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunnerConfig {
    /// Frames processed slower than this end the run early.
    pub stall_fps_floor: f64,
}

impl From<&TrackingConfig> for RunnerConfig {
    fn from(config: &TrackingConfig) -> Self {
        Self {
            stall_fps_floor: config.stall_fps(),
        }
    }
}

/// Every record of one sequence plus its aggregate.
#[derive(Clone, Debug)]
pub struct SequenceRun {
    pub records: Vec<FrameRecord>,
    pub summary: SequenceSummary,
}

/// Drives a [`TrackerArbiter`] over one frame source, timing each frame.
///
/// Per-frame tracking failures become invalid records and the next frame
/// attempts recovery. A frame slower than the stall floor, or a frame that
/// cannot be decoded, ends the run; the frames never reached are then
/// backfilled with zero-fps invalid records so every sequence reports one
/// record per frame.
pub struct SequenceRunner {
    config: RunnerConfig,
    logger: Box<dyn RunLogger>,
    clock: Box<dyn Clock>,
    cancelled: Arc<AtomicBool>,
}

impl SequenceRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config,
            logger: Box::new(NullRunLogger),
            clock: Box::new(SystemClock::new()),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_logger(mut self, logger: Box<dyn RunLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Shared flag checked between frames.
    pub fn with_cancel(mut self, cancelled: Arc<AtomicBool>) -> Self {
        self.cancelled = cancelled;
        self
    }

    pub fn run(
        &mut self,
        arbiter: &mut TrackerArbiter,
        source: &mut dyn FrameSource,
        selection: PendingSelection,
    ) -> Result<SequenceRun, TrackingError> {
        let total = source.total_frames();
        let mut frame = source
            .next_frame()?
            .ok_or_else(|| TrackingError::FrameUnavailable {
                index: 0,
                reason: "sequence has no frames".to_string(),
            })?;
        let initial = arbiter.start(&frame, selection)?;
        self.logger.info(&format!("Tracking from {initial}"));

        let mut records = Vec::with_capacity(total.unwrap_or(0));
        let termination = loop {
            let record = self.process(arbiter, &frame)?;
            let fps = record.fps;
            records.push(record);
            self.logger.progress(records.len(), total.unwrap_or(0));

            if fps < self.config.stall_fps_floor {
                warn!(
                    "Frame {} ran at {fps:.2} fps, below the {:.2} fps floor; stopping",
                    frame.index(),
                    self.config.stall_fps_floor
                );
                break Termination::Stalled;
            }
            if self.cancelled.load(Ordering::Relaxed) {
                break Termination::Cancelled;
            }
            match source.next_frame() {
                Ok(Some(next)) => frame = next,
                Ok(None) => break Termination::Completed,
                Err(e) => {
                    warn!("{e}; stopping");
                    break Termination::FrameUnavailable;
                }
            }
        };

        let processed = records.len();
        if termination != Termination::Cancelled {
            if let Some(total) = total {
                records.extend((processed..total).map(FrameRecord::skipped));
            }
        }

        let summary = SequenceSummary::from_records(&records, processed, termination);
        self.logger.info(&format!(
            "Run {termination} after {processed} frames: mean {:.1} fps, re-detector on {:.1}% of frames",
            summary.mean_fps,
            summary.re_detector_trigger_rate * 100.0
        ));
        self.logger.summary();
        Ok(SequenceRun { records, summary })
    }

    /// Steps (or recovers) on one frame and turns the outcome into a record.
    ///
    /// Only failures the next frame can recover from are absorbed.
    fn process(
        &mut self,
        arbiter: &mut TrackerArbiter,
        frame: &Frame,
    ) -> Result<FrameRecord, TrackingError> {
        let recovering = arbiter.state() == ArbiterState::Failed;
        let started = self.clock.now();
        let result = if recovering {
            arbiter.recover(frame)
        } else {
            arbiter.step(frame)
        };
        let elapsed = self.clock.now().saturating_sub(started);

        let stage = if recovering { "recover" } else { "step" };
        self.logger.timing(stage, elapsed.as_secs_f64() * 1000.0);
        let fps = 1.0 / elapsed.as_secs_f64().max(1e-9);

        let (bbox, selected) = match result {
            Ok(outcome) => (
                Some(outcome.bbox).filter(|b| !b.is_empty()),
                outcome.selected,
            ),
            Err(e) if e.is_recoverable() => {
                debug!("Frame {}: {e}", frame.index());
                (None, e.failed_tracker().unwrap_or(TrackerKind::ReDetector))
            }
            Err(e) => return Err(e),
        };
        self.logger.selection(selected);

        Ok(FrameRecord {
            frame_index: frame.index(),
            bbox,
            fps,
            selected: Some(selected),
        })
    }
}

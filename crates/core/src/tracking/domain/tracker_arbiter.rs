use log::debug;

use crate::shared::bbox::BBox;
use crate::shared::constants::{
    DEFAULT_CHANGE_THRESHOLD, DEFAULT_FINGERPRINT_SIDE, DEFAULT_MIN_SIDE,
};
use crate::shared::frame::Frame;
use crate::shared::tracker_kind::TrackerKind;
use crate::shared::tracking_config::TrackingConfig;
use crate::shared::tracking_error::TrackingError;

use super::box_sanitizer::sanitize;
use super::change_signal::{ChangeSignal, Fingerprint};
use super::fast_tracker::FastTracker;
use super::pending_selection::PendingSelection;
use super::re_detector::ReDetector;

/// Consecutive zero-area frames after which the track is declared failed.
const MAX_COLLAPSED_FRAMES: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArbiterConfig {
    /// Hamming distance at or above which the re-detector is invoked.
    pub change_threshold: u32,
    pub min_side: f64,
    pub fingerprint_side: u32,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            change_threshold: DEFAULT_CHANGE_THRESHOLD,
            min_side: DEFAULT_MIN_SIDE,
            fingerprint_side: DEFAULT_FINGERPRINT_SIDE,
        }
    }
}

impl From<&TrackingConfig> for ArbiterConfig {
    fn from(config: &TrackingConfig) -> Self {
        Self {
            change_threshold: config.change_threshold,
            min_side: config.min_side,
            fingerprint_side: config.fingerprint_side,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArbiterState {
    Uninitialized,
    /// Carries the tracker that produced the current box.
    Tracking(TrackerKind),
    Failed,
}

/// Result of one arbitration step.
#[derive(Clone, Debug, PartialEq)]
pub struct StepOutcome {
    /// Sanitized box. May have zero area on a single collapsed frame.
    pub bbox: BBox,
    pub selected: TrackerKind,
    /// Change distance that drove the decision; `None` when the re-detector
    /// was forced (collapsed box, recovery).
    pub distance: Option<u32>,
    /// The fast tracker was re-initialized on this frame before comparing.
    pub resynchronized: bool,
}

impl StepOutcome {
    pub fn is_valid(&self) -> bool {
        !self.bbox.is_empty()
    }
}

#[derive(Clone, Debug)]
struct TrackState {
    current_box: BBox,
    baseline: Option<Fingerprint>,
    fast_tracker_ready: bool,
    frame_index: usize,
    collapsed_frames: usize,
}

/// Chooses, frame by frame, whether the fast tracker or the re-detector
/// drives the track.
///
/// Each step compares the average hash of the current box's crop against
/// the hash taken after the previous step; a large change hands the frame
/// to the re-detector, and the fast tracker is re-initialized on the
/// re-detector's box at the start of the following step. Holds all
/// per-track state; one instance serves one track at a time.
pub struct TrackerArbiter {
    fast: Box<dyn FastTracker>,
    redetector: Box<dyn ReDetector>,
    config: ArbiterConfig,
    signal: ChangeSignal,
    state: ArbiterState,
    track: Option<TrackState>,
}

impl TrackerArbiter {
    pub fn new(
        fast: Box<dyn FastTracker>,
        redetector: Box<dyn ReDetector>,
        config: ArbiterConfig,
    ) -> Self {
        Self {
            fast,
            redetector,
            signal: ChangeSignal::new(config.fingerprint_side),
            config,
            state: ArbiterState::Uninitialized,
            track: None,
        }
    }

    pub fn state(&self) -> ArbiterState {
        self.state
    }

    pub fn current_box(&self) -> Option<BBox> {
        self.track.as_ref().map(|t| t.current_box)
    }

    /// Index of the last frame the track processed.
    pub fn frame_index(&self) -> Option<usize> {
        self.track.as_ref().map(|t| t.frame_index)
    }

    /// Starts a new track, discarding any previous one.
    ///
    /// Both trackers are initialized with the same sanitized box and the
    /// initial crop becomes the comparison baseline.
    pub fn start(
        &mut self,
        frame: &Frame,
        selection: PendingSelection,
    ) -> Result<BBox, TrackingError> {
        self.state = ArbiterState::Uninitialized;
        self.track = None;

        let bbox = sanitize(
            &selection.bbox(),
            frame.width(),
            frame.height(),
            self.config.min_side,
        );
        if bbox.is_empty() {
            return Err(TrackingError::InvalidInitialBox);
        }
        let baseline = self
            .signal
            .fingerprint_region(frame, &bbox)
            .map_err(|_| TrackingError::InvalidInitialBox)?;

        self.fast
            .init(frame, &bbox)
            .map_err(|e| TrackingError::TrackerInit {
                tracker: TrackerKind::Fast,
                reason: e.to_string(),
            })?;
        self.redetector
            .init(frame, &bbox.to_corners())
            .map_err(|e| TrackingError::TrackerInit {
                tracker: TrackerKind::ReDetector,
                reason: e.to_string(),
            })?;

        self.track = Some(TrackState {
            current_box: bbox,
            baseline: Some(baseline),
            fast_tracker_ready: true,
            frame_index: frame.index(),
            collapsed_frames: 0,
        });
        self.state = ArbiterState::Tracking(TrackerKind::Fast);
        debug!("Track started on frame {} at {bbox}", frame.index());
        Ok(bbox)
    }

    /// Advances the track by one frame.
    ///
    /// Any error moves the arbiter to [`ArbiterState::Failed`]; from there
    /// only [`start`](Self::start) or [`recover`](Self::recover) are accepted.
    pub fn step(&mut self, frame: &Frame) -> Result<StepOutcome, TrackingError> {
        if !matches!(self.state, ArbiterState::Tracking(_)) {
            return Err(TrackingError::NotTracking);
        }
        let mut track = self.track.take().ok_or(TrackingError::NotTracking)?;

        let result = self.advance(&mut track, frame);
        self.state = match &result {
            Ok(outcome) => ArbiterState::Tracking(outcome.selected),
            Err(_) => ArbiterState::Failed,
        };
        self.track = Some(track);
        result
    }

    /// Re-acquires a failed track with an unconditional re-detector call.
    ///
    /// On success the track resumes in `Tracking(ReDetector)`, so the next
    /// step resynchronizes the fast tracker. A degenerate result leaves the
    /// arbiter failed.
    pub fn recover(&mut self, frame: &Frame) -> Result<StepOutcome, TrackingError> {
        if self.state != ArbiterState::Failed {
            return Err(TrackingError::NotTracking);
        }
        let mut track = self.track.take().ok_or(TrackingError::NotTracking)?;

        let result = self.reacquire(&mut track, frame);
        if let Ok(outcome) = &result {
            self.state = ArbiterState::Tracking(outcome.selected);
        }
        self.track = Some(track);
        result
    }

    /// Hands the wrapped trackers back so the caller can release them.
    pub fn into_trackers(self) -> (Box<dyn FastTracker>, Box<dyn ReDetector>) {
        (self.fast, self.redetector)
    }

    fn advance(
        &mut self,
        track: &mut TrackState,
        frame: &Frame,
    ) -> Result<StepOutcome, TrackingError> {
        // Resync before comparing, so the baseline matches the box on screen.
        let resynchronized = !track.fast_tracker_ready && !track.current_box.is_empty();
        if resynchronized {
            self.fast
                .init(frame, &track.current_box)
                .map_err(|e| TrackingError::TrackLost {
                    tracker: TrackerKind::Fast,
                    reason: format!("re-initialization failed: {e}"),
                })?;
            track.fast_tracker_ready = true;
        }

        let distance = self.change_distance(track, frame);
        let selected = match distance {
            Some(d) if d < self.config.change_threshold => TrackerKind::Fast,
            _ => TrackerKind::ReDetector,
        };
        let raw = match selected {
            TrackerKind::Fast => self.update_fast(frame)?,
            TrackerKind::ReDetector => {
                let raw = self.track_redetector(frame)?;
                track.fast_tracker_ready = false;
                raw
            }
        };
        debug!(
            "Frame {}: distance {distance:?} -> {selected}",
            frame.index()
        );

        track.frame_index = frame.index();
        let bbox = self.rebaseline(track, frame, &raw)?;
        Ok(StepOutcome {
            bbox,
            selected,
            distance,
            resynchronized,
        })
    }

    fn reacquire(
        &mut self,
        track: &mut TrackState,
        frame: &Frame,
    ) -> Result<StepOutcome, TrackingError> {
        let raw = self.track_redetector(frame)?;
        let bbox = sanitize(&raw, frame.width(), frame.height(), self.config.min_side);
        let baseline = self
            .signal
            .fingerprint_region(frame, &bbox)
            .map_err(|_| TrackingError::BoxCollapsed)?;

        track.current_box = bbox;
        track.baseline = Some(baseline);
        track.collapsed_frames = 0;
        track.fast_tracker_ready = false;
        track.frame_index = frame.index();
        debug!("Frame {}: recovered at {bbox}", frame.index());
        Ok(StepOutcome {
            bbox,
            selected: TrackerKind::ReDetector,
            distance: None,
            resynchronized: false,
        })
    }

    /// `None` forces the re-detector: there is no usable region to compare.
    fn change_distance(&self, track: &TrackState, frame: &Frame) -> Option<u32> {
        let baseline = track.baseline?;
        self.signal
            .fingerprint_region(frame, &track.current_box)
            .ok()
            .map(|current| current.distance(baseline))
    }

    fn update_fast(&mut self, frame: &Frame) -> Result<BBox, TrackingError> {
        match self.fast.update(frame) {
            Ok((bbox, true)) => Ok(bbox),
            Ok((_, false)) => Err(TrackingError::TrackLost {
                tracker: TrackerKind::Fast,
                reason: "tracker reported failure".to_string(),
            }),
            Err(e) => Err(TrackingError::TrackLost {
                tracker: TrackerKind::Fast,
                reason: e.to_string(),
            }),
        }
    }

    fn track_redetector(&mut self, frame: &Frame) -> Result<BBox, TrackingError> {
        self.redetector
            .track(frame)
            .map(|corners| BBox::from_corners(&corners))
            .map_err(|e| TrackingError::TrackLost {
                tracker: TrackerKind::ReDetector,
                reason: e.to_string(),
            })
    }

    /// Sanitizes `raw`, stores it, and fingerprints the sanitized region as
    /// the next step's baseline.
    fn rebaseline(
        &self,
        track: &mut TrackState,
        frame: &Frame,
        raw: &BBox,
    ) -> Result<BBox, TrackingError> {
        let bbox = sanitize(raw, frame.width(), frame.height(), self.config.min_side);
        track.current_box = bbox;

        match self.signal.fingerprint_region(frame, &bbox) {
            Ok(fingerprint) => {
                track.baseline = Some(fingerprint);
                track.collapsed_frames = 0;
                Ok(bbox)
            }
            Err(_) => {
                track.baseline = None;
                track.collapsed_frames += 1;
                if track.collapsed_frames >= MAX_COLLAPSED_FRAMES {
                    Err(TrackingError::BoxCollapsed)
                } else {
                    Ok(bbox)
                }
            }
        }
    }
}

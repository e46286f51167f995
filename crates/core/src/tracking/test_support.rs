//! Scripted tracker stubs and synthetic frames shared by the tracking,
//! pipeline and evaluation tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::shared::bbox::{BBox, Corners};
use crate::shared::frame::Frame;
use crate::shared::tracking_error::TrackingError;
use crate::tracking::domain::fast_tracker::FastTracker;
use crate::tracking::domain::re_detector::ReDetector;
use crate::tracking::domain::tracker_arbiter::{ArbiterConfig, TrackerArbiter};
use crate::video::domain::frame_source::FrameSource;

pub const SIDE: u32 = 100;

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    FastInit(usize, BBox),
    FastUpdate(usize),
    RedetInit(usize, Corners),
    RedetTrack(usize),
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Fast tracker replaying scripted results; once the script runs out it
/// keeps reporting its last box with success.
pub struct ScriptedFast {
    log: CallLog,
    script: VecDeque<Result<(BBox, bool), String>>,
    current: BBox,
    delays: HashMap<usize, Duration>,
}

impl ScriptedFast {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            script: VecDeque::new(),
            current: BBox::new(0.0, 0.0, 0.0, 0.0),
            delays: HashMap::new(),
        }
    }

    pub fn with_script(mut self, script: Vec<Result<(BBox, bool), String>>) -> Self {
        self.script = script.into();
        self
    }

    /// Blocks `update` on the frame with this index.
    pub fn with_delay_at(mut self, index: usize, delay: Duration) -> Self {
        self.delays.insert(index, delay);
        self
    }
}

impl FastTracker for ScriptedFast {
    fn init(&mut self, frame: &Frame, bbox: &BBox) -> Result<(), Box<dyn std::error::Error>> {
        self.log
            .lock()
            .unwrap()
            .push(Call::FastInit(frame.index(), *bbox));
        self.current = *bbox;
        Ok(())
    }

    fn update(&mut self, frame: &Frame) -> Result<(BBox, bool), Box<dyn std::error::Error>> {
        self.log.lock().unwrap().push(Call::FastUpdate(frame.index()));
        if let Some(delay) = self.delays.get(&frame.index()) {
            std::thread::sleep(*delay);
        }
        match self.script.pop_front() {
            Some(Ok((bbox, ok))) => {
                self.current = bbox;
                Ok((bbox, ok))
            }
            Some(Err(msg)) => Err(msg.into()),
            None => Ok((self.current, true)),
        }
    }
}

/// Re-detector replaying scripted corner boxes; defaults to its init box.
pub struct ScriptedReDetector {
    log: CallLog,
    script: VecDeque<Result<Corners, String>>,
    initial: Corners,
}

impl ScriptedReDetector {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            script: VecDeque::new(),
            initial: BBox::new(0.0, 0.0, 0.0, 0.0).to_corners(),
        }
    }

    pub fn with_script(mut self, script: Vec<Result<Corners, String>>) -> Self {
        self.script = script.into();
        self
    }
}

impl ReDetector for ScriptedReDetector {
    fn init(&mut self, frame: &Frame, corners: &Corners) -> Result<(), Box<dyn std::error::Error>> {
        self.log
            .lock()
            .unwrap()
            .push(Call::RedetInit(frame.index(), *corners));
        self.initial = *corners;
        Ok(())
    }

    fn track(&mut self, frame: &Frame) -> Result<Corners, Box<dyn std::error::Error>> {
        self.log.lock().unwrap().push(Call::RedetTrack(frame.index()));
        match self.script.pop_front() {
            Some(Ok(corners)) => Ok(corners),
            Some(Err(msg)) => Err(msg.into()),
            None => Ok(self.initial),
        }
    }
}

/// 100x100 gray frame: columns left of 20 are `left`, the rest `right`.
pub fn split_frame(index: usize, left: u8, right: u8) -> Frame {
    split_frame_at(index, 20, left, right)
}

/// 100x100 gray frame: columns left of `column` are `left`, the rest `right`.
pub fn split_frame_at(index: usize, column: u32, left: u8, right: u8) -> Frame {
    let data = (0..SIDE)
        .flat_map(|_| (0..SIDE).map(move |x| if x < column { left } else { right }))
        .collect();
    Frame::new(data, SIDE, SIDE, 1, index)
}

/// 100x100 gray frame: rows above `row` are `top`, the rest `bottom`.
pub fn row_split_frame(index: usize, row: u32, top: u8, bottom: u8) -> Frame {
    let data = (0..SIDE)
        .flat_map(|y| (0..SIDE).map(move |_| if y < row { top } else { bottom }))
        .collect();
    Frame::new(data, SIDE, SIDE, 1, index)
}

/// Dark left, bright right.
pub fn pattern_a(index: usize) -> Frame {
    split_frame(index, 0, 255)
}

/// Inverse of [`pattern_a`]; a box straddling column 20 sees every hash bit flip.
pub fn pattern_b(index: usize) -> Frame {
    split_frame(index, 255, 0)
}

pub fn config(threshold: u32) -> ArbiterConfig {
    ArbiterConfig {
        change_threshold: threshold,
        min_side: 4.0,
        fingerprint_side: 8,
    }
}

pub fn arbiter(fast: ScriptedFast, redetector: ScriptedReDetector, threshold: u32) -> TrackerArbiter {
    TrackerArbiter::new(Box::new(fast), Box::new(redetector), config(threshold))
}

pub fn corners(x: f64, y: f64, w: f64, h: f64) -> Corners {
    BBox::new(x, y, w, h).to_corners()
}

/// In-memory frame source; entries may be decode errors.
pub struct ScriptedSource {
    frames: VecDeque<Result<Frame, TrackingError>>,
    total: Option<usize>,
}

impl ScriptedSource {
    pub fn new(frames: Vec<Frame>) -> Self {
        let total = Some(frames.len());
        Self {
            frames: frames.into_iter().map(Ok).collect(),
            total,
        }
    }

    pub fn from_results(frames: Vec<Result<Frame, TrackingError>>, total: Option<usize>) -> Self {
        Self {
            frames: frames.into(),
            total,
        }
    }
}

impl FrameSource for ScriptedSource {
    fn total_frames(&self) -> Option<usize> {
        self.total
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, TrackingError> {
        self.frames.pop_front().transpose()
    }
}

/// `count` copies of [`pattern_a`] with consecutive indices.
pub fn pattern_a_frames(count: usize) -> Vec<Frame> {
    (0..count).map(pattern_a).collect()
}

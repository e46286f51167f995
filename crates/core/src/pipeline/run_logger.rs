use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use crate::shared::tracker_kind::TrackerKind;

/// Observer for sequence-run events.
///
/// Keeps the runner free of output decisions; the CLI reports through
/// stdout, batch workers and tests stay silent.
pub trait RunLogger: Send {
    /// Report frame-level progress. `total` is 0 when unknown.
    fn progress(&mut self, current: usize, total: usize);

    /// Record how long a named stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record which tracker produced a frame's box.
    fn selection(&mut self, tracker: TrackerKind);

    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

pub struct NullRunLogger;

impl RunLogger for NullRunLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn selection(&mut self, _tracker: TrackerKind) {}
    fn info(&mut self, _message: &str) {}
}

/// Logger for interactive runs: throttled progress, per-stage averages,
/// the fast/re-detector split and overall throughput.
pub struct StdoutRunLogger {
    throttle_frames: usize,
    timings: HashMap<String, Vec<f64>>,
    selections: BTreeMap<String, usize>,
    start_time: Instant,
    frames: usize,
}

impl StdoutRunLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: HashMap::new(),
            selections: BTreeMap::new(),
            start_time: Instant::now(),
            frames: 0,
        }
    }

    /// Returns the formatted summary, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.selections.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut lines = vec![format!(
            "Run summary ({} frames, {:.1}s total):",
            self.frames,
            elapsed_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = total_ms / durations.len().max(1) as f64;
            let slowest = durations.iter().copied().fold(0.0, f64::max);
            lines.push(format!(
                "  {stage:12}: avg {avg_ms:6.1}ms  max {slowest:6.1}ms  total {total_ms:7.0}ms"
            ));
        }

        let selected: usize = self.selections.values().sum();
        for (tracker, count) in &self.selections {
            let pct = *count as f64 / selected.max(1) as f64 * 100.0;
            lines.push(format!("  {tracker}: {count} frames ({pct:.1}%)"));
        }

        if self.frames > 0 && elapsed_ms > 0.0 {
            let fps = self.frames as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {fps:.1} fps"));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn selections_for(&self, tracker: TrackerKind) -> usize {
        self.selections
            .get(&tracker.to_string())
            .copied()
            .unwrap_or(0)
    }
}

impl Default for StdoutRunLogger {
    fn default() -> Self {
        Self::new(50)
    }
}

impl RunLogger for StdoutRunLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.frames = current;
        if current % self.throttle_frames != 0 && current != total {
            return;
        }
        if total > 0 {
            let pct = current as f64 / total as f64 * 100.0;
            log::info!("Tracking: {current}/{total} frames ({pct:.1}%)");
        } else {
            log::info!("Tracking: {current} frames");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn selection(&mut self, tracker: TrackerKind) {
        *self.selections.entry(tracker.to_string()).or_default() += 1;
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

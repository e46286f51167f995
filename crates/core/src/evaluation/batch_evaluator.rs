use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{info, warn};

use crate::pipeline::frame_record::SequenceSummary;
use crate::pipeline::sequence_runner::{RunnerConfig, SequenceRun, SequenceRunner};
use crate::shared::tracking_error::TrackingError;
use crate::tracking::domain::pending_selection::PendingSelection;
use crate::tracking::domain::tracker_arbiter::TrackerArbiter;

use super::domain::result_sink::{ResultSink, SummarySink};
use super::domain::sequence_source::SequenceSource;

/// Aggregate of a batch run.
#[derive(Clone, Debug, Default)]
pub struct BatchReport {
    pub summaries: BTreeMap<String, SequenceSummary>,
    /// Sequences that could not be evaluated, with the reason.
    pub skipped: Vec<(String, String)>,
    /// Unweighted mean of the per-sequence re-detector trigger rates.
    pub mean_trigger_rate: f64,
}

impl BatchReport {
    fn finish(mut self) -> Self {
        self.mean_trigger_rate = if self.summaries.is_empty() {
            0.0
        } else {
            self.summaries
                .values()
                .map(|s| s.re_detector_trigger_rate)
                .sum::<f64>()
                / self.summaries.len() as f64
        };
        self
    }
}

enum Outcome {
    Completed(SequenceRun),
    Skipped(String),
}

/// Owns one arbiter for the lifetime of a worker; built on first use.
struct Worker<'f> {
    factory: &'f (dyn Fn() -> Result<TrackerArbiter, TrackingError> + Sync),
    arbiter: Option<TrackerArbiter>,
    config: RunnerConfig,
    cancelled: Arc<AtomicBool>,
}

impl<'f> Worker<'f> {
    fn new(
        factory: &'f (dyn Fn() -> Result<TrackerArbiter, TrackingError> + Sync),
        config: RunnerConfig,
        cancelled: Arc<AtomicBool>,
    ) -> Self {
        Self {
            factory,
            arbiter: None,
            config,
            cancelled,
        }
    }

    fn cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    fn evaluate(&mut self, sequence: &dyn SequenceSource) -> Outcome {
        let (mut frames, initial) = match sequence.open() {
            Ok(opened) => opened,
            Err(e) => return Outcome::Skipped(e.to_string()),
        };
        let mut arbiter = match self.arbiter.take() {
            Some(arbiter) => arbiter,
            None => match (self.factory)() {
                Ok(arbiter) => arbiter,
                Err(e) => return Outcome::Skipped(format!("tracker setup failed: {e}")),
            },
        };

        let mut runner = SequenceRunner::new(self.config).with_cancel(self.cancelled.clone());
        let result = runner.run(
            &mut arbiter,
            frames.as_mut(),
            PendingSelection::new(initial),
        );
        self.arbiter = Some(arbiter);

        match result {
            Ok(run) => Outcome::Completed(run),
            Err(e) => Outcome::Skipped(e.to_string()),
        }
    }
}

/// Runs many sequences and aggregates their summaries.
///
/// Each worker thread builds its own arbiter from the factory and pulls
/// sequences from a shared queue; sinks are fed from the calling thread as
/// sequences complete. With a single worker everything runs inline.
pub struct BatchEvaluator {
    runner_config: RunnerConfig,
    workers: usize,
    result_sink: Option<Box<dyn ResultSink>>,
    summary_sink: Option<Box<dyn SummarySink>>,
    cancelled: Arc<AtomicBool>,
}

impl BatchEvaluator {
    pub fn new(runner_config: RunnerConfig) -> Self {
        Self {
            runner_config,
            workers: 1,
            result_sink: None,
            summary_sink: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_result_sink(mut self, sink: Box<dyn ResultSink>) -> Self {
        self.result_sink = Some(sink);
        self
    }

    pub fn with_summary_sink(mut self, sink: Box<dyn SummarySink>) -> Self {
        self.summary_sink = Some(sink);
        self
    }

    pub fn with_cancel(mut self, cancelled: Arc<AtomicBool>) -> Self {
        self.cancelled = cancelled;
        self
    }

    pub fn run(
        &mut self,
        sequences: &[Box<dyn SequenceSource>],
        factory: &(dyn Fn() -> Result<TrackerArbiter, TrackingError> + Sync),
    ) -> BatchReport {
        let workers = self.workers.min(sequences.len()).max(1);
        info!(
            "Evaluating {} sequences on {workers} worker(s)",
            sequences.len()
        );

        let mut report = BatchReport::default();
        if workers == 1 {
            let mut worker = Worker::new(factory, self.runner_config, self.cancelled.clone());
            for sequence in sequences {
                if worker.cancelled() {
                    break;
                }
                let outcome = worker.evaluate(sequence.as_ref());
                self.record(&mut report, sequence.label(), outcome);
            }
        } else {
            self.run_parallel(sequences, factory, workers, &mut report);
        }

        let report = report.finish();
        info!(
            "Evaluated {} sequences ({} skipped), mean re-detector trigger rate {:.4}",
            report.summaries.len(),
            report.skipped.len(),
            report.mean_trigger_rate
        );
        report
    }

    fn run_parallel(
        &mut self,
        sequences: &[Box<dyn SequenceSource>],
        factory: &(dyn Fn() -> Result<TrackerArbiter, TrackingError> + Sync),
        workers: usize,
        report: &mut BatchReport,
    ) {
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<&dyn SequenceSource>();
        let (done_tx, done_rx) = crossbeam_channel::unbounded::<(String, Outcome)>();
        for sequence in sequences {
            if job_tx.send(sequence.as_ref()).is_err() {
                break;
            }
        }
        drop(job_tx);

        std::thread::scope(|scope| {
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let done_tx = done_tx.clone();
                let mut worker = Worker::new(factory, self.runner_config, self.cancelled.clone());
                scope.spawn(move || {
                    for sequence in job_rx.iter() {
                        if worker.cancelled() {
                            break;
                        }
                        let outcome = worker.evaluate(sequence);
                        if done_tx.send((sequence.label().to_string(), outcome)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(done_tx);

            for (label, outcome) in done_rx.iter() {
                self.record(report, &label, outcome);
            }
        });
    }

    fn record(&mut self, report: &mut BatchReport, label: &str, outcome: Outcome) {
        let run = match outcome {
            Outcome::Completed(run) => run,
            Outcome::Skipped(reason) => {
                warn!("Skipping sequence {label}: {reason}");
                report.skipped.push((label.to_string(), reason));
                return;
            }
        };

        if let Some(sink) = self.result_sink.as_mut() {
            if let Err(e) = sink.write(label, &run.records) {
                warn!("Failed to write results for {label}: {e}");
            }
        }
        if let Some(sink) = self.summary_sink.as_mut() {
            if let Err(e) = sink.append(label, &run.summary) {
                warn!("Failed to append summary for {label}: {e}");
            }
        }

        let summary = run.summary;
        info!(
            "{label}: {} frames, {:.1} fps, trigger rate {:.4} ({})",
            summary.frames, summary.mean_fps, summary.re_detector_trigger_rate, summary.termination
        );
        report.summaries.insert(label.to_string(), summary);
    }
}

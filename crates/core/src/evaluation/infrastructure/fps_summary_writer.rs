use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use crate::evaluation::domain::result_sink::SummarySink;
use crate::pipeline::frame_record::SequenceSummary;

/// Appends `label, meanFps` lines to a single summary file.
///
/// Appending keeps the lines of earlier runs, so repeated benchmarks
/// accumulate in one file.
pub struct FpsSummaryWriter {
    path: PathBuf,
}

impl FpsSummaryWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SummarySink for FpsSummaryWriter {
    fn append(
        &mut self,
        label: &str,
        summary: &SequenceSummary,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{label}, {:.2}", summary.mean_fps)?;
        Ok(())
    }
}

use crate::pipeline::frame_record::{FrameRecord, SequenceSummary};

/// Receives the per-frame records of each completed sequence.
pub trait ResultSink {
    fn write(&mut self, label: &str, records: &[FrameRecord])
        -> Result<(), Box<dyn std::error::Error>>;
}

/// Receives the aggregate of each completed sequence.
pub trait SummarySink {
    fn append(
        &mut self,
        label: &str,
        summary: &SequenceSummary,
    ) -> Result<(), Box<dyn std::error::Error>>;
}

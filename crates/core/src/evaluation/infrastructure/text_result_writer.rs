use std::fs;
use std::path::{Path, PathBuf};

use crate::evaluation::domain::result_sink::ResultSink;
use crate::pipeline::frame_record::FrameRecord;

/// Writes `<dir>/<label>.txt` with one `x,y,width,height` line per frame.
pub struct TextResultWriter {
    dir: PathBuf,
}

impl TextResultWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, label: &str) -> PathBuf {
        self.dir.join(format!("{label}.txt"))
    }
}

/// Formats records the way result files store them.
pub fn format_records(records: &[FrameRecord]) -> String {
    let mut out = String::new();
    for record in records {
        out.push_str(&record.result_line());
        out.push('\n');
    }
    out
}

/// Writes records to an arbitrary file, creating its parent directory.
pub fn write_records(path: &Path, records: &[FrameRecord]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, format_records(records))
}

impl ResultSink for TextResultWriter {
    fn write(
        &mut self,
        label: &str,
        records: &[FrameRecord],
    ) -> Result<(), Box<dyn std::error::Error>> {
        write_records(&self.path_for(label), records)?;
        Ok(())
    }
}

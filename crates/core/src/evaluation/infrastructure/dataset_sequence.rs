use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::evaluation::domain::sequence_source::SequenceSource;
use crate::shared::bbox::BBox;
use crate::shared::tracking_error::TrackingError;
use crate::video::domain::frame_source::FrameSource;
use crate::video::infrastructure::image_sequence_reader::ImageSequenceReader;

use super::ground_truth::read_first_box;

/// Sequence stored on disk as a directory of frames plus an annotation file.
#[derive(Clone, Debug, PartialEq)]
pub struct DatasetSequence {
    label: String,
    frames_dir: PathBuf,
    annotation: PathBuf,
}

impl DatasetSequence {
    pub fn new(label: impl Into<String>, frames_dir: PathBuf, annotation: PathBuf) -> Self {
        Self {
            label: label.into(),
            frames_dir,
            annotation,
        }
    }

    pub fn frames_dir(&self) -> &Path {
        &self.frames_dir
    }

    pub fn annotation(&self) -> &Path {
        &self.annotation
    }
}

impl SequenceSource for DatasetSequence {
    fn label(&self) -> &str {
        &self.label
    }

    fn open(&self) -> Result<(Box<dyn FrameSource>, BBox), TrackingError> {
        let initial = read_first_box(&self.annotation)?;
        let reader = ImageSequenceReader::open(&self.frames_dir)?;
        Ok((Box::new(reader), initial))
    }
}

/// One sequence per subdirectory of `sequences_dir`, annotated by
/// `<annotations_dir>/<name>.txt`, sorted by name.
///
/// Frames are read from `<name>/img/` when that directory exists, otherwise
/// from `<name>/` itself. Missing annotations are not checked here; such
/// sequences fail when opened.
pub fn discover(sequences_dir: &Path, annotations_dir: &Path) -> std::io::Result<Vec<DatasetSequence>> {
    let mut sequences = Vec::new();
    for entry in fs::read_dir(sequences_dir)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            continue;
        };
        let img = path.join("img");
        let frames_dir = if img.is_dir() { img } else { path };
        let annotation = annotations_dir.join(format!("{name}.txt"));
        sequences.push(DatasetSequence::new(name, frames_dir, annotation));
    }
    sequences.sort_by(|a, b| a.label.cmp(&b.label));
    debug!(
        "Discovered {} sequences in {}",
        sequences.len(),
        sequences_dir.display()
    );
    Ok(sequences)
}

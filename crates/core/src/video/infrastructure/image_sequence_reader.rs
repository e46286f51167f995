use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;
use crate::shared::tracking_error::TrackingError;
use crate::video::domain::frame_source::FrameSource;

/// Reads a sequence stored as one image file per frame.
///
/// Files are ordered by name, so frame numbers must be zero-padded
/// (`0001.jpg`, `0002.jpg`, ...). Non-image files in the directory are ignored.
pub struct ImageSequenceReader {
    paths: Vec<PathBuf>,
    cursor: usize,
}

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl ImageSequenceReader {
    pub fn open(dir: &Path) -> Result<Self, TrackingError> {
        let entries = fs::read_dir(dir).map_err(|e| TrackingError::FrameUnavailable {
            index: 0,
            reason: format!("cannot list {}: {e}", dir.display()),
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_image_file(p))
            .collect();
        paths.sort();
        debug!("{} frames in {}", paths.len(), dir.display());

        Ok(Self::from_paths(paths))
    }

    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        Self { paths, cursor: 0 }
    }
}

impl FrameSource for ImageSequenceReader {
    fn total_frames(&self) -> Option<usize> {
        Some(self.paths.len())
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, TrackingError> {
        let Some(path) = self.paths.get(self.cursor) else {
            return Ok(None);
        };
        let index = self.cursor;
        self.cursor += 1;

        let img = image::open(path)
            .map_err(|e| TrackingError::FrameUnavailable {
                index,
                reason: format!("{}: {e}", path.display()),
            })?
            .to_rgb8();
        let (width, height) = img.dimensions();
        Ok(Some(Frame::new(img.into_raw(), width, height, 3, index)))
    }
}

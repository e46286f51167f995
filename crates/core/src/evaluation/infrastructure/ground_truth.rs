use std::fs;
use std::path::Path;

use crate::shared::bbox::BBox;
use crate::shared::tracking_error::TrackingError;

/// Parses the initial target box from the first line of an annotation file.
///
/// The line holds `x,y,width,height`; tabs and spaces are accepted as
/// delimiters too, since annotation sets disagree on the separator.
pub fn read_first_box(path: &Path) -> Result<BBox, TrackingError> {
    let invalid = |reason: String| TrackingError::GroundTruth {
        path: path.to_path_buf(),
        reason,
    };

    let text = fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
    let line = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or_else(|| invalid("file is empty".to_string()))?;

    let values = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|field| !field.is_empty())
        .map(|field| {
            field
                .parse::<f64>()
                .map_err(|_| invalid(format!("not a number: {field:?}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    match values.as_slice() {
        [x, y, width, height] => Ok(BBox::new(*x, *y, *width, *height)),
        _ => Err(invalid(format!(
            "expected 4 values on the first line, found {}",
            values.len()
        ))),
    }
}

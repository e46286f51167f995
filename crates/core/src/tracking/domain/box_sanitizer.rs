use crate::shared::bbox::BBox;

/// Clamps a candidate box to frame-relative geometry.
///
/// Position is clamped before size, so a box sliding off the right or
/// bottom edge loses width/height instead of being pushed back on-frame.
/// A box starting past the frame edge ends up with zero width (or height);
/// callers treat that as invalid. Non-finite positions become 0 and
/// non-finite sizes become `min_side`.
pub fn sanitize(bbox: &BBox, frame_width: u32, frame_height: u32, min_side: f64) -> BBox {
    let x = finite_or(bbox.x, 0.0).max(0.0);
    let y = finite_or(bbox.y, 0.0).max(0.0);
    let mut width = finite_or(bbox.width, min_side).max(min_side);
    let mut height = finite_or(bbox.height, min_side).max(min_side);

    let fw = frame_width as f64;
    let fh = frame_height as f64;
    if x + width > fw {
        width = (fw - x).max(0.0);
    }
    if y + height > fh {
        height = (fh - y).max(0.0);
    }

    BBox::new(x, y, width, height)
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

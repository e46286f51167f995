use serde::{Deserialize, Serialize};

/// Axis-aligned box in frame pixel coordinates: top-left corner plus size.
///
/// Values are unconstrained until sanitized; trackers may return negative
/// or out-of-frame geometry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Corner form `(x0, y0, x1, y1)` used at the re-detector boundary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Corners {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

/// Whole-pixel rectangle guaranteed to lie inside a frame and to be non-empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn is_empty(&self) -> bool {
        let area = self.area();
        area.is_nan() || area <= 0.0
    }

    pub fn to_corners(&self) -> Corners {
        Corners {
            x0: self.x,
            y0: self.y,
            x1: self.x + self.width,
            y1: self.y + self.height,
        }
    }

    pub fn from_corners(c: &Corners) -> Self {
        Self {
            x: c.x0,
            y: c.y0,
            width: c.x1 - c.x0,
            height: c.y1 - c.y0,
        }
    }

    /// Maps the box onto whole pixels of a `frame_width` x `frame_height`
    /// frame: near edges are floored, far edges ceiled, both clipped.
    ///
    /// Returns `None` when nothing of the box is left inside the frame.
    pub fn pixel_rect(&self, frame_width: u32, frame_height: u32) -> Option<PixelRect> {
        if self.is_empty() || !self.x.is_finite() || !self.y.is_finite() {
            return None;
        }
        let (x0, x1) = pixel_span(self.x, self.width, frame_width)?;
        let (y0, y1) = pixel_span(self.y, self.height, frame_height)?;
        Some(PixelRect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }
}

fn pixel_span(start: f64, len: f64, limit: u32) -> Option<(u32, u32)> {
    let lo = start.floor().clamp(0.0, limit as f64);
    let hi = (start + len).ceil().clamp(0.0, limit as f64);
    if hi > lo {
        Some((lo as u32, hi as u32))
    } else {
        None
    }
}

impl std::fmt::Display for BBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    // ── Corner conversion ────────────────────────────────────────────

    #[rstest]
    #[case::integral(BBox::new(10.0, 10.0, 20.0, 20.0))]
    #[case::fractional(BBox::new(3.5, 7.25, 12.75, 0.5))]
    #[case::negative_origin(BBox::new(-4.0, -8.0, 16.0, 32.0))]
    #[case::zero_size(BBox::new(50.0, 60.0, 0.0, 0.0))]
    fn test_corner_round_trip_is_exact(#[case] b: BBox) {
        assert_eq!(BBox::from_corners(&b.to_corners()), b);
    }

    #[test]
    fn test_to_corners_keeps_origin() {
        let c = BBox::new(1.0, 2.0, 3.0, 4.0).to_corners();
        assert_eq!(c, Corners { x0: 1.0, y0: 2.0, x1: 4.0, y1: 6.0 });
    }

    // ── Area ─────────────────────────────────────────────────────────

    #[test]
    fn test_area() {
        assert_relative_eq!(BBox::new(0.0, 0.0, 4.0, 2.5).area(), 10.0);
    }

    #[rstest]
    #[case::zero_width(BBox::new(0.0, 0.0, 0.0, 10.0))]
    #[case::zero_height(BBox::new(0.0, 0.0, 10.0, 0.0))]
    #[case::negative(BBox::new(0.0, 0.0, -5.0, 10.0))]
    #[case::nan(BBox::new(0.0, 0.0, f64::NAN, 10.0))]
    fn test_degenerate_boxes_are_empty(#[case] b: BBox) {
        assert!(b.is_empty());
    }

    // ── Pixel mapping ────────────────────────────────────────────────

    #[test]
    fn test_pixel_rect_integral_box() {
        let rect = BBox::new(10.0, 10.0, 20.0, 20.0).pixel_rect(100, 100);
        assert_eq!(
            rect,
            Some(PixelRect {
                x: 10,
                y: 10,
                width: 20,
                height: 20
            })
        );
    }

    #[test]
    fn test_pixel_rect_covers_fractional_edges() {
        let rect = BBox::new(99.5, 0.25, 0.5, 1.5).pixel_rect(100, 100).unwrap();
        assert_eq!((rect.x, rect.width), (99, 1));
        assert_eq!((rect.y, rect.height), (0, 2));
    }

    #[test]
    fn test_pixel_rect_clips_to_frame() {
        let rect = BBox::new(-5.0, 90.0, 20.0, 20.0).pixel_rect(100, 100).unwrap();
        assert_eq!(
            rect,
            PixelRect {
                x: 0,
                y: 90,
                width: 15,
                height: 10
            }
        );
    }

    #[test]
    fn test_pixel_rect_outside_frame_is_none() {
        assert!(BBox::new(120.0, 0.0, 10.0, 10.0).pixel_rect(100, 100).is_none());
        assert!(BBox::new(10.0, 10.0, 0.0, 10.0).pixel_rect(100, 100).is_none());
    }

    #[test]
    fn test_display_is_comma_separated() {
        assert_eq!(BBox::new(10.0, 12.5, 20.0, 4.0).to_string(), "10,12.5,20,4");
    }
}

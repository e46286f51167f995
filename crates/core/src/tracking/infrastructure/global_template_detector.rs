use image::imageops::{self, FilterType};
use image::GrayImage;
use log::debug;

use crate::shared::bbox::{BBox, Corners};
use crate::shared::frame::Frame;
use crate::tracking::domain::re_detector::ReDetector;

use super::template_matching::best_match;

/// Longest side of the downscaled frame the search runs on.
pub const DEFAULT_MAX_SEARCH_SIDE: u32 = 160;

/// Whole-frame re-detector: matches the template captured at init against
/// a downscaled copy of every frame.
///
/// The template is never refreshed, so the detector cannot drift; the price
/// is one full-frame search per call.
pub struct GlobalTemplateDetector {
    max_search_side: u32,
    template: Option<GrayImage>,
    size: (f64, f64),
}

impl GlobalTemplateDetector {
    pub fn new(max_search_side: u32) -> Self {
        Self {
            max_search_side: max_search_side.max(1),
            template: None,
            size: (0.0, 0.0),
        }
    }

    fn scale_for(&self, width: u32, height: u32) -> f64 {
        let longest = width.max(height).max(1);
        (self.max_search_side as f64 / longest as f64).min(1.0)
    }
}

impl Default for GlobalTemplateDetector {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SEARCH_SIDE)
    }
}

fn scaled(image: &GrayImage, scale: f64) -> GrayImage {
    if scale >= 1.0 {
        return image.clone();
    }
    let width = ((image.width() as f64 * scale).round() as u32).max(1);
    let height = ((image.height() as f64 * scale).round() as u32).max(1);
    imageops::resize(image, width, height, FilterType::Triangle)
}

impl ReDetector for GlobalTemplateDetector {
    fn init(&mut self, frame: &Frame, corners: &Corners) -> Result<(), Box<dyn std::error::Error>> {
        let bbox = BBox::from_corners(corners);
        let rect = bbox
            .pixel_rect(frame.width(), frame.height())
            .ok_or("initial box lies outside the frame")?;
        self.template = Some(frame.crop(&rect).to_luma_image());
        self.size = (rect.width as f64, rect.height as f64);
        Ok(())
    }

    fn track(&mut self, frame: &Frame) -> Result<Corners, Box<dyn std::error::Error>> {
        let template = self
            .template
            .as_ref()
            .ok_or("re-detector used before init")?;

        let scale = self.scale_for(frame.width(), frame.height());
        let search = scaled(&frame.to_luma_image(), scale);
        let needle = scaled(template, scale);
        let found = best_match(&search, &needle).ok_or("template larger than frame")?;
        debug!(
            "Global match at ({}, {}) scale {scale:.3}, error {:.4}",
            found.x, found.y, found.error
        );

        let bbox = BBox::new(
            (found.x as f64 / scale).round(),
            (found.y as f64 / scale).round(),
            self.size.0,
            self.size.1,
        );
        Ok(bbox.to_corners())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_frame(width: u32, height: u32, sx: u32, sy: u32, side: u32) -> Frame {
        let data = (0..height)
            .flat_map(|y| {
                (0..width).map(move |x| {
                    let inside = x >= sx && x < sx + side && y >= sy && y < sy + side;
                    if inside {
                        220
                    } else {
                        20
                    }
                })
            })
            .collect();
        Frame::new(data, width, height, 1, 0)
    }

    #[test]
    fn test_finds_target_anywhere_at_full_resolution() {
        let mut detector = GlobalTemplateDetector::new(200);
        let start = BBox::new(8.0, 8.0, 14.0, 14.0);
        detector
            .init(&square_frame(120, 90, 10, 10, 10), &start.to_corners())
            .unwrap();

        let corners = detector.track(&square_frame(120, 90, 95, 70, 10)).unwrap();

        assert_eq!(BBox::from_corners(&corners), BBox::new(93.0, 68.0, 14.0, 14.0));
    }

    #[test]
    fn test_downscaled_search_maps_back_to_frame_coordinates() {
        let mut detector = GlobalTemplateDetector::new(100);
        let start = BBox::new(36.0, 36.0, 28.0, 28.0);
        detector
            .init(&square_frame(200, 200, 40, 40, 20), &start.to_corners())
            .unwrap();

        let found = BBox::from_corners(&detector.track(&square_frame(200, 200, 120, 100, 20)).unwrap());

        assert!((found.x - 116.0).abs() <= 2.0, "x = {}", found.x);
        assert!((found.y - 96.0).abs() <= 2.0, "y = {}", found.y);
        assert_eq!((found.width, found.height), (28.0, 28.0));
    }

    #[test]
    fn test_track_before_init_is_error() {
        let mut detector = GlobalTemplateDetector::default();
        assert!(detector.track(&square_frame(10, 10, 0, 0, 2)).is_err());
    }

    #[test]
    fn test_scale_never_upsamples() {
        let detector = GlobalTemplateDetector::new(160);
        assert_eq!(detector.scale_for(100, 50), 1.0);
        assert_eq!(detector.scale_for(320, 100), 0.5);
    }
}

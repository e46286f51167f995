use image::imageops;
use image::GrayImage;
use log::debug;

use crate::shared::bbox::{BBox, PixelRect};
use crate::shared::frame::Frame;
use crate::tracking::domain::fast_tracker::FastTracker;

use super::template_matching::best_match;

pub const DEFAULT_SEARCH_MARGIN: u32 = 16;
pub const DEFAULT_MAX_ERROR: f32 = 0.05;

/// Local template tracker: searches a window around the last position and
/// refreshes its template from every accepted match.
///
/// The refresh lets it follow gradual appearance changes, and also lets it
/// drift onto background when the target is occluded, which is the failure
/// mode the arbiter's change check is there to catch.
pub struct TemplateTracker {
    search_margin: u32,
    max_error: f32,
    template: Option<GrayImage>,
    position: Option<PixelRect>,
}

impl TemplateTracker {
    pub fn new(search_margin: u32, max_error: f32) -> Self {
        Self {
            search_margin,
            max_error,
            template: None,
            position: None,
        }
    }
}

impl Default for TemplateTracker {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_MARGIN, DEFAULT_MAX_ERROR)
    }
}

fn to_bbox(rect: &PixelRect) -> BBox {
    BBox::new(
        rect.x as f64,
        rect.y as f64,
        rect.width as f64,
        rect.height as f64,
    )
}

/// `rect` grown by `margin` on every side, clipped to the image.
fn search_window(rect: &PixelRect, margin: u32, width: u32, height: u32) -> PixelRect {
    let x0 = rect.x.saturating_sub(margin);
    let y0 = rect.y.saturating_sub(margin);
    let x1 = (rect.x + rect.width + margin).min(width);
    let y1 = (rect.y + rect.height + margin).min(height);
    PixelRect {
        x: x0,
        y: y0,
        width: x1 - x0,
        height: y1 - y0,
    }
}

impl FastTracker for TemplateTracker {
    fn init(&mut self, frame: &Frame, bbox: &BBox) -> Result<(), Box<dyn std::error::Error>> {
        let rect = bbox
            .pixel_rect(frame.width(), frame.height())
            .ok_or("initial box lies outside the frame")?;
        self.template = Some(frame.crop(&rect).to_luma_image());
        self.position = Some(rect);
        Ok(())
    }

    fn update(&mut self, frame: &Frame) -> Result<(BBox, bool), Box<dyn std::error::Error>> {
        let (template, rect) = match (&self.template, &self.position) {
            (Some(t), Some(r)) => (t, *r),
            _ => return Err("template tracker used before init".into()),
        };

        let gray = frame.to_luma_image();
        let window = search_window(&rect, self.search_margin, gray.width(), gray.height());
        let search =
            imageops::crop_imm(&gray, window.x, window.y, window.width, window.height).to_image();

        let Some(found) = best_match(&search, template) else {
            debug!("Template no longer fits the search window");
            return Ok((to_bbox(&rect), false));
        };
        if found.error > self.max_error {
            debug!("Template match error {:.4} above {:.4}", found.error, self.max_error);
            return Ok((to_bbox(&rect), false));
        }

        let next = PixelRect {
            x: window.x + found.x,
            y: window.y + found.y,
            width: rect.width,
            height: rect.height,
        };
        self.template = Some(
            imageops::crop_imm(&gray, next.x, next.y, next.width, next.height).to_image(),
        );
        self.position = Some(next);
        Ok((to_bbox(&next), true))
    }
}

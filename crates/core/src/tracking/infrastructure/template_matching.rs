use image::GrayImage;
use imageproc::template_matching::{find_extremes, match_template, MatchTemplateMethod};

/// Best placement of a template inside a search image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct TemplateMatch {
    pub x: u32,
    pub y: u32,
    /// Mean squared pixel error scaled to `0.0..=1.0`.
    pub error: f32,
}

/// Exhaustive sum-of-squared-errors search.
///
/// Returns `None` when the template does not fit inside `search`.
pub(super) fn best_match(search: &GrayImage, template: &GrayImage) -> Option<TemplateMatch> {
    let (tw, th) = template.dimensions();
    if tw == 0 || th == 0 || tw > search.width() || th > search.height() {
        return None;
    }

    let scores = match_template(search, template, MatchTemplateMethod::SumOfSquaredErrors);
    let extremes = find_extremes(&scores);
    let norm = (tw * th) as f32 * 255.0 * 255.0;
    Some(TemplateMatch {
        x: extremes.min_value_location.0,
        y: extremes.min_value_location.1,
        error: extremes.min_value / norm,
    })
}

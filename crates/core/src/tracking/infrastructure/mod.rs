pub mod global_template_detector;
mod template_matching;
pub mod template_tracker;

pub mod box_sanitizer;
pub mod change_signal;
pub mod fast_tracker;
pub mod pending_selection;
pub mod re_detector;
pub mod tracker_arbiter;

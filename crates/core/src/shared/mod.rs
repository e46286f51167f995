pub mod bbox;
pub mod constants;
pub mod frame;
pub mod tracker_kind;
pub mod tracking_config;
pub mod tracking_error;

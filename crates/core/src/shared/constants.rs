/// Side of the downsampled square used for crop fingerprints (8x8 = 64 bits).
pub const DEFAULT_FINGERPRINT_SIDE: u32 = 8;
pub const MAX_FINGERPRINT_SIDE: u32 = 16;

/// Hamming distance at or above which the re-detector takes over.
pub const DEFAULT_CHANGE_THRESHOLD: u32 = 10;

/// Smallest box side kept by the sanitizer, in pixels.
pub const DEFAULT_MIN_SIDE: f64 = 4.0;

/// Interactive sessions tolerate slow frames; benchmarks cut stalled runs short.
pub const INTERACTIVE_STALL_FPS: f64 = 1.0;
pub const BENCHMARK_STALL_FPS: f64 = 5.0;

pub const INVALID_RECORD_LINE: &str = "NaN,NaN,NaN,NaN";

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

use image::imageops::{self, FilterType};

use crate::shared::bbox::BBox;
use crate::shared::constants::MAX_FINGERPRINT_SIDE;
use crate::shared::frame::{luma, Frame};
use crate::shared::tracking_error::TrackingError;

/// 64-bit average hash of a crop. Only ever compared by Hamming distance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    pub fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u64 {
        self.0
    }

    pub fn distance(self, other: Fingerprint) -> u32 {
        distance(self, other)
    }
}

/// Number of differing bits between two fingerprints (0..=64).
pub fn distance(a: Fingerprint, b: Fingerprint) -> u32 {
    (a.0 ^ b.0).count_ones()
}

/// Cheap proxy for "how much did the tracked region change": an average
/// hash over a `side` x `side` grayscale thumbnail of the crop.
///
/// Bits are shifted in raster order, so for `side > 8` only the last 64
/// thumbnail pixels survive in the fingerprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChangeSignal {
    side: u32,
}

impl ChangeSignal {
    pub fn new(side: u32) -> Self {
        Self {
            side: side.clamp(1, MAX_FINGERPRINT_SIDE),
        }
    }

    pub fn side(&self) -> u32 {
        self.side
    }

    pub fn fingerprint(&self, crop: &Frame) -> Result<Fingerprint, TrackingError> {
        if crop.width() == 0 || crop.height() == 0 {
            return Err(TrackingError::InvalidRegion);
        }

        let thumb = imageops::resize(
            &crop.to_rgb_image(),
            self.side,
            self.side,
            FilterType::Triangle,
        );
        let intensities: Vec<u32> = thumb
            .pixels()
            .map(|p| luma(p[0], p[1], p[2]) as u32)
            .collect();
        let mean = intensities.iter().sum::<u32>() / intensities.len() as u32;

        let mut bits = 0u64;
        for value in intensities {
            bits <<= 1;
            if value >= mean {
                bits |= 1;
            }
        }
        Ok(Fingerprint(bits))
    }

    /// Fingerprints the part of `frame` covered by `bbox`.
    pub fn fingerprint_region(
        &self,
        frame: &Frame,
        bbox: &BBox,
    ) -> Result<Fingerprint, TrackingError> {
        let rect = bbox
            .pixel_rect(frame.width(), frame.height())
            .ok_or(TrackingError::InvalidRegion)?;
        self.fingerprint(&frame.crop(&rect))
    }
}

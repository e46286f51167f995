use image::{GrayImage, Luma, Rgb, RgbImage};
use ndarray::{s, ArrayView3};

use super::bbox::PixelRect;

/// A single video/image frame: contiguous bytes in row-major order
/// (1 = gray, 3 = RGB, 4 = RGBA channels).
///
/// Format conversion happens at I/O boundaries only; the tracking core
/// borrows frames read-only for the duration of one step.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Copies the pixels under `rect` into a new frame with the same index.
    ///
    /// `rect` must already lie inside the frame (see [`PixelRect`]).
    pub fn crop(&self, rect: &PixelRect) -> Frame {
        let view = self.as_ndarray();
        let region = view.slice(s![
            rect.y as usize..(rect.y + rect.height) as usize,
            rect.x as usize..(rect.x + rect.width) as usize,
            ..
        ]);
        let data: Vec<u8> = region.iter().copied().collect();
        Frame::new(data, rect.width, rect.height, self.channels, self.index)
    }

    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| Rgb(self.rgb_at(x, y)))
    }

    /// Single-channel intensity image using ITU-R BT.601 weights.
    pub fn to_luma_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            let [r, g, b] = self.rgb_at(x, y);
            Luma([luma(r, g, b)])
        })
    }

    fn rgb_at(&self, x: u32, y: u32) -> [u8; 3] {
        let c = self.channels as usize;
        let i = (y as usize * self.width as usize + x as usize) * c;
        if c < 3 {
            let v = self.data[i];
            [v, v, v]
        } else {
            [self.data[i], self.data[i + 1], self.data[i + 2]]
        }
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

/// BT.601 luma, rounded to the nearest integer.
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32 + 500) / 1000) as u8
}

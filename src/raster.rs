//! Owned pixel buffers and glyph geometry
//!
//! All row-major index arithmetic lives in [`Raster::index`]; every other
//! accessor goes through it and is bounds-checked.

use crate::error::OcrError;
use image::{DynamicImage, GrayImage};
use serde::{Serialize, Serializer};

/// Channel 0 values below this round to ink, everything else to background
pub const INK_CUTOFF: u8 = 128;

/// Row-major pixel buffer with `channels` interleaved samples per pixel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<u8>,
}

impl Raster {
    /// Wrap a raw buffer, validating its length against the dimensions
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Result<Self, OcrError> {
        if channels == 0 {
            return Err(OcrError::InvalidRaster(
                "raster must have at least one channel".to_string(),
            ));
        }

        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(OcrError::InvalidRaster(format!(
                "buffer holds {} bytes, {}x{}x{} needs {}",
                data.len(),
                width,
                height,
                channels,
                expected
            )));
        }

        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Single-channel raster filled with `value`
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        Self {
            width,
            height,
            channels: 1,
            data: vec![value; width as usize * height as usize],
        }
    }

    /// Luma view of a decoded image
    pub fn from_image(image: &DynamicImage) -> Self {
        Self::from_gray(image.to_luma8())
    }

    pub fn from_gray(gray: GrayImage) -> Self {
        let (width, height) = gray.dimensions();
        Self {
            width,
            height,
            channels: 1,
            data: gray.into_raw(),
        }
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

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Offset of the first channel of pixel (x, y), or None outside the raster
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * self.channels as usize)
    }

    /// Channel-0 sample at (x, y)
    pub fn sample(&self, x: u32, y: u32) -> Option<u8> {
        self.index(x, y).map(|i| self.data[i])
    }

    pub fn is_ink(&self, x: u32, y: u32) -> bool {
        self.sample(x, y).is_some_and(|v| v < INK_CUTOFF)
    }

    /// Set every channel of pixel (x, y) to `value`
    pub fn set(&mut self, x: u32, y: u32, value: u8) -> Result<(), OcrError> {
        let i = self.index(x, y).ok_or_else(|| {
            OcrError::InvalidRaster(format!(
                "pixel ({}, {}) outside {}x{} raster",
                x, y, self.width, self.height
            ))
        })?;
        self.data[i..i + self.channels as usize].fill(value);
        Ok(())
    }

    /// Paint an inclusive rectangle, clipped to the raster
    pub fn fill_rect(&mut self, bbox: &BoundingBox, value: u8) {
        let max_x = bbox.max_x.min(self.width.saturating_sub(1));
        let max_y = bbox.max_y.min(self.height.saturating_sub(1));
        for y in bbox.min_y..=max_y {
            for x in bbox.min_x..=max_x {
                // Clipped above, cannot fail
                let _ = self.set(x, y, value);
            }
        }
    }

    /// Copy the pixels covered by `bbox` into a new raster
    pub fn crop(&self, bbox: &BoundingBox) -> Result<Raster, OcrError> {
        if bbox.max_x >= self.width || bbox.max_y >= self.height {
            return Err(OcrError::InvalidRaster(format!(
                "crop {:?} exceeds {}x{} raster",
                bbox, self.width, self.height
            )));
        }

        let channels = self.channels as usize;
        let row_len = bbox.width() as usize * channels;
        let mut data = Vec::with_capacity(row_len * bbox.height() as usize);
        for y in bbox.min_y..=bbox.max_y {
            let start = self
                .index(bbox.min_x, y)
                .ok_or_else(|| OcrError::Internal("crop row out of bounds".to_string()))?;
            data.extend_from_slice(&self.data[start..start + row_len]);
        }

        Raster::new(bbox.width(), bbox.height(), self.channels, data)
    }

    /// Channel 0 as an 8-bit grayscale image
    pub fn to_gray_image(&self) -> GrayImage {
        let channels = self.channels as usize;
        let samples = self.data.iter().step_by(channels).copied().collect();
        // Length is width * height by construction
        GrayImage::from_raw(self.width, self.height, samples)
            .unwrap_or_else(|| GrayImage::new(self.width, self.height))
    }
}

/// Axis-aligned box with inclusive pixel corners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoundingBox {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl BoundingBox {
    pub fn new(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Box covering a single pixel
    pub fn point(x: u32, y: u32) -> Self {
        Self::new(x, y, x, y)
    }

    /// Pixel columns covered
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    /// Pixel rows covered
    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    pub fn include(&mut self, x: u32, y: u32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

impl Serialize for BoundingBox {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Rect {
            x: u32,
            y: u32,
            width: u32,
            height: u32,
        }

        Rect {
            x: self.min_x,
            y: self.min_y,
            width: self.width(),
            height: self.height(),
        }
        .serialize(serializer)
    }
}

/// A glyph crop paired with where it came from in the source raster
#[derive(Debug, Clone)]
pub struct CroppedRegion {
    pub raster: Raster,
    pub bounding_box: BoundingBox,
}

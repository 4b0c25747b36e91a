use crate::error::OcrError;
use image::{GrayImage, Luma};

/// Linear stretch so the darkest pixel maps to 0 and the brightest to 255
pub fn apply(image: GrayImage) -> Result<GrayImage, OcrError> {
    let (low, high) = image
        .pixels()
        .fold((u8::MAX, u8::MIN), |(low, high), Luma([v])| {
            (low.min(*v), high.max(*v))
        });

    // Flat image, nothing to stretch
    if high <= low {
        return Ok(image);
    }

    let lut = stretch_table(low, high);
    let mut stretched = image;
    for pixel in stretched.pixels_mut() {
        pixel.0[0] = lut[pixel.0[0] as usize];
    }
    Ok(stretched)
}

fn stretch_table(low: u8, high: u8) -> [u8; 256] {
    let range = (high - low) as f32;
    let mut lut = [0u8; 256];
    for (value, slot) in lut.iter_mut().enumerate() {
        let clamped = (value as u8).clamp(low, high);
        *slot = (((clamped - low) as f32 / range) * 255.0).round() as u8;
    }
    lut
}

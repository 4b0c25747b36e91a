//! Image binarization ahead of segmentation
//!
//! Segmentation expects ink as 0 and background as 255 in channel 0. The
//! [`Preprocessor`] trait is the seam for producing that raster; [`Pipeline`]
//! is the default implementation.

pub mod pipeline;
pub mod steps;

pub use pipeline::{Pipeline, Preset, PreprocessingResult, StepTiming};

use crate::error::OcrError;
use image::DynamicImage;

/// Turns a decoded image into a binary one
pub trait Preprocessor: Send + Sync {
    /// Identifier reported in responses and logs
    fn name(&self) -> &str;

    fn preprocess(&self, image: DynamicImage) -> Result<DynamicImage, OcrError>;
}

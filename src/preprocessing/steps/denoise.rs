use crate::error::OcrError;
use image::GrayImage;
use imageproc::filter::median_filter;

/// 3x3 median; removes salt-and-pepper pixels while keeping stroke edges
pub fn apply(image: GrayImage) -> Result<GrayImage, OcrError> {
    Ok(median_filter(&image, 1, 1))
}

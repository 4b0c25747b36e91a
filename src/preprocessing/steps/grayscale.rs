use crate::error::OcrError;
use image::{DynamicImage, GrayImage};

/// Collapse any decoded image to 8-bit luma; the first step of every preset
pub fn apply(image: DynamicImage) -> Result<GrayImage, OcrError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(OcrError::PreprocessingError(
            "image has zero area".to_string(),
        ));
    }
    Ok(image.into_luma8())
}

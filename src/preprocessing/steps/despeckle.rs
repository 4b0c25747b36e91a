use crate::error::OcrError;
use image::GrayImage;
use imageproc::distance_transform::Norm;
use imageproc::morphology::close;

/// Structuring radius; ink specks up to 2 px across are filled in
const RADIUS: u8 = 1;

/// Remove isolated ink specks from a binarized image
///
/// Morphology treats non-zero pixels as foreground, so closing the white
/// background swallows small dark blobs while larger strokes survive.
pub fn apply(image: GrayImage) -> Result<GrayImage, OcrError> {
    Ok(close(&image, Norm::LInf, RADIUS))
}

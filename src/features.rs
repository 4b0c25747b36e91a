use crate::error::OcrError;
use crate::raster::Raster;
use image::imageops::{self, FilterType};

/// Largest channel-0 sample; features are divided by this
const MAX_SAMPLE: f32 = 255.0;

/// Resampling grid in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureGrid {
    pub width: u32,
    pub height: u32,
}

impl Default for FeatureGrid {
    fn default() -> Self {
        Self {
            width: 16,
            height: 20,
        }
    }
}

impl FeatureGrid {
    /// Grid samples plus the trailing aspect ratio
    pub fn feature_len(&self) -> usize {
        (self.width * self.height) as usize + 1
    }
}

/// Normalized grid samples followed by the crop aspect ratio
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f32>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Grid samples without the trailing aspect ratio
    pub fn samples(&self) -> &[f32] {
        &self.0[..self.0.len().saturating_sub(1)]
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.0.last().copied().unwrap_or_default()
    }
}

/// Build the feature vector for one glyph crop
///
/// The crop is resampled nearest-neighbor onto `grid`, channel 0 is scaled
/// into [0, 1], and the crop's width / height ratio is appended last.
pub fn extract_features(crop: &Raster, grid: FeatureGrid) -> Result<FeatureVector, OcrError> {
    if crop.is_empty() {
        return Err(OcrError::InvalidRaster(
            "cannot extract features from an empty crop".to_string(),
        ));
    }

    let gray = crop.to_gray_image();
    let resampled = imageops::resize(&gray, grid.width, grid.height, FilterType::Nearest);

    let mut features = Vec::with_capacity(grid.feature_len());
    features.extend(resampled.pixels().map(|p| p.0[0] as f32 / MAX_SAMPLE));
    features.push(crop.width() as f32 / crop.height() as f32);

    Ok(FeatureVector(features))
}

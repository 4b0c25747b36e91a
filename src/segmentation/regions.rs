use super::labeling::Labeling;
use crate::raster::BoundingBox;

/// Bounding box and pixel count of one labeled component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub label: u32,
    pub bounding_box: BoundingBox,
    pub pixel_count: u32,
}

/// Why a region was not accepted as a glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Degenerate,
    TooWideForHeight,
    TooTall,
    TooWide,
    TooShort,
    TooThin,
    TooSmall,
    TouchesBorder,
}

/// Shape, size and position limits a region must meet to count as a glyph
///
/// Ratios are fractions of the source image dimensions. Width and height
/// are measured as `max - min` of the inclusive box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphFilter {
    /// Upper bound (exclusive) on width / height
    pub max_aspect_ratio: f64,
    pub max_height_ratio: f64,
    pub max_width_ratio: f64,
    pub min_height_ratio: f64,
    pub min_width_ratio: f64,
    /// Lower bound (exclusive) on width * height
    pub min_area: u64,
}

impl Default for GlyphFilter {
    fn default() -> Self {
        Self {
            max_aspect_ratio: 1.6,
            max_height_ratio: 0.75,
            max_width_ratio: 0.25,
            min_height_ratio: 0.25,
            min_width_ratio: 0.01,
            min_area: 100,
        }
    }
}

impl GlyphFilter {
    /// Accept or reject a box found in an `image_width` x `image_height` raster
    pub fn check(
        &self,
        bbox: &BoundingBox,
        image_width: u32,
        image_height: u32,
    ) -> Result<(), Rejection> {
        if bbox.min_x >= bbox.max_x || bbox.min_y >= bbox.max_y {
            return Err(Rejection::Degenerate);
        }

        let width = bbox.max_x - bbox.min_x;
        let height = bbox.max_y - bbox.min_y;
        let (w, h) = (width as f64, height as f64);
        let (image_w, image_h) = (image_width as f64, image_height as f64);

        if height == 0 || w / h >= self.max_aspect_ratio {
            return Err(Rejection::TooWideForHeight);
        }
        if h >= image_h * self.max_height_ratio {
            return Err(Rejection::TooTall);
        }
        if w >= image_w * self.max_width_ratio {
            return Err(Rejection::TooWide);
        }
        if h <= image_h * self.min_height_ratio {
            return Err(Rejection::TooShort);
        }
        if w <= image_w * self.min_width_ratio {
            return Err(Rejection::TooThin);
        }
        if width as u64 * height as u64 <= self.min_area {
            return Err(Rejection::TooSmall);
        }
        if bbox.min_x == 0
            || bbox.min_y == 0
            || bbox.max_x >= image_width.saturating_sub(1)
            || bbox.max_y >= image_height.saturating_sub(1)
        {
            return Err(Rejection::TouchesBorder);
        }

        Ok(())
    }
}

/// Collect one region per component in a single pass over the labeling
pub fn collect_regions(labeling: &Labeling) -> Vec<Region> {
    let mut regions: Vec<Option<Region>> = vec![None; labeling.component_count()];

    for (x, y, label) in labeling.ink_pixels() {
        match &mut regions[label as usize] {
            Some(region) => {
                region.bounding_box.include(x, y);
                region.pixel_count += 1;
            }
            slot @ None => {
                *slot = Some(Region {
                    label,
                    bounding_box: BoundingBox::point(x, y),
                    pixel_count: 1,
                });
            }
        }
    }

    regions.into_iter().flatten().collect()
}

/// Regions of `labeling` that pass `filter`, in label order
pub fn accepted_regions(labeling: &Labeling, filter: &GlyphFilter) -> Vec<Region> {
    let (width, height) = (labeling.width(), labeling.height());

    collect_regions(labeling)
        .into_iter()
        .filter(|region| match filter.check(&region.bounding_box, width, height) {
            Ok(()) => true,
            Err(reason) => {
                tracing::trace!(
                    "Rejected region {} at {:?} ({} px): {:?}",
                    region.label,
                    region.bounding_box,
                    region.pixel_count,
                    reason
                );
                false
            }
        })
        .collect()
}

//! Glyph segmentation
//!
//! Binary raster in, one crop per plausible glyph out, ordered left to right.

pub mod disjoint_set;
pub mod labeling;
pub mod merge;
pub mod regions;

pub use disjoint_set::DisjointSet;
pub use labeling::{label_components, Labeling, BACKGROUND_LABEL};
pub use merge::{merge_boxes, MergeRadius};
pub use regions::{accepted_regions, collect_regions, GlyphFilter, Region, Rejection};

use crate::error::OcrError;
use crate::raster::{BoundingBox, CroppedRegion, Raster};

/// Boxes of every glyph in `raster`, sorted by x origin
pub fn glyph_boxes(
    raster: &Raster,
    filter: &GlyphFilter,
    radius: MergeRadius,
) -> Result<Vec<BoundingBox>, OcrError> {
    if raster.is_empty() {
        return Ok(Vec::new());
    }

    let labeling = label_components(raster)?;
    let accepted = accepted_regions(&labeling, filter);
    let boxes: Vec<BoundingBox> = accepted.iter().map(|r| r.bounding_box).collect();
    let merged = merge_boxes(&boxes, radius)?;

    tracing::debug!(
        "Segmentation: {} components, {} accepted, {} glyphs",
        labeling.component_count(),
        accepted.len(),
        merged.len()
    );

    Ok(merged)
}

/// Crop every glyph out of `raster`, sorted by x origin
pub fn extract_glyphs(
    raster: &Raster,
    filter: &GlyphFilter,
    radius: MergeRadius,
) -> Result<Vec<CroppedRegion>, OcrError> {
    glyph_boxes(raster, filter, radius)?
        .into_iter()
        .map(|bounding_box| {
            Ok(CroppedRegion {
                raster: raster.crop(&bounding_box)?,
                bounding_box,
            })
        })
        .collect()
}

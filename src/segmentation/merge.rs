//! Merge accepted regions whose padded boxes overlap
//!
//! Dots, accents and strokes split by labeling end up as separate regions
//! sitting a pixel or two apart. Each box is padded by a merge radius, any
//! groups whose padded extents overlap are unioned, and the sweep repeats
//! until nothing new merges. A group's final extent is the union of its
//! members' un-padded boxes.

use super::disjoint_set::DisjointSet;
use crate::error::OcrError;
use crate::raster::BoundingBox;

/// Padding applied to each side of a box before overlap testing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeRadius {
    pub x: u32,
    pub y: u32,
}

impl Default for MergeRadius {
    fn default() -> Self {
        Self { x: 1, y: 3 }
    }
}

/// Half-open extent of a padded box, signed so padding can cross the origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PaddedExtent {
    x0: i64,
    y0: i64,
    x1: i64,
    y1: i64,
}

impl PaddedExtent {
    fn new(bbox: &BoundingBox, radius: MergeRadius) -> Self {
        let (rx, ry) = (radius.x as i64, radius.y as i64);
        Self {
            x0: bbox.min_x as i64 - rx,
            y0: bbox.min_y as i64 - ry,
            x1: bbox.max_x as i64 + 1 + rx,
            y1: bbox.max_y as i64 + 1 + ry,
        }
    }

    /// Overlap with positive area; touching edges do not count
    fn intersects(&self, other: &Self) -> bool {
        self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
    }
}

/// True when the padded forms of `a` and `b` overlap
pub fn padded_overlap(a: &BoundingBox, b: &BoundingBox, radius: MergeRadius) -> bool {
    PaddedExtent::new(a, radius).intersects(&PaddedExtent::new(b, radius))
}

/// Merge overlapping boxes to a fixed point, returning them sorted by (x, y)
pub fn merge_boxes(
    boxes: &[BoundingBox],
    radius: MergeRadius,
) -> Result<Vec<BoundingBox>, OcrError> {
    let mut groups = DisjointSet::with_capacity(boxes.len());
    for index in 0..boxes.len() {
        groups.make_set(index as u32);
    }

    let mut sweeps = 0;
    loop {
        sweeps += 1;
        let extents = group_extents(&mut groups, boxes)?;

        let mut merged = false;
        for (i, (root_a, box_a)) in extents.iter().enumerate() {
            for (root_b, box_b) in &extents[i + 1..] {
                if !padded_overlap(box_a, box_b, radius) {
                    continue;
                }
                if groups.find(*root_a)? != groups.find(*root_b)? {
                    groups.union(*root_a, *root_b)?;
                    merged = true;
                }
            }
        }

        if !merged {
            let mut merged_boxes: Vec<BoundingBox> =
                extents.into_iter().map(|(_, bbox)| bbox).collect();
            merged_boxes.sort_by_key(|bbox| (bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y));
            merged_boxes.dedup();

            tracing::trace!(
                "Merged {} regions into {} glyph boxes in {} sweeps",
                boxes.len(),
                merged_boxes.len(),
                sweeps
            );
            return Ok(merged_boxes);
        }
    }
}

/// Un-padded union box of every current group, keyed by root
fn group_extents(
    groups: &mut DisjointSet,
    boxes: &[BoundingBox],
) -> Result<Vec<(u32, BoundingBox)>, OcrError> {
    let mut by_root: Vec<Option<BoundingBox>> = vec![None; boxes.len()];
    for (index, bbox) in boxes.iter().enumerate() {
        let root = groups.find(index as u32)? as usize;
        by_root[root] = Some(match by_root[root] {
            Some(existing) => existing.union(bbox),
            None => *bbox,
        });
    }

    Ok(by_root
        .into_iter()
        .enumerate()
        .filter_map(|(root, bbox)| bbox.map(|bbox| (root as u32, bbox)))
        .collect())
}

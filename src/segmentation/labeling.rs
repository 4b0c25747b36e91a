//! Two-pass connected-component labeling
//!
//! Pass 1 walks the raster in row-major order looking only at the pixel
//! above and the pixel to the left, handing out provisional labels and
//! recording equivalences in a [`DisjointSet`]. Pass 2 resolves every
//! provisional label and renumbers the survivors densely.

use super::disjoint_set::DisjointSet;
use crate::error::OcrError;
use crate::raster::Raster;

/// Provisional value carried by background pixels; never used as a real label
pub const BACKGROUND_LABEL: u32 = 255;

/// Hands out provisional labels, skipping the background sentinel
#[derive(Debug, Default)]
struct LabelAllocator {
    last: u32,
}

impl LabelAllocator {
    fn next(&mut self) -> Result<u32, OcrError> {
        let mut label = self
            .last
            .checked_add(1)
            .ok_or(OcrError::LabelSpaceExhausted(self.last))?;
        if label == BACKGROUND_LABEL {
            label = label
                .checked_add(1)
                .ok_or(OcrError::LabelSpaceExhausted(self.last))?;
        }
        self.last = label;
        Ok(label)
    }
}

/// Result of labeling: every pixel mapped to a dense component index
#[derive(Debug, Clone)]
pub struct Labeling {
    width: u32,
    height: u32,
    labels: Vec<Option<u32>>,
    component_count: usize,
}

impl Labeling {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of distinct components, K; indices run `0..K`
    pub fn component_count(&self) -> usize {
        self.component_count
    }

    /// Dense component index of (x, y), None for background or out of range
    pub fn label_at(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.labels[y as usize * self.width as usize + x as usize]
    }

    /// Row-major iterator of `(x, y, component)` for every ink pixel
    pub fn ink_pixels(&self) -> impl Iterator<Item = (u32, u32, u32)> + '_ {
        let width = self.width as usize;
        self.labels.iter().enumerate().filter_map(move |(i, label)| {
            label.map(|label| ((i % width) as u32, (i / width) as u32, label))
        })
    }
}

/// Provisional labels after pass 1, plus their equivalences
#[derive(Debug)]
pub struct ProvisionalLabels {
    width: u32,
    height: u32,
    labels: Vec<u32>,
    equivalences: DisjointSet,
}

impl ProvisionalLabels {
    /// Provisional label at (x, y), `BACKGROUND_LABEL` for background
    pub fn get(&self, x: u32, y: u32) -> u32 {
        self.labels[y as usize * self.width as usize + x as usize]
    }

    pub fn equivalences(&mut self) -> &mut DisjointSet {
        &mut self.equivalences
    }
}

/// Pass 1: provisional labels from the causal above/left mask
pub fn first_pass(raster: &Raster) -> Result<ProvisionalLabels, OcrError> {
    let (width, height) = (raster.width(), raster.height());
    let mut labels = vec![BACKGROUND_LABEL; width as usize * height as usize];
    let mut equivalences = DisjointSet::new();
    let mut allocator = LabelAllocator::default();

    let at = |x: u32, y: u32| y as usize * width as usize + x as usize;

    for y in 0..height {
        for x in 0..width {
            if !raster.is_ink(x, y) {
                continue;
            }

            let above = (y > 0)
                .then(|| labels[at(x, y - 1)])
                .filter(|&label| label != BACKGROUND_LABEL);
            let left = (x > 0)
                .then(|| labels[at(x - 1, y)])
                .filter(|&label| label != BACKGROUND_LABEL);

            let label = match (above, left) {
                (None, None) => {
                    let fresh = allocator.next()?;
                    equivalences.make_set(fresh);
                    fresh
                }
                (Some(above), None) => above,
                (None, Some(left)) => left,
                (Some(above), Some(left)) => {
                    if above != left {
                        equivalences.union(above, left)?;
                    }
                    above
                }
            };
            labels[at(x, y)] = label;
        }
    }

    Ok(ProvisionalLabels {
        width,
        height,
        labels,
        equivalences,
    })
}

/// Pass 2: resolve provisional labels and renumber them `0..K` in scan order
pub fn second_pass(mut provisional: ProvisionalLabels) -> Result<Labeling, OcrError> {
    let mut dense: Vec<Option<u32>> = Vec::new();
    let mut next_index = 0u32;
    let mut labels = Vec::with_capacity(provisional.labels.len());

    for i in 0..provisional.labels.len() {
        let label = provisional.labels[i];
        if label == BACKGROUND_LABEL {
            labels.push(None);
            continue;
        }

        let root = provisional.equivalences.find(label)? as usize;
        if root >= dense.len() {
            dense.resize(root + 1, None);
        }
        let index = *dense[root].get_or_insert_with(|| {
            let index = next_index;
            next_index += 1;
            index
        });
        labels.push(Some(index));
    }

    Ok(Labeling {
        width: provisional.width,
        height: provisional.height,
        labels,
        component_count: next_index as usize,
    })
}

/// Label every connected run of ink in `raster`
pub fn label_components(raster: &Raster) -> Result<Labeling, OcrError> {
    let provisional = first_pass(raster)?;
    let provisional_count = provisional.equivalences.set_count();
    let labeling = second_pass(provisional)?;

    tracing::trace!(
        "Labeled {}x{} raster: {} components",
        raster.width(),
        raster.height(),
        labeling.component_count()
    );
    debug_assert_eq!(provisional_count, labeling.component_count());

    Ok(labeling)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::BoundingBox;

    fn raster_from_rows(rows: &[&str]) -> Raster {
        let height = rows.len() as u32;
        let width = rows[0].len() as u32;
        let data = rows
            .iter()
            .flat_map(|row| row.bytes().map(|b| if b == b'#' { 0 } else { 255 }))
            .collect();
        Raster::new(width, height, 1, data).unwrap()
    }

    #[test]
    fn test_allocator_skips_background_sentinel() {
        let mut allocator = LabelAllocator { last: 253 };
        assert_eq!(allocator.next().unwrap(), 254);
        assert_eq!(allocator.next().unwrap(), 256);
        assert_eq!(allocator.next().unwrap(), 257);
    }

    #[test]
    fn test_allocator_reports_exhaustion() {
        let mut allocator = LabelAllocator { last: u32::MAX };
        assert!(matches!(
            allocator.next(),
            Err(OcrError::LabelSpaceExhausted(_))
        ));
    }

    #[test]
    fn test_blank_raster_has_no_components() {
        let labeling = label_components(&Raster::filled(12, 7, 255)).unwrap();
        assert_eq!(labeling.component_count(), 0);
        assert_eq!(labeling.ink_pixels().count(), 0);
    }

    #[test]
    fn test_separate_blobs_get_distinct_labels() {
        let raster = raster_from_rows(&[
            "##..#", //
            "##..#", //
            ".....", //
            "###..",
        ]);
        let labeling = label_components(&raster).unwrap();
        assert_eq!(labeling.component_count(), 3);
        assert_eq!(labeling.label_at(0, 0), Some(0));
        assert_eq!(labeling.label_at(4, 1), Some(1));
        assert_eq!(labeling.label_at(2, 3), Some(2));
        assert_eq!(labeling.label_at(2, 0), None);
    }

    #[test]
    fn test_u_shape_merges_through_equivalence() {
        // The two arms get different provisional labels and only meet on the last row
        let raster = raster_from_rows(&[
            "#...#", //
            "#...#", //
            "#####",
        ]);
        let labeling = label_components(&raster).unwrap();
        assert_eq!(labeling.component_count(), 1);
        assert_eq!(labeling.label_at(0, 0), labeling.label_at(4, 0));
    }

    #[test]
    fn test_diagonal_neighbors_stay_separate() {
        let raster = raster_from_rows(&[
            "#..", //
            ".#.", //
            "..#",
        ]);
        let labeling = label_components(&raster).unwrap();
        assert_eq!(labeling.component_count(), 3);
    }

    #[test]
    fn test_many_components_cross_sentinel() {
        // 300 isolated dots force provisional labels past 255
        let mut raster = Raster::filled(600, 2, 255);
        for i in 0..300 {
            raster.set(i * 2, 0, 0).unwrap();
        }
        let labeling = label_components(&raster).unwrap();
        assert_eq!(labeling.component_count(), 300);

        let mut seen: Vec<u32> = labeling.ink_pixels().map(|(_, _, l)| l).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen, (0..300).collect::<Vec<_>>());
    }

    #[test]
    fn test_find_is_idempotent_for_every_provisional_label() {
        let raster = raster_from_rows(&[
            "#.#.#", //
            "#####", //
            "....#", //
            "##..#",
        ]);
        let mut provisional = first_pass(&raster).unwrap();
        let ids: Vec<u32> = provisional.equivalences().ids().collect();
        assert!(!ids.contains(&BACKGROUND_LABEL));
        for id in ids {
            let root = provisional.equivalences().find(id).unwrap();
            assert_eq!(provisional.equivalences().find(root).unwrap(), root);
        }
    }

    #[test]
    fn test_ink_pixels_cover_component_box() {
        let mut raster = Raster::filled(20, 20, 255);
        raster.fill_rect(&BoundingBox::new(3, 4, 8, 15), 0);
        let labeling = label_components(&raster).unwrap();
        assert_eq!(labeling.component_count(), 1);
        assert_eq!(labeling.ink_pixels().count(), 6 * 12);
        assert_eq!(provisional_background(&raster), 20 * 20 - 6 * 12);
    }

    fn provisional_background(raster: &Raster) -> usize {
        let provisional = first_pass(raster).unwrap();
        (0..raster.height())
            .flat_map(|y| (0..raster.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| provisional.get(x, y) == BACKGROUND_LABEL)
            .count()
    }
}

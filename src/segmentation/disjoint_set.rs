//! Union-find over sparse `u32` identifiers
//!
//! Identifiers are registered explicitly with [`DisjointSet::make_set`].
//! Resolving or merging an identifier that was never registered is an
//! error rather than an implicit insert.

use crate::error::OcrError;

/// Disjoint-set forest with path compression
#[derive(Debug, Default, Clone)]
pub struct DisjointSet {
    /// `parent[id]` is `None` for ids never registered
    parent: Vec<Option<u32>>,
    sets: usize,
}

impl DisjointSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forest pre-sized for ids below `capacity`
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            parent: Vec::with_capacity(capacity),
            sets: 0,
        }
    }

    /// Register `id` as a singleton. No-op if already present.
    pub fn make_set(&mut self, id: u32) {
        let slot = id as usize;
        if slot >= self.parent.len() {
            self.parent.resize(slot + 1, None);
        }
        if self.parent[slot].is_none() {
            self.parent[slot] = Some(id);
            self.sets += 1;
        }
    }

    /// Number of disjoint sets currently tracked
    pub fn set_count(&self) -> usize {
        self.sets
    }

    fn parent_of(&self, id: u32) -> Result<u32, OcrError> {
        self.parent
            .get(id as usize)
            .copied()
            .flatten()
            .ok_or(OcrError::UnknownLabel(id))
    }

    /// Canonical representative of the set containing `id`
    pub fn find(&mut self, id: u32) -> Result<u32, OcrError> {
        let mut root = id;
        loop {
            let parent = self.parent_of(root)?;
            if parent == root {
                break;
            }
            root = parent;
        }

        // Point every node on the path straight at the root
        let mut node = id;
        while node != root {
            let next = self.parent_of(node)?;
            self.parent[node as usize] = Some(root);
            node = next;
        }

        Ok(root)
    }

    /// Merge the sets containing `a` and `b`, returning the surviving root
    pub fn union(&mut self, a: u32, b: u32) -> Result<u32, OcrError> {
        let root_a = self.find(a)?;
        let root_b = self.find(b)?;
        if root_a == root_b {
            return Ok(root_a);
        }

        // Lower id wins so the result does not depend on argument order
        let (root, child) = if root_a < root_b {
            (root_a, root_b)
        } else {
            (root_b, root_a)
        };
        self.parent[child as usize] = Some(root);
        self.sets -= 1;
        Ok(root)
    }

    /// Registered ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.parent
            .iter()
            .enumerate()
            .filter(|(_, parent)| parent.is_some())
            .map(|(id, _)| id as u32)
    }
}

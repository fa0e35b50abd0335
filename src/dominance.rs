//! Minimal gap box selection.
//!
//! Candidates are visited from the smallest area up. A candidate is kept only
//! if none of the boxes kept so far lies inside it, so every surviving box
//! spans a single gap rather than restating a smaller one.

use std::collections::BTreeMap;

use crate::gap_candidates::GapBox;

/// Incremental 2-D index over accepted boxes.
///
/// Boxes are bucketed by query begin; a containment query only visits the
/// buckets whose query begin falls inside the probe's query extent.
#[derive(Debug, Default)]
pub struct BoxIndex {
    by_q_begin: BTreeMap<i64, Vec<GapBox>>,
    count: usize,
}

impl BoxIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, rect: GapBox) {
        self.by_q_begin.entry(rect.q_begin).or_default().push(rect);
        self.count += 1;
    }

    /// Whether any indexed box lies entirely inside `rect` (closed bounds)
    pub fn exists_contained(&self, rect: &GapBox) -> bool {
        if rect.q_begin > rect.q_end {
            return false;
        }
        self.by_q_begin
            .range(rect.q_begin..=rect.q_end)
            .flat_map(|(_, bucket)| bucket.iter())
            .any(|inner| rect.contains(inner))
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Reduce `boxes` to its minimal, non-nested members.
///
/// On return `boxes` holds the accepted boxes in ascending area order; boxes
/// of equal area keep their incoming order.
pub fn retain_minimal_boxes(boxes: &mut Vec<GapBox>) {
    boxes.sort_by_key(GapBox::area);
    let mut index = BoxIndex::new();
    boxes.retain(|candidate| {
        if index.exists_contained(candidate) {
            return false;
        }
        index.insert(*candidate);
        true
    });
}

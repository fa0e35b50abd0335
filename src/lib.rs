// Library exports for sweepgap
pub mod alignment;
pub mod dominance;
pub mod gap_candidates;
pub mod gap_finder;
pub mod grouping;
pub mod paf;
pub mod rangeset;
pub mod reciprocal_best;
pub mod sequence_index;

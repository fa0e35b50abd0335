//! Greedy reciprocal-best alignment selection.
//!
//! Alignments are visited from the highest score down. Each one is kept only
//! if the bases it shares with territory already claimed on the query genome
//! and on the target genome both stay within `score * max_overlap_fraction`.
//! Kept alignments claim their territory on both genomes. There is no
//! backtracking: a higher-scoring alignment always wins.

use anyhow::{bail, Result};
use log::info;

use crate::alignment::Alignment;
use crate::rangeset::RangeSet;

const PROGRESS_INTERVAL: usize = 1_000_000;

/// Selection configuration
#[derive(Debug, Clone, Copy)]
pub struct SelectionConfig {
    /// Maximum covered fraction, relative to the alignment score, that a
    /// candidate may share with already-claimed territory on either genome
    pub max_overlap_fraction: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        SelectionConfig {
            max_overlap_fraction: 0.5,
        }
    }
}

/// Territory claimed on one genome after selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoverageStats {
    pub segments: u64,
    pub bases: u64,
}

impl CoverageStats {
    fn from_sets(sets: &[RangeSet]) -> Self {
        sets.iter().fold(CoverageStats::default(), |acc, set| CoverageStats {
            segments: acc.segments + set.len() as u64,
            bases: acc.bases + set.covered_bases() as u64,
        })
    }
}

/// Outcome of a selection pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionSummary {
    pub processed: usize,
    pub selected: usize,
    pub query_coverage: CoverageStats,
    pub target_coverage: CoverageStats,
}

/// Select reciprocal-best alignments in place.
///
/// `num_queries` and `num_targets` are the dictionary sizes of the two
/// genomes; an alignment naming an id outside them is an error. On return
/// `alignments` holds only the selected records, sorted by descending score
/// (equal scores keep their input order).
pub fn select_reciprocal_best(
    alignments: &mut Vec<Alignment>,
    num_queries: usize,
    num_targets: usize,
    config: &SelectionConfig,
) -> Result<SelectionSummary> {
    info!(
        "Selecting reciprocal best alignments from {} records",
        alignments.len()
    );

    // Stable: ties keep input order
    alignments.sort_by(|a, b| b.score.cmp(&a.score));

    let mut query_sets = vec![RangeSet::new(); num_queries];
    let mut target_sets = vec![RangeSet::new(); num_targets];
    let mut selected = 0usize;

    for (i, aln) in alignments.iter_mut().enumerate() {
        let (Some(q_set), Some(t_set)) = (
            query_sets.get_mut(aln.query_id as usize),
            target_sets.get_mut(aln.target_id as usize),
        ) else {
            bail!(
                "alignment references unknown sequence (query id {}, target id {})",
                aln.query_id,
                aln.target_id
            );
        };

        let (q_overlap, q_span) = q_set.overlap(aln.q_begin, aln.q_end);
        let (t_overlap, t_span) = t_set.overlap(aln.t_begin, aln.t_end);
        let threshold = aln.score as f64 * config.max_overlap_fraction;

        if q_overlap as f64 <= threshold && t_overlap as f64 <= threshold {
            q_set.insert(aln.q_begin, aln.q_end, q_span);
            t_set.insert(aln.t_begin, aln.t_end, t_span);
            selected += 1;
        } else {
            aln.score = 0;
        }

        if (i + 1) % PROGRESS_INTERVAL == 0 {
            info!("Processed {} records, {} selected", i + 1, selected);
        }
    }

    let processed = alignments.len();
    info!("Processed {processed} records, {selected} selected");

    let summary = SelectionSummary {
        processed,
        selected,
        query_coverage: CoverageStats::from_sets(&query_sets),
        target_coverage: CoverageStats::from_sets(&target_sets),
    };
    info!(
        "Query genome covered with {} segments of {} bases",
        summary.query_coverage.segments, summary.query_coverage.bases
    );
    info!(
        "Target genome covered with {} segments of {} bases",
        summary.target_coverage.segments, summary.target_coverage.bases
    );

    alignments.retain(|aln| !aln.is_rejected());
    alignments.shrink_to_fit();

    Ok(summary)
}

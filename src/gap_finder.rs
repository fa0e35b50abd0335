//! Gap search driver: selection, grouping and the per-group worker pool.
//!
//! Groups are assigned to workers statically, worker `w` taking groups
//! `w, w + n, w + 2n, ...`. Each worker owns its scratch buffers for the whole
//! run. Output lines and running statistics sit behind a single lock that is
//! taken once per group, so lines of one group are never interleaved with
//! another's, but group order across workers is not fixed.

use anyhow::{anyhow, bail, Context, Result};
use log::{debug, info};
use rayon::prelude::*;
use std::io::Write;
use std::sync::Mutex;

use crate::alignment::{Alignment, AlignmentStore};
use crate::dominance::retain_minimal_boxes;
use crate::gap_candidates::{bound_group, collect_candidates, GapBox, GapParams};
use crate::grouping::{GroupPartition, GroupSpan};
use crate::reciprocal_best::{select_reciprocal_best, SelectionConfig, SelectionSummary};
use crate::sequence_index::SequenceIndex;

/// Full pipeline configuration
#[derive(Debug, Clone)]
pub struct GapFinderConfig {
    pub params: GapParams,
    /// Reciprocal-best selection; `None` uses every alignment
    pub selection: Option<SelectionConfig>,
    pub threads: usize,
}

impl Default for GapFinderConfig {
    fn default() -> Self {
        GapFinderConfig {
            params: GapParams::default(),
            selection: Some(SelectionConfig::default()),
            threads: 1,
        }
    }
}

impl GapFinderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            bail!("thread count must be at least 1");
        }
        if self.params.min_gap < 0 || self.params.max_flank < 0 {
            bail!("gap sizes and flank size must not be negative");
        }
        if self.params.min_gap > self.params.max_gap {
            bail!(
                "min gap size ({}) exceeds max gap size ({})",
                self.params.min_gap,
                self.params.max_gap
            );
        }
        if let Some(selection) = &self.selection {
            if !(0.0..=1.0).contains(&selection.max_overlap_fraction) {
                bail!(
                    "max overlap fraction must be within [0, 1], got {}",
                    selection.max_overlap_fraction
                );
            }
        }
        Ok(())
    }
}

/// Aggregate statistics over all emitted gap boxes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GapStats {
    pub boxes: u64,
    pub query_bases: u64,
    pub target_bases: u64,
    pub area: u128,
}

impl GapStats {
    fn record(&mut self, gap: &GapBox) {
        self.boxes += 1;
        self.query_bases += gap.query_len() as u64;
        self.target_bases += gap.target_len() as u64;
        self.area += gap.area() as u128;
    }
}

/// Result of a full run
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummary {
    pub selection: Option<SelectionSummary>,
    pub groups: usize,
    pub gaps: GapStats,
}

/// Per-worker buffers, sized once for the largest group
struct Scratch {
    bounded: Vec<Alignment>,
    candidates: Vec<GapBox>,
}

impl Scratch {
    fn with_capacity(max_group_len: usize) -> Self {
        Scratch {
            bounded: Vec::with_capacity(max_group_len + 2),
            candidates: Vec::with_capacity(max_group_len * 4),
        }
    }
}

/// Shared output stream and running totals
struct Sink<W> {
    out: W,
    stats: GapStats,
}

/// Read-only inputs shared by all workers
struct GroupContext<'a> {
    alignments: &'a [Alignment],
    queries: &'a SequenceIndex,
    targets: &'a SequenceIndex,
    params: &'a GapParams,
}

/// Run selection (if configured) and gap search over `store`, writing one
/// line per accepted gap box to `out`.
///
/// `store.alignments` is left selected and position-sorted.
pub fn run_pipeline<W: Write + Send>(
    store: &mut AlignmentStore,
    config: &GapFinderConfig,
    out: W,
) -> Result<RunSummary> {
    config.validate()?;

    let selection = match &config.selection {
        Some(selection_config) => Some(select_reciprocal_best(
            &mut store.alignments,
            store.queries.len(),
            store.targets.len(),
            selection_config,
        )?),
        None => None,
    };

    store.sort_by_position();
    let partition = GroupPartition::build(&store.alignments);
    let stats = partition.stats();
    debug!(
        "{} sequence pairs, group size min {} / mean {:.1} / max {}",
        stats.num_groups, stats.min_group_size, stats.mean_group_size, stats.max_group_size
    );

    let gaps = find_gaps(
        &store.alignments,
        &partition,
        &store.queries,
        &store.targets,
        &config.params,
        config.threads,
        out,
    )?;

    Ok(RunSummary {
        selection,
        groups: partition.len(),
        gaps,
    })
}

/// Search every group of `partition` for gap boxes on a pool of `threads`
/// workers.
///
/// `alignments` must be sorted by sequence pair and position, and
/// `partition` built from it.
pub fn find_gaps<W: Write + Send>(
    alignments: &[Alignment],
    partition: &GroupPartition,
    queries: &SequenceIndex,
    targets: &SequenceIndex,
    params: &GapParams,
    threads: usize,
    out: W,
) -> Result<GapStats> {
    let threads = threads.max(1);
    let ctx = GroupContext {
        alignments,
        queries,
        targets,
        params,
    };
    let sink = Mutex::new(Sink {
        out,
        stats: GapStats::default(),
    });

    if !partition.is_empty() {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .context("failed to build worker pool")?;

        pool.install(|| {
            (0..threads).into_par_iter().try_for_each(|worker| -> Result<()> {
                let mut scratch = Scratch::with_capacity(partition.max_len);
                for group in partition.groups.iter().skip(worker).step_by(threads) {
                    process_group(&ctx, group, &mut scratch, &sink)?;
                }
                Ok(())
            })
        })?;
    }

    let mut sink = sink
        .into_inner()
        .map_err(|_| anyhow!("output lock poisoned by a failed worker"))?;
    sink.out.flush().context("failed to flush gap output")?;

    let stats = sink.stats;
    info!(
        "Selected gap filling boxes: {}; q_bases: {}; t_bases: {}; area: {}",
        stats.boxes, stats.query_bases, stats.target_bases, stats.area
    );
    Ok(stats)
}

fn process_group<W: Write>(
    ctx: &GroupContext,
    group: &GroupSpan,
    scratch: &mut Scratch,
    sink: &Mutex<Sink<W>>,
) -> Result<()> {
    let pair = group.pair;
    let query_name = ctx
        .queries
        .name(pair.query_id)
        .with_context(|| format!("unknown query sequence id {}", pair.query_id))?;
    let target_name = ctx
        .targets
        .name(pair.target_id)
        .with_context(|| format!("unknown target sequence id {}", pair.target_id))?;
    let q_len = ctx.queries.len_of(pair.query_id).unwrap_or(0) as i64;
    let t_len = ctx.targets.len_of(pair.target_id).unwrap_or(0) as i64;

    bound_group(
        &ctx.alignments[group.range()],
        q_len,
        t_len,
        &mut scratch.bounded,
    );
    collect_candidates(&scratch.bounded, ctx.params, &mut scratch.candidates);
    if scratch.candidates.is_empty() {
        return Ok(());
    }

    let n_candidates = scratch.candidates.len();
    retain_minimal_boxes(&mut scratch.candidates);
    debug!(
        "{query_name} vs {target_name}: {} alignments, {n_candidates} candidates, {} minimal boxes",
        group.len,
        scratch.candidates.len()
    );

    let mut sink = sink
        .lock()
        .map_err(|_| anyhow!("output lock poisoned by a failed worker"))?;
    let Sink { out, stats } = &mut *sink;
    for gap in &scratch.candidates {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}",
            query_name, gap.q_begin, gap.q_end, target_name, gap.t_begin, gap.t_end
        )
        .context("failed to write gap output")?;
        stats.record(gap);
    }
    Ok(())
}

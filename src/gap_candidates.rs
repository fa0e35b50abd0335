//! Gap candidate boxes between collinear alignments of one sequence pair.
//!
//! Every alignment is paired with the alignments that start downstream of it
//! on the query within `[min_gap, max_gap)`. A pair whose target-axis
//! separation also falls within `[min_gap, max_gap]` proposes a box spanning
//! the gap plus up to `max_flank` bases of each flanking alignment.

use crate::alignment::Alignment;

/// A rectangle in (query, target) space proposed for re-alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GapBox {
    pub q_begin: i64,
    pub q_end: i64,
    pub t_begin: i64,
    pub t_end: i64,
}

impl GapBox {
    pub fn query_len(&self) -> i64 {
        self.q_end - self.q_begin
    }

    pub fn target_len(&self) -> i64 {
        self.t_end - self.t_begin
    }

    pub fn area(&self) -> i128 {
        self.query_len() as i128 * self.target_len() as i128
    }

    /// Closed containment: `other` lies entirely inside `self`
    pub fn contains(&self, other: &GapBox) -> bool {
        other.q_begin >= self.q_begin
            && other.q_end <= self.q_end
            && other.t_begin >= self.t_begin
            && other.t_end <= self.t_end
    }
}

/// Gap search parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapParams {
    pub min_gap: i64,
    pub max_gap: i64,
    /// Maximum number of flanking alignment bases included on each side
    pub max_flank: i64,
}

impl Default for GapParams {
    fn default() -> Self {
        GapParams {
            min_gap: 100,
            max_gap: 1_000_000,
            max_flank: 1_000,
        }
    }
}

/// Copy `group` into `bounded` between a start sentinel at `(0, 0)` and an
/// end sentinel at `(q_len, t_len)`
pub fn bound_group(group: &[Alignment], q_len: i64, t_len: i64, bounded: &mut Vec<Alignment>) {
    bounded.clear();
    bounded.push(Alignment::sentinel(0, 0));
    bounded.extend_from_slice(group);
    bounded.push(Alignment::sentinel(q_len, t_len));
}

/// Box between `a1` and a downstream `a2`, or `None` if their target-axis
/// separation is outside the gap window
pub fn gap_box(a1: &Alignment, a2: &Alignment, params: &GapParams) -> Option<GapBox> {
    let dist = a1.t_begin.max(a2.t_begin) - a1.t_end.min(a2.t_end);
    if dist < params.min_gap || dist > params.max_gap {
        return None;
    }
    let flank = params.max_flank;

    let t_begin = if a1.t_end < a2.t_end {
        a1.t_begin.max(a1.t_end.saturating_sub(flank))
    } else {
        a2.t_begin.max(a2.t_end.saturating_sub(flank))
    };
    let t_end = if a1.t_begin > a2.t_begin {
        a1.t_end.min(a1.t_begin.saturating_add(flank))
    } else {
        a2.t_end.min(a2.t_begin.saturating_add(flank))
    };

    Some(GapBox {
        q_begin: a1.q_begin.max(a1.q_end.saturating_sub(flank)),
        q_end: a2.q_end.min(a2.q_begin.saturating_add(flank)),
        t_begin,
        t_end,
    })
}

/// Collect all candidate boxes of a sentinel-bounded, position-sorted group
/// into `out` (cleared first)
pub fn collect_candidates(bounded: &[Alignment], params: &GapParams, out: &mut Vec<GapBox>) {
    out.clear();
    for (i, a1) in bounded.iter().enumerate() {
        let downstream = &bounded[i + 1..];
        // Saturating: `max_gap` may be as large as i64::MAX
        let lower = a1.q_end.saturating_add(params.min_gap);
        let upper = a1.q_end.saturating_add(params.max_gap);
        let start = downstream.partition_point(|a| a.q_begin < lower);
        let stop = downstream.partition_point(|a| a.q_begin < upper);
        if start >= stop {
            continue;
        }
        out.extend(
            downstream[start..stop]
                .iter()
                .filter_map(|a2| gap_box(a1, a2, params)),
        );
    }
}

/// Candidate boxes for one group, allocating fresh buffers
pub fn gap_candidates(group: &[Alignment], q_len: i64, t_len: i64, params: &GapParams) -> Vec<GapBox> {
    let mut bounded = Vec::with_capacity(group.len() + 2);
    bound_group(group, q_len, t_len, &mut bounded);
    let mut out = Vec::new();
    collect_candidates(&bounded, params, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aln(q: (i64, i64), t: (i64, i64)) -> Alignment {
        Alignment::new(0, 0, q, t, 1)
    }

    fn interior(boxes: &[GapBox], q_len: i64, t_len: i64) -> Vec<GapBox> {
        // Drop boxes anchored on a sentinel
        boxes
            .iter()
            .copied()
            .filter(|b| b.q_begin > 0 && b.q_end < q_len && b.t_begin > 0 && b.t_end < t_len)
            .collect()
    }

    #[test]
    fn test_gap_box_formula() {
        let a1 = aln((1000, 2000), (1000, 2000));
        let a2 = aln((2500, 3500), (2500, 3500));
        let params = GapParams {
            min_gap: 100,
            max_gap: 1000,
            max_flank: 200,
        };
        assert_eq!(
            gap_box(&a1, &a2, &params),
            Some(GapBox {
                q_begin: 1800,
                q_end: 2700,
                t_begin: 1800,
                t_end: 2700
            })
        );
    }

    #[test]
    fn test_flank_clipped_to_alignment() {
        let a1 = aln((1000, 1050), (1000, 1050));
        let a2 = aln((1500, 1530), (1500, 1530));
        let params = GapParams {
            min_gap: 100,
            max_gap: 1000,
            max_flank: 200,
        };
        assert_eq!(
            gap_box(&a1, &a2, &params),
            Some(GapBox {
                q_begin: 1000,
                q_end: 1530,
                t_begin: 1000,
                t_end: 1530
            })
        );
    }

    #[test]
    fn test_target_order_swapped() {
        // a2 precedes a1 on the target axis
        let a1 = aln((1000, 2000), (5000, 6000));
        let a2 = aln((2500, 3500), (3000, 4000));
        let params = GapParams {
            min_gap: 100,
            max_gap: 2000,
            max_flank: 100,
        };
        // dist = 5000 - 4000
        assert_eq!(
            gap_box(&a1, &a2, &params),
            Some(GapBox {
                q_begin: 1900,
                q_end: 2600,
                t_begin: 3900,
                t_end: 5100
            })
        );
    }

    #[test]
    fn test_target_distance_window() {
        let group = vec![aln((1000, 2000), (1000, 2000)), aln((2500, 3500), (2500, 3500))];
        let mut params = GapParams {
            min_gap: 100,
            max_gap: 1000,
            max_flank: 200,
        };
        let boxes = gap_candidates(&group, 100_000, 100_000, &params);
        assert_eq!(interior(&boxes, 100_000, 100_000).len(), 1);

        params.max_gap = 400;
        let boxes = gap_candidates(&group, 100_000, 100_000, &params);
        assert!(interior(&boxes, 100_000, 100_000).is_empty());
    }

    #[test]
    fn test_single_alignment_reaches_both_sentinels() {
        let group = vec![aln((400, 600), (400, 600))];
        let params = GapParams {
            min_gap: 100,
            max_gap: 1000,
            max_flank: 50,
        };
        let boxes = gap_candidates(&group, 1000, 1000, &params);
        assert_eq!(
            boxes,
            vec![
                GapBox {
                    q_begin: 0,
                    q_end: 450,
                    t_begin: 0,
                    t_end: 450
                },
                GapBox {
                    q_begin: 550,
                    q_end: 1000,
                    t_begin: 550,
                    t_end: 1000
                },
            ]
        );
    }

    #[test]
    fn test_query_window_is_half_open() {
        let params = GapParams {
            min_gap: 100,
            max_gap: 500,
            max_flank: 10,
        };
        // q gap of exactly max_gap is excluded by the query window
        let group = vec![aln((0, 100), (0, 100)), aln((600, 700), (300, 400))];
        let mut bounded = Vec::new();
        bound_group(&group, 10_000, 10_000, &mut bounded);
        let mut out = Vec::new();
        collect_candidates(&bounded, &params, &mut out);
        assert!(out.iter().all(|b| !(b.q_begin == 90 && b.q_end == 610)));

        // one base closer and the pair is considered
        let group = vec![aln((0, 100), (0, 100)), aln((599, 700), (300, 400))];
        bound_group(&group, 10_000, 10_000, &mut bounded);
        collect_candidates(&bounded, &params, &mut out);
        assert!(out.contains(&GapBox {
            q_begin: 90,
            q_end: 609,
            t_begin: 90,
            t_end: 310
        }));
    }

    #[test]
    fn test_unbounded_gap_window() {
        let group = vec![aln((0, 100), (0, 100)), aln((600, 700), (600, 700))];
        let bounded_params = GapParams {
            min_gap: 100,
            max_gap: 1000,
            max_flank: 100,
        };
        let unbounded_params = GapParams {
            max_gap: i64::MAX,
            max_flank: i64::MAX,
            ..bounded_params
        };

        let boxes = gap_candidates(&group, 1000, 1000, &unbounded_params);
        // Flanks clip to the alignments themselves
        assert!(boxes.contains(&GapBox {
            q_begin: 0,
            q_end: 700,
            t_begin: 0,
            t_end: 700
        }));
        assert!(boxes.contains(&GapBox {
            q_begin: 600,
            q_end: 1000,
            t_begin: 600,
            t_end: 1000
        }));
        // A wider window only adds candidates
        let bounded = gap_candidates(&group, 1000, 1000, &bounded_params);
        assert!(bounded.iter().all(|b| boxes.contains(b)));
    }

    #[test]
    fn test_contains_is_closed() {
        let outer = GapBox {
            q_begin: 0,
            q_end: 100,
            t_begin: 0,
            t_end: 100,
        };
        assert!(outer.contains(&outer));
        assert!(outer.contains(&GapBox {
            q_begin: 10,
            q_end: 100,
            t_begin: 0,
            t_end: 50
        }));
        assert!(!outer.contains(&GapBox {
            q_begin: 10,
            q_end: 101,
            t_begin: 0,
            t_end: 50
        }));
        assert_eq!(outer.area(), 10_000);
    }
}

//! Sorted coverage set of disjoint half-open intervals on one sequence.
//!
//! Used by reciprocal-best selection to track the territory already claimed
//! by accepted alignments. Lookups are binary searches over the stored
//! intervals, so cost grows with the number of segments, not with bases.

/// A half-open interval `[begin, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub begin: i64,
    pub end: i64,
}

impl Interval {
    pub fn length(&self) -> i64 {
        self.end - self.begin
    }

    /// Number of bases shared with `[begin, end)`
    pub fn overlap(&self, begin: i64, end: i64) -> i64 {
        (self.end.min(end) - self.begin.max(begin)).max(0)
    }
}

/// Boundary indices returned by [`RangeSet::overlap`].
///
/// `lower` is the rightmost stored interval ending strictly before the query
/// begin (-1 if none); `upper` is the leftmost stored interval starting
/// strictly after the query end (`len()` if none). Intervals strictly between
/// them touch or overlap the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub lower: isize,
    pub upper: usize,
}

impl Span {
    fn touched(&self) -> std::ops::Range<usize> {
        (self.lower + 1) as usize..self.upper
    }
}

/// Strictly increasing, pairwise disjoint, non-adjacent intervals
#[derive(Debug, Clone, Default)]
pub struct RangeSet {
    intervals: Vec<Interval>,
}

impl RangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Measure how many bases of `[begin, end)` are already covered.
    ///
    /// Returns the overlap together with the boundary [`Span`] that a
    /// following [`insert`](Self::insert) of the same range needs.
    pub fn overlap(&self, begin: i64, end: i64) -> (i64, Span) {
        let n = self.intervals.len();
        if begin >= end || n == 0 {
            return (
                0,
                Span {
                    lower: -1,
                    upper: n,
                },
            );
        }

        // Stored ends and begins are both increasing
        let lower = self.intervals.partition_point(|iv| iv.end < begin) as isize - 1;
        let upper = self.intervals.partition_point(|iv| iv.begin <= end);
        let span = Span { lower, upper };

        let covered = self.intervals[span.touched()]
            .iter()
            .map(|iv| iv.overlap(begin, end))
            .sum();
        (covered, span)
    }

    /// Add `[begin, end)`, merging it with every stored interval it touches.
    ///
    /// `span` must come from `overlap(begin, end)` on the current state of
    /// this set; it is not re-validated.
    pub fn insert(&mut self, begin: i64, end: i64, span: Span) {
        if begin >= end {
            return;
        }
        let touched = span.touched();
        let mut merged = Interval { begin, end };
        let spanned = &self.intervals[touched.clone()];
        if let (Some(first), Some(last)) = (spanned.first(), spanned.last()) {
            merged.begin = merged.begin.min(first.begin);
            merged.end = merged.end.max(last.end);
        }
        self.intervals.splice(touched, std::iter::once(merged));
    }

    /// Convenience wrapper: overlap query followed by insert
    pub fn add(&mut self, begin: i64, end: i64) {
        let (_, span) = self.overlap(begin, end);
        self.insert(begin, end, span);
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Interval> {
        self.intervals.iter()
    }

    /// Total number of bases covered
    pub fn covered_bases(&self) -> i64 {
        self.intervals.iter().map(Interval::length).sum()
    }
}

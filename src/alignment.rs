use crate::sequence_index::SequenceIndex;

/// Compact alignment record used by selection and gap search.
///
/// Coordinates are 0-based and half-open on both axes. `score` is the PAF
/// matching-base count; zero marks a record rejected during selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Alignment {
    pub query_id: u32,
    pub target_id: u32,
    pub q_begin: i64,
    pub q_end: i64,
    pub t_begin: i64,
    pub t_end: i64,
    pub score: u32,
}

impl Alignment {
    pub fn new(query_id: u32, target_id: u32, q: (i64, i64), t: (i64, i64), score: u32) -> Self {
        Alignment {
            query_id,
            target_id,
            q_begin: q.0,
            q_end: q.1,
            t_begin: t.0,
            t_end: t.1,
            score,
        }
    }

    /// Zero-length alignment at `(q, t)`, used to bound gap search at sequence ends
    pub fn sentinel(q: i64, t: i64) -> Self {
        Alignment::new(0, 0, (q, q), (t, t), 0)
    }

    pub fn query_len(&self) -> i64 {
        self.q_end - self.q_begin
    }

    pub fn target_len(&self) -> i64 {
        self.t_end - self.t_begin
    }

    pub fn is_rejected(&self) -> bool {
        self.score == 0
    }

    /// Sort key used for grouping: sequence pair first, then positions
    pub fn position_key(&self) -> (u32, u32, i64, i64, i64, i64) {
        (
            self.query_id,
            self.target_id,
            self.q_begin,
            self.t_begin,
            self.q_end,
            self.t_end,
        )
    }
}

/// All alignments of a run, together with the query and target genome dictionaries.
#[derive(Debug, Default)]
pub struct AlignmentStore {
    pub alignments: Vec<Alignment>,
    pub queries: SequenceIndex,
    pub targets: SequenceIndex,
}

impl AlignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register both sequences and append the alignment, returning its index
    pub fn add(
        &mut self,
        query: (&str, u64),
        target: (&str, u64),
        q: (i64, i64),
        t: (i64, i64),
        score: u32,
    ) -> usize {
        let query_id = self.queries.put(query.0, query.1);
        let target_id = self.targets.put(target.0, target.1);
        self.alignments
            .push(Alignment::new(query_id, target_id, q, t, score));
        self.alignments.len() - 1
    }

    pub fn len(&self) -> usize {
        self.alignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alignments.is_empty()
    }

    /// Sort by (query id, target id, q_begin, t_begin, q_end, t_end)
    pub fn sort_by_position(&mut self) {
        self.alignments.sort_unstable_by_key(|a| a.position_key());
    }
}

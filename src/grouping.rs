/// Partition of position-sorted alignments into per-sequence-pair groups
use crate::alignment::Alignment;

/// Key for grouping alignments by sequence pair
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct SequencePair {
    pub query_id: u32,
    pub target_id: u32,
}

impl SequencePair {
    pub fn of(aln: &Alignment) -> Self {
        SequencePair {
            query_id: aln.query_id,
            target_id: aln.target_id,
        }
    }
}

/// A contiguous run of alignments sharing one sequence pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSpan {
    pub pair: SequencePair,
    pub offset: usize,
    pub len: usize,
}

impl GroupSpan {
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.len
    }
}

/// Work list for gap search
#[derive(Debug, Default)]
pub struct GroupPartition {
    pub groups: Vec<GroupSpan>,
    /// Length of the largest group, used to size worker scratch buffers
    pub max_len: usize,
}

impl GroupPartition {
    /// Split `alignments`, which must already be sorted by sequence pair, into
    /// one span per distinct pair in order of first appearance.
    pub fn build(alignments: &[Alignment]) -> Self {
        let mut groups: Vec<GroupSpan> = Vec::new();
        for (i, aln) in alignments.iter().enumerate() {
            let pair = SequencePair::of(aln);
            match groups.last_mut() {
                Some(last) if last.pair == pair => last.len += 1,
                _ => groups.push(GroupSpan {
                    pair,
                    offset: i,
                    len: 1,
                }),
            }
        }
        let max_len = groups.iter().map(|g| g.len).max().unwrap_or(0);
        GroupPartition { groups, max_len }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Get summary statistics
    pub fn stats(&self) -> GroupPartitionStats {
        let total: usize = self.groups.iter().map(|g| g.len).sum();
        let min = self.groups.iter().map(|g| g.len).min().unwrap_or(0);
        let mean = if !self.groups.is_empty() {
            total as f64 / self.groups.len() as f64
        } else {
            0.0
        };

        GroupPartitionStats {
            num_groups: self.groups.len(),
            num_alignments: total,
            min_group_size: min,
            max_group_size: self.max_len,
            mean_group_size: mean,
        }
    }
}

/// Statistics about grouped alignments
#[derive(Debug)]
pub struct GroupPartitionStats {
    pub num_groups: usize,
    pub num_alignments: usize,
    pub min_group_size: usize,
    pub max_group_size: usize,
    pub mean_group_size: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_alignment(query_id: u32, target_id: u32, start: i64) -> Alignment {
        Alignment::new(
            query_id,
            target_id,
            (start, start + 1000),
            (start, start + 1000),
            1000,
        )
    }

    #[test]
    fn test_group_partition() {
        let alns = vec![
            make_test_alignment(0, 0, 1000),
            make_test_alignment(0, 0, 2000),
            make_test_alignment(0, 1, 3000),
            make_test_alignment(1, 0, 4000),
            make_test_alignment(1, 0, 5000),
            make_test_alignment(1, 0, 6000),
        ];
        let partition = GroupPartition::build(&alns);

        assert_eq!(partition.len(), 3);
        assert_eq!(partition.max_len, 3);
        assert_eq!(partition.groups[0].range(), 0..2);
        assert_eq!(partition.groups[1].range(), 2..3);
        assert_eq!(partition.groups[2].range(), 3..6);
        assert_eq!(
            partition.groups[2].pair,
            SequencePair {
                query_id: 1,
                target_id: 0
            }
        );

        let stats = partition.stats();
        assert_eq!(stats.num_groups, 3);
        assert_eq!(stats.num_alignments, 6);
        assert_eq!(stats.min_group_size, 1);
        assert_eq!(stats.max_group_size, 3);
    }

    #[test]
    fn test_empty_partition() {
        let partition = GroupPartition::build(&[]);
        assert!(partition.is_empty());
        assert_eq!(partition.max_len, 0);
    }
}

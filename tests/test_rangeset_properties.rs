/// Property-based tests for the coverage rangeset
///
/// Uses proptest to verify the invariants that must ALWAYS hold after any
/// sequence of inserts.
use proptest::prelude::*;
use sweepgap::rangeset::RangeSet;

fn intervals() -> impl Strategy<Value = Vec<(i64, i64)>> {
    prop::collection::vec((0i64..2_000, 0i64..200), 0..60)
        .prop_map(|v| v.into_iter().map(|(b, len)| (b, b + len)).collect())
}

/// Naive coverage: a bitmap over the whole coordinate range
fn naive_covered(inserted: &[(i64, i64)], begin: i64, end: i64) -> i64 {
    (begin.max(0)..end)
        .filter(|&pos| inserted.iter().any(|&(b, e)| b <= pos && pos < e))
        .count() as i64
}

/// Property: stored intervals stay sorted, disjoint and non-adjacent
#[test]
fn prop_sorted_disjoint_non_adjacent() {
    proptest!(|(ranges in intervals())| {
        let mut set = RangeSet::new();
        for (b, e) in ranges {
            set.add(b, e);
        }
        let stored: Vec<_> = set.iter().copied().collect();
        for iv in &stored {
            prop_assert!(iv.begin < iv.end, "empty interval stored: {:?}", iv);
        }
        for pair in stored.windows(2) {
            prop_assert!(pair[0].end < pair[1].begin,
                "intervals not separated: {:?} then {:?}", pair[0], pair[1]);
        }
    });
}

/// Property: an inserted range is fully covered afterwards
#[test]
fn prop_inserted_range_is_covered() {
    proptest!(|(ranges in intervals(), begin in 0i64..2_000, len in 1i64..200)| {
        let mut set = RangeSet::new();
        for (b, e) in ranges {
            set.add(b, e);
        }
        set.add(begin, begin + len);
        let (covered, _) = set.overlap(begin, begin + len);
        prop_assert!(covered >= len);
    });
}

/// Property: overlap agrees with a brute-force base count
#[test]
fn prop_overlap_matches_naive_count() {
    proptest!(|(ranges in intervals(), begin in 0i64..2_200, len in 0i64..300)| {
        let mut set = RangeSet::new();
        for &(b, e) in &ranges {
            set.add(b, e);
        }
        let (covered, _) = set.overlap(begin, begin + len);
        prop_assert_eq!(covered, naive_covered(&ranges, begin, begin + len));
        prop_assert_eq!(set.covered_bases(), naive_covered(&ranges, 0, 2_200));
    });
}

#[test]
fn test_adjacent_ranges_merge() {
    let mut set = RangeSet::new();
    set.add(10, 20);
    set.add(20, 30);
    let stored: Vec<(i64, i64)> = set.iter().map(|iv| (iv.begin, iv.end)).collect();
    assert_eq!(stored, vec![(10, 30)]);
}

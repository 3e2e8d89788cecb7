use std::collections::BTreeSet;

use crate::tests::random_indices;
use crate::{ExecutionConfig, IndexArena, IndexSet, MAX_SEGMENT_SIZE};

#[test]
fn test_complement_basic() {
    let arena = IndexArena::new();
    let set = IndexSet::from_indices(&[2i64, 3], &arena);
    let complement = set.complement(0..10, &arena);
    assert_eq!(complement.to_indices::<i64>(), vec![0, 1, 4, 5, 6, 7, 8, 9]);
    assert_eq!(complement.to_ranges(), vec![0..2, 4..10]);
}

#[test]
fn test_complement_edge_cases() {
    let arena = IndexArena::new();
    let empty = IndexSet::empty();
    assert_eq!(empty.complement(5..15, &arena).to_range(), Some(5..15));
    assert!(empty.complement(5..5, &arena).is_empty());

    let full = IndexSet::from_range(0..100);
    assert!(full.complement(0..100, &arena).is_empty());
    assert_eq!(full.complement(50..150, &arena).to_range(), Some(100..150));
    assert_eq!(full.complement(0..50, &arena).size(), 0);

    let prefix = IndexSet::from_range(0..10);
    assert_eq!(prefix.complement(0..30, &arena).to_range(), Some(10..30));
    let suffix = IndexSet::from_range(20..30);
    assert_eq!(suffix.complement(0..30, &arena).to_range(), Some(0..20));
}

#[test]
fn test_complement_ignores_members_outside_universe() {
    let arena = IndexArena::new();
    let set = IndexSet::from_indices(&[1i64, 5, 6, 50, 51, 99], &arena);
    let complement = set.complement(5..60, &arena);
    let expected: Vec<i64> = (5..60).filter(|i| ![5, 6, 50, 51].contains(i)).collect();
    assert_eq!(complement.to_indices::<i64>(), expected);
}

#[test]
fn test_complement_long_interior_gaps() {
    let arena = IndexArena::new();
    let indices = [0i64, 1, 2, 500, 502, 504, 1000];
    let set = IndexSet::from_indices(&indices, &arena);
    let complement = set.complement(0..1001, &arena);
    assert_eq!(
        complement.to_ranges(),
        vec![3..500, 501..502, 503..504, 505..1000]
    );
    assert_eq!(complement.size(), 1001 - indices.len() as i64);
}

#[test]
fn test_complement_involution_and_partition() {
    let arena = IndexArena::new();
    let mut rng = fastrand::Rng::with_seed(123456);
    for round in 0..5 {
        let universe_len = 300_000 + round * 50_000;
        let indices = random_indices(&mut rng, universe_len);
        let set = IndexSet::from_indices(&indices, &arena);
        let universe = 0..universe_len;

        let complement = set.complement(universe.clone(), &arena);
        assert_eq!(complement.size() + set.size(), universe_len);
        assert!(complement.indices().all(|i| !set.contains(i)));

        let back = complement.complement(universe.clone(), &arena);
        assert_eq!(back, set, "round {round}");
        assert_eq!(
            complement.to_ranges(),
            set.to_ranges_invert(universe.clone()),
            "round {round}"
        );
    }
}

#[test]
fn test_complement_parallel_matches_sequential() {
    let arena = IndexArena::new();
    let mut rng = fastrand::Rng::with_seed(404);
    let indices = random_indices(&mut rng, 2_000_000);
    let set = IndexSet::from_indices(&indices, &arena);
    let universe = 0..2_000_000;

    let sequential = set.complement_with(universe.clone(), ExecutionConfig::sequential(), &arena);
    for config in [
        ExecutionConfig::default().with_grain_size(64),
        ExecutionConfig::default().with_max_threads(Some(4)),
    ] {
        let parallel = set.complement_with(universe.clone(), config, &arena);
        assert_eq!(parallel, sequential, "{config:?}");
    }
}

#[test]
fn test_union_intersection_difference() {
    let arena = IndexArena::new();
    let mut rng = fastrand::Rng::with_seed(2718);
    let a_indices = random_indices(&mut rng, 400_000);
    let b_indices = random_indices(&mut rng, 300_000);
    let a = IndexSet::from_indices(&a_indices, &arena);
    let b = IndexSet::from_indices(&b_indices, &arena);
    let a_set: BTreeSet<i64> = a_indices.iter().copied().collect();
    let b_set: BTreeSet<i64> = b_indices.iter().copied().collect();

    for config in [ExecutionConfig::sequential(), ExecutionConfig::default()] {
        let union = IndexSet::from_union(&a, &b, config, &arena);
        let expected: Vec<i64> = a_set.union(&b_set).copied().collect();
        assert_eq!(union.to_indices::<i64>(), expected);

        let intersection = IndexSet::from_intersection(&a, &b, config, &arena);
        let expected: Vec<i64> = a_set.intersection(&b_set).copied().collect();
        assert_eq!(intersection.to_indices::<i64>(), expected);

        let difference = IndexSet::from_difference(&a, &b, config, &arena);
        let expected: Vec<i64> = a_set.difference(&b_set).copied().collect();
        assert_eq!(difference.to_indices::<i64>(), expected);
    }
}

#[test]
fn test_union_fast_paths() {
    let arena = IndexArena::new();
    let config = ExecutionConfig::default();
    let a = IndexSet::from_range(0..10);
    let b = IndexSet::from_range(10..20);
    assert_eq!(
        IndexSet::from_union(&a, &b, config, &arena).to_range(),
        Some(0..20)
    );
    let c = IndexSet::from_range(30..40);
    assert_eq!(
        IndexSet::from_union(&a, &c, config, &arena).to_ranges(),
        vec![0..10, 30..40]
    );
    let empty = IndexSet::empty();
    assert_eq!(IndexSet::from_union(&empty, &c, config, &arena), c);
    assert!(IndexSet::from_intersection(&a, &c, config, &arena).is_empty());
    assert_eq!(IndexSet::from_difference(&a, &c, config, &arena), a);
    assert_eq!(
        IndexSet::from_difference(&IndexSet::from_range(0..20), &b, config, &arena),
        a
    );
}

#[test]
fn test_from_group_ids() {
    let arena = IndexArena::new();
    let universe = IndexSet::from_range(0..5);
    let groups = IndexSet::from_group_ids(&universe, &[1, 2, 1, 3, 2], &arena);
    assert_eq!(groups.len(), 3);
    assert_eq!(groups.ids(), &[1, 2, 3]);
    assert_eq!(groups.get(1).unwrap().to_indices::<i64>(), vec![0, 2]);
    assert_eq!(groups.get(2).unwrap().to_indices::<i64>(), vec![1, 4]);
    assert_eq!(groups.get(3).unwrap().to_indices::<i64>(), vec![3]);
    assert!(groups.get(4).is_none());
}

#[test]
fn test_from_group_ids_single_group_returns_universe() {
    let arena = IndexArena::new();
    let universe = IndexSet::from_indices(&[1i64, 3, 8], &arena);
    let groups = IndexSet::from_group_ids(&universe, &[0, 7, 0, 7, 0, 0, 0, 0, 7], &arena);
    assert_eq!(groups.ids(), &[7]);
    assert_eq!(groups.sets()[0], universe);

    let empty = IndexSet::from_group_ids(&IndexSet::empty(), &[], &arena);
    assert!(empty.is_empty());
}

#[test]
fn test_from_group_ids_partitions_universe() {
    let arena = IndexArena::new();
    let mut rng = fastrand::Rng::with_seed(5150);
    let indices = random_indices(&mut rng, 200_000);
    let universe = IndexSet::from_indices(&indices, &arena);
    // Long stretches share a group so that whole segments land in one set.
    let group_ids: Vec<i32> = (0..200_000)
        .map(|i| if i < 100_000 { (i / 40_000) as i32 } else { rng.i32(0..5) })
        .collect();

    let groups = IndexSet::from_group_ids(&universe, &group_ids, &arena);
    let total: i64 = groups.sets().iter().map(|s| s.size()).sum();
    assert_eq!(total, universe.size());
    for (id, set) in groups.iter() {
        assert!(set.indices().all(|i| group_ids[i as usize] == id));
        let expected: Vec<i64> = indices
            .iter()
            .copied()
            .filter(|&i| group_ids[i as usize] == id)
            .collect();
        assert_eq!(set.to_indices::<i64>(), expected, "group {id}");
    }
}

#[test]
fn test_from_repeating_range() {
    let arena = IndexArena::new();
    let base = IndexSet::from_indices(&[0i64, 1], &arena);
    let repeated = IndexSet::from_repeating(&base, 3, 5, 0, &arena);
    assert_eq!(repeated.to_indices::<i64>(), vec![0, 1, 5, 6, 10, 11]);

    let tiled = IndexSet::from_repeating(&IndexSet::from_range(0..4), 5, 4, 100, &arena);
    assert_eq!(tiled.to_range(), Some(100..120));

    assert!(IndexSet::from_repeating(&base, 0, 5, 0, &arena).is_empty());
    assert!(IndexSet::from_repeating(&IndexSet::empty(), 4, 5, 0, &arena).is_empty());
    assert_eq!(IndexSet::from_repeating(&base, 1, 5, 0, &arena), base);
    assert_eq!(
        IndexSet::from_repeating(&base, 1, 5, 7, &arena).to_indices::<i64>(),
        vec![7, 8]
    );
}

#[test]
fn test_from_repeating_shares_offsets() {
    let arena = IndexArena::new();
    let base = IndexSet::from_indices(&[0i64, 2], &arena);
    let repeated = IndexSet::from_repeating(&base, 3, 5, 0, &arena);
    assert_eq!(repeated.to_indices::<i64>(), vec![0, 2, 5, 7, 10, 12]);
    assert_eq!(repeated.segments_num(), 1);

    // Enough repetitions to need several segments sharing one offset array.
    let reps = 20_000;
    let many = IndexSet::from_repeating(&base, reps, 5, 3, &arena);
    assert_eq!(many.size(), 2 * reps as i64);
    assert!(many.segments_num() > 1);
    let first_ptr = many.segment(0).local_offsets().as_ptr();
    assert_eq!(many.segment(1).local_offsets().as_ptr(), first_ptr);
    let expected: Vec<i64> = (0..reps as i64)
        .flat_map(|k| [3 + 5 * k, 5 + 5 * k])
        .collect();
    assert_eq!(many.to_indices::<i64>(), expected);
}

#[test]
fn test_from_repeating_wide_base() {
    let arena = IndexArena::new();
    let base_indices = [0i64, 7, 20_000, 30_000];
    let base = IndexSet::from_indices(&base_indices, &arena);
    let stride = 40_000;
    let repeated = IndexSet::from_repeating(&base, 4, stride, 10, &arena);
    let expected: Vec<i64> = (0..4)
        .flat_map(|k| base_indices.map(|i| i + 10 + k * stride))
        .collect();
    assert_eq!(repeated.to_indices::<i64>(), expected);
}

#[test]
fn test_from_repeating_matches_naive() {
    let arena = IndexArena::new();
    let mut rng = fastrand::Rng::with_seed(8080);
    for _ in 0..20 {
        let span = rng.i64(1..30_000);
        let base_indices: Vec<i64> = random_indices(&mut rng, span);
        if base_indices.is_empty() {
            continue;
        }
        let base = IndexSet::from_indices(&base_indices, &arena);
        let width = base.bounds().end - base.bounds().start;
        let stride = width + rng.i64(0..100);
        let reps = rng.usize(1..20);
        let offset = rng.i64(0..1000);
        let repeated = IndexSet::from_repeating(&base, reps, stride, offset, &arena);
        let expected: Vec<i64> = (0..reps as i64)
            .flat_map(|k| base_indices.iter().map(move |&i| i + offset + k * stride))
            .collect();
        assert_eq!(repeated.to_indices::<i64>(), expected);
    }
}

#[test]
fn test_equals_across_representations() {
    let arena = IndexArena::new();
    let from_indices = IndexSet::from_indices(&[0i64, 1, 2, 100, 101, 200], &arena);
    let from_ranges = IndexSet::from_ranges(&[0..3, 100..102, 200..201], &arena);
    let mut bools = vec![false; 201];
    for i in [0, 1, 2, 100, 101, 200] {
        bools[i] = true;
    }
    let from_bools = IndexSet::from_bools(&bools, &arena);
    assert_eq!(from_indices, from_ranges);
    assert_eq!(from_ranges, from_bools);

    let other = IndexSet::from_indices(&[0i64, 1, 2, 100, 102, 200], &arena);
    assert_ne!(from_indices, other);
    let shorter = IndexSet::from_indices(&[0i64, 1, 2, 100, 101], &arena);
    assert_ne!(from_indices, shorter);
    assert_eq!(IndexSet::empty(), IndexSet::from_range(7..7));
}

#[test]
fn test_equals_with_different_segmentation() {
    let arena = IndexArena::new();
    let n = MAX_SEGMENT_SIZE as i64;
    let indices = [10i64, 20, n + 5, n + 15];
    // Cut as [10, 20, n + 5] [n + 15].
    let a = IndexSet::from_indices(&indices, &arena);
    // Cut at the universe segment border: [10, 20] [n + 5, n + 15].
    let mut bools = vec![false; (n + 16) as usize];
    for i in indices {
        bools[i as usize] = true;
    }
    let b = IndexSet::from_bools(&bools, &arena);
    assert_eq!(a.segment(0).len(), 3);
    assert_eq!(b.segment(0).len(), 2);
    assert_eq!(a, b);

    let pieces: Vec<usize> = a
        .zip_segments(&b)
        .map(|(x, y)| {
            assert_eq!(x.len(), y.len());
            assert!(x.indices().eq(y.indices()));
            x.len()
        })
        .collect();
    assert_eq!(pieces, vec![2, 1, 1]);
}

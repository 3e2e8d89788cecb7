use std::sync::atomic::{AtomicI64, Ordering};

use crate::tests::random_indices;
use crate::{ExecutionConfig, IndexArena, IndexSet, MAX_SEGMENT_SIZE, SegmentPosition};

#[test]
fn test_contiguous_indices_collapse_to_range() {
    let arena = IndexArena::new();
    let set = IndexSet::from_indices(&[5i64, 6, 7, 8], &arena);
    assert_eq!(set.to_range(), Some(5..9));
    assert_eq!(set.size(), 4);
    assert_eq!(arena.allocated_bytes(), 0);
}

#[test]
fn test_sparse_set_ranges_and_queries() {
    let arena = IndexArena::new();
    let set = IndexSet::from_indices(&[0i64, 1, 2, 100, 101, 200], &arena);
    assert_eq!(set.to_ranges(), vec![0..3, 100..102, 200..201]);
    assert_eq!(set.size(), 6);
    assert_eq!(set.first(), Some(0));
    assert_eq!(set.last(), Some(200));
    assert_eq!(set.bounds(), 0..201);
    assert_eq!(set.min_array_size(), 201);
    assert_eq!(set.to_range(), None);
    assert!(set.contains(101));
    assert!(!set.contains(3));
    assert!(!set.contains(201));
    assert_eq!(set.get(3), 100);
    assert_eq!(set.get(5), 200);
    assert_eq!(
        format!("{set:?}"),
        "IndexSet(size: 6, [0..3, 100..102, 200])"
    );
}

#[test]
fn test_empty_set() {
    let set = IndexSet::empty();
    assert_eq!(set.size(), 0);
    assert!(set.is_empty());
    assert_eq!(set.to_range(), Some(0..0));
    assert_eq!(set.first(), None);
    assert_eq!(set.last(), None);
    assert_eq!(set.min_array_size(), 0);
    assert_eq!(set.segments_num(), 0);
    assert!(set.to_ranges().is_empty());
    assert_eq!(set.indices().count(), 0);
    assert_eq!(set.find_first_at_or_after(0), None);
    assert_eq!(set.find_last_at_or_before(100), None);
    assert!(set.slice_content(0..100).is_empty());
}

#[test]
fn test_range_layout_segments() {
    let set = IndexSet::from_range(10..40_010);
    assert_eq!(set.segments_num(), 3);
    assert_eq!(set.segment(0).first(), 10);
    assert_eq!(set.segment(1).first(), 10 + MAX_SEGMENT_SIZE as i64);
    assert_eq!(set.segment(2).len(), 40_000 - 2 * MAX_SEGMENT_SIZE);
    assert_eq!(set.get(20_000), 20_010);
    let sp = set.find(20_010).unwrap();
    assert_eq!(sp, SegmentPosition::new(1, 20_000 - MAX_SEGMENT_SIZE));
    assert_eq!(set.position_of(sp), 20_000);
    assert_eq!(set.slice(5, 10).to_range(), Some(15..25));
    assert_eq!(set.slice_content(0..20).to_range(), Some(10..20));
}

#[test]
fn test_segment_position_round_trip() {
    let arena = IndexArena::new();
    let mut rng = fastrand::Rng::with_seed(297135646);
    let indices = random_indices(&mut rng, 300_000);
    let set = IndexSet::from_indices(&indices, &arena);
    assert_eq!(set.size(), indices.len() as i64);
    assert!(set.segments_num() > 1);

    for _ in 0..2000 {
        let pos = rng.i64(0..set.size());
        let sp = set.segment_position(pos);
        assert_eq!(set.position_of(sp), pos);
        let index = set.get(pos);
        assert_eq!(index, indices[pos as usize]);
        assert_eq!(set.find(index), Some(sp));
        assert_eq!(
            set.segment(sp.segment).get(sp.index_in_segment),
            index,
            "segment position of {pos}"
        );
    }
}

#[test]
fn test_find_neighbors() {
    let arena = IndexArena::new();
    let mut rng = fastrand::Rng::with_seed(1129);
    let indices = random_indices(&mut rng, 200_000);
    let set = IndexSet::from_indices(&indices, &arena);

    for _ in 0..2000 {
        let probe = rng.i64(0..210_000);
        let after = indices.partition_point(|&i| i < probe);
        let expected_after = indices.get(after).copied();
        let found_after = set
            .find_first_at_or_after(probe)
            .map(|sp| set.get(set.position_of(sp)));
        assert_eq!(found_after, expected_after, "first at or after {probe}");

        let before = indices.partition_point(|&i| i <= probe);
        let expected_before = before.checked_sub(1).map(|p| indices[p]);
        let found_before = set
            .find_last_at_or_before(probe)
            .map(|sp| set.get(set.position_of(sp)));
        assert_eq!(found_before, expected_before, "last at or before {probe}");

        assert_eq!(set.contains(probe), indices.binary_search(&probe).is_ok());
    }
}

#[test]
fn test_slice_matches_vec_slice() {
    let arena = IndexArena::new();
    let mut rng = fastrand::Rng::with_seed(55500000);
    let indices = random_indices(&mut rng, 250_000);
    let set = IndexSet::from_indices(&indices, &arena);
    let size = set.size();

    for _ in 0..200 {
        let start = rng.i64(0..=size);
        let len = rng.i64(0..=size - start);
        let slice = set.slice(start, len);
        assert_eq!(slice.size(), len);
        assert_eq!(
            slice.to_indices::<i64>(),
            &indices[start as usize..(start + len) as usize]
        );

        if len > 2 {
            let inner_start = rng.i64(0..len);
            let inner_len = rng.i64(0..=len - inner_start);
            let inner = slice.slice(inner_start, inner_len);
            let from = (start + inner_start) as usize;
            assert_eq!(
                inner.to_indices::<i64>(),
                &indices[from..from + inner_len as usize]
            );
            assert_eq!(inner.ranges().count(), inner.to_ranges().len());
        }
    }
}

#[test]
fn test_slice_content_matches_filter() {
    let arena = IndexArena::new();
    let mut rng = fastrand::Rng::with_seed(7);
    let indices = random_indices(&mut rng, 150_000);
    let set = IndexSet::from_indices(&indices, &arena);

    for _ in 0..200 {
        let a = rng.i64(0..160_000);
        let b = rng.i64(a..=160_000);
        let content = set.slice_content(a..b);
        let expected: Vec<i64> = indices.iter().copied().filter(|i| (a..b).contains(i)).collect();
        assert_eq!(content.to_indices::<i64>(), expected, "content of {a}..{b}");
    }
}

#[test]
fn test_shift_and_slice_and_shift() {
    let arena = IndexArena::new();
    let set = IndexSet::from_indices(&[3i64, 10, 11, 40_000, 40_005], &arena);

    let shifted = set.shift(1000, &arena);
    assert_eq!(
        shifted.to_indices::<i64>(),
        vec![1003, 1010, 1011, 41_000, 41_005]
    );
    assert_eq!(
        shifted.segment(0).local_offsets().as_ptr(),
        set.segment(0).local_offsets().as_ptr()
    );

    let moved = set.slice_and_shift(1, 3, -10, &arena);
    assert_eq!(moved.to_indices::<i64>(), vec![0, 1, 39_990]);

    let range = IndexSet::from_range(5..10).shift(-5, &arena);
    assert_eq!(range.to_range(), Some(0..5));
}

#[test]
fn test_indices_iterator_resumes() {
    let arena = IndexArena::new();
    let mut rng = fastrand::Rng::with_seed(4242);
    let indices = random_indices(&mut rng, 100_000);
    let set = IndexSet::from_indices(&indices, &arena);

    let mut iter = set.indices();
    assert_eq!(iter.len(), indices.len());
    let head: Vec<i64> = iter.by_ref().take(indices.len() / 3).collect();
    let resume_at = iter.position();
    let tail: Vec<i64> = set.indices_from(resume_at).collect();
    assert_eq!(head.len() + tail.len(), indices.len());
    assert_eq!([head, tail].concat(), indices);
}

#[test]
fn test_foreach_variants() {
    let arena = IndexArena::new();
    let indices = [2i64, 4, 5, 6, 20_000, 20_001];
    let set = IndexSet::from_indices(&indices, &arena);

    let mut seen = Vec::new();
    set.foreach_index_with_pos(|index, pos| seen.push((index, pos)));
    assert_eq!(
        seen,
        indices
            .iter()
            .enumerate()
            .map(|(p, &i)| (i, p as i64))
            .collect::<Vec<_>>()
    );

    let mut runs = Vec::new();
    set.foreach_range(|r| runs.push(r));
    assert_eq!(runs, vec![2..3, 4..7, 20_000..20_002]);

    let mut starts = Vec::new();
    set.foreach_segment(|segment, pos| starts.push((segment.first(), pos)));
    assert_eq!(starts.first(), Some(&(2, 0)));
    let total: usize = set.segments().map(|s| s.len()).sum();
    assert_eq!(total, indices.len());
}

#[test]
fn test_par_foreach_matches_sequential() {
    let arena = IndexArena::new();
    let mut rng = fastrand::Rng::with_seed(31337);
    let indices = random_indices(&mut rng, 500_000);
    let set = IndexSet::from_indices(&indices, &arena);
    let config = ExecutionConfig::default().with_grain_size(64);

    let sum = AtomicI64::new(0);
    let count = AtomicI64::new(0);
    set.par_foreach_index(config, |index| {
        sum.fetch_add(index, Ordering::Relaxed);
        count.fetch_add(1, Ordering::Relaxed);
    });
    assert_eq!(sum.into_inner(), indices.iter().sum::<i64>());
    assert_eq!(count.into_inner(), set.size());

    let covered = AtomicI64::new(0);
    set.par_foreach_segment(config, |segment, pos| {
        assert_eq!(set.get(pos), segment.first());
        covered.fetch_add(segment.len() as i64, Ordering::Relaxed);
    });
    assert_eq!(covered.into_inner(), set.size());
}

#[test]
fn test_conversions() {
    let arena = IndexArena::new();
    let set = IndexSet::from_indices(&[1u32, 3, 4, 70, 71, 72], &arena);

    assert_eq!(set.to_indices::<u32>(), vec![1, 3, 4, 70, 71, 72]);
    let mut out = vec![0usize; 8];
    set.to_indices_into(&mut out);
    assert_eq!(out, vec![1, 3, 4, 70, 71, 72, 0, 0]);

    let bools = set.to_bools(80);
    assert_eq!(bools.len(), 80);
    let selected: Vec<usize> = (0..bools.len()).filter(|&i| bools[i]).collect();
    assert_eq!(selected, vec![1, 3, 4, 70, 71, 72]);

    let bits = set.to_bits(100);
    assert_eq!(bits.iter().collect::<Vec<_>>(), vec![1, 3, 4, 70, 71, 72]);

    assert_eq!(set.to_ranges(), vec![1..2, 3..5, 70..73]);
    assert_eq!(set.to_ranges_invert(0..80), vec![0..1, 2..3, 5..70, 73..80]);
    assert_eq!(set.to_ranges_chunked(2), vec![1..2, 3..5, 70..72, 72..73]);
}

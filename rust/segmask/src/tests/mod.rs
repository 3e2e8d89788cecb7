mod algebra_tests;
mod index_set_tests;

/// Sorted, duplicate-free indices below `universe`, mixing long runs, short
/// scattered stretches and gaps of varying length.
pub(crate) fn random_indices(rng: &mut fastrand::Rng, universe: i64) -> Vec<i64> {
    let mut indices = Vec::new();
    let mut pos = 0i64;
    while pos < universe {
        match rng.u8(0..4) {
            0 => pos += rng.i64(1..200),
            1 => {
                let end = (pos + rng.i64(1..300)).min(universe);
                indices.extend(pos..end);
                pos = end + rng.i64(1..5);
            }
            2 => {
                for _ in 0..rng.usize(1..50) {
                    if pos >= universe {
                        break;
                    }
                    indices.push(pos);
                    pos += rng.i64(1..10);
                }
            }
            _ => pos += rng.i64(1000..40000),
        }
    }
    indices
}

//! Partitioning an index set by group id.

use ahash::AHashMap;

use crate::arena::IndexArena;
use crate::build::{LocalSegments, finish};
use crate::index_set::IndexSet;

/// The result of [`IndexSet::from_group_ids`]: one index set per distinct
/// group id.
///
/// Groups are ordered by the first member of the universe that carries
/// their id. Together the sets partition the universe.
#[derive(Debug, Clone, Default)]
pub struct GroupedIndexSets<'a> {
    ids: Vec<i32>,
    sets: Vec<IndexSet<'a>>,
    lookup: AHashMap<i32, usize>,
}

impl<'a> GroupedIndexSets<'a> {
    /// Number of distinct groups.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Distinct group ids in order of first appearance.
    pub fn ids(&self) -> &[i32] {
        &self.ids
    }

    /// Index sets, parallel to [`GroupedIndexSets::ids`].
    pub fn sets(&self) -> &[IndexSet<'a>] {
        &self.sets
    }

    /// The members carrying `id`, if any do.
    pub fn get(&self, id: i32) -> Option<&IndexSet<'a>> {
        self.lookup.get(&id).map(|&i| &self.sets[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, &IndexSet<'a>)> + '_ {
        self.ids.iter().copied().zip(self.sets.iter())
    }
}

impl<'a> IndexSet<'a> {
    /// Splits `universe` into one set per distinct value of
    /// `group_ids[index]`.
    ///
    /// Segments of the universe that fall entirely into one group are shared
    /// with the universe instead of copied.
    ///
    /// # Panics
    ///
    /// Panics if `group_ids` is shorter than `universe.min_array_size()`.
    pub fn from_group_ids(
        universe: &IndexSet<'a>,
        group_ids: &[i32],
        arena: &'a IndexArena,
    ) -> GroupedIndexSets<'a> {
        let Some(first) = universe.first() else {
            return GroupedIndexSets::default();
        };
        assert!(
            group_ids.len() as i64 >= universe.min_array_size(),
            "{} group ids do not cover the universe",
            group_ids.len()
        );
        let first_id = group_ids[first as usize];
        if universe.indices().all(|i| group_ids[i as usize] == first_id) {
            return GroupedIndexSets {
                ids: vec![first_id],
                sets: vec![*universe],
                lookup: AHashMap::from_iter([(first_id, 0)]),
            };
        }

        let mut ids = Vec::new();
        let mut lookup = AHashMap::new();
        let mut locals: Vec<LocalSegments<'a>> = Vec::new();
        let mut pending: Vec<Vec<u16>> = Vec::new();
        let mut touched = Vec::new();
        universe.foreach_segment(|segment, _| {
            let base = segment.base();
            for &offset in segment.local_offsets() {
                let id = group_ids[(base + offset as i64) as usize];
                let group = *lookup.entry(id).or_insert_with(|| {
                    ids.push(id);
                    locals.push(LocalSegments::new());
                    pending.push(Vec::new());
                    ids.len() - 1
                });
                if pending[group].is_empty() {
                    touched.push(group);
                }
                pending[group].push(offset);
            }
            for group in touched.drain(..) {
                let offsets = &mut pending[group];
                if offsets.len() == segment.len() {
                    locals[group].push_shared(segment);
                } else {
                    locals[group].push_local_offsets(base, offsets);
                }
                offsets.clear();
            }
        });
        log::debug!(
            "split {} indices into {} groups",
            universe.size(),
            ids.len()
        );
        let sets = locals
            .into_iter()
            .map(|local| finish(vec![local], arena))
            .collect();
        GroupedIndexSets { ids, sets, lookup }
    }
}

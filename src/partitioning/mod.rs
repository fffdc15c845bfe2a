//! Partitionings: per-task ranges over a [`crate::space::Space`], produced by
//! a [`Partitioner`] and optionally filtered down to the ranges a single task
//! cares about.
//!
//! Grounded on the original's `Laik_Partitioning` / `laik_update_partitioning`
//! (`laik-space.c`): the `off[]`/`myMapOff[]` bookkeeping and the `bordersValid`
//! idempotency flag are carried over directly; the partitioner dispatch itself
//! moves to [`Partitioner::run`] (see `partitioner.rs`).

pub mod partitioner;

use crate::index::Range;
use crate::instance::Group;
use crate::space::SpaceId;
use partitioner::Partitioner;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Opaque handle into an [`crate::instance::Instance`]'s partitioning arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PartitioningId(pub(crate) u32);

/// One task's ownership of one range within a partitioning.
///
/// `data` is an opaque, crate-ignored payload slot — ported from the
/// original's `void* data` on `Laik_TaskSlice_Gen` — carried through purely
/// so a higher-level data-movement layer can stash something per range.
#[derive(Clone)]
pub struct TaskRange {
    pub task: usize,
    pub range: Range,
    pub tag: i32,
    pub map_no: u32,
    pub data: Option<Arc<dyn Any + Send + Sync>>,
}

impl fmt::Debug for TaskRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRange")
            .field("task", &self.task)
            .field("range", &self.range)
            .field("tag", &self.tag)
            .field("map_no", &self.map_no)
            .finish()
    }
}

impl PartialEq for TaskRange {
    fn eq(&self, other: &Self) -> bool {
        self.task == other.task
            && self.range == other.range
            && self.tag == other.tag
            && self.map_no == other.map_no
    }
}

/// An optional predicate narrowing which ranges a partitioner's output keeps.
///
/// Ported from `Laik_Partitioning`'s `pfilter1`/`pfilter2`/my-task flag
/// (`space-internal.h`): `my` keeps only ranges owned by the running task,
/// and up to two `intersect` partitionings additionally require the range to
/// overlap a range owned by the same task in that other partitioning.
#[derive(Clone, Copy, Debug, Default)]
pub struct Filter {
    pub my: bool,
    pub intersect: [Option<PartitioningId>; 2],
}

impl Filter {
    pub fn none() -> Self {
        Filter::default()
    }

    pub fn my() -> Self {
        Filter {
            my: true,
            intersect: [None, None],
        }
    }
}

/// The scratch structure a [`Partitioner`] writes ranges into.
///
/// Mirrors the original's `laik_append_slice`-family helpers: a partitioner
/// calls [`PartitionBuilder::add_range`] for every range it wants to emit,
/// and the builder applies the configured [`Filter`] and `tag`/`map_no`
/// bookkeeping before a [`Partitioning`] compiles the result.
pub struct PartitionBuilder {
    space: Range,
    dims: usize,
    group_size: usize,
    myid: usize,
    filter: Filter,
    filter_refs: [Option<Vec<TaskRange>>; 2],
    raw: Vec<TaskRange>,
}

impl PartitionBuilder {
    pub(crate) fn new(space: Range, dims: usize, group_size: usize, myid: usize, filter: Filter) -> Self {
        PartitionBuilder {
            space,
            dims,
            group_size,
            myid,
            filter,
            filter_refs: [None, None],
            raw: Vec::new(),
        }
    }

    pub(crate) fn set_filter_ref(&mut self, slot: usize, ranges: Vec<TaskRange>) {
        self.filter_refs[slot] = Some(ranges);
    }

    /// Add a range owned by `task`. Dropped immediately if it fails the
    /// builder's configured filter, so partitioners never need to know
    /// about filtering themselves.
    pub fn add_range(&mut self, task: usize, range: Range, tag: i32, data: Option<Arc<dyn Any + Send + Sync>>) {
        if range.is_empty(self.dims) {
            return;
        }
        if self.filter.my && task != self.myid {
            return;
        }
        for slot in self.filter_refs.iter().flatten() {
            let owns_overlap = slot
                .iter()
                .filter(|tr| tr.task == task)
                .any(|tr| tr.range.intersect(self.dims, &range).is_some());
            if !owns_overlap {
                return;
            }
        }
        self.raw.push(TaskRange {
            task,
            range,
            tag,
            map_no: 0,
            data,
        });
    }

    pub(crate) fn finish(self) -> Vec<TaskRange> {
        self.raw
    }
}

/// A computed assignment of ranges to tasks over a single [`crate::space::Space`].
#[derive(Clone)]
pub struct Partitioning {
    id: PartitioningId,
    space: SpaceId,
    group: Group,
    partitioner: Partitioner,
    base: Option<PartitioningId>,
    filter: Filter,
    ranges: Vec<TaskRange>,
    /// `off[t]..off[t+1]` indexes into `ranges` for task `t`'s ranges,
    /// length `group.size + 1`. Empty until `run` has completed.
    off: Vec<usize>,
    /// The owning space's dimensionality, captured at `run` time so range
    /// arithmetic elsewhere doesn't need a `Space` reference in hand.
    dims: usize,
    borders_valid: bool,
}

impl Partitioning {
    pub(crate) fn new(
        id: PartitioningId,
        space: SpaceId,
        group: Group,
        partitioner: Partitioner,
        base: Option<PartitioningId>,
        filter: Filter,
    ) -> Self {
        Partitioning {
            id,
            space,
            group,
            partitioner,
            base,
            filter,
            ranges: Vec::new(),
            off: Vec::new(),
            dims: 0,
            borders_valid: false,
        }
    }

    pub fn id(&self) -> PartitioningId {
        self.id
    }

    pub fn space(&self) -> SpaceId {
        self.space
    }

    /// The owning space's dimensionality. `0` until [`Partitioning::run`]
    /// has been called at least once.
    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn group(&self) -> Group {
        self.group
    }

    pub fn base(&self) -> Option<PartitioningId> {
        self.base
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn borders_valid(&self) -> bool {
        self.borders_valid
    }

    /// Mark the computed borders stale, forcing the next [`Partitioning::run`]
    /// to recompute them (e.g. after the owning space's extent changes).
    pub(crate) fn invalidate(&mut self) {
        self.borders_valid = false;
    }

    /// Run the partitioner against `space_extent`, using `base` and the
    /// (already-run) `filter_sources` as context. No-op if borders are
    /// already valid.
    pub fn run(
        &mut self,
        space: &crate::space::Space,
        base: Option<&Partitioning>,
        filter_sources: [Option<&Partitioning>; 2],
    ) {
        if self.borders_valid {
            return;
        }
        let mut builder = PartitionBuilder::new(
            space.extent(),
            space.dims(),
            self.group.size,
            self.group.myid,
            self.filter,
        );
        for (slot, src) in filter_sources.into_iter().enumerate() {
            if let Some(src) = src {
                builder.set_filter_ref(slot, src.ranges.clone());
            }
        }
        self.partitioner.run(&mut builder, base);
        let mut raw = builder.finish();
        raw.sort_by_key(|tr| tr.task);

        // Assign per-task, first-seen-order map numbers (laik_update_partitioning's
        // per-map bookkeeping), then compute off[]. Ranges sharing a `tag > 0`
        // on the same task share a map_no; a `tag <= 0` always starts a new one.
        let mut off = vec![0usize; self.group.size + 1];
        for tr in &raw {
            off[tr.task + 1] += 1;
        }
        for t in 0..self.group.size {
            off[t + 1] += off[t];
        }
        let mut next_map_no = vec![0u32; self.group.size];
        let mut tag_map_no: Vec<HashMap<i32, u32>> = vec![HashMap::new(); self.group.size];
        for tr in &mut raw {
            tr.map_no = if tr.tag > 0 {
                *tag_map_no[tr.task].entry(tr.tag).or_insert_with(|| {
                    let m = next_map_no[tr.task];
                    next_map_no[tr.task] += 1;
                    m
                })
            } else {
                let m = next_map_no[tr.task];
                next_map_no[tr.task] += 1;
                m
            };
        }

        self.ranges = raw;
        self.off = off;
        self.dims = space.dims();
        self.borders_valid = true;
    }

    /// All ranges owned by `task`, in map-number order.
    pub fn ranges_of(&self, task: usize) -> &[TaskRange] {
        if !self.borders_valid {
            return &[];
        }
        &self.ranges[self.off[task]..self.off[task + 1]]
    }

    pub fn all_ranges(&self) -> &[TaskRange] {
        &self.ranges
    }

    /// The number of distinct maps (contiguous ranges) task `task` owns.
    pub fn map_count(&self, task: usize) -> usize {
        self.ranges_of(task).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Index;
    use crate::space::Space;

    fn space(dims: usize, size: [u64; 3]) -> Space {
        Space::new(SpaceId(0), dims, Range::full(dims, size))
    }

    #[test]
    fn stripe_partitioning_has_contiguous_off_table() {
        let mut p = Partitioning::new(
            PartitioningId(0),
            SpaceId(0),
            Group { size: 4, myid: 0 },
            Partitioner::Stripe(0),
            None,
            Filter::none(),
        );
        p.run(&space(1, [100, 0, 0]), None, [None, None]);
        assert_eq!(p.ranges_of(0).len(), 1);
        assert_eq!(p.ranges_of(3).len(), 1);
        assert_eq!(p.all_ranges().len(), 4);
    }

    #[test]
    fn my_filter_keeps_only_owned_ranges() {
        let mut p = Partitioning::new(
            PartitioningId(0),
            SpaceId(0),
            Group { size: 4, myid: 2 },
            Partitioner::Stripe(0),
            None,
            Filter::my(),
        );
        p.run(&space(1, [100, 0, 0]), None, [None, None]);
        assert_eq!(p.all_ranges().len(), 1);
        assert_eq!(p.all_ranges()[0].task, 2);
    }

    #[test]
    fn master_partitioning_leaves_other_tasks_empty() {
        let mut p = Partitioning::new(
            PartitioningId(0),
            SpaceId(0),
            Group { size: 3, myid: 0 },
            Partitioner::Master,
            None,
            Filter::none(),
        );
        p.run(&space(1, [10, 0, 0]), None, [None, None]);
        assert_eq!(p.ranges_of(0).len(), 1);
        assert!(p.ranges_of(1).is_empty());
        assert!(p.ranges_of(2).is_empty());
    }

    #[test]
    fn run_is_idempotent() {
        let mut p = Partitioning::new(
            PartitioningId(0),
            SpaceId(0),
            Group { size: 2, myid: 0 },
            Partitioner::All,
            None,
            Filter::none(),
        );
        p.run(&space(1, [10, 0, 0]), None, [None, None]);
        let before = p.all_ranges().to_vec();
        // A second run with nonsense context must be a no-op.
        p.run(&space(1, [999, 0, 0]), None, [None, None]);
        assert_eq!(p.all_ranges(), before.as_slice());
    }

    #[test]
    fn ranges_sharing_a_positive_tag_on_the_same_task_share_a_map_no() {
        let mut p = Partitioning::new(
            PartitioningId(0),
            SpaceId(0),
            Group { size: 1, myid: 0 },
            Partitioner::Custom(Arc::new(|b, _| {
                b.add_range(0, Range::new(Index::new1(0), Index::new1(5)), 1, None);
                b.add_range(0, Range::new(Index::new1(5), Index::new1(10)), 2, None);
                b.add_range(0, Range::new(Index::new1(10), Index::new1(15)), 1, None);
                b.add_range(0, Range::new(Index::new1(15), Index::new1(20)), 0, None);
                b.add_range(0, Range::new(Index::new1(20), Index::new1(25)), 0, None);
            })),
            None,
            Filter::none(),
        );
        p.run(&space(1, [100, 0, 0]), None, [None, None]);
        let ranges = p.ranges_of(0);
        assert_eq!(ranges.len(), 5);
        // two ranges tagged 1 share a map_no
        assert_eq!(ranges[0].map_no, ranges[2].map_no);
        // a different positive tag gets its own map_no
        assert_ne!(ranges[0].map_no, ranges[1].map_no);
        // tag <= 0 ranges always start a new map_no, even from each other
        assert_ne!(ranges[3].map_no, ranges[4].map_no);
    }

    #[test]
    fn intersect_filter_requires_overlap_with_same_task_in_source() {
        let mut base = Partitioning::new(
            PartitioningId(0),
            SpaceId(0),
            Group { size: 2, myid: 0 },
            Partitioner::Custom(Arc::new(|b, _| {
                b.add_range(0, Range::new(Index::new1(0), Index::new1(5)), 0, None);
            })),
            None,
            Filter::none(),
        );
        base.run(&space(1, [10, 0, 0]), None, [None, None]);

        let mut derived = Partitioning::new(
            PartitioningId(1),
            SpaceId(0),
            Group { size: 2, myid: 0 },
            Partitioner::All,
            None,
            Filter {
                my: false,
                intersect: [Some(PartitioningId(0)), None],
            },
        );
        derived.run(&space(1, [10, 0, 0]), None, [Some(&base), None]);
        // task 0 overlaps base's task-0 range -> kept; task 1 does not -> dropped
        assert_eq!(derived.all_ranges().len(), 1);
        assert_eq!(derived.all_ranges()[0].task, 0);
    }
}

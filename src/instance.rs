//! The top-level registry: task group, space/partitioning arenas, and the
//! installed [`Backend`].
//!
//! The original implementation threads a `Laik_Instance*` through every call
//! and keeps spaces and partitionings on intrusive linked lists hanging off
//! it. Here `Instance` owns two flat arenas (`Vec<Space>`, `Vec<Partitioning>`)
//! indexed by the opaque handles `SpaceId` and `PartitioningId`, so creating
//! a space or partitioning is just a push and a handle is just an index —
//! no pointer cycles, no manual teardown order to get right.

use crate::backend::{Backend, NullBackend};
use crate::index::Range;
use crate::partitioning::{Filter, Partitioning, PartitioningId};
use crate::partitioning::partitioner::Partitioner;
use crate::reorder::Reordering;
use crate::space::{Space, SpaceId};

/// A fixed-size set of cooperating tasks and this process's rank within it.
///
/// Groups in this crate are a flat `(size, myid)` pair rather than the
/// original's own arena of derived subgroups; subgrouping for a transition
/// is computed on demand by [`crate::transition`] instead of being a
/// long-lived object.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Group {
    pub size: usize,
    pub myid: usize,
}

impl Group {
    pub fn new(size: usize, myid: usize) -> Self {
        assert!(myid < size, "myid must be within the group");
        Group { size, myid }
    }
}

/// Owns every space and partitioning created during a run, plus the
/// location/reordering state and the backend collaborator.
pub struct Instance {
    group: Group,
    spaces: Vec<Space>,
    partitionings: Vec<Partitioning>,
    /// Per-task location strings (e.g. SuperMUC-style `iNNrNNcNNsNN`), used
    /// by [`crate::topology`] to build a cost matrix. Empty until set.
    locations: Vec<String>,
    location_map: Option<Reordering>,
    backend: Box<dyn Backend>,
}

impl Instance {
    pub fn new(group: Group) -> Self {
        Instance {
            group,
            spaces: Vec::new(),
            partitionings: Vec::new(),
            locations: vec![String::new(); group.size],
            location_map: None,
            backend: Box::new(NullBackend),
        }
    }

    pub fn with_backend(group: Group, backend: Box<dyn Backend>) -> Self {
        let mut inst = Instance::new(group);
        inst.backend = backend;
        inst
    }

    pub fn group(&self) -> Group {
        self.group
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn set_backend(&mut self, backend: Box<dyn Backend>) {
        self.backend = backend;
    }

    // -- spaces ----------------------------------------------------------

    pub fn create_space(&mut self, dims: usize, size: [u64; 3]) -> SpaceId {
        let id = SpaceId(self.spaces.len() as u32);
        self.spaces.push(Space::new(id, dims, Range::full(dims, size)));
        id
    }

    pub fn space(&self, id: SpaceId) -> &Space {
        &self.spaces[id.0 as usize]
    }

    pub fn space_mut(&mut self, id: SpaceId) -> &mut Space {
        &mut self.spaces[id.0 as usize]
    }

    /// Resize a 1-D space's extent along its only axis, invalidating the
    /// borders of every partitioning built directly on it so the next
    /// [`Instance::run_partitioning`] call recomputes them.
    pub fn change_extent_1d(&mut self, id: SpaceId, new_size: u64) {
        let space = self.space_mut(id);
        assert_eq!(space.dims(), 1, "change_extent_1d requires a 1-D space");
        space.set_extent(Range::full(1, [new_size, 0, 0]));
        for p in &mut self.partitionings {
            if p.space() == id {
                p.invalidate();
            }
        }
    }

    // -- partitionings -----------------------------------------------------

    pub fn create_partitioning(
        &mut self,
        space: SpaceId,
        partitioner: Partitioner,
        base: Option<PartitioningId>,
        filter: Filter,
    ) -> PartitioningId {
        let id = PartitioningId(self.partitionings.len() as u32);
        self.partitionings.push(Partitioning::new(
            id,
            space,
            self.group,
            partitioner,
            base,
            filter,
        ));
        id
    }

    pub fn partitioning(&self, id: PartitioningId) -> &Partitioning {
        &self.partitionings[id.0 as usize]
    }

    /// Compute the ranges for `id`, recursing into its `base` first if it
    /// has not been run yet. Idempotent: a partitioning whose borders are
    /// already valid is left untouched (`bordersValid` in the original).
    pub fn run_partitioning(&mut self, id: PartitioningId) {
        if self.partitionings[id.0 as usize].borders_valid() {
            return;
        }
        let base_id = self.partitionings[id.0 as usize].base();
        if let Some(b) = base_id {
            self.run_partitioning(b);
        }
        let filter = self.partitionings[id.0 as usize].filter();
        if let Some(f) = filter.intersect[0] {
            self.run_partitioning(f);
        }
        if let Some(f) = filter.intersect[1] {
            self.run_partitioning(f);
        }

        let space_id = self.partitionings[id.0 as usize].space();
        let space = self.space(space_id).clone();
        let base_snapshot = base_id.map(|b| self.partitionings[b.0 as usize].clone());
        let filter_snapshots = [
            filter.intersect[0].map(|f| self.partitionings[f.0 as usize].clone()),
            filter.intersect[1].map(|f| self.partitionings[f.0 as usize].clone()),
        ];

        let p = &mut self.partitionings[id.0 as usize];
        p.run(
            &space,
            base_snapshot.as_ref(),
            [filter_snapshots[0].as_ref(), filter_snapshots[1].as_ref()],
        );
        tracing::debug!(partitioning = id.0, space = space_id.0, "computed partitioning borders");
    }

    // -- locations / reordering -------------------------------------------

    pub fn set_location(&mut self, task: usize, location: impl Into<String>) {
        self.locations[task] = location.into();
    }

    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    pub fn location_map(&self) -> Option<&Reordering> {
        self.location_map.as_ref()
    }

    /// Install a new rank reordering, notifying the backend so it can
    /// update its own view of the group.
    pub fn apply_reordering(&mut self, reordering: Reordering) {
        tracing::debug!(entries = reordering.len(), "applying rank reordering");
        self.location_map = Some(reordering);
        self.backend.update_group(&self.group);
    }
}

//! Named, multi-dimensional index spaces.
//!
//! A [`Space`] is immutable after creation except through [`Space::rename`]
//! and the 1-D-only [`Instance::change_extent_1d`](crate::instance::Instance::change_extent_1d).
//! Spaces are owned by an [`crate::instance::Instance`] and enumerated in
//! creation order; see the arena note on [`SpaceId`].

use crate::index::Range;

/// Opaque handle into an `Instance`'s space arena.
///
/// Handles replace the original implementation's intrusive linked list of
/// `Laik_Space*` pointers (see DESIGN.md): the arena is a plain `Vec<Space>`
/// on `Instance` and `SpaceId` is just its index, giving O(1) iteration with
/// no pointer cycles to reason about.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SpaceId(pub(crate) u32);

/// A named rectangular index domain of 1, 2, or 3 dimensions.
#[derive(Clone, Debug)]
pub struct Space {
    pub(crate) id: SpaceId,
    name: String,
    dims: usize,
    extent: Range,
}

impl Space {
    pub(crate) fn new(id: SpaceId, dims: usize, extent: Range) -> Self {
        assert!((1..=3).contains(&dims), "space dims must be 1, 2, or 3");
        Space {
            id,
            name: format!("space-{}", id.0),
            dims,
            extent,
        }
    }

    pub fn id(&self) -> SpaceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Give this space a name, for debug output.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn extent(&self) -> Range {
        self.extent
    }

    pub(crate) fn set_extent(&mut self, extent: Range) {
        self.extent = extent;
    }

    pub fn pretty(&self) -> String {
        self.extent.pretty(self.dims)
    }
}

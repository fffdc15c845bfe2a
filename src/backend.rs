//! The narrow interface this crate calls out through.
//!
//! Everything on the other side of [`Backend`] — actual network sends,
//! receives, collective reductions, and transport-level group management —
//! is out of scope for this crate (§1). The core only needs two hooks: a
//! collective that produces a globally-reduced view of a [`crate::commmatrix::CommMatrix`],
//! and a notification that a reordering has been applied so the transport
//! layer can update its own view of the group.

use crate::commmatrix::CommMatrix;
use crate::instance::Group;

/// Collaborator the core calls out to for cross-rank effects.
///
/// Implementations are provided by the embedding application (an MPI-like
/// backend); this crate never implements `Backend` itself outside of tests.
pub trait Backend: Send + Sync {
    /// Collectively reduce `cm` across every rank in the group, in place.
    fn matsync(&self, cm: &mut CommMatrix);

    /// Informs the backend that `group`'s rank assignment has changed.
    fn update_group(&self, group: &Group);
}

/// A `Backend` that does nothing but record that it was called; used by
/// [`crate::instance::Instance`] when no real transport is configured, and
/// directly by tests that want to assert on backend interactions.
#[derive(Default)]
pub struct NullBackend;

impl Backend for NullBackend {
    fn matsync(&self, _cm: &mut CommMatrix) {}
    fn update_group(&self, _group: &Group) {}
}

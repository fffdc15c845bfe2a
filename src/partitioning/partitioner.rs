//! The partitioner capability value.
//!
//! The original C implementation models a partitioner as a function pointer
//! plus an opaque `void*` payload (`laik_run_partitioner_t` + `data` in
//! `Laik_Partitioner`). Per the REDESIGN FLAGS in the design note, this crate
//! instead uses a small closed set of built-in variants plus one explicit
//! escape hatch for user logic, dispatched by matching on the enum rather
//! than through an indirect call.

use super::{PartitionBuilder, Partitioning};
use std::fmt;
use std::sync::Arc;

/// A strategy that produces a partitioning, optionally relative to a `base`.
#[derive(Clone)]
pub enum Partitioner {
    /// Every task owns the full extent of the space.
    All,
    /// Task 0 owns the full extent; every other task owns nothing.
    Master,
    /// The space is sliced into `group.size` near-equal contiguous chunks
    /// along axis `dim`.
    Stripe(usize),
    /// Each task's range is the base partitioning's single range for that
    /// task, with axis `dim` copied onto this space's axis `dim` and all
    /// other axes spanning the full extent. Requires the coupled axis to
    /// have equal length in both spaces.
    Copy(usize),
    /// User-supplied partitioning logic.
    Custom(Arc<dyn Fn(&mut PartitionBuilder, Option<&Partitioning>) + Send + Sync>),
}

impl fmt::Debug for Partitioner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Partitioner::All => write!(f, "All"),
            Partitioner::Master => write!(f, "Master"),
            Partitioner::Stripe(d) => write!(f, "Stripe({d})"),
            Partitioner::Copy(d) => write!(f, "Copy({d})"),
            Partitioner::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

impl Partitioner {
    /// Run this partitioner, calling `builder.add_range` for every range it
    /// wants to emit. `base`, if present, is already fully run (`bordersValid`).
    pub(super) fn run(&self, builder: &mut PartitionBuilder, base: Option<&Partitioning>) {
        let count = builder.group_size;
        let space = builder.space;
        let dims = builder.dims;

        match self {
            Partitioner::All => {
                let full = space;
                for task in 0..count {
                    builder.add_range(task, full, 0, None);
                }
            }
            Partitioner::Master => {
                builder.add_range(0, space, 0, None);
            }
            Partitioner::Stripe(dim) => {
                let dim = *dim;
                assert!(dim < dims, "stripe dimension out of range");
                let size = space.to.get(dim);
                let inc = size.div_ceil(count as u64).max(1);
                let mut idx = 0u64;
                for task in 0..count {
                    let mut from = space.from;
                    let mut to = space.to;
                    from.0[dim] = idx;
                    idx = (idx + inc).min(size);
                    to.0[dim] = idx;
                    builder.add_range(task, crate::index::Range::new(from, to), 0, None);
                }
            }
            Partitioner::Copy(dim) => {
                let dim = *dim;
                let base = base.expect("Copy partitioner requires a base partitioning");
                for task in 0..count {
                    let Some(base_range) = base.ranges_of(task).first().map(|tr| tr.range) else {
                        continue;
                    };
                    let mut from = space.from;
                    let mut to = space.to;
                    from.0[dim] = base_range.from.get(dim);
                    to.0[dim] = base_range.to.get(dim);
                    builder.add_range(task, crate::index::Range::new(from, to), 0, None);
                }
            }
            Partitioner::Custom(f) => f(builder, base),
        }
    }
}

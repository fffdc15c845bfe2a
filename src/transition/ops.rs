//! The individual operations a [`super::Transition`] compiles down to.
//!
//! Named after the original's `Laik_TransitionOp` family (`localTOp`,
//! `initTOp`, `sendTOp`, `recvTOp`, `redTOp` in `space-internal.h`), kept as
//! separate structs rather than one tagged op so each list can be consumed
//! independently (a backend only cares about `sends`/`recvs`; `CommMatrix`
//! only cares about `sends`/`reductions`).

use crate::index::Range;
use crate::transition::ReductionOp;

/// Data already resident where it needs to be: no network traffic required.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LocalOp {
    pub range: Range,
}

/// Data that must be freshly initialized rather than copied from anywhere.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct InitOp {
    pub range: Range,
}

/// A range this task must send to `to_task`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SendOp {
    pub to_task: usize,
    pub range: Range,
}

/// A range this task must receive from `from_task`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RecvOp {
    pub from_task: usize,
    pub range: Range,
}

/// A collective reduction of `range` across `input_tasks`, landing on
/// `output_task`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ReduceOp {
    pub range: Range,
    pub op: ReductionOp,
    pub input_tasks: Vec<usize>,
    pub output_task: usize,
}

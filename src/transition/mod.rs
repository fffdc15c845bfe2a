//! Computing the communication required to move from one [`Partitioning`]
//! to another.
//!
//! Grounded on `laik_calc_transitionP` (`laik-space.c`): the same per-task,
//! per-range intersection loop (`laik_slice_intersect` over `from->borders`
//! and `to->borders`) drives [`Transition::calculate`]. Two changes from the
//! original: self-sends (`task == myid`) are classified as [`ops::LocalOp`]
//! instead of a send paired with a matching receive, and `DataFlow`/
//! `ReductionOp` are explicit enums rather than permission bits on the
//! partitioning itself.

pub mod ops;

use crate::error::RankmeshError;
use crate::partitioning::Partitioning;
use ops::{InitOp, LocalOp, ReduceOp, RecvOp, SendOp};

/// How data should move (or not) between the two sides of a transition.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DataFlow {
    /// `to` receives a copy of whatever `from` holds.
    CopyIn,
    /// Same data movement as `CopyIn`; named separately so callers can
    /// express intent (this crate computes identical ops for both).
    CopyOut,
    /// Both directions of `CopyIn`/`CopyOut` combined.
    CopyInOut,
    /// `to` is populated without reference to `from`'s contents.
    Init,
    /// `from` (which must cover the whole space on every task) is folded
    /// into `to` via a [`ReductionOp`].
    Reduce,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ReductionOp {
    Plus,
    Times,
    Min,
    Max,
}

/// The compiled set of operations one task must perform to move from
/// partitioning `from` to partitioning `to`.
#[derive(Clone, Debug, Default)]
pub struct Transition {
    dims: usize,
    me: usize,
    local: Vec<LocalOp>,
    init: Vec<InitOp>,
    send: Vec<SendOp>,
    recv: Vec<RecvOp>,
    red: Vec<ReduceOp>,
    subgroup: Vec<usize>,
}

impl Transition {
    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn me(&self) -> usize {
        self.me
    }

    pub fn locals(&self) -> &[LocalOp] {
        &self.local
    }

    pub fn inits(&self) -> &[InitOp] {
        &self.init
    }

    pub fn sends(&self) -> &[SendOp] {
        &self.send
    }

    pub fn recvs(&self) -> &[RecvOp] {
        &self.recv
    }

    pub fn reductions(&self) -> &[ReduceOp] {
        &self.red
    }

    /// Every task that owns at least one op in this transition.
    pub fn subgroup(&self) -> &[usize] {
        &self.subgroup
    }

    /// Compute the transition `from -> to` as seen by task `me`.
    pub fn calculate(
        from: &Partitioning,
        to: &Partitioning,
        flow: DataFlow,
        reduction: Option<ReductionOp>,
        me: usize,
    ) -> Result<Transition, RankmeshError> {
        if from.space() != to.space() {
            return Err(RankmeshError::MismatchedSpace {
                from_space: from.space(),
                to_space: to.space(),
            });
        }
        if from.group() != to.group() {
            return Err(RankmeshError::GroupMismatch);
        }
        let dims = from.dims().max(to.dims());
        let count = from.group().size;

        let mut t = Transition {
            dims,
            me,
            ..Default::default()
        };

        match flow {
            DataFlow::Init => {
                for tr in to.ranges_of(me) {
                    t.init.push(InitOp { range: tr.range });
                }
            }
            DataFlow::CopyIn | DataFlow::CopyOut | DataFlow::CopyInOut => {
                t.calc_repartition(from, to, count);
            }
            DataFlow::Reduce => {
                let op = reduction.ok_or(RankmeshError::UnknownFlow)?;
                if !(0..count).all(|task| !from.ranges_of(task).is_empty()) {
                    return Err(RankmeshError::InvariantViolation(
                        "Reduce requires `from` to own data on every task".into(),
                    ));
                }
                let input_tasks: Vec<usize> = (0..count).collect();
                for output_task in 0..count {
                    for tr in to.ranges_of(output_task) {
                        t.red.push(ReduceOp {
                            range: tr.range,
                            op,
                            input_tasks: input_tasks.clone(),
                            output_task,
                        });
                    }
                }
            }
        }

        t.subgroup = {
            let mut tasks: Vec<usize> = (0..count)
                .filter(|&task| !from.ranges_of(task).is_empty() || !to.ranges_of(task).is_empty())
                .collect();
            tasks.sort_unstable();
            tasks
        };

        Ok(t)
    }

    fn calc_repartition(&mut self, from: &Partitioning, to: &Partitioning, count: usize) {
        let dims = self.dims;

        // Local: from's and to's ranges for `me` that overlap need no movement.
        for f in from.ranges_of(self.me) {
            for tt in to.ranges_of(self.me) {
                if let Some(r) = f.range.intersect(dims, &tt.range) {
                    self.local.push(LocalOp { range: r });
                }
            }
        }

        // Send: my ranges in `from` that another task wants in `to`.
        for task in 0..count {
            if task == self.me {
                continue;
            }
            for f in from.ranges_of(self.me) {
                for tt in to.ranges_of(task) {
                    if let Some(r) = f.range.intersect(dims, &tt.range) {
                        self.send.push(SendOp { to_task: task, range: r });
                    }
                }
            }
        }

        // Recv: my ranges in `to` that another task owns in `from`.
        for task in 0..count {
            if task == self.me {
                continue;
            }
            for tt in to.ranges_of(self.me) {
                for f in from.ranges_of(task) {
                    if let Some(r) = tt.range.intersect(dims, &f.range) {
                        self.recv.push(RecvOp { from_task: task, range: r });
                    }
                }
            }
        }
    }
}

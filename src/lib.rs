//! A topology-aware rank remapping core.
//!
//! This crate implements the piece of a partitioned-index-space runtime
//! that decides *who talks to whom* and *where they should sit*: named
//! multi-dimensional index spaces and their partitionings ([`space`],
//! [`partitioning`]), the communication a transition between two
//! partitionings requires ([`transition`]), a running tally of that
//! communication ([`commmatrix`]), a model of the physical interconnect
//! ([`topology`]), and a heuristic that maps ranks onto locations to
//! minimize communication cost over distance ([`qap`], [`reorder`]).
//!
//! It does not move any bytes itself. Actual sends, receives, and
//! collectives are the job of whatever implements [`backend::Backend`]; this
//! crate only computes what should happen and how well a given rank
//! placement is likely to perform.
//!
//! # Example
//!
//! ```
//! use rankmesh::instance::{Group, Instance};
//! use rankmesh::partitioning::partitioner::Partitioner;
//! use rankmesh::partitioning::Filter;
//! use rankmesh::transition::{DataFlow, Transition};
//!
//! let mut inst = Instance::new(Group::new(4, 0));
//! let space = inst.create_space(1, [1000, 0, 0]);
//!
//! let striped = inst.create_partitioning(space, Partitioner::Stripe(0), None, Filter::none());
//! inst.run_partitioning(striped);
//! let all = inst.create_partitioning(space, Partitioner::All, None, Filter::none());
//! inst.run_partitioning(all);
//!
//! let tr = Transition::calculate(
//!     inst.partitioning(striped),
//!     inst.partitioning(all),
//!     DataFlow::CopyIn,
//!     None,
//!     0,
//! )
//! .unwrap();
//! assert!(!tr.sends().is_empty() || !tr.locals().is_empty());
//! ```

pub mod backend;
pub mod commmatrix;
pub mod config;
pub mod error;
pub mod index;
pub mod instance;
pub mod log;
pub mod partitioning;
pub mod qap;
pub mod reorder;
pub mod space;
pub mod testing;
pub mod topology;
pub mod transition;

pub use backend::{Backend, NullBackend};
pub use commmatrix::{CommMatrix, Symmetric};
pub use error::RankmeshError;
pub use index::{Index, Range};
pub use instance::{Group, Instance};
pub use partitioning::partitioner::Partitioner;
pub use partitioning::{Filter, Partitioning, PartitioningId, TaskRange};
pub use reorder::{Reordering, ReorderEnv};
pub use space::{Space, SpaceId};
pub use topology::{Topology, TopologyMatrix};
pub use transition::{DataFlow, ReductionOp, Transition};

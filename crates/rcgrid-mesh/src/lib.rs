//! Mesh topology, double-buffered grids, and row partitioning for rcgrid.
//!
//! # Architecture
//!
//! ```text
//! GridBuffers (double buffer)
//! ├── previous: SharedGrid   ←── read by every worker during a step
//! └── current:  SharedGrid   ←── written through one RowBand per worker
//!
//! PartitionTable
//! └── RowRange × N           ←── contiguous, disjoint, covering [0, rows-1]
//!
//! Grid                       ←── owned snapshot handed to sinks and tests
//! ```
//!
//! # Ownership model
//!
//! `SharedGrid` is shared by reference across threads without locks. Its
//! cells are [`VoltageCell`](rcgrid_core::VoltageCell)s, so no access is
//! ever undefined behaviour, but the *logical* correctness of a step
//! depends on two invariants that the type system does not express:
//!
//! 1. The partition table is complete and non-overlapping, so each node of
//!    `current` has exactly one writer per step. [`PartitionTable::verify`]
//!    checks this at construction and [`RowBand`] asserts it on every write.
//! 2. Writers and readers of a buffer are separated by the engine's
//!    barrier rendezvous, which provides the happens-before edge.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod buffer;
pub mod grid;
pub mod node;
pub mod partition;

pub use buffer::GridBuffers;
pub use grid::{Grid, RowBand, SharedGrid};
pub use node::{classify, EdgeSide, NodeClass};
pub use partition::{PartitionTable, RowRange};

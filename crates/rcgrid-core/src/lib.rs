//! Core types and traits for the rcgrid RC-mesh simulator.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the rest of the workspace: step and worker
//! identifiers, the RC element constants, the lock-free voltage cell,
//! error types, and the traits at the seams between the engine and its
//! collaborators (stencils, boundary sources, output sinks).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod constants;
pub mod error;
pub mod id;
pub mod traits;
pub mod voltage;

pub use constants::RcConstants;
pub use error::{ConstantsError, MeshError, SinkError};
pub use id::{StepId, WorkerId};
pub use traits::{BoundarySource, GridRead, OutputSink, Stencil};
pub use voltage::VoltageCell;

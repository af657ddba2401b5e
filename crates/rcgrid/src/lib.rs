//! rcgrid: a parallel simulator of voltage spreading through a mesh of
//! identical resistor-capacitor elements.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the rcgrid sub-crates. For most users, adding `rcgrid` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use rcgrid::prelude::*;
//!
//! // 4×4 mesh, one simulated step, two workers, 220 V on the corners.
//! let config = SimConfig::new(4, 4, 1, 2);
//! let report = StepController::new(config, ConstantSource(220.0), MemorySink::new())
//!     .unwrap()
//!     .run()
//!     .unwrap();
//!
//! // total_steps + 2 frames; frame 1 is the first computed step.
//! assert_eq!(report.sink.len(), 3);
//! let frame = report.sink.frame(StepId(1)).unwrap();
//! assert_eq!(frame.get(0, 1), Some(44.0));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `rcgrid-core` | IDs, RC constants, errors, core traits |
//! | [`mesh`] | `rcgrid-mesh` | Grids, double buffering, row partitioning |
//! | [`engine`] | `rcgrid-engine` | Controller, workers, barriers, sources, sinks |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`rcgrid-core`).
///
/// Contains [`types::RcConstants`], the error enums, and the seam traits
/// ([`types::GridRead`], [`types::Stencil`], [`types::BoundarySource`],
/// [`types::OutputSink`]).
pub use rcgrid_core as types;

/// Grids, buffers, and partitioning (`rcgrid-mesh`).
pub use rcgrid_mesh as mesh;

/// The stepping engine (`rcgrid-engine`).
///
/// [`engine::StepController`] runs a configured mesh on a worker pool or,
/// with [`engine::StepController::run_serial`], on the calling thread.
pub use rcgrid_engine as engine;

/// Common imports for typical rcgrid usage.
///
/// ```rust
/// use rcgrid::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use rcgrid_core::{
        BoundarySource, GridRead, OutputSink, RcConstants, StepId, Stencil, WorkerId,
    };

    // Errors
    pub use rcgrid_core::{ConstantsError, MeshError, SinkError};
    pub use rcgrid_engine::{ConfigError, LaunchError, RunError};

    // Mesh
    pub use rcgrid_mesh::{Grid, PartitionTable};

    // Engine
    pub use rcgrid_engine::{
        ConstantSource, FrozenSineSource, GnuplotScript, GnuplotTextSink, LastFrameSink,
        MemorySink, NullSink, RcStencil, RunMetrics, RunReport, SimConfig, SineSource,
        StepController, TableSource,
    };
}

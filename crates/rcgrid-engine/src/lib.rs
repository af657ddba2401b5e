//! Barrier-synchronised parallel time-stepping engine for rcgrid.
//!
//! A [`StepController`] owns a double-buffered grid and a fixed pool of
//! worker threads, one per row band. Every step follows the same
//! two-barrier protocol:
//!
//! ```text
//! Controller                         Workers (N)
//!     |  set boundary source             |
//!     |--- entry barrier (N+1) ----------|
//!     |                                  | read previous, write own band of current
//!     |--- exit barrier (N+1) -----------|
//!     |  sink.append(previous)           |
//!     |  previous <- current; clear      |  (blocked on next entry)
//!     v  next step                       v
//! ```
//!
//! The grid is never locked. Each worker writes only its band of
//! `current` and only reads `previous`; the controller touches the
//! buffers only between an exit barrier and the next entry barrier. The
//! result is bit-identical for every valid worker count.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod barrier;
pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod metrics;
pub mod serial;
pub mod sink;
pub mod source;
pub mod stencil;
pub mod worker;

pub use barrier::{Phase, StepBarriers, StepCycle};
pub use config::{ConfigError, SimConfig};
pub use context::SimulationContext;
pub use controller::{RunReport, StepController};
pub use error::{LaunchError, RunError};
pub use metrics::RunMetrics;
pub use sink::{GnuplotScript, GnuplotTextSink, LastFrameSink, MemorySink, NullSink};
pub use source::{ConstantSource, FrozenSineSource, SineSource, TableSource};
pub use stencil::{compute_band, RcStencil};

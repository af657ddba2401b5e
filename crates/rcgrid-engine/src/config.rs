//! Run configuration, validation, and error types.
//!
//! [`SimConfig`] is the builder-input for a [`StepController`](crate::StepController).
//! [`validate()`](SimConfig::validate) checks every structural invariant
//! before any buffer is allocated or any thread is spawned.

use std::error::Error;
use std::fmt;

use rcgrid_core::{ConstantsError, MeshError, RcConstants};
use rcgrid_mesh::PartitionTable;

/// Thread name prefix used when [`SimConfig::thread_name_prefix`] is left
/// at its default.
pub const DEFAULT_THREAD_PREFIX: &str = "rcgrid-worker";

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`SimConfig::validate()`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// Mesh shape or row partition is invalid.
    Mesh(MeshError),
    /// RC constants are invalid or unstable.
    Constants(ConstantsError),
    /// `total_steps + 2` iterations do not fit in a `u64`.
    IterationOverflow {
        /// The configured step count.
        total_steps: u64,
    },
    /// An explicit worker stack size of zero was requested.
    ZeroStackSize,
    /// The initial grid does not match the configured mesh shape.
    InitialShape {
        /// Configured `(rows, cols)`.
        expected: (usize, usize),
        /// Shape of the supplied grid.
        found: (usize, usize),
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mesh(e) => write!(f, "mesh: {e}"),
            Self::Constants(e) => write!(f, "constants: {e}"),
            Self::IterationOverflow { total_steps } => {
                write!(f, "total_steps {total_steps} leaves no room for the two extra iterations")
            }
            Self::ZeroStackSize => write!(f, "worker_stack_size must be non-zero"),
            Self::InitialShape { expected, found } => write!(
                f,
                "initial grid is {}x{}, mesh is {}x{}",
                found.0, found.1, expected.0, expected.1
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Mesh(e) => Some(e),
            Self::Constants(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MeshError> for ConfigError {
    fn from(e: MeshError) -> Self {
        Self::Mesh(e)
    }
}

impl From<ConstantsError> for ConfigError {
    fn from(e: ConstantsError) -> Self {
        Self::Constants(e)
    }
}

// ── SimConfig ──────────────────────────────────────────────────────

/// Complete configuration for one simulation run.
#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    /// Mesh row count. Must be a multiple of `workers`.
    pub rows: usize,
    /// Mesh column count.
    pub cols: usize,
    /// Number of simulated steps. The run performs `total_steps + 2`
    /// iterations and emits that many frames.
    pub total_steps: u64,
    /// Worker thread count. Default: 1.
    pub workers: usize,
    /// Physical constants of the mesh. Default: C = 1, R = 5, h = 1.
    pub constants: RcConstants,
    /// Prefix for worker thread names; the worker index is appended.
    pub thread_name_prefix: String,
    /// Explicit worker stack size in bytes. `None` uses the platform default.
    pub worker_stack_size: Option<usize>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            rows: 4,
            cols: 4,
            total_steps: 1,
            workers: 1,
            constants: RcConstants::default(),
            thread_name_prefix: DEFAULT_THREAD_PREFIX.to_string(),
            worker_stack_size: None,
        }
    }
}

impl SimConfig {
    /// A config for a `rows × cols` mesh run for `total_steps` steps on
    /// `workers` threads, with default constants.
    pub fn new(rows: usize, cols: usize, total_steps: u64, workers: usize) -> Self {
        Self {
            rows,
            cols,
            total_steps,
            workers,
            ..Self::default()
        }
    }

    /// Replace the RC constants.
    pub fn with_constants(mut self, constants: RcConstants) -> Self {
        self.constants = constants;
        self
    }

    /// Total controller iterations: `total_steps + 2`.
    ///
    /// Saturates; [`validate()`](Self::validate) rejects the overflowing case.
    pub fn iterations(&self) -> u64 {
        self.total_steps.saturating_add(2)
    }

    /// Build the row partition for this config.
    pub fn partition(&self) -> Result<PartitionTable, ConfigError> {
        Ok(PartitionTable::even(self.rows, self.workers)?)
    }

    /// Validate all structural invariants.
    ///
    /// Pure: allocates nothing but the partition table and logs nothing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Both dimensions non-zero and the node count addressable.
        if self.rows == 0 || self.cols == 0 {
            return Err(MeshError::EmptyMesh {
                rows: self.rows,
                cols: self.cols,
            }
            .into());
        }
        if self.rows.checked_mul(self.cols).is_none() {
            return Err(MeshError::CellCountOverflow {
                rows: self.rows,
                cols: self.cols,
            }
            .into());
        }
        // 2. Rows split evenly across workers.
        self.partition()?;
        // 3. Constants finite, positive, and inside the stability bound.
        self.constants.validate()?;
        // 4. Iteration count representable.
        if self.total_steps.checked_add(2).is_none() {
            return Err(ConfigError::IterationOverflow {
                total_steps: self.total_steps,
            });
        }
        if self.worker_stack_size == Some(0) {
            return Err(ConfigError::ZeroStackSize);
        }
        Ok(())
    }
}

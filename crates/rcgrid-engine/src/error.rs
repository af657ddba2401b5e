//! Errors raised while launching or running the worker pool.

use std::error::Error;
use std::fmt;

use rcgrid_core::{MeshError, SinkError, WorkerId};

use crate::config::ConfigError;

/// The worker pool could not be brought up.
///
/// When this is returned every worker that did start has already been
/// told to abort and has been joined. No step was executed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LaunchError {
    /// The OS refused to create a worker thread.
    Spawn {
        /// The worker that could not be started.
        worker: WorkerId,
        /// Rendered I/O error.
        reason: String,
    },
    /// A worker's row band could not be bound to the grid.
    Band(MeshError),
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn { worker, reason } => {
                write!(f, "failed to spawn worker {worker}: {reason}")
            }
            Self::Band(e) => write!(f, "row band: {e}"),
        }
    }
}

impl Error for LaunchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Band(e) => Some(e),
            Self::Spawn { .. } => None,
        }
    }
}

/// Errors returned by [`StepController::run()`](crate::StepController::run).
#[derive(Clone, Debug, PartialEq)]
pub enum RunError {
    /// The configuration failed validation.
    Config(ConfigError),
    /// The worker pool could not be launched.
    Launch(LaunchError),
    /// The output sink failed. The run still completed all iterations
    /// and joined all workers before reporting this.
    Sink(SinkError),
    /// A worker thread panicked and could not be joined cleanly.
    WorkerPanicked {
        /// The worker that panicked.
        worker: WorkerId,
    },
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Launch(e) => write!(f, "launch: {e}"),
            Self::Sink(e) => write!(f, "sink: {e}"),
            Self::WorkerPanicked { worker } => write!(f, "worker {worker} panicked"),
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Launch(e) => Some(e),
            Self::Sink(e) => Some(e),
            Self::WorkerPanicked { .. } => None,
        }
    }
}

impl From<ConfigError> for RunError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<LaunchError> for RunError {
    fn from(e: LaunchError) -> Self {
        Self::Launch(e)
    }
}

impl From<SinkError> for RunError {
    fn from(e: SinkError) -> Self {
        Self::Sink(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcgrid_core::StepId;

    #[test]
    fn spawn_error_names_worker() {
        let err = LaunchError::Spawn {
            worker: WorkerId(2),
            reason: "resource temporarily unavailable".into(),
        };
        assert!(err.to_string().contains("worker 2"));
        assert!(err.source().is_none());
    }

    #[test]
    fn run_error_chains_source() {
        let err = RunError::from(SinkError::Rejected {
            step: StepId(1),
            reason: "closed".into(),
        });
        assert!(err.to_string().starts_with("sink:"));
        assert!(err.source().is_some());
        let launch = RunError::from(LaunchError::Band(MeshError::ZeroWorkers));
        assert!(launch.source().unwrap().source().is_some());
    }
}

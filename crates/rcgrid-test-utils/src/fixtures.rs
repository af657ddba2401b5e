//! Protocol-observing fixtures.
//!
//! - [`TaggingStencil`]: writes the source voltage everywhere and checks
//!   that every read of `previous` sees one whole earlier step.
//! - [`RecordingSource`]: yields `step` as the voltage and logs each call.
//! - [`FailingSink`]: accepts N frames, then fails.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rcgrid_core::{BoundarySource, GridRead, OutputSink, SinkError, StepId, Stencil};
use rcgrid_mesh::Grid;

/// Stencil that tags every node with the step's source voltage.
///
/// Drive it with a source returning `step` as the voltage (see
/// [`RecordingSource`]). While computing step `k >= 1`, `previous` must
/// then hold `k - 1` at every node; at step 0 it holds the seeded mesh,
/// which is all zeros. Any other observation means a worker saw a grid
/// that was still being written or promoted, and is counted.
///
/// Each call scans the whole of `previous`; keep meshes small.
#[derive(Debug, Default)]
pub struct TaggingStencil {
    calls: AtomicUsize,
    violations: AtomicUsize,
}

impl TaggingStencil {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node updates performed.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Reads of `previous` that were not a single whole step.
    pub fn violations(&self) -> usize {
        self.violations.load(Ordering::SeqCst)
    }
}

impl Stencil for TaggingStencil {
    fn name(&self) -> &str {
        "tagging"
    }

    fn next_voltage(&self, previous: &dyn GridRead, _row: usize, _col: usize, source: f64) -> f64 {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let expected = if source == 0.0 { 0.0 } else { source - 1.0 };
        if previous.to_row_major().iter().any(|&v| v != expected) {
            self.violations.fetch_add(1, Ordering::SeqCst);
        }
        source
    }
}

/// Source that returns `step` as the voltage and logs every request.
#[derive(Clone, Debug, Default)]
pub struct RecordingSource {
    log: Arc<Mutex<Vec<StepId>>>,
}

impl RecordingSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the request log. Stays valid after the source is
    /// moved into a controller.
    pub fn log(&self) -> Arc<Mutex<Vec<StepId>>> {
        Arc::clone(&self.log)
    }
}

impl BoundarySource for RecordingSource {
    fn voltage(&mut self, step: StepId) -> f64 {
        if let Ok(mut log) = self.log.lock() {
            log.push(step);
        }
        step.0 as f64
    }
}

/// Sink that stores the first `fail_at` frames and rejects the next one.
///
/// Appends after the failure are counted in
/// [`appends_after_failure`](Self::appends_after_failure); a well-behaved
/// controller makes none.
#[derive(Debug)]
pub struct FailingSink {
    fail_at: usize,
    frames: Vec<(StepId, Grid)>,
    failed: bool,
    appends_after_failure: usize,
    finished: bool,
}

impl FailingSink {
    pub fn new(fail_at: usize) -> Self {
        Self {
            fail_at,
            frames: Vec::new(),
            failed: false,
            appends_after_failure: 0,
            finished: false,
        }
    }

    pub fn frames(&self) -> &[(StepId, Grid)] {
        &self.frames
    }

    pub fn appends_after_failure(&self) -> usize {
        self.appends_after_failure
    }

    pub fn finished(&self) -> bool {
        self.finished
    }
}

impl OutputSink for FailingSink {
    fn append(&mut self, step: StepId, snapshot: &dyn GridRead) -> Result<(), SinkError> {
        if self.failed {
            self.appends_after_failure += 1;
            return Err(SinkError::Rejected {
                step,
                reason: "already failed".into(),
            });
        }
        if self.frames.len() == self.fail_at {
            self.failed = true;
            return Err(SinkError::Io {
                step,
                reason: "disk full".into(),
            });
        }
        self.frames.push((step, Grid::capture(snapshot)));
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.finished = true;
        Ok(())
    }
}

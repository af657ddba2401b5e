//! Whole-run performance metrics.
//!
//! [`RunMetrics`] is filled in by the controller as the run proceeds and
//! returned in the [`RunReport`](crate::RunReport).

use std::time::Duration;

/// Timing and progress counters for one run.
///
/// All durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunMetrics {
    /// Wall-clock time from launch to the last worker joined, in microseconds.
    pub total_us: u64,
    /// Time the controller spent blocked at the exit barrier, summed over
    /// all steps. Approximates the parallel compute time, in microseconds.
    pub compute_wait_us: u64,
    /// Time spent in the controller-exclusive window (sink append plus
    /// buffer promotion), summed over all steps, in microseconds.
    pub exclusive_us: u64,
    /// Time spent inside [`OutputSink::append`](rcgrid_core::OutputSink::append), in microseconds.
    pub sink_us: u64,
    /// Controller iterations executed.
    pub iterations: u64,
    /// Frames the sink accepted.
    pub frames_emitted: u64,
    /// Worker threads used. Zero for the serial runner.
    pub workers: usize,
}

impl RunMetrics {
    /// Mean wall-clock time per iteration, in microseconds.
    pub fn mean_iteration_us(&self) -> f64 {
        if self.iterations == 0 {
            0.0
        } else {
            self.total_us as f64 / self.iterations as f64
        }
    }

    /// `total_us` as a [`Duration`].
    pub fn elapsed(&self) -> Duration {
        Duration::from_micros(self.total_us)
    }
}

pub(crate) fn micros(d: Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}

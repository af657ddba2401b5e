//! Single-threaded reference runner.
//!
//! Runs the same iteration schedule as [`StepController::run()`] with the
//! whole mesh as one band on the calling thread and no barriers. Parallel
//! runs must reproduce its frames bit for bit.

use std::time::Instant;

use rcgrid_core::{BoundarySource, OutputSink, StepId, WorkerId};
use rcgrid_mesh::RowRange;
use tracing::{info, trace};

use crate::config::ConfigError;
use crate::controller::{log_start, seed, FrameOutput, RunReport, StepController};
use crate::error::RunError;
use crate::metrics::{micros, RunMetrics};
use crate::stencil::compute_band;

impl<B: BoundarySource, S: OutputSink> StepController<B, S> {
    /// Run every step on the calling thread.
    ///
    /// `config.workers` is ignored beyond validation. A stencil panic
    /// propagates to the caller.
    ///
    /// # Errors
    ///
    /// [`RunError::Sink`] if the sink failed; the run still completed.
    pub fn run_serial(mut self) -> Result<RunReport<S>, RunError> {
        let start = Instant::now();
        let (context, buffers) = seed(&self.config, self.initial.take(), &mut self.source)?;
        log_start(&self.config, &*self.stencil, 0);

        let whole = RowRange {
            worker: WorkerId(0),
            from: 0,
            to: self.config.rows - 1,
        };
        let band = buffers.current_band(whole).map_err(ConfigError::from)?;
        let mut output = FrameOutput::new(self.sink);
        let mut metrics = RunMetrics::default();
        for k in 0..context.iterations() {
            let step = StepId(k);
            if k > 0 {
                context.set_source_voltage(self.source.voltage(step));
            }
            let compute = Instant::now();
            compute_band(&*self.stencil, buffers.previous(), &band, context.source_voltage());
            metrics.compute_wait_us += micros(compute.elapsed());

            let exclusive = Instant::now();
            output.emit(step, buffers.previous());
            buffers.promote();
            metrics.exclusive_us += micros(exclusive.elapsed());
            metrics.iterations += 1;
            trace!(%step, "serial step complete");
        }

        let final_grid = buffers.previous().snapshot();
        metrics.total_us = micros(start.elapsed());
        let sink = output.finish(&mut metrics)?;
        info!(
            iterations = metrics.iterations,
            total_us = metrics.total_us,
            "serial run complete"
        );
        Ok(RunReport {
            sink,
            metrics,
            final_grid,
            workers: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::config::SimConfig;
    use crate::controller::StepController;
    use crate::sink::MemorySink;
    use crate::source::ConstantSource;
    use rcgrid_core::{GridRead, StepId};

    #[test]
    fn serial_emits_total_steps_plus_two_frames() {
        let report = StepController::new(SimConfig::new(4, 4, 3, 1), ConstantSource(220.0), MemorySink::new())
            .unwrap()
            .run_serial()
            .unwrap();
        assert_eq!(report.sink.len(), 5);
        assert_eq!(report.metrics.workers, 0);
        assert!(report.workers.is_empty());
        let steps: Vec<StepId> = report.sink.frames().iter().map(|(s, _)| *s).collect();
        assert_eq!(steps, (0..5).map(StepId).collect::<Vec<_>>());
    }

    #[test]
    fn serial_first_step_charges_edges() {
        let report = StepController::new(SimConfig::new(4, 4, 1, 1), ConstantSource(220.0), MemorySink::new())
            .unwrap()
            .run_serial()
            .unwrap();
        let f1 = report.sink.frame(StepId(1)).unwrap();
        assert_eq!(f1.get(0, 1), Some(44.0));
        assert_eq!(f1.get(1, 1), Some(0.0));
        assert_eq!(f1.corners(), [220.0; 4]);
    }

    #[test]
    fn serial_ignores_worker_count_after_validation() {
        let a = StepController::new(SimConfig::new(4, 3, 4, 1), ConstantSource(5.0), MemorySink::new())
            .unwrap()
            .run_serial()
            .unwrap();
        let b = StepController::new(SimConfig::new(4, 3, 4, 4), ConstantSource(5.0), MemorySink::new())
            .unwrap()
            .run_serial()
            .unwrap();
        assert_eq!(a.final_grid, b.final_grid);
    }
}

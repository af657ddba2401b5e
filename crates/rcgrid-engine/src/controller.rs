//! The step controller: owns the run and drives the lockstep protocol.
//!
//! Per iteration `k` in `0..total_steps + 2` the controller:
//!
//! 1. sets the boundary source to `source.voltage(k)` (step 0's value is
//!    applied while seeding, before launch);
//! 2. releases the workers through the entry barrier;
//! 3. waits at the exit barrier;
//! 4. hands `previous` to the sink as frame `k`;
//! 5. promotes `current` into `previous` and clears `current`.
//!
//! Frame `k` is therefore the state computed in iteration `k - 1`, and
//! frame 0 is the seeded initial state. Corners of frame `k >= 1` carry
//! `source.voltage(k - 1)`.
//!
//! # Sink failures
//!
//! The first sink error disables further appends. The protocol still
//! runs to completion and every worker is joined before the error is
//! returned, so a failing sink never strands a thread at a barrier.
//!
//! A panic in the boundary source or the sink faults the run instead. The
//! controller passes one more barrier pair so the waiting workers see the
//! fault and exit, joins them, and then resumes the panic.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use rcgrid_core::{BoundarySource, GridRead, OutputSink, SinkError, StepId, Stencil};
use rcgrid_mesh::{Grid, GridBuffers};
use tracing::{debug, error, info, trace, warn};

use crate::barrier::StepCycle;
use crate::config::{ConfigError, SimConfig};
use crate::context::SimulationContext;
use crate::error::RunError;
use crate::metrics::{micros, RunMetrics};
use crate::stencil::RcStencil;
use crate::worker::{OsSpawner, SharedRun, SpawnWorker, WorkerPool, WorkerReport};

/// Outcome of a completed run.
#[derive(Debug)]
pub struct RunReport<S> {
    /// The sink, returned after [`OutputSink::finish`].
    pub sink: S,
    /// Timing and progress counters.
    pub metrics: RunMetrics,
    /// State computed by the last iteration. One step past the last
    /// frame handed to the sink.
    pub final_grid: Grid,
    /// Per-worker reports, in worker order. Empty for serial runs.
    pub workers: Vec<WorkerReport>,
}

/// Owns a validated configuration, a boundary source, a stencil, and an
/// output sink, and runs them to completion.
pub struct StepController<B, S> {
    pub(crate) config: SimConfig,
    pub(crate) source: B,
    pub(crate) sink: S,
    pub(crate) stencil: Arc<dyn Stencil>,
    pub(crate) initial: Option<Grid>,
}

impl<B: BoundarySource, S: OutputSink> StepController<B, S> {
    /// Validate `config` and build a controller using [`RcStencil`].
    pub fn new(config: SimConfig, source: B, sink: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let stencil: Arc<dyn Stencil> = Arc::new(RcStencil::new(config.constants));
        Ok(Self {
            config,
            source,
            sink,
            stencil,
            initial: None,
        })
    }

    /// Replace the stencil.
    pub fn with_stencil(mut self, stencil: Arc<dyn Stencil>) -> Self {
        self.stencil = stencil;
        self
    }

    /// Start from `initial` instead of an all-zero mesh. Corners are
    /// still overwritten with the step-0 source voltage.
    pub fn with_initial(mut self, initial: Grid) -> Result<Self, ConfigError> {
        let expected = (self.config.rows, self.config.cols);
        if initial.shape() != expected {
            return Err(ConfigError::InitialShape {
                expected,
                found: initial.shape(),
            });
        }
        self.initial = Some(initial);
        Ok(self)
    }

    /// The validated configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Run on `config.workers` threads.
    ///
    /// # Errors
    ///
    /// - [`RunError::Launch`] if a worker cannot be spawned. Nothing was
    ///   computed and the sink was never called.
    /// - [`RunError::WorkerPanicked`] if the stencil panicked. The run
    ///   stops after the faulted step.
    /// - [`RunError::Sink`] if the sink failed. The run completed.
    ///
    /// # Panics
    ///
    /// Resumes a panic raised by the boundary source or the sink, after
    /// every worker has been joined.
    pub fn run(self) -> Result<RunReport<S>, RunError> {
        self.run_with(&mut OsSpawner)
    }

    pub(crate) fn run_with(mut self, spawner: &mut dyn SpawnWorker) -> Result<RunReport<S>, RunError> {
        let start = Instant::now();
        let table = self.config.partition()?;
        let (context, buffers) = seed(&self.config, self.initial.take(), &mut self.source)?;
        log_start(&self.config, &*self.stencil, table.worker_count());

        let run = Arc::new(SharedRun::new(
            context,
            buffers,
            table.worker_count(),
            Arc::clone(&self.stencil),
        ));
        let pool = WorkerPool::launch(&run, &table, &self.config, spawner)?;

        let mut output = FrameOutput::new(self.sink);
        let mut metrics = RunMetrics {
            workers: table.worker_count(),
            ..RunMetrics::default()
        };
        let mut cycle = StepCycle::new(&run.barriers);
        for k in 0..run.context.iterations() {
            let step = StepId(k);
            if k > 0 {
                match panic::catch_unwind(AssertUnwindSafe(|| self.source.voltage(step))) {
                    Ok(voltage) => run.context.set_source_voltage(voltage),
                    Err(payload) => abandon(&run, pool, k, payload),
                }
            }
            cycle.release();
            let waited = Instant::now();
            cycle.await_exit();
            metrics.compute_wait_us += micros(waited.elapsed());
            if run.is_faulted() {
                warn!(%step, "worker fault, stopping run");
                break;
            }

            let exclusive = Instant::now();
            let emitted =
                panic::catch_unwind(AssertUnwindSafe(|| output.emit(step, run.buffers.previous())));
            if let Err(payload) = emitted {
                abandon(&run, pool, k + 1, payload);
            }
            run.buffers.promote();
            cycle.finish_step();
            metrics.exclusive_us += micros(exclusive.elapsed());
            metrics.iterations += 1;
            trace!(%step, "step complete");
        }

        let workers = pool.join()?;
        let final_grid = run.buffers.previous().snapshot();
        metrics.total_us = micros(start.elapsed());
        let sink = output.finish(&mut metrics)?;
        info!(
            iterations = metrics.iterations,
            frames = metrics.frames_emitted,
            total_us = metrics.total_us,
            "run complete"
        );
        Ok(RunReport {
            sink,
            metrics,
            final_grid,
            workers,
        })
    }
}

/// Leave the step loop on a source or sink panic without stranding a
/// worker, then resume the panic.
///
/// `next` is the iteration the workers are blocked on. If they still have
/// one to run, one barrier pair carries the fault to them.
fn abandon(run: &SharedRun, pool: WorkerPool, next: u64, payload: Box<dyn Any + Send>) -> ! {
    error!(step = next, "source or sink panicked, stopping workers");
    run.fault();
    if next < run.context.iterations() {
        run.barriers.wait_entry();
        run.barriers.wait_exit();
    }
    if let Err(e) = pool.join() {
        error!(error = %e, "worker failed while stopping");
    }
    panic::resume_unwind(payload)
}

/// Build the context and buffers, applying the step-0 source voltage.
pub(crate) fn seed<B: BoundarySource>(
    config: &SimConfig,
    initial: Option<Grid>,
    source: &mut B,
) -> Result<(SimulationContext, GridBuffers), ConfigError> {
    let context = SimulationContext::new(config);
    let v0 = source.voltage(StepId(0));
    context.set_source_voltage(v0);
    let buffers = match initial {
        Some(grid) => GridBuffers::from_initial(&grid),
        None => GridBuffers::zeros(config.rows, config.cols)?,
    };
    buffers.seed_corners(v0);
    Ok((context, buffers))
}

pub(crate) fn log_start(config: &SimConfig, stencil: &dyn Stencil, workers: usize) {
    info!(
        rows = config.rows,
        cols = config.cols,
        total_steps = config.total_steps,
        workers,
        stencil = stencil.name(),
        "starting run"
    );
    if !config.constants.is_oscillation_free() {
        warn!(
            ratio = config.constants.stability_ratio(),
            "4h/(C*R) above 1, node voltages will oscillate"
        );
    }
}

/// Sink wrapper that applies the first-error-wins policy.
pub(crate) struct FrameOutput<S> {
    sink: S,
    failed: Option<SinkError>,
    frames: u64,
    sink_us: u64,
}

impl<S: OutputSink> FrameOutput<S> {
    pub(crate) fn new(sink: S) -> Self {
        Self {
            sink,
            failed: None,
            frames: 0,
            sink_us: 0,
        }
    }

    /// Offer frame `step`. Ignored once the sink has failed.
    pub(crate) fn emit(&mut self, step: StepId, snapshot: &dyn GridRead) {
        if self.failed.is_some() {
            return;
        }
        let t = Instant::now();
        match self.sink.append(step, snapshot) {
            Ok(()) => self.frames += 1,
            Err(e) => {
                warn!(%step, error = %e, "sink failed, dropping remaining frames");
                self.failed = Some(e);
            }
        }
        self.sink_us += micros(t.elapsed());
    }

    /// Flush the sink and fold its counters into `metrics`.
    pub(crate) fn finish(mut self, metrics: &mut RunMetrics) -> Result<S, SinkError> {
        metrics.frames_emitted = self.frames;
        metrics.sink_us = self.sink_us;
        if let Some(e) = self.failed {
            return Err(e);
        }
        self.sink.finish()?;
        debug!(frames = self.frames, "sink finished");
        Ok(self.sink)
    }
}

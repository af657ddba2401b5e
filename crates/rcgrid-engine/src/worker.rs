//! The fixed worker pool.
//!
//! One long-lived thread per row band. Each worker:
//!
//! 1. Blocks on the launch gate until the whole pool is up. If the gate
//!    closes without a start signal it returns at once, never having
//!    touched a barrier.
//! 2. Runs exactly `total_steps + 2` cycles of: entry barrier, compute
//!    its band of `current` from `previous`, exit barrier.
//! 3. Returns a [`WorkerReport`] through its join handle.
//!
//! A stencil panic is caught inside the compute phase. The worker marks
//! the run faulted and still arrives at the exit barrier, so no party is
//! left waiting; every party then observes the fault after the exit
//! barrier and stops. The controller faults the run the same way when its
//! own source or sink panics.

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use rcgrid_core::{Stencil, WorkerId};
use rcgrid_mesh::{GridBuffers, PartitionTable, RowRange};
use tracing::{debug, error};

use crate::barrier::StepBarriers;
use crate::config::SimConfig;
use crate::context::SimulationContext;
use crate::error::{LaunchError, RunError};
use crate::stencil::compute_band;

/// State shared by the controller and every worker for one run.
pub(crate) struct SharedRun {
    pub(crate) context: SimulationContext,
    pub(crate) buffers: GridBuffers,
    pub(crate) barriers: StepBarriers,
    pub(crate) stencil: Arc<dyn Stencil>,
    faulted: AtomicBool,
}

impl SharedRun {
    pub(crate) fn new(
        context: SimulationContext,
        buffers: GridBuffers,
        workers: usize,
        stencil: Arc<dyn Stencil>,
    ) -> Self {
        Self {
            context,
            buffers,
            barriers: StepBarriers::new(workers),
            stencil,
            faulted: AtomicBool::new(false),
        }
    }

    /// Whether the run has faulted. Stable between an exit barrier and the
    /// next entry barrier.
    pub(crate) fn is_faulted(&self) -> bool {
        self.faulted.load(Ordering::Acquire)
    }

    /// Mark the run faulted. Every party stops after the next exit barrier.
    pub(crate) fn fault(&self) {
        self.faulted.store(true, Ordering::Release);
    }
}

/// What a worker did, returned through its join handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkerReport {
    /// The worker.
    pub worker: WorkerId,
    /// Rows it owned.
    pub range: RowRange,
    /// Compute cycles it completed.
    pub cycles: u64,
    /// Whether its compute phase panicked.
    pub panicked: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LaunchSignal {
    Start,
}

type WorkerBody = Box<dyn FnOnce() -> WorkerReport + Send>;

/// Brings worker threads up. Abstracted so tests can refuse a spawn.
pub(crate) trait SpawnWorker {
    fn spawn(
        &mut self,
        worker: WorkerId,
        builder: thread::Builder,
        body: WorkerBody,
    ) -> io::Result<JoinHandle<WorkerReport>>;
}

/// Spawns real OS threads.
pub(crate) struct OsSpawner;

impl SpawnWorker for OsSpawner {
    fn spawn(
        &mut self,
        _worker: WorkerId,
        builder: thread::Builder,
        body: WorkerBody,
    ) -> io::Result<JoinHandle<WorkerReport>> {
        builder.spawn(body)
    }
}

/// Running workers, started and waiting on the barriers.
pub(crate) struct WorkerPool {
    handles: Vec<(WorkerId, JoinHandle<WorkerReport>)>,
}

impl WorkerPool {
    /// Spawn one worker per partition range, then open the launch gate.
    ///
    /// If any spawn fails, the gate is closed instead, every worker that
    /// did start is joined, and the error is returned. No barrier has
    /// been entered at that point.
    pub(crate) fn launch(
        run: &Arc<SharedRun>,
        table: &PartitionTable,
        config: &SimConfig,
        spawner: &mut dyn SpawnWorker,
    ) -> Result<Self, LaunchError> {
        for range in table.ranges() {
            run.buffers.current_band(*range).map_err(LaunchError::Band)?;
        }

        let (gate_tx, gate_rx) = crossbeam_channel::unbounded();
        let mut handles = Vec::with_capacity(table.worker_count());
        for range in table.ranges().iter().copied() {
            let mut builder =
                thread::Builder::new().name(format!("{}-{}", config.thread_name_prefix, range.worker));
            if let Some(size) = config.worker_stack_size {
                builder = builder.stack_size(size);
            }
            let shared = Arc::clone(run);
            let gate = gate_rx.clone();
            let body: WorkerBody = Box::new(move || worker_loop(shared, range, gate));
            match spawner.spawn(range.worker, builder, body) {
                Ok(handle) => handles.push((range.worker, handle)),
                Err(e) => {
                    error!(worker = %range.worker, error = %e, "worker spawn failed, aborting launch");
                    abort(gate_tx, handles);
                    return Err(LaunchError::Spawn {
                        worker: range.worker,
                        reason: e.to_string(),
                    });
                }
            }
        }
        open_gate(&gate_tx, handles.len());
        debug!(workers = handles.len(), "worker pool launched");
        Ok(Self { handles })
    }

    /// Join every worker, even after one has failed.
    pub(crate) fn join(self) -> Result<Vec<WorkerReport>, RunError> {
        let mut reports = Vec::with_capacity(self.handles.len());
        let mut failure = None;
        for (worker, handle) in self.handles {
            match handle.join() {
                Ok(report) => {
                    if report.panicked {
                        failure.get_or_insert(RunError::WorkerPanicked { worker });
                    }
                    reports.push(report);
                }
                Err(_) => {
                    error!(%worker, "worker thread panicked outside its compute phase");
                    failure.get_or_insert(RunError::WorkerPanicked { worker });
                }
            }
        }
        match failure {
            Some(e) => Err(e),
            None => Ok(reports),
        }
    }
}

fn open_gate(gate: &Sender<LaunchSignal>, workers: usize) {
    for _ in 0..workers {
        // Receivers outlive this call: every worker holds one until it
        // has taken its signal.
        let _ = gate.send(LaunchSignal::Start);
    }
}

fn abort(gate: Sender<LaunchSignal>, started: Vec<(WorkerId, JoinHandle<WorkerReport>)>) {
    drop(gate);
    for (worker, handle) in started {
        if handle.join().is_err() {
            error!(%worker, "aborted worker panicked during join");
        }
    }
}

fn worker_loop(run: Arc<SharedRun>, range: RowRange, gate: Receiver<LaunchSignal>) -> WorkerReport {
    let mut report = WorkerReport {
        worker: range.worker,
        range,
        cycles: 0,
        panicked: false,
    };
    if gate.recv() != Ok(LaunchSignal::Start) {
        debug!(worker = %range.worker, "launch aborted before start");
        return report;
    }
    drop(gate);

    let band = run
        .buffers
        .current_band(range)
        .expect("row band validated at launch");
    let stencil = &*run.stencil;
    let previous = run.buffers.previous();
    debug!(worker = %range.worker, from = range.from, to = range.to, "worker started");

    for _ in 0..run.context.iterations() {
        run.barriers.wait_entry();
        if !report.panicked {
            let source = run.context.source_voltage();
            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| compute_band(stencil, previous, &band, source)));
            if outcome.is_err() {
                error!(worker = %range.worker, stencil = stencil.name(), "stencil panicked, faulting run");
                report.panicked = true;
                run.fault();
            }
        }
        run.barriers.wait_exit();
        if run.is_faulted() {
            break;
        }
        report.cycles += 1;
    }
    debug!(worker = %range.worker, cycles = report.cycles, "worker finished");
    report
}

//! The two-barrier lockstep protocol.
//!
//! [`StepBarriers`] holds the entry and exit barriers, each sized for
//! `workers + 1` parties (every worker plus the controller). One step is
//! a fixed cycle of [`Phase`]s:
//!
//! ```text
//! AwaitEntry ──entry──▶ Computing ──▶ AwaitExit ──exit──▶ ControllerExclusive
//!     ▲                                                          │
//!     └──────────────────────────── next step ◀─────────────────┘
//! ```
//!
//! Only during `ControllerExclusive` (and before the first entry) may the
//! controller touch the grid buffers or the boundary source. During
//! `Computing` workers read `previous` and write their own bands of
//! `current`. Between the exit barrier and the next entry barrier no
//! worker touches the grid.
//!
//! [`StepCycle`] is the controller's handle on the protocol; it checks the
//! transition order so a misordered call is caught at the call site.

use std::fmt;
use std::sync::Barrier;

use rcgrid_core::StepId;

/// Where the controller is within one step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Preparing the step; next action is the entry barrier.
    AwaitEntry,
    /// Workers are released and computing.
    Computing,
    /// Waiting at the exit barrier.
    AwaitExit,
    /// All workers are parked; the controller owns the grid.
    ControllerExclusive,
}

impl Phase {
    /// The phase that follows `self` in the step cycle.
    pub fn next(self) -> Self {
        match self {
            Self::AwaitEntry => Self::Computing,
            Self::Computing => Self::AwaitExit,
            Self::AwaitExit => Self::ControllerExclusive,
            Self::ControllerExclusive => Self::AwaitEntry,
        }
    }

    /// Whether the controller may mutate shared state in this phase.
    pub fn controller_owns_grid(self) -> bool {
        matches!(self, Self::AwaitEntry | Self::ControllerExclusive)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AwaitEntry => "await-entry",
            Self::Computing => "computing",
            Self::AwaitExit => "await-exit",
            Self::ControllerExclusive => "controller-exclusive",
        };
        f.write_str(name)
    }
}

/// Entry and exit barriers shared by the controller and all workers.
pub struct StepBarriers {
    entry: Barrier,
    exit: Barrier,
    parties: usize,
}

impl StepBarriers {
    /// Barriers for `workers` workers plus the controller.
    pub fn new(workers: usize) -> Self {
        let parties = workers + 1;
        Self {
            entry: Barrier::new(parties),
            exit: Barrier::new(parties),
            parties,
        }
    }

    /// Participants per barrier: workers + 1.
    pub fn parties(&self) -> usize {
        self.parties
    }

    /// Block until every party has reached the entry barrier.
    pub fn wait_entry(&self) {
        self.entry.wait();
    }

    /// Block until every party has reached the exit barrier.
    pub fn wait_exit(&self) {
        self.exit.wait();
    }
}

impl fmt::Debug for StepBarriers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepBarriers")
            .field("parties", &self.parties)
            .finish_non_exhaustive()
    }
}

/// Controller-side driver of the step cycle.
#[derive(Debug)]
pub struct StepCycle<'b> {
    barriers: &'b StepBarriers,
    phase: Phase,
    step: StepId,
}

impl<'b> StepCycle<'b> {
    /// Start at step 0 in [`Phase::AwaitEntry`].
    pub fn new(barriers: &'b StepBarriers) -> Self {
        Self {
            barriers,
            phase: Phase::AwaitEntry,
            step: StepId(0),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Step in progress.
    pub fn step(&self) -> StepId {
        self.step
    }

    fn advance(&mut self, expected: Phase) {
        assert_eq!(
            self.phase, expected,
            "step {} protocol violation: expected {expected}, in {}",
            self.step, self.phase
        );
        self.phase = self.phase.next();
    }

    /// Release the workers for this step (entry barrier).
    ///
    /// # Panics
    ///
    /// If not in [`Phase::AwaitEntry`].
    pub fn release(&mut self) {
        self.advance(Phase::AwaitEntry);
        self.barriers.wait_entry();
    }

    /// Wait for every worker to finish this step (exit barrier). On
    /// return the controller holds exclusive access to the grid.
    ///
    /// # Panics
    ///
    /// If not in [`Phase::Computing`].
    pub fn await_exit(&mut self) {
        self.advance(Phase::Computing);
        self.barriers.wait_exit();
        self.phase = self.phase.next();
    }

    /// Close the exclusive window and move on to the next step.
    ///
    /// # Panics
    ///
    /// If not in [`Phase::ControllerExclusive`].
    pub fn finish_step(&mut self) {
        self.advance(Phase::ControllerExclusive);
        self.step = self.step.next();
    }
}

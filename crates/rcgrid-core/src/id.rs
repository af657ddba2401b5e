//! Strongly-typed identifiers for steps and workers.

use std::fmt;

/// Index of one controller iteration.
///
/// Step `0` is the priming iteration. The snapshot emitted at step `k`
/// holds the grid computed during step `k - 1` (snapshot lag), so step
/// `0` always emits the seeded initial state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct StepId(pub u64);

impl StepId {
    /// The step after this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// The step index as a `usize`, for indexing frame lists.
    ///
    /// Saturates on targets where `usize` is narrower than `u64`.
    pub fn as_index(self) -> usize {
        usize::try_from(self.0).unwrap_or(usize::MAX)
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for StepId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Identifies one worker thread in the pool.
///
/// Workers are numbered `0..worker_count` in partition order: worker `n`
/// owns the `n`-th row band.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(pub u32);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for WorkerId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

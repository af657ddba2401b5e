//! Benchmark profiles for the rcgrid mesh simulator.
//!
//! - [`reference_profile`]: 64×64 mesh, 100 steps.
//! - [`stress_profile`]: 512×512 mesh, 20 steps.
//! - [`worker_counts`]: the worker counts worth sweeping for a profile.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rcgrid_core::RcConstants;
use rcgrid_engine::SimConfig;

/// 64×64 mesh (4K nodes), 100 steps, default constants.
pub fn reference_profile(workers: usize) -> SimConfig {
    SimConfig::new(64, 64, 100, workers).with_constants(RcConstants::default())
}

/// 512×512 mesh (~262K nodes), 20 steps, default constants.
pub fn stress_profile(workers: usize) -> SimConfig {
    SimConfig::new(512, 512, 20, workers)
}

/// Powers of two that divide `rows`, capped at the machine's parallelism
/// (at least 1 and never above 16).
pub fn worker_counts(rows: usize) -> Vec<usize> {
    let cap = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
        .clamp(1, 16);
    let mut out = Vec::new();
    let mut n = 1;
    while n <= cap && n <= rows {
        if rows % n == 0 {
            out.push(n);
        }
        n *= 2;
    }
    out
}

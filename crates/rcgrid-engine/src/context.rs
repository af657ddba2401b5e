//! Read-mostly run state shared by the controller and every worker.

use rcgrid_core::{RcConstants, VoltageCell};

use crate::config::SimConfig;

/// Mesh dimensions, constants, step count, and the current boundary
/// source voltage.
///
/// Everything except the source voltage is fixed at construction. The
/// source is written only by the controller, while it holds exclusive
/// access between an exit barrier and the next entry barrier, and read
/// by workers during the compute phase.
#[derive(Debug)]
pub struct SimulationContext {
    rows: usize,
    cols: usize,
    total_steps: u64,
    constants: RcConstants,
    source: VoltageCell,
}

impl SimulationContext {
    /// Build a context from a validated config. The source starts at 0 V.
    pub fn new(config: &SimConfig) -> Self {
        Self {
            rows: config.rows,
            cols: config.cols,
            total_steps: config.total_steps,
            constants: config.constants,
            source: VoltageCell::default(),
        }
    }

    /// Mesh row count.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Mesh column count.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Configured number of simulated steps.
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Iterations the protocol runs: `total_steps + 2`.
    pub fn iterations(&self) -> u64 {
        self.total_steps.saturating_add(2)
    }

    /// Physical constants.
    pub fn constants(&self) -> &RcConstants {
        &self.constants
    }

    /// Boundary source voltage of the step in progress.
    pub fn source_voltage(&self) -> f64 {
        self.source.get()
    }

    pub(crate) fn set_source_voltage(&self, voltage: f64) {
        self.source.set(voltage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_mirrors_config() {
        let ctx = SimulationContext::new(&SimConfig::new(6, 3, 10, 2));
        assert_eq!(ctx.rows(), 6);
        assert_eq!(ctx.cols(), 3);
        assert_eq!(ctx.total_steps(), 10);
        assert_eq!(ctx.iterations(), 12);
        assert_eq!(ctx.constants(), &RcConstants::default());
        assert_eq!(ctx.source_voltage(), 0.0);
    }

    #[test]
    fn source_voltage_is_settable() {
        let ctx = SimulationContext::new(&SimConfig::default());
        ctx.set_source_voltage(220.0);
        assert_eq!(ctx.source_voltage(), 220.0);
    }
}

//! Stock boundary sources.
//!
//! Any `FnMut(StepId) -> f64 + Send` closure is also a
//! [`BoundarySource`]; the types here cover the common drives and give
//! them names in logs and on the command line.

use rcgrid_core::{BoundarySource, StepId};

/// The same voltage at every step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantSource(pub f64);

impl BoundarySource for ConstantSource {
    fn voltage(&mut self, _step: StepId) -> f64 {
        self.0
    }
}

/// `amplitude · sin(omega · step + phase)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SineSource {
    /// Peak voltage.
    pub amplitude: f64,
    /// Angular advance per step, in radians.
    pub omega: f64,
    /// Phase at step 0, in radians.
    pub phase: f64,
}

impl SineSource {
    /// Zero-phase sine of the given amplitude and angular step.
    pub fn new(amplitude: f64, omega: f64) -> Self {
        Self {
            amplitude,
            omega,
            phase: 0.0,
        }
    }
}

impl BoundarySource for SineSource {
    fn voltage(&mut self, step: StepId) -> f64 {
        self.amplitude * (self.omega * step.0 as f64 + self.phase).sin()
    }
}

/// `sin(total_steps)` held for the whole run.
///
/// The sine is evaluated once, at the final simulated time, and then
/// applied unchanged at every step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrozenSineSource {
    value: f64,
}

impl FrozenSineSource {
    /// Freeze `sin(total_steps)`.
    pub fn new(total_steps: u64) -> Self {
        Self {
            value: (total_steps as f64).sin(),
        }
    }

    /// The frozen voltage.
    pub fn value(&self) -> f64 {
        self.value
    }
}

impl BoundarySource for FrozenSineSource {
    fn voltage(&mut self, _step: StepId) -> f64 {
        self.value
    }
}

/// Per-step voltages from a table; the last entry is held once the
/// table runs out. An empty table drives 0 V.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableSource {
    values: Vec<f64>,
}

impl TableSource {
    /// Source that yields `values[k]` at step `k`.
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }
}

impl BoundarySource for TableSource {
    fn voltage(&mut self, step: StepId) -> f64 {
        self.values
            .get(step.as_index())
            .or_else(|| self.values.last())
            .copied()
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_source_is_constant() {
        let mut s = ConstantSource(220.0);
        assert_eq!(s.voltage(StepId(0)), 220.0);
        assert_eq!(s.voltage(StepId(1_000)), 220.0);
    }

    #[test]
    fn sine_source_follows_step() {
        let mut s = SineSource::new(2.0, std::f64::consts::FRAC_PI_2);
        assert_eq!(s.voltage(StepId(0)), 0.0);
        assert!((s.voltage(StepId(1)) - 2.0).abs() < 1e-12);
        assert!(s.voltage(StepId(2)).abs() < 1e-12);
        assert!((s.voltage(StepId(3)) + 2.0).abs() < 1e-12);
    }

    #[test]
    fn frozen_sine_ignores_step() {
        let mut s = FrozenSineSource::new(3);
        let expected = 3.0f64.sin();
        assert_eq!(s.value(), expected);
        assert_eq!(s.voltage(StepId(0)), expected);
        assert_eq!(s.voltage(StepId(4)), expected);
    }

    #[test]
    fn table_source_holds_last_value() {
        let mut s = TableSource::new(vec![1.0, 2.0, 3.0]);
        assert_eq!(s.voltage(StepId(0)), 1.0);
        assert_eq!(s.voltage(StepId(2)), 3.0);
        assert_eq!(s.voltage(StepId(9)), 3.0);
        assert_eq!(TableSource::default().voltage(StepId(0)), 0.0);
    }

    #[test]
    fn closures_are_sources() {
        let mut s = |step: StepId| step.0 as f64 * 10.0;
        assert_eq!(BoundarySource::voltage(&mut s, StepId(3)), 30.0);
    }
}

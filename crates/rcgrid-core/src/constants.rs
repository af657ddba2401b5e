//! Per-element RC constants and the explicit Euler update they drive.

use crate::error::ConstantsError;

/// Upper bound on `4h / (C·R)` beyond which the explicit update diverges.
pub const MAX_STABILITY_RATIO: f64 = 2.0;

/// Electrical constants shared by every mesh node, plus the integration step.
///
/// Every node is an identical resistor-capacitor pair. The explicit Euler
/// update of the RC charging equation is
///
/// ```text
/// next = h * neighbour_sum / (C * R) + previous * (1 - 4h / (C * R))
/// ```
///
/// which is stable while `4h / (C·R) <= 2` and free of oscillation while
/// `4h / (C·R) <= 1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RcConstants {
    /// Capacitance `C` of every element.
    pub capacitance: f64,
    /// Resistance `R` of every element.
    pub resistance: f64,
    /// Integration step `h`.
    pub step: f64,
}

impl Default for RcConstants {
    /// `C = 1`, `R = 5`, `h = 1`: ratio `0.8`, oscillation-free.
    fn default() -> Self {
        Self {
            capacitance: 1.0,
            resistance: 5.0,
            step: 1.0,
        }
    }
}

impl RcConstants {
    /// Create a constant set. Call [`validate()`](Self::validate) before use.
    pub fn new(capacitance: f64, resistance: f64, step: f64) -> Self {
        Self {
            capacitance,
            resistance,
            step,
        }
    }

    /// The RC time constant `C·R`.
    pub fn time_constant(&self) -> f64 {
        self.capacitance * self.resistance
    }

    /// `4h / (C·R)`, the quantity that decides stability.
    pub fn stability_ratio(&self) -> f64 {
        4.0 * self.step / self.capacitance / self.resistance
    }

    /// Whether the update decays monotonically (`4h / (C·R) <= 1`).
    pub fn is_oscillation_free(&self) -> bool {
        self.stability_ratio() <= 1.0
    }

    /// Next voltage of a non-corner node.
    ///
    /// The operation order is fixed so that every worker, whatever its
    /// row band, produces bit-identical results for the same inputs.
    #[inline]
    pub fn next_voltage(&self, neighbour_sum: f64, previous: f64) -> f64 {
        self.step * neighbour_sum / self.capacitance / self.resistance
            + previous * (1.0 - 4.0 * self.step / self.capacitance / self.resistance)
    }

    /// Check that every constant is finite and positive and that the
    /// stability ratio does not exceed [`MAX_STABILITY_RATIO`].
    pub fn validate(&self) -> Result<(), ConstantsError> {
        for (name, value) in [
            ("capacitance", self.capacitance),
            ("resistance", self.resistance),
            ("step", self.step),
        ] {
            if !value.is_finite() {
                return Err(ConstantsError::NonFinite { name, value });
            }
            if value <= 0.0 {
                return Err(ConstantsError::NonPositive { name, value });
            }
        }
        let ratio = self.stability_ratio();
        if !ratio.is_finite() || ratio > MAX_STABILITY_RATIO {
            return Err(ConstantsError::Unstable { ratio });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_constants_are_valid_and_oscillation_free() {
        let c = RcConstants::default();
        assert!(c.validate().is_ok());
        assert!((c.stability_ratio() - 0.8).abs() < 1e-12);
        assert!(c.is_oscillation_free());
        assert_eq!(c.time_constant(), 5.0);
    }

    #[test]
    fn edge_next_to_single_corner_charges_to_44() {
        // One 220 V corner neighbour, all else zero.
        let c = RcConstants::default();
        assert_eq!(c.next_voltage(220.0, 0.0), 44.0);
    }

    #[test]
    fn zero_step_rejected() {
        let c = RcConstants::new(1.0, 5.0, 0.0);
        match c.validate() {
            Err(ConstantsError::NonPositive { name: "step", .. }) => {}
            other => panic!("expected NonPositive(step), got {other:?}"),
        }
    }

    #[test]
    fn nan_capacitance_rejected() {
        let c = RcConstants::new(f64::NAN, 5.0, 1.0);
        match c.validate() {
            Err(ConstantsError::NonFinite {
                name: "capacitance",
                ..
            }) => {}
            other => panic!("expected NonFinite(capacitance), got {other:?}"),
        }
    }

    #[test]
    fn negative_resistance_rejected() {
        let c = RcConstants::new(1.0, -5.0, 1.0);
        assert!(matches!(
            c.validate(),
            Err(ConstantsError::NonPositive {
                name: "resistance",
                ..
            })
        ));
    }

    #[test]
    fn unstable_ratio_rejected() {
        // 4 * 1 / (1 * 1) = 4 > 2
        let c = RcConstants::new(1.0, 1.0, 1.0);
        match c.validate() {
            Err(ConstantsError::Unstable { ratio }) => assert_eq!(ratio, 4.0),
            other => panic!("expected Unstable, got {other:?}"),
        }
    }

    #[test]
    fn ratio_of_exactly_two_is_accepted_but_oscillates() {
        let c = RcConstants::new(1.0, 2.0, 1.0);
        assert!(c.validate().is_ok());
        assert!(!c.is_oscillation_free());
    }

    proptest! {
        #[test]
        fn uniform_field_is_a_fixed_point(v in -500.0f64..500.0) {
            // Four neighbours at the same voltage leave the node unchanged
            // (up to rounding).
            let c = RcConstants::default();
            let next = c.next_voltage(4.0 * v, v);
            prop_assert!((next - v).abs() <= 1e-9 * v.abs().max(1.0));
        }
    }
}

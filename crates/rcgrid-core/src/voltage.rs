//! Lock-free shared voltage storage.
//!
//! [`VoltageCell`] stores an `f64` as its IEEE-754 bit pattern in an
//! `AtomicU64`. All accesses use `Relaxed` ordering: cross-thread
//! visibility comes from the barrier rendezvous that separates every
//! write phase from the following read phase, not from the cell itself.
//! The atomic only makes a concurrent access well-defined; the engine's
//! row partition guarantees it never happens.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// A single shared `f64` with lock-free loads and stores.
#[derive(Default)]
pub struct VoltageCell(AtomicU64);

impl VoltageCell {
    /// Create a cell holding `value`.
    pub fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    /// Read the stored value.
    #[inline]
    pub fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    /// Overwrite the stored value.
    #[inline]
    pub fn set(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

impl Clone for VoltageCell {
    fn clone(&self) -> Self {
        Self::new(self.get())
    }
}

impl fmt::Debug for VoltageCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("VoltageCell").field(&self.get()).finish()
    }
}

impl From<f64> for VoltageCell {
    fn from(v: f64) -> Self {
        Self::new(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_positive_zero() {
        let cell = VoltageCell::default();
        assert_eq!(cell.get().to_bits(), 0.0f64.to_bits());
    }

    #[test]
    fn set_then_get_is_bit_exact() {
        let cell = VoltageCell::new(1.0);
        for v in [220.0, -0.0, f64::MIN_POSITIVE, 1e300, f64::INFINITY] {
            cell.set(v);
            assert_eq!(cell.get().to_bits(), v.to_bits());
        }
    }

    #[test]
    fn nan_payload_survives() {
        let cell = VoltageCell::new(f64::NAN);
        assert!(cell.get().is_nan());
    }

    #[test]
    fn clone_copies_current_value() {
        let a = VoltageCell::new(3.5);
        let b = a.clone();
        a.set(7.0);
        assert_eq!(b.get(), 3.5);
    }
}

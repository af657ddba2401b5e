//! The RC mesh stencil and the per-band compute kernel.

use rcgrid_core::{GridRead, RcConstants, Stencil};
use rcgrid_mesh::{classify, RowBand};

/// Explicit Euler update of a uniform RC mesh.
///
/// Corners are clamped to the boundary source. Every other node sums its
/// in-mesh neighbours from the previous grid, in the fixed order given by
/// [`NodeClass::neighbours()`](rcgrid_mesh::NodeClass::neighbours), and
/// applies [`RcConstants::next_voltage()`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RcStencil {
    constants: RcConstants,
}

impl RcStencil {
    /// Stencil over elements with the given constants.
    pub fn new(constants: RcConstants) -> Self {
        Self { constants }
    }

    /// The constants this stencil applies.
    pub fn constants(&self) -> &RcConstants {
        &self.constants
    }
}

impl Stencil for RcStencil {
    fn name(&self) -> &str {
        "rc"
    }

    fn next_voltage(&self, previous: &dyn GridRead, row: usize, col: usize, source: f64) -> f64 {
        let (rows, cols) = previous.shape();
        let class = classify(row, col, rows, cols);
        if class.is_corner() {
            return source;
        }
        let mut sum = 0.0;
        for (r, c) in class.neighbours(row, col, rows, cols) {
            sum += previous.get(r, c).unwrap_or(0.0);
        }
        let prev = previous.get(row, col).unwrap_or(0.0);
        self.constants.next_voltage(sum, prev)
    }
}

/// Apply `stencil` to every node of `band`, reading from `previous`.
///
/// This is the whole of a worker's compute phase. Rows are visited in
/// ascending order and columns left to right.
pub fn compute_band(stencil: &dyn Stencil, previous: &dyn GridRead, band: &RowBand<'_>, source: f64) {
    let cols = band.cols();
    for row in band.range().rows() {
        for col in 0..cols {
            band.write(row, col, stencil.next_voltage(previous, row, col, source));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcgrid_core::WorkerId;
    use rcgrid_mesh::{Grid, RowRange, SharedGrid};

    fn seeded_4x4(corner: f64) -> Grid {
        let mut g = Grid::zeros(4, 4).unwrap();
        for (r, c) in [(0, 0), (0, 3), (3, 0), (3, 3)] {
            *g.get_mut(r, c).unwrap() = corner;
        }
        g
    }

    #[test]
    fn corner_takes_source() {
        let s = RcStencil::default();
        let g = seeded_4x4(220.0);
        assert_eq!(s.next_voltage(&g, 0, 0, 17.0), 17.0);
        assert_eq!(s.next_voltage(&g, 3, 3, -1.0), -1.0);
    }

    #[test]
    fn edge_next_to_corner_charges_to_44() {
        let s = RcStencil::default();
        let g = seeded_4x4(220.0);
        // Top edge (0,1): left = 220, right = 0, down = 0.
        assert_eq!(s.next_voltage(&g, 0, 1, 220.0), 44.0);
        assert_eq!(s.next_voltage(&g, 1, 0, 220.0), 44.0);
        assert_eq!(s.next_voltage(&g, 2, 3, 220.0), 44.0);
        assert_eq!(s.next_voltage(&g, 3, 2, 220.0), 44.0);
    }

    #[test]
    fn interior_untouched_in_first_step() {
        let s = RcStencil::default();
        let g = seeded_4x4(220.0);
        assert_eq!(s.next_voltage(&g, 1, 1, 220.0), 0.0);
        assert_eq!(s.next_voltage(&g, 2, 2, 220.0), 0.0);
    }

    #[test]
    fn uniform_interior_is_a_fixed_point() {
        let s = RcStencil::default();
        let g = Grid::from_row_major(3, 3, vec![5.0; 9]).unwrap();
        assert!((s.next_voltage(&g, 1, 1, 5.0) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn compute_band_fills_only_its_rows() {
        let s = RcStencil::default();
        let prev = seeded_4x4(220.0);
        let current = SharedGrid::zeros(4, 4).unwrap();
        let band = current
            .band(RowRange {
                worker: WorkerId(0),
                from: 0,
                to: 1,
            })
            .unwrap();
        compute_band(&s, &prev, &band, 220.0);
        let out = current.snapshot();
        assert_eq!(out.row(0).unwrap(), &[220.0, 44.0, 44.0, 220.0]);
        assert_eq!(out.row(1).unwrap(), &[44.0, 0.0, 0.0, 44.0]);
        assert!(out.row(2).unwrap().iter().all(|&v| v == 0.0));
        assert!(out.row(3).unwrap().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn stencil_name() {
        assert_eq!(RcStencil::default().name(), "rc");
    }
}

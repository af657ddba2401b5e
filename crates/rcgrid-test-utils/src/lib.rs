//! Test fixtures and grid assertions for rcgrid development.
//!
//! - [`fixtures`]: stencils, sources, and sinks that observe or break the
//!   stepping protocol on purpose.
//! - Grid helpers: build seeded meshes and compare grids bit for bit.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{FailingSink, RecordingSource, TaggingStencil};

use rcgrid_core::GridRead;
use rcgrid_mesh::Grid;

/// A zero mesh with `corner` at the four corners.
pub fn seeded_grid(rows: usize, cols: usize, corner: f64) -> Grid {
    let mut g = Grid::zeros(rows, cols).expect("non-empty test mesh");
    for (r, c) in [(0, 0), (0, cols - 1), (rows - 1, 0), (rows - 1, cols - 1)] {
        if let Some(v) = g.get_mut(r, c) {
            *v = corner;
        }
    }
    g
}

/// Raw bit patterns of every node, row-major.
pub fn grid_bits(grid: &dyn GridRead) -> Vec<u64> {
    grid.to_row_major().into_iter().map(f64::to_bits).collect()
}

/// Panic with the first differing node unless `a` and `b` have the same
/// shape and bit-identical values.
pub fn assert_bit_identical(a: &dyn GridRead, b: &dyn GridRead, context: &str) {
    assert_eq!(a.shape(), b.shape(), "{context}: shape differs");
    let (rows, cols) = a.shape();
    for i in 0..rows {
        for j in 0..cols {
            let (x, y) = (a.get(i, j), b.get(i, j));
            assert!(
                x.map(f64::to_bits) == y.map(f64::to_bits),
                "{context}: node ({i}, {j}) differs: {x:?} vs {y:?}"
            );
        }
    }
}

/// Whether every node of `grid` holds exactly `value`.
pub fn is_uniform(grid: &dyn GridRead, value: f64) -> bool {
    grid.to_row_major().iter().all(|&v| v == value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_grid_sets_corners_only() {
        let g = seeded_grid(3, 4, 7.0);
        assert_eq!(g.corners(), [7.0; 4]);
        assert_eq!(g.get(1, 1), Some(0.0));
        assert_eq!(g.as_slice().iter().filter(|&&v| v == 7.0).count(), 4);
    }

    #[test]
    fn bit_identity_distinguishes_signed_zero() {
        let a = Grid::from_row_major(1, 1, vec![0.0]).unwrap();
        let b = Grid::from_row_major(1, 1, vec![-0.0]).unwrap();
        assert_ne!(grid_bits(&a), grid_bits(&b));
        assert_bit_identical(&a, &a.clone(), "self");
    }

    #[test]
    #[should_panic(expected = "node (0, 1) differs")]
    fn bit_identity_reports_first_difference() {
        let a = Grid::from_row_major(1, 2, vec![1.0, 2.0]).unwrap();
        let b = Grid::from_row_major(1, 2, vec![1.0, 2.5]).unwrap();
        assert_bit_identical(&a, &b, "diff");
    }

    #[test]
    fn uniformity() {
        assert!(is_uniform(&Grid::zeros(2, 2).unwrap(), 0.0));
        assert!(!is_uniform(&seeded_grid(2, 3, 1.0), 1.0));
    }
}

//! Static row partitioning across the worker pool.
//!
//! [`PartitionTable::even()`] splits `rows` into `workers` contiguous bands
//! of `rows / workers` rows each: worker `n` owns
//! `[n * band, (n + 1) * band - 1]`. The row count must be a multiple of
//! the worker count; ranges are never padded or truncated.

use std::ops::RangeInclusive;

use rcgrid_core::{MeshError, WorkerId};

/// Inclusive row range owned by one worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RowRange {
    /// Owning worker.
    pub worker: WorkerId,
    /// First owned row.
    pub from: usize,
    /// Last owned row (inclusive).
    pub to: usize,
}

impl RowRange {
    /// Number of rows in the range. Zero if inverted.
    pub fn len(&self) -> usize {
        if self.to < self.from {
            0
        } else {
            self.to - self.from + 1
        }
    }

    /// Whether the range is inverted (owns nothing).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `row` is owned by this range.
    pub fn contains(&self, row: usize) -> bool {
        self.from <= row && row <= self.to
    }

    /// Iterate the owned rows.
    pub fn rows(&self) -> RangeInclusive<usize> {
        self.from..=self.to
    }
}

/// Complete, non-overlapping assignment of mesh rows to workers.
///
/// Computed once before the pool is launched and immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartitionTable {
    rows: usize,
    ranges: Vec<RowRange>,
}

impl PartitionTable {
    /// Split `rows` into `workers` equal contiguous bands.
    ///
    /// # Errors
    ///
    /// - `EmptyMesh` if `rows == 0`.
    /// - `ZeroWorkers` if `workers == 0`.
    /// - `IndivisibleRows` if `rows % workers != 0`.
    /// - `TooManyWorkers` if `workers` does not fit in a [`WorkerId`].
    pub fn even(rows: usize, workers: usize) -> Result<Self, MeshError> {
        if rows == 0 {
            return Err(MeshError::EmptyMesh { rows, cols: 0 });
        }
        if workers == 0 {
            return Err(MeshError::ZeroWorkers);
        }
        if rows % workers != 0 {
            return Err(MeshError::IndivisibleRows { rows, workers });
        }
        if u32::try_from(workers).is_err() {
            return Err(MeshError::TooManyWorkers { workers });
        }
        let band = rows / workers;
        let ranges = (0..workers)
            .map(|n| RowRange {
                worker: WorkerId(n as u32),
                from: band * n,
                to: band * (n + 1) - 1,
            })
            .collect();
        let table = Self { rows, ranges };
        table.verify()?;
        Ok(table)
    }

    /// Build a table from explicit ranges, rejecting gaps and overlaps.
    pub fn from_ranges(rows: usize, ranges: Vec<RowRange>) -> Result<Self, MeshError> {
        if rows == 0 {
            return Err(MeshError::EmptyMesh { rows, cols: 0 });
        }
        if ranges.is_empty() {
            return Err(MeshError::ZeroWorkers);
        }
        let table = Self { rows, ranges };
        table.verify()?;
        Ok(table)
    }

    /// Check that every row in `[0, rows-1]` is owned by exactly one range.
    pub fn verify(&self) -> Result<(), MeshError> {
        let mut owner: Vec<Option<WorkerId>> = vec![None; self.rows];
        for range in &self.ranges {
            if range.is_empty() || range.to >= self.rows {
                return Err(MeshError::InvalidRange {
                    worker: range.worker,
                    from: range.from,
                    to: range.to,
                });
            }
            for row in range.rows() {
                if owner[row].replace(range.worker).is_some() {
                    return Err(MeshError::PartitionOverlap { row });
                }
            }
        }
        if let Some(row) = owner.iter().position(Option::is_none) {
            return Err(MeshError::PartitionGap { row });
        }
        Ok(())
    }

    /// Mesh row count covered by the table.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of workers.
    pub fn worker_count(&self) -> usize {
        self.ranges.len()
    }

    /// All ranges in worker order.
    pub fn ranges(&self) -> &[RowRange] {
        &self.ranges
    }

    /// The range assigned to `worker`.
    pub fn range_of(&self, worker: WorkerId) -> Option<RowRange> {
        self.ranges.iter().copied().find(|r| r.worker == worker)
    }

    /// The worker that owns `row`.
    pub fn owner_of(&self, row: usize) -> Option<WorkerId> {
        self.ranges
            .iter()
            .find(|r| r.contains(row))
            .map(|r| r.worker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn range(worker: u32, from: usize, to: usize) -> RowRange {
        RowRange {
            worker: WorkerId(worker),
            from,
            to,
        }
    }

    #[test]
    fn even_split_of_eight_rows_four_workers() {
        let t = PartitionTable::even(8, 4).unwrap();
        assert_eq!(
            t.ranges(),
            &[range(0, 0, 1), range(1, 2, 3), range(2, 4, 5), range(3, 6, 7)]
        );
        assert_eq!(t.worker_count(), 4);
        assert_eq!(t.rows(), 8);
    }

    #[test]
    fn single_worker_owns_everything() {
        let t = PartitionTable::even(5, 1).unwrap();
        assert_eq!(t.ranges(), &[range(0, 0, 4)]);
    }

    #[test]
    fn one_row_per_worker() {
        let t = PartitionTable::even(3, 3).unwrap();
        assert_eq!(t.owner_of(2), Some(WorkerId(2)));
        assert_eq!(t.range_of(WorkerId(1)), Some(range(1, 1, 1)));
    }

    #[test]
    fn indivisible_rows_rejected() {
        assert_eq!(
            PartitionTable::even(10, 3),
            Err(MeshError::IndivisibleRows {
                rows: 10,
                workers: 3
            })
        );
    }

    #[test]
    fn more_workers_than_rows_rejected() {
        assert!(matches!(
            PartitionTable::even(2, 4),
            Err(MeshError::IndivisibleRows { .. })
        ));
    }

    #[test]
    fn zero_workers_and_zero_rows_rejected() {
        assert_eq!(PartitionTable::even(4, 0), Err(MeshError::ZeroWorkers));
        assert!(matches!(
            PartitionTable::even(0, 1),
            Err(MeshError::EmptyMesh { .. })
        ));
    }

    #[test]
    fn overlapping_ranges_rejected() {
        let err = PartitionTable::from_ranges(4, vec![range(0, 0, 2), range(1, 2, 3)]);
        assert_eq!(err, Err(MeshError::PartitionOverlap { row: 2 }));
    }

    #[test]
    fn gapped_ranges_rejected() {
        let err = PartitionTable::from_ranges(5, vec![range(0, 0, 1), range(1, 3, 4)]);
        assert_eq!(err, Err(MeshError::PartitionGap { row: 2 }));
    }

    #[test]
    fn out_of_mesh_range_rejected() {
        let err = PartitionTable::from_ranges(4, vec![range(0, 0, 4)]);
        assert!(matches!(err, Err(MeshError::InvalidRange { .. })));
    }

    #[test]
    fn uneven_explicit_ranges_accepted() {
        let t = PartitionTable::from_ranges(5, vec![range(0, 0, 0), range(1, 1, 4)]).unwrap();
        assert_eq!(t.owner_of(3), Some(WorkerId(1)));
        assert_eq!(t.owner_of(5), None);
    }

    #[test]
    fn range_len_and_rows() {
        let r = range(0, 2, 5);
        assert_eq!(r.len(), 4);
        assert!(!r.is_empty());
        assert_eq!(r.rows().collect::<Vec<_>>(), vec![2, 3, 4, 5]);
        assert!(range(0, 3, 2).is_empty());
    }

    proptest! {
        #[test]
        fn even_partition_covers_every_row_exactly_once(
            band in 1usize..16,
            workers in 1usize..16,
        ) {
            let rows = band * workers;
            let t = PartitionTable::even(rows, workers).unwrap();
            let mut seen = vec![0u32; rows];
            for r in t.ranges() {
                prop_assert_eq!(r.len(), band);
                for row in r.rows() {
                    seen[row] += 1;
                }
            }
            prop_assert!(seen.iter().all(|&n| n == 1));
            // Contiguous and in worker order.
            for pair in t.ranges().windows(2) {
                prop_assert_eq!(pair[0].to + 1, pair[1].from);
                prop_assert_eq!(pair[0].worker.0 + 1, pair[1].worker.0);
            }
            prop_assert_eq!(t.ranges()[0].from, 0);
            prop_assert_eq!(t.ranges()[workers - 1].to, rows - 1);
        }

        #[test]
        fn owner_of_agrees_with_ranges(band in 1usize..8, workers in 1usize..8, row in 0usize..64) {
            let rows = band * workers;
            let t = PartitionTable::even(rows, workers).unwrap();
            let row = row % rows;
            let owner = t.owner_of(row).unwrap();
            prop_assert_eq!(owner.0 as usize, row / band);
        }
    }
}

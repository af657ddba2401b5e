//! Integration test: results do not depend on the worker count.
//!
//! Every frame produced with 1, 2, 4, or 8 workers must be bit-identical
//! to the frames of the single-threaded reference runner.

use proptest::prelude::*;

use rcgrid_core::{RcConstants, StepId};
use rcgrid_engine::{MemorySink, SimConfig, SineSource, StepController};
use rcgrid_mesh::Grid;
use rcgrid_test_utils::{assert_bit_identical, grid_bits};

fn frames(config: SimConfig, serial: bool) -> Vec<(StepId, Grid)> {
    let ctl = StepController::new(config, SineSource::new(220.0, 0.3), MemorySink::new()).unwrap();
    let report = if serial {
        ctl.run_serial().unwrap()
    } else {
        ctl.run().unwrap()
    };
    report.sink.into_frames()
}

fn assert_same_frames(a: &[(StepId, Grid)], b: &[(StepId, Grid)], label: &str) {
    assert_eq!(a.len(), b.len(), "{label}: frame count");
    for ((sa, ga), (sb, gb)) in a.iter().zip(b) {
        assert_eq!(sa, sb, "{label}: step order");
        assert_bit_identical(ga, gb, &format!("{label} step {sa}"));
    }
}

#[test]
fn worker_counts_match_serial_reference() {
    let reference = frames(SimConfig::new(8, 8, 20, 1), true);
    assert_eq!(reference.len(), 22);
    for workers in [1, 2, 4, 8] {
        let parallel = frames(SimConfig::new(8, 8, 20, workers), false);
        assert_same_frames(&reference, &parallel, &format!("{workers} workers"));
    }
}

#[test]
fn non_square_mesh_is_deterministic() {
    let reference = frames(SimConfig::new(12, 5, 15, 1), true);
    for workers in [2, 3, 4, 6, 12] {
        let parallel = frames(SimConfig::new(12, 5, 15, workers), false);
        assert_same_frames(&reference, &parallel, &format!("{workers} workers"));
    }
}

#[test]
fn repeated_parallel_runs_agree() {
    let first = frames(SimConfig::new(16, 16, 30, 4), false);
    for _ in 0..5 {
        let again = frames(SimConfig::new(16, 16, 30, 4), false);
        assert_same_frames(&first, &again, "repeat");
    }
}

#[test]
fn oscillating_constants_are_still_deterministic() {
    let c = RcConstants::new(1.0, 1.0, 0.4);
    let reference = frames(SimConfig::new(6, 6, 12, 1).with_constants(c), true);
    let parallel = frames(SimConfig::new(6, 6, 12, 3).with_constants(c), false);
    assert_same_frames(&reference, &parallel, "ratio 1.6");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn any_valid_partition_matches_serial(
        band in 1usize..5,
        workers in 1usize..5,
        cols in 1usize..7,
        steps in 0u64..8,
    ) {
        let rows = band * workers;
        let reference = StepController::new(
            SimConfig::new(rows, cols, steps, 1),
            SineSource::new(10.0, 1.1),
            MemorySink::new(),
        )
        .unwrap()
        .run_serial()
        .unwrap();
        let parallel = StepController::new(
            SimConfig::new(rows, cols, steps, workers),
            SineSource::new(10.0, 1.1),
            MemorySink::new(),
        )
        .unwrap()
        .run()
        .unwrap();
        prop_assert_eq!(reference.sink.len(), parallel.sink.len());
        for ((_, a), (_, b)) in reference.sink.frames().iter().zip(parallel.sink.frames()) {
            prop_assert_eq!(grid_bits(a), grid_bits(b));
        }
        prop_assert_eq!(
            grid_bits(&reference.final_grid),
            grid_bits(&parallel.final_grid)
        );
    }
}

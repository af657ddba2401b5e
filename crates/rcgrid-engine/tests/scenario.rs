//! Integration test: end-to-end runs with known answers.
//!
//! Covers the first-step values of a 4×4 mesh, the one-step lag between
//! the source and the corners in each frame, the frame count, and the
//! boundedness of an oscillation-free run.

use rcgrid_core::{BoundarySource, GridRead, Stencil, StepId};
use rcgrid_engine::{
    ConstantSource, GnuplotTextSink, MemorySink, RcStencil, RunReport, SimConfig, StepController,
    TableSource,
};
use rcgrid_mesh::Grid;
use rcgrid_test_utils::{assert_bit_identical, seeded_grid};

fn run(config: SimConfig, source: impl BoundarySource) -> RunReport<MemorySink> {
    StepController::new(config, source, MemorySink::new())
        .unwrap()
        .run()
        .unwrap()
}

/// Apply the stencil to a whole frame on the test thread.
fn step_by_hand(prev: &Grid, source: f64) -> Grid {
    let stencil = RcStencil::default();
    let (rows, cols) = prev.shape();
    let mut out = Grid::zeros(rows, cols).unwrap();
    for i in 0..rows {
        for j in 0..cols {
            *out.get_mut(i, j).unwrap() = stencil.next_voltage(prev, i, j, source);
        }
    }
    out
}

#[test]
fn four_by_four_single_step() {
    for (total, workers) in [(0, 1), (1, 2), (1, 4)] {
        four_by_four_first_frames(total, workers);
    }
}

fn four_by_four_first_frames(total: u64, workers: usize) {
    let report = run(SimConfig::new(4, 4, total, workers), ConstantSource(220.0));
    let sink = &report.sink;
    assert_eq!(sink.len() as u64, total + 2);

    let f0 = sink.frame(StepId(0)).unwrap();
    assert_eq!(f0, &seeded_grid(4, 4, 220.0));

    let f1 = sink.frame(StepId(1)).unwrap();
    assert_eq!(f1.corners(), [220.0; 4]);
    for (r, c) in [(0, 1), (0, 2), (1, 0), (2, 0), (1, 3), (2, 3), (3, 1), (3, 2)] {
        assert_eq!(f1.get(r, c), Some(44.0), "edge ({r}, {c})");
    }
    for (r, c) in [(1, 1), (1, 2), (2, 1), (2, 2)] {
        assert_eq!(f1.get(r, c), Some(0.0), "interior ({r}, {c})");
    }
}

#[test]
fn frame_count_is_total_steps_plus_two() {
    for total in [0u64, 1, 5, 17] {
        let report = run(SimConfig::new(4, 3, total, 4), ConstantSource(1.0));
        assert_eq!(report.sink.len() as u64, total + 2);
        assert_eq!(report.metrics.iterations, total + 2);
        let steps: Vec<u64> = report.sink.frames().iter().map(|(s, _)| s.0).collect();
        assert_eq!(steps, (0..total + 2).collect::<Vec<_>>());
    }
}

#[test]
fn corners_lag_the_source_by_one_step() {
    let table = vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0];
    let report = run(SimConfig::new(4, 4, 4, 2), TableSource::new(table.clone()));
    let frames = report.sink.frames();
    assert_eq!(frames[0].1.corners(), [table[0]; 4]);
    for (step, grid) in &frames[1..] {
        let applied = table[step.as_index() - 1];
        assert_eq!(grid.corners(), [applied; 4], "frame {step}");
    }
    assert_eq!(report.final_grid.corners(), [table[5]; 4]);
}

#[test]
fn each_frame_is_the_previous_frame_stepped_once() {
    let table = vec![5.0, -3.0, 8.0, 1.0, 0.5, 2.0, 7.0];
    let report = run(SimConfig::new(6, 5, 5, 3), TableSource::new(table.clone()));
    let frames = report.sink.frames();
    for pair in frames.windows(2) {
        let (step, prev) = (&pair[0].0, &pair[0].1);
        let expected = step_by_hand(prev, table[step.as_index()]);
        assert_bit_identical(&pair[1].1, &expected, &format!("frame {}", step.next()));
    }
    let (last_step, last) = frames.last().unwrap();
    let expected_final = step_by_hand(last, table[last_step.as_index()]);
    assert_bit_identical(&report.final_grid, &expected_final, "final grid");
}

#[test]
fn oscillation_free_run_charges_monotonically_within_bounds() {
    let report = run(SimConfig::new(8, 8, 60, 4), ConstantSource(220.0));
    let frames = report.sink.frames();
    for (step, grid) in frames {
        assert!(grid.is_finite(), "frame {step} not finite");
        assert!(
            grid.as_slice().iter().all(|&v| (0.0..=220.0).contains(&v)),
            "frame {step} out of [0, 220]"
        );
    }
    for pair in frames.windows(2) {
        for (a, b) in pair[0].1.as_slice().iter().zip(pair[1].1.as_slice()) {
            assert!(b >= a, "voltage fell between frames {} and {}", pair[0].0, pair[1].0);
        }
    }
    // Charge has reached the centre.
    assert!(report.final_grid.get(4, 4).unwrap() > 0.0);
}

#[test]
fn single_node_mesh_follows_the_source() {
    let table = vec![1.0, 2.0, 3.0];
    let report = run(SimConfig::new(1, 1, 1, 1), TableSource::new(table));
    let values: Vec<f64> = report.sink.frames().iter().map(|(_, g)| g.as_slice()[0]).collect();
    assert_eq!(values, vec![1.0, 1.0, 2.0]);
}

#[test]
fn single_row_mesh_runs() {
    let report = run(SimConfig::new(1, 6, 10, 1), ConstantSource(3.0));
    assert!(report.final_grid.is_finite());
    assert_eq!(report.final_grid.corners(), [3.0; 4]);
}

#[test]
fn gnuplot_file_has_one_block_per_frame() {
    let mut buf = Vec::new();
    let report = StepController::new(SimConfig::new(2, 2, 2, 2), ConstantSource(220.0), GnuplotTextSink::new(&mut buf))
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(report.sink.frame_count(), 4);
    drop(report);
    let text = String::from_utf8(buf).unwrap();
    let blocks: Vec<&str> = text.split("\n\n\n").filter(|b| !b.is_empty()).collect();
    assert_eq!(blocks.len(), 4);
    assert!(blocks[0].starts_with("0 0 220.000000\n0 1 220.000000\n"));
}

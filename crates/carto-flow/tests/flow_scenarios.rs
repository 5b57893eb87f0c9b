//! End-to-end flows through the spectral velocity field.

use std::f64::consts::PI;

use carto_core::{
    CartogramConfig, DensityGrid, IntegrationMetrics, IntegratorConfig, NullProgress, Point, ProgressEvent,
    ProgressMode,
};
use carto_flow::{ChannelProgress, Integrator, Observers, SpectralVelocity};
use carto_spectral::{DiffusionSolver, Workspace};
use carto_test_utils::{
    cosine_mode_density, lattice_points, random_density, two_by_two_density, uniform_density,
    RecordingSnapshots,
};
use proptest::prelude::*;

fn velocity_field(solver: DiffusionSolver<'_>) -> SpectralVelocity<'_> {
    let horizon = CartogramConfig::DEFAULT_HORIZON * solver.relaxation_time();
    SpectralVelocity::new(solver, 1e-6, horizon).unwrap()
}

fn flow(density: DensityGrid, points: &mut [Point], config: IntegratorConfig) -> IntegrationMetrics {
    let mut ws = Workspace::new(density.dims()).unwrap();
    let solver = DiffusionSolver::new(&mut ws, density).unwrap();
    let mut field = velocity_field(solver);
    let mut progress = NullProgress;
    Integrator::new(config)
        .unwrap()
        .run(&mut field, points, &mut Observers::new(&mut progress))
        .unwrap()
}

#[test]
fn uniform_density_is_a_fixed_point() {
    let mut points = lattice_points(5, 4);
    points.push(Point::new(2.25, 1.75));
    let before = points.clone();
    let metrics = flow(uniform_density(5, 4, 2.0), &mut points, IntegratorConfig::default());
    for (a, b) in before.iter().zip(&points) {
        assert!(a.distance(*b) < 1e-12, "{a:?} moved to {b:?}");
    }
    assert_eq!(metrics.final_time, 1.0);
}

#[test]
fn single_cell_grid_never_moves() {
    let mut points = vec![
        Point::new(0.0, 0.0),
        Point::new(1.0, 1.0),
        Point::new(0.3, 0.6),
    ];
    let before = points.clone();
    flow(uniform_density(1, 1, 7.0), &mut points, IntegratorConfig::default());
    assert_eq!(points, before);
}

#[test]
fn dense_cell_pushes_neighbours_away() {
    let mut points = lattice_points(2, 2);
    flow(two_by_two_density(), &mut points, IntegratorConfig::default());

    // Lattice order is y outer, x inner: index = iy * 3 + ix. The map is
    // symmetric about the diagonal through the dense cell, and once the
    // density is equal the dense cell covers half the domain.
    let center = points[4];
    assert!((center.x - center.y).abs() < 1e-9, "center ended at {center:?}");
    assert!((center.x - 0.79).abs() < 0.05, "center ended at {center:?}");

    let right_mid = points[5];
    assert_eq!(right_mid.x, 2.0);
    assert!((right_mid.y - 0.72).abs() < 0.05, "right edge ended at {right_mid:?}");

    let top_mid = points[7];
    assert_eq!(top_mid.y, 2.0);
    assert!((top_mid.x - right_mid.y).abs() < 1e-9);

    // Each unit-population cell ends with area 4 / 6.
    let (bottom_mid, left_mid) = (points[1], points[3]);
    let area = 0.5 * (bottom_mid.x * center.y + left_mid.y * center.x);
    assert!((area - 2.0 / 3.0).abs() < 0.07, "corner cell area {area}");

    for (i, corner) in [(0, (0.0, 0.0)), (2, (2.0, 0.0)), (6, (0.0, 2.0)), (8, (2.0, 2.0))] {
        assert_eq!(points[i], Point::new(corner.0, corner.1));
    }
}

#[test]
fn area_follows_mass_for_single_mode() {
    // The mass left of a material line is conserved. It starts at
    // 4 + (4 / pi) sin(pi / 2) under rho = 1 + 0.5 cos(pi x / 8), and once
    // the density has relaxed to its mean of 1 the line must sit there.
    let mut points = vec![Point::new(4.0, 0.0), Point::new(4.0, 1.0), Point::new(4.0, 2.0)];
    let config = IntegratorConfig {
        target_error: 1e-6,
        ..IntegratorConfig::default()
    };
    flow(cosine_mode_density(8, 2, 0.5), &mut points, config);
    for p in &points {
        assert!((p.x - (4.0 + 4.0 / PI)).abs() < 0.03, "line ended at x = {}", p.x);
    }
    assert_eq!(points[0].y, 0.0);
    assert_eq!(points[2].y, 2.0);
}

#[test]
fn random_density_keeps_lattice_in_domain() {
    let (w, h) = (6u32, 5u32);
    let mut points = lattice_points(w, h);
    let before = points.clone();
    flow(random_density(w, h, 0.5, 2.0, 5), &mut points, IntegratorConfig::default());

    for (a, b) in before.iter().zip(&points) {
        assert!(b.is_finite());
        assert!((0.0..=w as f64).contains(&b.x) && (0.0..=h as f64).contains(&b.y));
        if a.x == 0.0 || a.x == w as f64 {
            assert_eq!(a.x, b.x, "edge point left x edge");
        }
        if a.y == 0.0 || a.y == h as f64 {
            assert_eq!(a.y, b.y, "edge point left y edge");
        }
    }
    let moved = before.iter().zip(&points).any(|(a, b)| a.distance(*b) > 1e-3);
    assert!(moved);
}

#[test]
fn snapshots_record_smoothing_density() {
    let density = random_density(4, 4, 0.2, 3.0, 9);
    let mut ws = Workspace::new(density.dims()).unwrap();
    let solver = DiffusionSolver::new(&mut ws, density).unwrap();
    let mut field = velocity_field(solver);
    let mut points = lattice_points(4, 4);
    let mut progress = NullProgress;
    let mut snapshots = RecordingSnapshots::new();
    let metrics = {
        let mut observers = Observers::new(&mut progress).with_snapshots(&mut snapshots);
        Integrator::new(IntegratorConfig::default())
            .unwrap()
            .run(&mut field, &mut points, &mut observers)
            .unwrap()
    };
    assert_eq!(snapshots.written.len() as u64, metrics.accepted_steps);
    let times: Vec<f64> = snapshots.written.iter().map(|w| w.1).collect();
    assert!(times.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(times.last().copied(), Some(1.0));

    let spread = |d: &[f64]| {
        let lo = d.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = d.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        hi - lo
    };
    let first = spread(&snapshots.written[0].2);
    let last = spread(&snapshots.written[snapshots.written.len() - 1].2);
    assert!(last < first);
}

#[test]
fn progress_streams_to_another_thread() {
    let (mut sink, rx) = ChannelProgress::unbounded();
    let worker = std::thread::spawn(move || {
        let density = cosine_mode_density(6, 3, 0.4);
        let mut ws = Workspace::new(density.dims()).unwrap();
        let solver = DiffusionSolver::new(&mut ws, density).unwrap();
        let mut field = velocity_field(solver);
        let mut points = lattice_points(6, 3);
        Integrator::new(IntegratorConfig::default())
            .unwrap()
            .with_progress_mode(ProgressMode::Percent)
            .run(&mut field, &mut points, &mut Observers::new(&mut sink))
            .unwrap()
    });
    let metrics = worker.join().unwrap();
    let events: Vec<ProgressEvent> = rx.try_iter().collect();
    assert_eq!(events.len() as u64, metrics.accepted_steps + 1);
    assert_eq!(events.last(), Some(&ProgressEvent::Finished { metrics }));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn one_dimensional_flow_preserves_order(
        amp in 0.05f64..0.8,
        mut xs in proptest::collection::vec(0.0f64..8.0, 2..8),
    ) {
        xs.sort_by(f64::total_cmp);
        let mut points: Vec<Point> = xs.iter().map(|&x| Point::new(x, 1.0)).collect();
        flow(cosine_mode_density(8, 2, amp), &mut points, IntegratorConfig::default());
        for w in points.windows(2) {
            prop_assert!(w[0].x <= w[1].x + 1e-9, "{:?} crossed {:?}", w[0], w[1]);
            prop_assert!((w[0].y - 1.0).abs() < 1e-9);
        }
    }
}

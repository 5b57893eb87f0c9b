//! Whole-transform properties: conservation, fixed points, idempotence.

use std::f64::consts::PI;

use carto::prelude::*;
use carto_test_utils::{lattice_points, random_density, uniform_density, RecordingSnapshots};
use proptest::prelude::*;

fn run(density: DensityGrid, points: &mut [Point], config: &CartogramConfig) -> IntegrationMetrics {
    let mut cartogram = Cartogram::new(density.dims()).unwrap();
    let mut progress = NullProgress;
    cartogram
        .transform(density, points, config, &mut Observers::new(&mut progress))
        .unwrap()
}

fn shoelace(quad: [Point; 4]) -> f64 {
    (0..4)
        .map(|i| {
            let (a, b) = (quad[i], quad[(i + 1) % 4]);
            a.x * b.y - b.x * a.y
        })
        .sum::<f64>()
        * 0.5
}

#[test]
fn cell_areas_end_proportional_to_population() {
    // rho0 = 1 + a cos(kx) cos(ky) has mean 1, so once the density is equal
    // every transformed cell's area is its original population.
    let n = 8u32;
    let (k, a) = (PI / n as f64, 0.3);
    let dims = GridDims::new(n, n).unwrap();
    let density = DensityGrid::from_fn(dims, |ix, iy| {
        1.0 + a * (k * (ix as f64 + 0.5)).cos() * (k * (iy as f64 + 0.5)).cos()
    })
    .unwrap();
    let mut points = lattice_points(n, n);
    run(density, &mut points, &CartogramConfig::default());

    let band = |i: u32| ((k * (i + 1) as f64).sin() - (k * i as f64).sin()) / k;
    let at = |ix: u32, iy: u32| points[(iy * (n + 1) + ix) as usize];
    for iy in 0..n {
        for ix in 0..n {
            let area = shoelace([at(ix, iy), at(ix + 1, iy), at(ix + 1, iy + 1), at(ix, iy + 1)]);
            let population = 1.0 + a * band(ix) * band(iy);
            assert!(
                (area - population).abs() / population < 0.03,
                "cell ({ix}, {iy}): area {area} vs population {population}"
            );
        }
    }
}

#[test]
fn two_bands_meet_where_mass_splits() {
    // Density 1 on the left half, 3 on the right: a quarter of the mass
    // lies left of x = 16, so the boundary ends at a quarter of the width.
    let n = 32u32;
    let dims = GridDims::new(n, n).unwrap();
    let density = DensityGrid::from_fn(dims, |ix, _| if ix < n / 2 { 1.0 } else { 3.0 }).unwrap();
    let mut points = vec![Point::new(16.0, 16.0), Point::new(8.0, 4.0), Point::new(24.0, 30.0)];
    run(density, &mut points, &CartogramConfig::default());

    let expected = [8.0, 4.0, 20.0];
    for (p, x) in points.iter().zip(expected) {
        assert!((p.x - x).abs() < 0.25, "{p:?} should end near x = {x}");
    }
    assert!((points[0].y - 16.0).abs() < 1e-9);
}

#[test]
fn field_is_uniform_at_time_one() {
    let density = random_density(12, 9, 0.5, 2.0, 31);
    let mean = density.mean();
    let mut cartogram = Cartogram::new(density.dims()).unwrap();
    let mut progress = NullProgress;
    let mut snapshots = RecordingSnapshots::new();
    let config = CartogramConfig {
        intermediate: true,
        ..CartogramConfig::default()
    };
    cartogram
        .transform(
            density,
            &mut lattice_points(12, 9),
            &config,
            &mut Observers::new(&mut progress).with_snapshots(&mut snapshots),
        )
        .unwrap();

    let (_, time, last) = snapshots.written.last().unwrap();
    assert_eq!(*time, 1.0);
    let worst = last.iter().map(|v| (v - mean).abs()).fold(0.0, f64::max);
    assert!(worst / mean < 1e-4, "final density deviates by {worst}");
}

#[test]
fn transformed_lattice_still_tiles_domain() {
    let (w, h) = (5u32, 4u32);
    let mut points = lattice_points(w, h);
    run(
        random_density(w, h, 0.5, 2.0, 17),
        &mut points,
        &CartogramConfig::default(),
    );
    let at = |ix: u32, iy: u32| points[(iy * (w + 1) + ix) as usize];
    let mut total = 0.0;
    for iy in 0..h {
        for ix in 0..w {
            let area = shoelace([at(ix, iy), at(ix + 1, iy), at(ix + 1, iy + 1), at(ix, iy + 1)]);
            assert!(area > 0.0, "cell ({ix}, {iy}) folded over");
            total += area;
        }
    }
    assert!((total - (w * h) as f64).abs() < 1e-9);
}

#[test]
fn rerun_on_final_field_is_idempotent() {
    let (w, h) = (6u32, 4u32);
    let mut points = lattice_points(w, h);
    let mut cartogram = Cartogram::new(GridDims::new(w, h).unwrap()).unwrap();
    let mut progress = NullProgress;
    let mut snapshots = RecordingSnapshots::new();
    let config = CartogramConfig {
        intermediate: true,
        ..CartogramConfig::default()
    };
    cartogram
        .transform(
            random_density(w, h, 0.5, 2.0, 23),
            &mut points,
            &config,
            &mut Observers::new(&mut progress).with_snapshots(&mut snapshots),
        )
        .unwrap();
    let settled = points.clone();

    let (_, _, last) = snapshots.written.pop().unwrap();
    let final_field = DensityGrid::from_vec(GridDims::new(w, h).unwrap(), last).unwrap();
    let metrics = run(final_field, &mut points, &CartogramConfig::default());
    assert!(metrics.max_displacement < 1e-3, "moved {}", metrics.max_displacement);
    for (a, b) in settled.iter().zip(&points) {
        assert!(a.distance(*b) < 1e-3);
    }
}

#[test]
fn heavy_blur_flattens_the_map() {
    let mut sharp = lattice_points(6, 6);
    let mut blurred = sharp.clone();
    let before = sharp.clone();
    let density = random_density(6, 6, 0.5, 2.0, 4);
    let sharp_metrics = run(density.clone(), &mut sharp, &CartogramConfig::default());
    let blurred_metrics = run(
        density,
        &mut blurred,
        &CartogramConfig::default().with_blur(6.0),
    );
    assert!(blurred_metrics.max_displacement < sharp_metrics.max_displacement);
    for (a, b) in before.iter().zip(&blurred) {
        assert!(a.distance(*b) < 0.05);
    }
}

#[test]
fn step_cap_is_honoured_end_to_end() {
    let mut points = lattice_points(4, 4);
    let metrics = run(
        random_density(4, 4, 0.5, 2.0, 8),
        &mut points,
        &CartogramConfig::default().with_max_step(0.02),
    );
    assert!(metrics.largest_step <= 0.02);
    assert!(metrics.accepted_steps >= 50);
    assert_eq!(metrics.final_time, 1.0);
}

#[test]
fn cancellation_surfaces_through_facade() {
    let density = random_density(4, 4, 0.5, 2.0, 2);
    let mut cartogram = Cartogram::new(density.dims()).unwrap();
    let flag = CancelFlag::new();
    flag.cancel();
    let mut progress = NullProgress;
    let mut observers = Observers::new(&mut progress).with_cancel(&flag);
    let err = cartogram
        .transform(
            density,
            &mut lattice_points(4, 4),
            &CartogramConfig::default(),
            &mut observers,
        )
        .unwrap_err();
    assert_eq!(
        err,
        CartogramError::Integration(IntegrationError::Cancelled { time: 0.0 })
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn uniform_density_leaves_any_points_fixed(
        xsize in 1u32..7,
        ysize in 1u32..7,
        value in 0.1f64..50.0,
        raw in proptest::collection::vec((0.0f64..1.0, 0.0f64..1.0), 0..12),
    ) {
        let mut points: Vec<Point> = raw
            .iter()
            .map(|&(u, v)| Point::new(u * xsize as f64, v * ysize as f64))
            .collect();
        let before = points.clone();
        run(uniform_density(xsize, ysize, value), &mut points, &CartogramConfig::default());
        for (a, b) in before.iter().zip(&points) {
            prop_assert!(a.distance(*b) < 1e-10);
        }
    }
}

//! Accuracy regression tests for meridian-dtw.
//!
//! These tests pin DTW distances, warping paths and soft-DTW values so that
//! algorithmic changes cannot silently alter alignment results.

use meridian_dtw::{
    AlignmentConstraint, Dtw, SoftDtw, SquaredEuclidean, TimeSeries, WarpingStep, resample,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// ---------------------------------------------------------------------------
// Helper
// ---------------------------------------------------------------------------

fn ts(values: Vec<f64>) -> TimeSeries {
    TimeSeries::univariate(values).expect("valid test series")
}

fn random_series(rng: &mut ChaCha8Rng, len: usize) -> TimeSeries {
    ts((0..len).map(|_| rng.gen_range(-2.0..2.0)).collect())
}

fn steps(path: &[(usize, usize)]) -> Vec<WarpingStep> {
    path.iter().map(|&(a, b)| WarpingStep { a, b }).collect()
}

// ---------------------------------------------------------------------------
// a) dtw_distances_match_known_values
// ---------------------------------------------------------------------------

/// DTW distances for 10 synthetic univariate pairs.
#[test]
fn dtw_distances_match_known_values() {
    let pairs: Vec<(TimeSeries, TimeSeries)> = vec![
        (ts(vec![0.0, 0.0, 0.0]), ts(vec![1.0, 1.0, 1.0])),           // constant offset
        (ts(vec![0.0, 1.0, 0.0]), ts(vec![0.0, 0.0, 0.0])),           // single peak
        (ts(vec![1.0, 2.0, 3.0, 4.0]), ts(vec![1.0, 2.0, 3.0, 4.0])), // identical
        (ts(vec![1.0, 2.0, 3.0]), ts(vec![3.0, 2.0, 1.0])),           // reversed
        (ts(vec![0.0, 5.0, 0.0, 5.0]), ts(vec![5.0, 0.0, 5.0, 0.0])), // alternating
        (ts(vec![1.0]), ts(vec![5.0])),                               // single point
        (ts(vec![0.0, 0.0, 1.0]), ts(vec![1.0, 0.0, 0.0])),           // shifted peak
        (ts(vec![0.0, 1.0, 2.0, 3.0, 4.0]), ts(vec![0.0, 0.0, 0.0, 0.0, 4.0])), // late ramp
        (ts(vec![10.0, 10.0, 10.0]), ts(vec![10.1, 9.9, 10.0])),      // tiny perturbation
        (ts(vec![0.0, 3.0, 0.0, 3.0, 0.0]), ts(vec![3.0, 0.0, 3.0, 0.0, 3.0])), // opposite phase
    ];

    let expected: Vec<f64> = vec![
        1.7320508075688772,
        1.0,
        0.0,
        2.8284271247461903,
        7.0710678118654755,
        4.0,
        1.4142135623730951,
        2.449489742783178,
        0.141421356237309,
        4.242640687119285,
    ];

    let dtw = Dtw::unconstrained();
    for (i, ((a, b), &exp)) in pairs.iter().zip(expected.iter()).enumerate() {
        let dist = dtw.distance(a.as_view(), b.as_view()).unwrap().value();
        assert!(
            (dist - exp).abs() < 1e-10,
            "pair {i}: got {dist:.15}, expected {exp:.15}"
        );
    }
}

// ---------------------------------------------------------------------------
// b) warping_paths_match_known_values
// ---------------------------------------------------------------------------

/// Paths for unequal lengths, including the diagonal-first tie preference.
#[test]
fn warping_paths_match_known_values() {
    let dtw = Dtw::unconstrained();

    let (path, dist) = dtw
        .align(
            ts(vec![0.0, 0.0, 1.0, 2.0, 3.0]).as_view(),
            ts(vec![0.0, 1.0, 2.0, 3.0]).as_view(),
        )
        .unwrap();
    assert_eq!(path.steps(), steps(&[(0, 0), (1, 0), (2, 1), (3, 2), (4, 3)]));
    assert!(dist.value().abs() < 1e-12);

    let (path, dist) = dtw
        .align(
            ts(vec![1.0, 2.0, 3.0]).as_view(),
            ts(vec![1.0, 2.0, 3.0, 3.0, 3.0, 4.0]).as_view(),
        )
        .unwrap();
    assert_eq!(
        path.steps(),
        steps(&[(0, 0), (1, 1), (2, 2), (2, 3), (2, 4), (2, 5)])
    );
    assert!((dist.value() - 1.0).abs() < 1e-12);
}

// ---------------------------------------------------------------------------
// c) constrained_distance_geq_unconstrained
// ---------------------------------------------------------------------------

/// Any global constraint can only remove paths, never add cheaper ones.
#[test]
fn constrained_distance_geq_unconstrained() {
    let pairs: Vec<(TimeSeries, TimeSeries)> = vec![
        (ts(vec![0.0, 1.0, 2.0, 3.0]), ts(vec![3.0, 2.0, 1.0, 0.0])),
        (ts(vec![1.0, 5.0, 1.0, 5.0, 1.0]), ts(vec![5.0, 1.0, 5.0, 1.0, 5.0])),
        (ts(vec![0.0, 0.0, 0.0, 1.0]), ts(vec![1.0, 0.0, 0.0, 0.0])),
        (ts(vec![1.0, 2.0, 3.0, 4.0, 5.0]), ts(vec![5.0, 4.0, 3.0, 2.0, 1.0])),
        (ts(vec![10.0, 0.0, 10.0]), ts(vec![0.0, 10.0, 0.0])),
    ];

    let unconstrained = Dtw::unconstrained();
    let constrained = [Dtw::with_sakoe_chiba(1), Dtw::with_itakura(2.0)];

    for (i, (a, b)) in pairs.iter().enumerate() {
        let free = unconstrained.distance(a.as_view(), b.as_view()).unwrap().value();
        for dtw in &constrained {
            let d = dtw.distance(a.as_view(), b.as_view()).unwrap().value();
            assert!(
                d >= free - 1e-10,
                "pair {i} with {:?}: {d} < unconstrained {free}",
                dtw.constraint()
            );
        }
    }
}

// ---------------------------------------------------------------------------
// d) rolling_distance_matches_aligned_cost
// ---------------------------------------------------------------------------

/// `distance()` (two rolling rows) must agree with `align()` (full table) on
/// random pairs of unequal lengths, and the path must reproduce the cost.
#[test]
fn rolling_distance_matches_aligned_cost() {
    let mut rng = ChaCha8Rng::seed_from_u64(17);
    let dtw = Dtw::new(AlignmentConstraint::SakoeChiba { radius: 2 });

    for round in 0..25 {
        let n = rng.gen_range(1..12);
        let m = rng.gen_range(1..12);
        let a = random_series(&mut rng, n);
        let b = random_series(&mut rng, m);

        let rolling = dtw.distance(a.as_view(), b.as_view()).unwrap().value();
        let (path, full) = dtw.align(a.as_view(), b.as_view()).unwrap();
        assert!(
            (rolling - full.value()).abs() < 1e-10,
            "round {round}: rolling {rolling:.15} != full {:.15}",
            full.value()
        );

        let path_cost: f64 = path
            .steps()
            .iter()
            .map(|s| (a.sample(s.a)[0] - b.sample(s.b)[0]).powi(2))
            .sum();
        assert!((path_cost - full.squared()).abs() < 1e-9, "round {round}");
        assert_eq!(path.last(), Some(WarpingStep { a: n - 1, b: m - 1 }));
    }
}

// ---------------------------------------------------------------------------
// e) soft_dtw_bounds_hard_dtw
// ---------------------------------------------------------------------------

/// Soft-DTW never exceeds squared DTW and converges to it as gamma shrinks.
#[test]
fn soft_dtw_bounds_hard_dtw() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let dtw = Dtw::unconstrained();

    for _ in 0..10 {
        let a = random_series(&mut rng, 6);
        let b = random_series(&mut rng, 8);
        let hard = dtw.distance(a.as_view(), b.as_view()).unwrap().squared();
        let cost = SquaredEuclidean::new(a.as_view(), b.as_view()).unwrap();

        let mut previous_gap = f64::INFINITY;
        for gamma in [1.0, 0.1, 0.01, 0.001] {
            let soft = SoftDtw::compute(&cost, gamma).unwrap().value();
            let gap = hard - soft;
            assert!(gap >= -1e-10, "gamma {gamma}: soft {soft} > hard {hard}");
            assert!(gap <= previous_gap + 1e-10);
            previous_gap = gap;
        }
        assert!(previous_gap < 0.05);
    }
}

// ---------------------------------------------------------------------------
// f) resample_preserves_linear_series
// ---------------------------------------------------------------------------

/// A linear ramp stays a linear ramp under resampling in either direction.
#[test]
fn resample_preserves_linear_series() {
    let ramp = ts((0..9).map(|i| i as f64 * 0.25).collect());
    for new_len in [2, 5, 17] {
        let r = resample(ramp.as_view(), new_len).unwrap();
        assert_eq!(r.len(), new_len);
        for i in 0..new_len {
            let expected = 2.0 * i as f64 / (new_len - 1) as f64;
            assert!((r.sample(i)[0] - expected).abs() < 1e-12);
        }
    }
}

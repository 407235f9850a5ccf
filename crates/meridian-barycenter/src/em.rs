//! Shared expectation-maximization driver for the DBA engines.

use meridian_dtw::TimeSeries;
use tracing::{debug, info, warn};

use crate::error::BarycenterError;
use crate::result::{BarycenterResult, StopReason};

/// One alignment-then-update iteration of a DBA variant.
pub(crate) trait EmStep {
    /// Align the dataset against `barycenter` and return the weighted cost of
    /// that alignment together with the updated barycenter.
    fn step(&self, barycenter: &TimeSeries) -> Result<(f64, TimeSeries), BarycenterError>;
}

/// Stopping parameters of the EM loop.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EmSchedule {
    pub max_iter: usize,
    pub tol: f64,
    pub verbose: bool,
}

/// Iterate `step` from `seed` until the cost stabilizes, increases, or the
/// iteration budget runs out.
///
/// The barycenter is always updated before the stop check, so the returned
/// barycenter reflects the last alignment.
pub(crate) fn run<S: EmStep>(
    step: &S,
    seed: TimeSeries,
    schedule: EmSchedule,
) -> Result<BarycenterResult, BarycenterError> {
    let mut barycenter = seed;
    let mut cost_history = Vec::with_capacity(schedule.max_iter);
    let mut previous = f64::INFINITY;
    let mut stop = StopReason::MaxIter;

    for iteration in 0..schedule.max_iter {
        let (cost, updated) = step.step(&barycenter)?;
        barycenter = updated;
        cost_history.push(cost);

        if schedule.verbose {
            info!(iteration, cost, "DBA iteration complete");
        } else {
            debug!(iteration, cost, "DBA iteration complete");
        }

        if cost == previous || (previous - cost).abs() < schedule.tol {
            stop = StopReason::Converged;
            break;
        }
        if previous < cost {
            warn!(iteration, previous, cost, "DBA loss is increasing, stopping");
            stop = StopReason::Diverged;
            break;
        }
        previous = cost;
    }

    Ok(BarycenterResult {
        barycenter,
        iterations: cost_history.len(),
        cost_history,
        stop,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    /// Replays a fixed cost sequence and counts calls.
    struct Scripted {
        costs: Vec<f64>,
        calls: RefCell<usize>,
    }

    impl Scripted {
        fn new(costs: Vec<f64>) -> Self {
            Self {
                costs,
                calls: RefCell::new(0),
            }
        }
    }

    impl EmStep for Scripted {
        fn step(&self, barycenter: &TimeSeries) -> Result<(f64, TimeSeries), BarycenterError> {
            let mut calls = self.calls.borrow_mut();
            let cost = self.costs[*calls];
            *calls += 1;
            let next = TimeSeries::univariate(vec![barycenter.as_ref()[0] + 1.0])?;
            Ok((cost, next))
        }
    }

    fn seed() -> TimeSeries {
        TimeSeries::univariate(vec![0.0]).unwrap()
    }

    fn schedule(max_iter: usize, tol: f64) -> EmSchedule {
        EmSchedule {
            max_iter,
            tol,
            verbose: false,
        }
    }

    #[test]
    fn converges_when_delta_below_tol() {
        let step = Scripted::new(vec![5.0, 2.0, 1.999_999_9, 0.0]);
        let out = run(&step, seed(), schedule(10, 1e-5)).unwrap();
        assert_eq!(out.stop, StopReason::Converged);
        assert_eq!(out.iterations, 3);
        // Updated on every iteration, including the converging one.
        assert_eq!(out.barycenter.as_ref(), &[3.0]);
    }

    #[test]
    fn divergence_stops_after_update() {
        let step = Scripted::new(vec![5.0, 3.0, 4.0, 1.0]);
        let out = run(&step, seed(), schedule(10, 1e-5)).unwrap();
        assert_eq!(out.stop, StopReason::Diverged);
        assert_eq!(out.cost_history, vec![5.0, 3.0, 4.0]);
        assert_eq!(out.barycenter.as_ref(), &[3.0]);
    }

    #[test]
    fn max_iter_caps_loop() {
        let step = Scripted::new(vec![5.0, 4.0, 3.0, 2.0]);
        let out = run(&step, seed(), schedule(2, 1e-5)).unwrap();
        assert_eq!(out.stop, StopReason::MaxIter);
        assert_eq!(out.iterations, 2);
    }

    #[test]
    fn zero_budget_returns_seed() {
        let step = Scripted::new(vec![]);
        let out = run(&step, seed(), schedule(0, 1e-5)).unwrap();
        assert_eq!(out.barycenter, seed());
        assert!(out.cost_history.is_empty());
        assert_eq!(out.stop, StopReason::MaxIter);
    }

    #[test]
    fn equal_cost_converges_with_zero_tol() {
        let step = Scripted::new(vec![2.0, 2.0, 1.0]);
        let out = run(&step, seed(), schedule(10, 0.0)).unwrap();
        assert_eq!(out.stop, StopReason::Converged);
        assert_eq!(out.iterations, 2);
    }
}

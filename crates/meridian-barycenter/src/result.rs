//! Result types for DBA and soft-DTW barycenters.

use meridian_dtw::TimeSeries;
use serde::{Deserialize, Serialize};

use crate::minimize::MinimizeStatus;

/// Why an EM loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The cost changed by less than the tolerance.
    Converged,
    /// The cost increased; the loop stopped on the updated barycenter.
    Diverged,
    /// The iteration budget was exhausted.
    MaxIter,
}

/// Result of a DBA computation.
#[derive(Debug, Clone, Serialize)]
pub struct BarycenterResult {
    /// The barycenter after the last update.
    pub barycenter: TimeSeries,
    /// Weighted alignment cost measured at the start of each iteration, i.e.
    /// against the barycenter before that iteration's update.
    pub cost_history: Vec<f64>,
    /// Number of completed iterations.
    pub iterations: usize,
    /// Why the loop stopped.
    pub stop: StopReason,
}

impl BarycenterResult {
    /// Return the last recorded cost, if any iteration ran.
    #[must_use]
    pub fn final_cost(&self) -> Option<f64> {
        self.cost_history.last().copied()
    }

    /// Return true if the loop stopped because the cost stabilized.
    #[must_use]
    pub fn converged(&self) -> bool {
        self.stop == StopReason::Converged
    }
}

/// Result of a soft-DTW barycenter computation.
#[derive(Debug, Clone, Serialize)]
pub struct SoftDtwResult {
    /// The optimized barycenter.
    pub barycenter: TimeSeries,
    /// Weighted soft-DTW objective at the barycenter.
    pub objective: f64,
    /// Number of L-BFGS iterations performed.
    pub iterations: usize,
    /// How the optimizer terminated.
    pub status: MinimizeStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_cost_and_converged() {
        let result = BarycenterResult {
            barycenter: TimeSeries::univariate(vec![1.0]).unwrap(),
            cost_history: vec![3.0, 1.0],
            iterations: 2,
            stop: StopReason::Converged,
        };
        assert_eq!(result.final_cost(), Some(1.0));
        assert!(result.converged());
    }

    #[test]
    fn stop_reason_serializes_snake_case() {
        let json = serde_json::to_string(&StopReason::MaxIter).unwrap();
        assert_eq!(json, r#""max_iter""#);
    }
}

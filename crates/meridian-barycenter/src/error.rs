use meridian_dtw::DtwError;

/// Errors from the L-BFGS minimizer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MinimizeError {
    /// Returned when the starting point has no coordinates.
    #[error("cannot minimize over an empty point")]
    EmptyPoint,

    /// Returned when the objective value at an accepted point is NaN or infinite.
    #[error("objective is not finite at iteration {iteration}")]
    NonFiniteObjective {
        /// Iteration at which the value was observed (0 is the starting point).
        iteration: usize,
    },

    /// Returned when a gradient component at an accepted point is NaN or infinite.
    #[error("gradient is not finite at iteration {iteration}")]
    NonFiniteGradient {
        /// Iteration at which the gradient was observed (0 is the starting point).
        iteration: usize,
    },
}

/// Errors from barycenter computation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BarycenterError {
    /// Returned when no series are provided.
    #[error("dataset must contain at least one series")]
    EmptyDataset,

    /// Returned when an operation that needs equal-length series gets ragged input.
    #[error("series {index} has length {got}, expected {expected}")]
    UnequalLengths {
        /// Length of the first series.
        expected: usize,
        /// Length of the offending series.
        got: usize,
        /// Position of the offending series in the dataset.
        index: usize,
    },

    /// Returned when a seed barycenter or a series disagrees with the dataset dimension.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Dimension of the dataset.
        expected: usize,
        /// Dimension provided.
        got: usize,
    },

    /// Returned when a barycenter of zero samples is requested.
    #[error("barycenter size must be at least 1")]
    InvalidBarycenterSize,

    /// Returned when weights are negative, non-finite, or sum to zero.
    #[error("invalid weights: {reason}")]
    InvalidWeights {
        /// Which validation rule failed.
        reason: &'static str,
    },

    /// Returned when no series puts positive weight on a barycenter position.
    #[error("barycenter position {position} received no weighted alignment")]
    UnreachablePosition {
        /// The barycenter time index left without mass.
        position: usize,
    },

    /// Wraps an alignment error.
    #[error("alignment error: {0}")]
    Dtw(#[from] DtwError),

    /// Wraps a minimizer error from the soft-DTW engine.
    #[error("optimizer error: {0}")]
    Minimize(#[from] MinimizeError),
}

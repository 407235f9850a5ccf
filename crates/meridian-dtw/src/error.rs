//! Error types for series validation and alignment.

/// Errors from time series construction, alignment constraints and DTW.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DtwError {
    /// Returned when a series (or a dataset) has no samples.
    #[error("time series must be non-empty")]
    EmptySeries,

    /// Returned when a series contains NaN, infinity, or negative infinity.
    #[error("time series contains non-finite value at index {index}")]
    NonFiniteValue {
        /// Flat position of the first non-finite value found.
        index: usize,
    },

    /// Returned when the sample dimension is zero.
    #[error("sample dimension must be at least 1")]
    ZeroDimension,

    /// Returned when a flat buffer length is not a multiple of the dimension.
    #[error("buffer of length {len} cannot be split into samples of dimension {dim}")]
    RaggedBuffer {
        /// Length of the flat buffer.
        len: usize,
        /// Requested sample dimension.
        dim: usize,
    },

    /// Returned when two series (or a series and a dataset) disagree on dimension.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Dimension required by the other operand.
        expected: usize,
        /// Dimension actually provided.
        got: usize,
    },

    /// Returned when a constraint leaves no path from `(0, 0)` to `(n-1, m-1)`.
    #[error("alignment constraint admits no warping path for sizes {n}x{m}")]
    NoAdmissiblePath {
        /// Length of the first series.
        n: usize,
        /// Length of the second series.
        m: usize,
    },

    /// Returned when an Itakura slope is not finite or below 1.
    #[error("itakura max slope must be finite and >= 1, got {0}")]
    InvalidSlope(f64),

    /// Returned when a custom window shape does not match the aligned sizes.
    #[error("custom window shape is {rows}x{cols}, alignment needs {n}x{m}")]
    WindowShape {
        /// Rows of the custom window.
        rows: usize,
        /// Columns of the custom window.
        cols: usize,
        /// Length of the first series.
        n: usize,
        /// Length of the second series.
        m: usize,
    },

    /// Returned when a Soft-DTW smoothing parameter is not positive and finite.
    #[error("gamma must be positive and finite, got {0}")]
    InvalidGamma(f64),

    /// Returned when resampling to zero samples is requested.
    #[error("cannot resample to length 0")]
    ZeroLength,
}

//! Dynamic Time Warping primitives for barycenter averaging.
//!
//! Pure math library with no I/O. Provides validated time series and
//! datasets, global alignment constraints (Sakoe-Chiba, Itakura, custom
//! windows), DTW distance and optimal warping paths, soft-DTW with its
//! gradient, and linear resampling.

mod constraint;
mod dataset;
mod distance;
mod dtw;
mod error;
mod path;
mod resample;
mod series;
mod soft_dtw;

pub use constraint::{AlignmentConstraint, Window, WindowShape};
pub use dataset::Dataset;
pub use distance::DtwDistance;
pub use dtw::{Dtw, TieBreak};
pub use error::DtwError;
pub use path::{WarpingPath, WarpingStep};
pub use resample::resample;
pub use series::{TimeSeries, TimeSeriesView, sq_dist};
pub use soft_dtw::{AlignmentMatrix, SoftDtw, SquaredEuclidean, soft_align};

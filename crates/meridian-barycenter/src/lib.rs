//! Barycenters of time series under Euclidean, DTW and soft-DTW geometries.
//!
//! Provides the weighted Euclidean mean, DTW Barycenter Averaging with either
//! the majorize-minimize or the classic Petitjean update, and soft-DTW
//! barycenters optimized with L-BFGS. Alignment primitives come from
//! `meridian-dtw`.

mod assign;
mod config;
mod convenience;
mod em;
mod error;
mod euclidean;
mod init;
mod minimize;
mod mm;
mod petitjean;
mod result;
mod soft;
mod weights;

pub use assign::{Alignment, Orientation, align_all};
pub use config::{DbaConfig, DbaMethod, SoftDtwConfig};
pub use convenience::{
    dtw_barycenter_averaging, dtw_barycenter_averaging_petitjean, euclidean_barycenter,
    softdtw_barycenter,
};
pub use error::{BarycenterError, MinimizeError};
pub use euclidean::weighted_mean;
pub use init::initial_barycenter;
pub use minimize::{Minimum, MinimizeStatus, Objective, minimize};
pub use result::{BarycenterResult, SoftDtwResult, StopReason};
pub use soft::SoftDtwObjective;
pub use weights::Weights;

//! One-call barycenter functions over a slice of series.

use meridian_dtw::{Dataset, TimeSeries};

use crate::config::{DbaConfig, DbaMethod, SoftDtwConfig};
use crate::error::BarycenterError;
use crate::euclidean::weighted_mean;
use crate::weights::Weights;

/// Weighted Euclidean barycenter of equal-length series.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`BarycenterError::EmptyDataset`] | `series` is empty |
/// | [`BarycenterError::DimensionMismatch`] | The series do not share one dimension |
/// | [`BarycenterError::UnequalLengths`] | The series do not share one length |
/// | [`BarycenterError::InvalidWeights`] | Weights are negative, non-finite, or sum to zero |
pub fn euclidean_barycenter(
    series: &[TimeSeries],
    weights: Option<&[f64]>,
) -> Result<TimeSeries, BarycenterError> {
    let dataset = to_dataset(series)?;
    let weights = Weights::resolve(weights, dataset.len())?;
    weighted_mean(&dataset, &weights)
}

/// DBA barycenter with the majorize-minimize update, whatever method `config` names.
///
/// # Errors
///
/// Returns the errors of [`DbaConfig::average`], plus
/// [`BarycenterError::EmptyDataset`] and [`BarycenterError::DimensionMismatch`]
/// for an empty or mixed-dimension `series`.
pub fn dtw_barycenter_averaging(
    series: &[TimeSeries],
    config: &DbaConfig,
    weights: Option<&[f64]>,
    init: Option<&TimeSeries>,
) -> Result<TimeSeries, BarycenterError> {
    let dataset = to_dataset(series)?;
    let config = config.clone().with_method(DbaMethod::MajorizeMinimize);
    Ok(config.average(&dataset, weights, init)?.barycenter)
}

/// DBA barycenter with the classic Petitjean update, whatever method `config` names.
///
/// # Errors
///
/// Same as [`dtw_barycenter_averaging`].
pub fn dtw_barycenter_averaging_petitjean(
    series: &[TimeSeries],
    config: &DbaConfig,
    weights: Option<&[f64]>,
    init: Option<&TimeSeries>,
) -> Result<TimeSeries, BarycenterError> {
    let dataset = to_dataset(series)?;
    let config = config.clone().with_method(DbaMethod::Petitjean);
    Ok(config.average(&dataset, weights, init)?.barycenter)
}

/// Soft-DTW barycenter.
///
/// # Errors
///
/// Returns the errors of [`SoftDtwConfig::average`], plus
/// [`BarycenterError::EmptyDataset`] and [`BarycenterError::DimensionMismatch`]
/// for an empty or mixed-dimension `series`.
pub fn softdtw_barycenter(
    series: &[TimeSeries],
    config: &SoftDtwConfig,
    weights: Option<&[f64]>,
    init: Option<&TimeSeries>,
) -> Result<TimeSeries, BarycenterError> {
    let dataset = to_dataset(series)?;
    Ok(config.average(&dataset, weights, init)?.barycenter)
}

fn to_dataset(series: &[TimeSeries]) -> Result<Dataset, BarycenterError> {
    let first = series.first().ok_or(BarycenterError::EmptyDataset)?;
    if let Some(other) = series.iter().find(|s| s.dim() != first.dim()) {
        return Err(BarycenterError::DimensionMismatch {
            expected: first.dim(),
            got: other.dim(),
        });
    }
    Ok(Dataset::new(series.to_vec())?)
}

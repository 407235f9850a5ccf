//! Soft-DTW barycenter objective (Cuturi & Blondel 2017).

use meridian_dtw::{Dataset, TimeSeriesView, soft_align};
use rayon::prelude::*;

use crate::error::BarycenterError;
use crate::minimize::Objective;
use crate::weights::Weights;

/// Weighted sum of soft-DTW values between a candidate barycenter and every
/// series of a dataset.
///
/// The candidate is a flat row-major buffer of `size x dim` values.
#[derive(Debug, Clone, Copy)]
pub struct SoftDtwObjective<'a> {
    dataset: &'a Dataset,
    weights: &'a Weights,
    gamma: f64,
    size: usize,
}

impl<'a> SoftDtwObjective<'a> {
    /// Build the objective for barycenters of `size` samples.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`BarycenterError::Dtw`] | `gamma` is not positive and finite |
    /// | [`BarycenterError::InvalidBarycenterSize`] | `size == 0` |
    /// | [`BarycenterError::InvalidWeights`] | `weights` does not cover every series |
    pub fn new(
        dataset: &'a Dataset,
        weights: &'a Weights,
        gamma: f64,
        size: usize,
    ) -> Result<Self, BarycenterError> {
        if gamma <= 0.0 || !gamma.is_finite() {
            return Err(meridian_dtw::DtwError::InvalidGamma(gamma).into());
        }
        if size == 0 {
            return Err(BarycenterError::InvalidBarycenterSize);
        }
        if weights.len() != dataset.len() {
            return Err(BarycenterError::InvalidWeights {
                reason: "one weight per series is required",
            });
        }
        Ok(Self {
            dataset,
            weights,
            gamma,
            size,
        })
    }

    /// Return the number of coordinates of a candidate barycenter.
    #[must_use]
    pub fn n_params(&self) -> usize {
        self.size * self.dataset.dim()
    }
}

impl Objective for SoftDtwObjective<'_> {
    type Error = BarycenterError;

    fn evaluate(&self, x: &[f64], grad: &mut [f64]) -> Result<f64, BarycenterError> {
        let z = TimeSeriesView::new(x, self.dataset.dim())?;
        let gamma = self.gamma;
        let parts = self
            .dataset
            .series()
            .par_iter()
            .map(|series| soft_align(z, series.as_view(), gamma))
            .collect::<Result<Vec<_>, _>>()?;

        grad.fill(0.0);
        let mut value = 0.0;
        for ((v, g), &w) in parts.iter().zip(self.weights.as_slice()) {
            value += w * v;
            for (acc, gi) in grad.iter_mut().zip(g) {
                *acc += w * gi;
            }
        }
        Ok(value)
    }
}

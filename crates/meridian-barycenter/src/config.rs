//! Configuration builders for DBA and soft-DTW barycenters.

use meridian_dtw::{AlignmentConstraint, Dataset, Dtw, TimeSeries, resample};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::em::{self, EmSchedule};
use crate::error::BarycenterError;
use crate::euclidean::weighted_mean;
use crate::init::initial_barycenter;
use crate::minimize::minimize;
use crate::mm::MajorizeMinimizeStep;
use crate::petitjean::PetitjeanStep;
use crate::result::{BarycenterResult, SoftDtwResult};
use crate::soft::SoftDtwObjective;
use crate::weights::Weights;

/// DBA update rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DbaMethod {
    /// Closed-form majorize-minimize update over weighted warping matrices (default).
    #[default]
    MajorizeMinimize,
    /// Classic per-position averaging of aligned samples (Petitjean et al. 2011).
    Petitjean,
}

/// Configuration for DBA barycenter computation.
///
/// Construct via [`DbaConfig::new`], then chain `with_*` methods to override defaults.
///
/// # Defaults
///
/// | Parameter         | Default                          |
/// |-------------------|----------------------------------|
/// | `method`          | `DbaMethod::MajorizeMinimize`    |
/// | `barycenter_size` | native dataset length            |
/// | `max_iter`        | 30                               |
/// | `tol`             | 1e-5                             |
/// | `verbose`         | false                            |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbaConfig {
    constraint: AlignmentConstraint,
    method: DbaMethod,
    barycenter_size: Option<usize>,
    max_iter: usize,
    tol: f64,
    verbose: bool,
}

impl Default for DbaConfig {
    fn default() -> Self {
        Self::new(AlignmentConstraint::Unconstrained)
    }
}

impl DbaConfig {
    /// Create a DBA configuration aligning under `constraint`.
    #[must_use]
    pub fn new(constraint: AlignmentConstraint) -> Self {
        Self {
            constraint,
            method: DbaMethod::default(),
            barycenter_size: None,
            max_iter: 30,
            tol: 1e-5,
            verbose: false,
        }
    }

    /// Set the update rule.
    #[must_use]
    pub fn with_method(mut self, method: DbaMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the barycenter length. Ignored when a seed barycenter is passed to
    /// [`average`][Self::average].
    #[must_use]
    pub fn with_barycenter_size(mut self, size: usize) -> Self {
        self.barycenter_size = Some(size);
        self
    }

    /// Set the maximum number of EM iterations.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the convergence tolerance on the change in alignment cost.
    #[must_use]
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Report per-iteration cost at `info` level instead of `debug`.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Return the alignment constraint.
    #[must_use]
    pub fn constraint(&self) -> &AlignmentConstraint {
        &self.constraint
    }

    /// Return the update rule.
    #[must_use]
    pub fn method(&self) -> DbaMethod {
        self.method
    }

    /// Return the requested barycenter length, if any.
    #[must_use]
    pub fn barycenter_size(&self) -> Option<usize> {
        self.barycenter_size
    }

    /// Return the maximum number of EM iterations.
    #[must_use]
    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    /// Return the convergence tolerance.
    #[must_use]
    pub fn tol(&self) -> f64 {
        self.tol
    }

    /// Return true if per-iteration cost is logged at `info` level.
    #[must_use]
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Compute the DBA barycenter of `dataset`.
    ///
    /// The loop starts from `init` when given (its length then fixes the
    /// barycenter length), otherwise from the mean profile of the dataset
    /// resampled to `barycenter_size`. Each iteration aligns every series with
    /// the current barycenter, records the weighted alignment cost, and
    /// replaces the barycenter with the update of the configured method.
    /// Iteration stops when the cost changes by less than `tol`, when it
    /// increases (logged as a warning), or after `max_iter` iterations.
    ///
    /// A [`AlignmentConstraint::Custom`] window has one row per barycenter
    /// position and one column per series sample, for both methods. Its shape
    /// is checked against every series before the first iteration.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`BarycenterError::InvalidWeights`] | Weights are negative, non-finite, or sum to zero |
    /// | [`BarycenterError::InvalidBarycenterSize`] | The requested size is zero |
    /// | [`BarycenterError::DimensionMismatch`] | `init` has a different dimension than the dataset |
    /// | [`BarycenterError::UnreachablePosition`] | A barycenter position receives no weighted alignment |
    /// | [`BarycenterError::Dtw`] | The constraint is invalid, does not fit some series, or admits no path for it |
    #[instrument(skip_all, fields(n = dataset.len(), method = ?self.method, max_iter = self.max_iter))]
    pub fn average(
        &self,
        dataset: &Dataset,
        weights: Option<&[f64]>,
        init: Option<&TimeSeries>,
    ) -> Result<BarycenterResult, BarycenterError> {
        self.constraint.validate()?;
        let weights = Weights::resolve(weights, dataset.len())?;
        let seed = match init {
            Some(seed) => checked_seed(dataset, seed)?,
            None => {
                let size = self.barycenter_size.unwrap_or_else(|| dataset.max_len());
                initial_barycenter(dataset, size)?
            }
        };

        for series in dataset.iter() {
            self.constraint.check_shape(seed.len(), series.len())?;
        }

        let dtw = Dtw::new(self.constraint.clone());
        let schedule = EmSchedule {
            max_iter: self.max_iter,
            tol: self.tol,
            verbose: self.verbose,
        };
        let result = match self.method {
            DbaMethod::MajorizeMinimize => {
                let step = MajorizeMinimizeStep {
                    dataset,
                    weights: &weights,
                    dtw: &dtw,
                };
                em::run(&step, seed, schedule)?
            }
            DbaMethod::Petitjean => {
                let step = PetitjeanStep {
                    dataset,
                    weights: &weights,
                    dtw: &dtw,
                };
                em::run(&step, seed, schedule)?
            }
        };

        info!(
            iterations = result.iterations,
            cost = ?result.final_cost(),
            stop = ?result.stop,
            "DBA finished"
        );
        Ok(result)
    }
}

/// Configuration for soft-DTW barycenter computation.
///
/// # Defaults
///
/// | Parameter  | Default |
/// |------------|---------|
/// | `gamma`    | 1.0     |
/// | `max_iter` | 50      |
/// | `tol`      | 1e-3    |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftDtwConfig {
    gamma: f64,
    max_iter: usize,
    tol: f64,
}

impl Default for SoftDtwConfig {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl SoftDtwConfig {
    /// Create a soft-DTW configuration with smoothing `gamma`.
    #[must_use]
    pub fn new(gamma: f64) -> Self {
        Self {
            gamma,
            max_iter: 50,
            tol: 1e-3,
        }
    }

    /// Set the maximum number of L-BFGS iterations.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the optimizer tolerance.
    #[must_use]
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Return the smoothing parameter.
    #[must_use]
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Return the maximum number of L-BFGS iterations.
    #[must_use]
    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    /// Return the optimizer tolerance.
    #[must_use]
    pub fn tol(&self) -> f64 {
        self.tol
    }

    /// Compute the soft-DTW barycenter of `dataset`.
    ///
    /// Starts from `init` when given, otherwise from the Euclidean barycenter
    /// of the dataset (after resampling every series to the longest length
    /// when lengths differ), and minimizes the weighted soft-DTW objective
    /// with L-BFGS. With `max_iter == 0` the seed is returned unchanged.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`BarycenterError::Dtw`] | `gamma` is not positive and finite |
    /// | [`BarycenterError::InvalidWeights`] | Weights are negative, non-finite, or sum to zero |
    /// | [`BarycenterError::DimensionMismatch`] | `init` has a different dimension than the dataset |
    /// | [`BarycenterError::Minimize`] | The objective or its gradient is not finite |
    #[instrument(skip_all, fields(n = dataset.len(), gamma = self.gamma, max_iter = self.max_iter))]
    pub fn average(
        &self,
        dataset: &Dataset,
        weights: Option<&[f64]>,
        init: Option<&TimeSeries>,
    ) -> Result<SoftDtwResult, BarycenterError> {
        let weights = Weights::resolve(weights, dataset.len())?;
        let seed = match init {
            Some(seed) => checked_seed(dataset, seed)?,
            None => euclidean_seed(dataset, &weights)?,
        };
        let (size, dim) = (seed.len(), seed.dim());
        let objective = SoftDtwObjective::new(dataset, &weights, self.gamma, size)?;

        let minimum = minimize(&objective, seed.into_inner(), self.tol, self.max_iter)?;
        debug!(
            iterations = minimum.iterations,
            objective = minimum.value,
            status = ?minimum.status,
            "soft-DTW barycenter finished"
        );
        Ok(SoftDtwResult {
            barycenter: TimeSeries::new(minimum.x, dim)?,
            objective: minimum.value,
            iterations: minimum.iterations,
            status: minimum.status,
        })
    }
}

fn checked_seed(dataset: &Dataset, seed: &TimeSeries) -> Result<TimeSeries, BarycenterError> {
    if seed.dim() != dataset.dim() {
        return Err(BarycenterError::DimensionMismatch {
            expected: dataset.dim(),
            got: seed.dim(),
        });
    }
    Ok(seed.clone())
}

fn euclidean_seed(dataset: &Dataset, weights: &Weights) -> Result<TimeSeries, BarycenterError> {
    if dataset.is_equal_size() {
        return weighted_mean(dataset, weights);
    }
    let sz = dataset.max_len();
    let resampled = dataset
        .iter()
        .map(|s| resample(s.as_view(), sz))
        .collect::<Result<Vec<_>, _>>()?;
    weighted_mean(&Dataset::new(resampled)?, weights)
}

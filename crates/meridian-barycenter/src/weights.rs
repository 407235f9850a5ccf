//! Per-series weights.

use tracing::debug;

use crate::error::BarycenterError;

/// Validated per-series weights: finite, non-negative, with a positive sum.
#[derive(Debug, Clone, PartialEq)]
pub struct Weights {
    values: Vec<f64>,
    sum: f64,
}

impl Weights {
    /// Uniform weights (all ones) for `n` series.
    #[must_use]
    pub fn uniform(n: usize) -> Self {
        Self {
            values: vec![1.0; n],
            sum: n as f64,
        }
    }

    /// Resolve caller weights for `n` series.
    ///
    /// Missing weights, or weights whose length differs from `n`, fall back to
    /// [`uniform`][Self::uniform].
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`BarycenterError::EmptyDataset`] | `n == 0` |
    /// | [`BarycenterError::InvalidWeights`] | A weight is negative or non-finite, or the weights sum to zero |
    pub fn resolve(weights: Option<&[f64]>, n: usize) -> Result<Self, BarycenterError> {
        if n == 0 {
            return Err(BarycenterError::EmptyDataset);
        }
        let values = match weights {
            Some(w) if w.len() == n => w.to_vec(),
            Some(w) => {
                debug!(got = w.len(), expected = n, "weight count mismatch, using uniform weights");
                return Ok(Self::uniform(n));
            }
            None => return Ok(Self::uniform(n)),
        };
        if values.iter().any(|w| !w.is_finite()) {
            return Err(BarycenterError::InvalidWeights {
                reason: "weights must be finite",
            });
        }
        if values.iter().any(|&w| w < 0.0) {
            return Err(BarycenterError::InvalidWeights {
                reason: "weights must be non-negative",
            });
        }
        let sum: f64 = values.iter().sum();
        if sum <= 0.0 {
            return Err(BarycenterError::InvalidWeights {
                reason: "weights must have a positive sum",
            });
        }
        Ok(Self { values, sum })
    }

    /// Return the weight of series `i`.
    #[must_use]
    pub fn get(&self, i: usize) -> f64 {
        self.values[i]
    }

    /// Return the weights as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Return the total weight.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Return the number of weights.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Return true if there are no weights.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_weights_are_uniform() {
        let w = Weights::resolve(None, 3).unwrap();
        assert_eq!(w.as_slice(), &[1.0, 1.0, 1.0]);
        assert!((w.sum() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn mismatched_length_falls_back_to_uniform() {
        let w = Weights::resolve(Some(&[0.5, 0.5]), 4).unwrap();
        assert_eq!(w, Weights::uniform(4));
    }

    #[test]
    fn explicit_weights_kept() {
        let w = Weights::resolve(Some(&[0.75, 0.25]), 2).unwrap();
        assert_eq!(w.get(0), 0.75);
        assert!((w.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_weight_allowed_if_sum_positive() {
        assert!(Weights::resolve(Some(&[0.0, 2.0]), 2).is_ok());
    }

    #[test]
    fn rejects_negative_nan_and_zero_sum() {
        for bad in [[-1.0, 2.0], [f64::NAN, 1.0], [0.0, 0.0], [f64::INFINITY, 1.0]] {
            assert!(
                matches!(
                    Weights::resolve(Some(&bad), 2),
                    Err(BarycenterError::InvalidWeights { .. })
                ),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn zero_series_is_empty_dataset() {
        assert_eq!(Weights::resolve(None, 0), Err(BarycenterError::EmptyDataset));
    }
}

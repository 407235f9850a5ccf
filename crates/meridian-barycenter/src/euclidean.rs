//! Pointwise weighted mean of equal-length series.

use meridian_dtw::{Dataset, TimeSeries};

use crate::error::BarycenterError;
use crate::weights::Weights;

/// Weighted Euclidean barycenter: `b[t] = Σ_i w_i · x_i[t] / Σ_i w_i` for
/// every time index and dimension.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`BarycenterError::UnequalLengths`] | The series do not all share one length |
/// | [`BarycenterError::InvalidWeights`] | `weights` does not cover every series |
pub fn weighted_mean(dataset: &Dataset, weights: &Weights) -> Result<TimeSeries, BarycenterError> {
    let len = check_equal_lengths(dataset)?;
    if weights.len() != dataset.len() {
        return Err(BarycenterError::InvalidWeights {
            reason: "one weight per series is required",
        });
    }

    let mut values = vec![0.0; len * dataset.dim()];
    for (series, &w) in dataset.iter().zip(weights.as_slice()) {
        for (acc, &v) in values.iter_mut().zip(series.as_ref()) {
            *acc += w * v;
        }
    }
    let total = weights.sum();
    for v in &mut values {
        *v /= total;
    }
    Ok(TimeSeries::new(values, dataset.dim())?)
}

fn check_equal_lengths(dataset: &Dataset) -> Result<usize, BarycenterError> {
    let expected = dataset.series()[0].len();
    match dataset.iter().position(|s| s.len() != expected) {
        Some(index) => Err(BarycenterError::UnequalLengths {
            expected,
            got: dataset.series()[index].len(),
            index,
        }),
        None => Ok(expected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unweighted_mean() {
        let data = Dataset::univariate(vec![vec![1.0, 2.0, 3.0, 4.0], vec![1.0, 2.0, 4.0, 5.0]]).unwrap();
        let b = weighted_mean(&data, &Weights::uniform(2)).unwrap();
        assert_eq!(b.as_ref(), &[1.0, 2.0, 3.5, 4.5]);
    }

    #[test]
    fn weighted_mean_of_constant_series() {
        let data = Dataset::univariate(vec![vec![0.0; 3], vec![10.0; 3]]).unwrap();
        let w = Weights::resolve(Some(&[0.75, 0.25]), 2).unwrap();
        let b = weighted_mean(&data, &w).unwrap();
        for &v in b.as_ref() {
            assert!((v - 2.5).abs() < 1e-12);
        }
    }

    #[test]
    fn multivariate_shape() {
        let a = TimeSeries::new(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0], 2).unwrap();
        let b = TimeSeries::new(vec![2.0, 1.0, 0.0, 3.0, 4.0, 7.0], 2).unwrap();
        let data = Dataset::new(vec![a, b]).unwrap();
        let m = weighted_mean(&data, &Weights::uniform(2)).unwrap();
        assert_eq!((m.len(), m.dim()), (3, 2));
        assert_eq!(m.as_ref(), &[1.0, 1.0, 1.0, 3.0, 4.0, 6.0]);
    }

    #[test]
    fn ragged_input_fails_fast() {
        let data = Dataset::univariate(vec![vec![1.0, 2.0], vec![1.0, 2.0, 3.0]]).unwrap();
        assert_eq!(
            weighted_mean(&data, &Weights::uniform(2)),
            Err(BarycenterError::UnequalLengths { expected: 2, got: 3, index: 1 })
        );
    }
}

//! Multivariate time series types with validation guarantees.

use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::error::DtwError;

/// Owned, validated time series of `len` samples, each a vector of `dim` values.
///
/// Values are stored row-major: sample `t` occupies `values[t * dim..(t + 1) * dim]`.
/// Guaranteed non-empty with all values finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSeries", into = "RawSeries")]
pub struct TimeSeries {
    values: Vec<f64>,
    dim: usize,
}

impl TimeSeries {
    /// Create a new series from a row-major buffer of samples of dimension `dim`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::ZeroDimension`] | `dim` is zero |
    /// | [`DtwError::EmptySeries`] | `values` is empty |
    /// | [`DtwError::RaggedBuffer`] | `values.len()` is not a multiple of `dim` |
    /// | [`DtwError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn new(values: Vec<f64>, dim: usize) -> Result<Self, DtwError> {
        validate(&values, dim)?;
        Ok(Self { values, dim })
    }

    /// Create a univariate series (`dim == 1`).
    ///
    /// # Errors
    ///
    /// Same as [`TimeSeries::new`].
    pub fn univariate(values: Vec<f64>) -> Result<Self, DtwError> {
        Self::new(values, 1)
    }

    /// Create a series from one vector per sample.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::EmptySeries`] | `rows` is empty |
    /// | [`DtwError::ZeroDimension`] | The first sample is empty |
    /// | [`DtwError::DimensionMismatch`] | Samples disagree on dimension |
    /// | [`DtwError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, DtwError> {
        let dim = rows.first().ok_or(DtwError::EmptySeries)?.len();
        let mut values = Vec::with_capacity(rows.len() * dim);
        for row in rows {
            if row.len() != dim {
                return Err(DtwError::DimensionMismatch {
                    expected: dim,
                    got: row.len(),
                });
            }
            values.extend_from_slice(row);
        }
        Self::new(values, dim)
    }

    /// Build a series from values the caller already knows to be valid.
    pub(crate) fn from_parts_unchecked(values: Vec<f64>, dim: usize) -> Self {
        debug_assert!(validate(&values, dim).is_ok());
        Self { values, dim }
    }

    /// Borrow this series as a zero-copy view.
    #[must_use]
    pub fn as_view(&self) -> TimeSeriesView<'_> {
        TimeSeriesView::new_unchecked(&self.values, self.dim)
    }

    /// Return the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len() / self.dim
    }

    /// Return true if the series has no samples.
    ///
    /// A [`TimeSeries`] constructed via [`TimeSeries::new`] is always non-empty,
    /// so this always returns `false` for valid instances. Provided to satisfy
    /// the `len_without_is_empty` convention.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Return the dimension of each sample.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Return sample `t` as a slice of length `dim`.
    ///
    /// # Panics
    ///
    /// Panics if `t >= len`.
    #[must_use]
    pub fn sample(&self, t: usize) -> &[f64] {
        &self.values[t * self.dim..(t + 1) * self.dim]
    }

    /// Consume and return the row-major value buffer.
    #[must_use]
    pub fn into_inner(self) -> Vec<f64> {
        self.values
    }
}

impl AsRef<[f64]> for TimeSeries {
    fn as_ref(&self) -> &[f64] {
        &self.values
    }
}

impl TryFrom<Vec<f64>> for TimeSeries {
    type Error = DtwError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::univariate(values)
    }
}

/// Serialized form: `{ "dim": d, "values": [...] }`, validated on the way in.
#[derive(Serialize, Deserialize)]
struct RawSeries {
    dim: usize,
    values: Vec<f64>,
}

impl TryFrom<RawSeries> for TimeSeries {
    type Error = DtwError;

    fn try_from(raw: RawSeries) -> Result<Self, Self::Error> {
        Self::new(raw.values, raw.dim)
    }
}

impl From<TimeSeries> for RawSeries {
    fn from(series: TimeSeries) -> Self {
        Self {
            dim: series.dim,
            values: series.values,
        }
    }
}

/// Borrowed, validated view into a time series. Zero-copy reference.
#[derive(Debug, Clone, Copy)]
pub struct TimeSeriesView<'a> {
    values: &'a [f64],
    dim: usize,
}

impl<'a> TimeSeriesView<'a> {
    /// Create a new view, validating the buffer the same way as [`TimeSeries::new`].
    ///
    /// # Errors
    ///
    /// Same as [`TimeSeries::new`].
    pub fn new(values: &'a [f64], dim: usize) -> Result<Self, DtwError> {
        validate(values, dim)?;
        Ok(Self { values, dim })
    }

    /// Create a view without validation. For internal use where data is already validated.
    pub(crate) fn new_unchecked(values: &'a [f64], dim: usize) -> Self {
        Self { values, dim }
    }

    /// Return the underlying row-major slice.
    #[must_use]
    pub fn as_slice(&self) -> &'a [f64] {
        self.values
    }

    /// Return the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len() / self.dim
    }

    /// Return true if the view has no samples.
    ///
    /// A [`TimeSeriesView`] constructed via [`TimeSeriesView::new`] is always
    /// non-empty, so this always returns `false` for valid instances.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Return the dimension of each sample.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Return sample `t` as a slice of length `dim`.
    #[must_use]
    pub fn sample(&self, t: usize) -> &'a [f64] {
        &self.values[t * self.dim..(t + 1) * self.dim]
    }

    /// Copy the view into an owned series.
    #[must_use]
    pub fn to_series(&self) -> TimeSeries {
        TimeSeries::from_parts_unchecked(self.values.to_vec(), self.dim)
    }
}

/// Index by sample: `view[t]` is the `dim`-length slice of sample `t`.
impl Index<usize> for TimeSeriesView<'_> {
    type Output = [f64];

    fn index(&self, t: usize) -> &Self::Output {
        &self.values[t * self.dim..(t + 1) * self.dim]
    }
}

impl AsRef<[f64]> for TimeSeriesView<'_> {
    fn as_ref(&self) -> &[f64] {
        self.values
    }
}

fn validate(values: &[f64], dim: usize) -> Result<(), DtwError> {
    if dim == 0 {
        return Err(DtwError::ZeroDimension);
    }
    if values.is_empty() {
        return Err(DtwError::EmptySeries);
    }
    if values.len() % dim != 0 {
        return Err(DtwError::RaggedBuffer {
            len: values.len(),
            dim,
        });
    }
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(DtwError::NonFiniteValue { index });
    }
    Ok(())
}

/// Squared Euclidean distance between two samples of equal dimension.
#[inline]
pub fn sq_dist(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

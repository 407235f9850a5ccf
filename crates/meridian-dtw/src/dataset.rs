//! Collections of series that share a sample dimension.

use serde::{Deserialize, Serialize};

use crate::error::DtwError;
use crate::series::{TimeSeries, TimeSeriesView};

/// Non-empty ordered collection of series sharing one sample dimension.
///
/// Lengths may differ. The longest length is the dataset's native length,
/// i.e. the size a padded `(n, sz, d)` array would have.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TimeSeries>", into = "Vec<TimeSeries>")]
pub struct Dataset {
    series: Vec<TimeSeries>,
}

impl Dataset {
    /// Create a dataset, checking that it is non-empty and dimensionally consistent.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::EmptySeries`] | `series` is empty |
    /// | [`DtwError::DimensionMismatch`] | A series has a different dimension than the first |
    pub fn new(series: Vec<TimeSeries>) -> Result<Self, DtwError> {
        let dim = series.first().ok_or(DtwError::EmptySeries)?.dim();
        if let Some(bad) = series.iter().find(|s| s.dim() != dim) {
            return Err(DtwError::DimensionMismatch {
                expected: dim,
                got: bad.dim(),
            });
        }
        Ok(Self { series })
    }

    /// Create a univariate dataset from raw value vectors.
    ///
    /// # Errors
    ///
    /// Returns the first validation error of [`TimeSeries::univariate`], or
    /// [`DtwError::EmptySeries`] if `rows` is empty.
    pub fn univariate(rows: Vec<Vec<f64>>) -> Result<Self, DtwError> {
        let series = rows
            .into_iter()
            .map(TimeSeries::univariate)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(series)
    }

    /// Unpack a uniform row-major `(n, sz, dim)` array where trailing samples
    /// made entirely of NaN mark padding ("no value").
    ///
    /// Each series keeps the samples up to its last non-padding sample. NaN
    /// before that point is rejected.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::RaggedBuffer`] | `values.len() != n * sz * dim` |
    /// | [`DtwError::EmptySeries`] | `n == 0`, `sz == 0`, or a series is pure padding |
    /// | [`DtwError::NonFiniteValue`] | A value before the true end is not finite |
    pub fn from_padded(values: &[f64], n: usize, sz: usize, dim: usize) -> Result<Self, DtwError> {
        if dim == 0 {
            return Err(DtwError::ZeroDimension);
        }
        let ragged = DtwError::RaggedBuffer {
            len: values.len(),
            dim: sz.saturating_mul(dim),
        };
        let expected = n
            .checked_mul(sz)
            .and_then(|x| x.checked_mul(dim))
            .ok_or_else(|| ragged.clone())?;
        if values.len() != expected {
            return Err(ragged);
        }
        if n == 0 || sz == 0 {
            return Err(DtwError::EmptySeries);
        }
        let series = values
            .chunks_exact(sz * dim)
            .map(|block| {
                let len = true_length(block, dim);
                TimeSeries::new(block[..len * dim].to_vec(), dim)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(series)
    }

    /// Return the number of series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Always `false` for a constructed dataset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Return the shared sample dimension.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.series[0].dim()
    }

    /// Return the longest series length (the padded size).
    #[must_use]
    pub fn max_len(&self) -> usize {
        self.series.iter().map(TimeSeries::len).max().unwrap_or(0)
    }

    /// Return true if every series has the same length.
    #[must_use]
    pub fn is_equal_size(&self) -> bool {
        let first = self.series[0].len();
        self.series.iter().all(|s| s.len() == first)
    }

    /// Borrow the series.
    #[must_use]
    pub fn series(&self) -> &[TimeSeries] {
        &self.series
    }

    /// Borrow series `i`.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<&TimeSeries> {
        self.series.get(i)
    }

    /// Collect zero-copy views of every series.
    #[must_use]
    pub fn views(&self) -> Vec<TimeSeriesView<'_>> {
        self.series.iter().map(TimeSeries::as_view).collect()
    }

    /// Iterate over the series.
    pub fn iter(&self) -> std::slice::Iter<'_, TimeSeries> {
        self.series.iter()
    }

    /// Consume the dataset and return its series.
    #[must_use]
    pub fn into_inner(self) -> Vec<TimeSeries> {
        self.series
    }
}

impl TryFrom<Vec<TimeSeries>> for Dataset {
    type Error = DtwError;

    fn try_from(series: Vec<TimeSeries>) -> Result<Self, Self::Error> {
        Self::new(series)
    }
}

impl From<Dataset> for Vec<TimeSeries> {
    fn from(dataset: Dataset) -> Self {
        dataset.series
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a TimeSeries;
    type IntoIter = std::slice::Iter<'a, TimeSeries>;

    fn into_iter(self) -> Self::IntoIter {
        self.series.iter()
    }
}

/// Number of samples up to and including the last sample that is not all-NaN.
fn true_length(block: &[f64], dim: usize) -> usize {
    let mut len = block.len() / dim;
    while len > 0 && block[(len - 1) * dim..len * dim].iter().all(|v| v.is_nan()) {
        len -= 1;
    }
    len
}

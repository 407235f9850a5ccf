//! Starting barycenter for the iterative engines.

use meridian_dtw::{Dataset, TimeSeries, resample};

use crate::error::BarycenterError;

/// Mean profile of `dataset` at its native length, resampled to `size` samples.
///
/// At each time index only the series that reach that index contribute, so
/// ragged datasets are averaged without padding artefacts.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`BarycenterError::InvalidBarycenterSize`] | `size == 0` |
pub fn initial_barycenter(dataset: &Dataset, size: usize) -> Result<TimeSeries, BarycenterError> {
    if size == 0 {
        return Err(BarycenterError::InvalidBarycenterSize);
    }
    let profile = mean_profile(dataset)?;
    if profile.len() == size {
        return Ok(profile);
    }
    Ok(resample(profile.as_view(), size)?)
}

fn mean_profile(dataset: &Dataset) -> Result<TimeSeries, BarycenterError> {
    let dim = dataset.dim();
    let sz = dataset.max_len();
    let mut sums = vec![0.0; sz * dim];
    let mut counts = vec![0usize; sz];
    for series in dataset {
        for (acc, &v) in sums.iter_mut().zip(series.as_ref()) {
            *acc += v;
        }
        for c in &mut counts[..series.len()] {
            *c += 1;
        }
    }
    for (t, &count) in counts.iter().enumerate() {
        // Every index below max_len is reached by at least the longest series.
        for v in &mut sums[t * dim..(t + 1) * dim] {
            *v /= count as f64;
        }
    }
    Ok(TimeSeries::new(sums, dim)?)
}

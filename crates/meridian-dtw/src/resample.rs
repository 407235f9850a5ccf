//! Linear resampling of a series onto a new number of evenly spaced samples.

use crate::error::DtwError;
use crate::series::{TimeSeries, TimeSeriesView};

/// Resample `series` to `new_len` samples by per-dimension linear interpolation.
///
/// Both the source and target time axes are evenly spaced over `[0, 1]`, so
/// the first and last samples are always preserved. A single-sample source
/// is repeated; a single-sample target takes the first source sample.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DtwError::ZeroLength`] | `new_len == 0` |
pub fn resample(series: TimeSeriesView<'_>, new_len: usize) -> Result<TimeSeries, DtwError> {
    if new_len == 0 {
        return Err(DtwError::ZeroLength);
    }
    let dim = series.dim();
    let len = series.len();
    if len == new_len {
        return Ok(series.to_series());
    }

    let mut values = Vec::with_capacity(new_len * dim);
    for i in 0..new_len {
        let pos = if new_len == 1 || len == 1 {
            0.0
        } else {
            i as f64 * (len - 1) as f64 / (new_len - 1) as f64
        };
        let lo = (pos.floor() as usize).min(len - 1);
        let hi = (lo + 1).min(len - 1);
        let frac = pos - lo as f64;
        let (a, b) = (series.sample(lo), series.sample(hi));
        values.extend(a.iter().zip(b).map(|(x, y)| x + frac * (y - x)));
    }
    Ok(TimeSeries::from_parts_unchecked(values, dim))
}

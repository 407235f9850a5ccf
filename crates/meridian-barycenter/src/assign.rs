//! Alignment of every series of a dataset against a barycenter estimate.

use meridian_dtw::{Dataset, Dtw, TieBreak, TimeSeriesView, WarpingPath};
use rayon::prelude::*;
use tracing::{instrument, trace};

use crate::error::BarycenterError;

/// Operand order whose traceback tie-breaking an engine reproduces.
///
/// Alignments are always computed as `align(barycenter, series)`, so a
/// custom window has barycenter rows and series columns under either
/// orientation. When several optimal paths tie, [`Orientation::SeriesFirst`]
/// returns the path `align(series, barycenter)` would have found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Ties resolved as by `align(series, barycenter)`.
    SeriesFirst,
    /// Ties resolved as by `align(barycenter, series)`.
    BarycenterFirst,
}

impl Orientation {
    fn tie_break(self) -> TieBreak {
        match self {
            Self::SeriesFirst => TieBreak::AlongB,
            Self::BarycenterFirst => TieBreak::AlongA,
        }
    }
}

/// Optimal alignment of one series against the barycenter.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    /// Warping path with `a` indexing the barycenter and `b` the series.
    pub path: WarpingPath,
    /// Accumulated squared-Euclidean cost along the path.
    pub cost: f64,
}

/// Align every series of `dataset` with `barycenter`.
///
/// Series are processed in parallel with rayon; the returned vector is in
/// dataset order.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`BarycenterError::Dtw`] | A pair has no admissible path under the constraint, or dimensions differ |
#[instrument(level = "trace", skip_all, fields(n = dataset.len(), bsz = barycenter.len()))]
pub fn align_all(
    dtw: &Dtw,
    dataset: &Dataset,
    barycenter: TimeSeriesView<'_>,
    orientation: Orientation,
) -> Result<Vec<Alignment>, BarycenterError> {
    let dtw = dtw.clone().with_tie_break(orientation.tie_break());
    let alignments = dataset
        .series()
        .par_iter()
        .map(|series| {
            let (path, dist) = dtw.align(barycenter, series.as_view())?;
            Ok(Alignment {
                path,
                cost: dist.squared(),
            })
        })
        .collect::<Result<Vec<_>, BarycenterError>>()?;
    trace!(total_cost = alignments.iter().map(|a| a.cost).sum::<f64>(), "alignment step complete");
    Ok(alignments)
}

//! DTW distance and warping-path computation for multivariate series.

use tracing::instrument;

use crate::constraint::{AlignmentConstraint, Window};
use crate::distance::DtwDistance;
use crate::error::DtwError;
use crate::path::{WarpingPath, WarpingStep};
use crate::series::{TimeSeriesView, sq_dist};

/// Immutable DTW configuration.
///
/// The local cost between two samples is their squared Euclidean distance;
/// the reported distance is the square root of the optimal accumulated cost.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dtw {
    constraint: AlignmentConstraint,
    tie_break: TieBreak,
}

/// Traceback preference between the two non-diagonal moves when their
/// accumulated costs are equal. A diagonal move always wins a tie.
///
/// `align(a, b)` with [`TieBreak::AlongB`] returns exactly the transpose of
/// `align(b, a)` with [`TieBreak::AlongA`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreak {
    /// Prefer advancing in `a` (default).
    #[default]
    AlongA,
    /// Prefer advancing in `b`.
    AlongB,
}

impl Dtw {
    /// Create a DTW calculator from an [`AlignmentConstraint`].
    #[must_use]
    pub fn new(constraint: AlignmentConstraint) -> Self {
        Self {
            constraint,
            tie_break: TieBreak::default(),
        }
    }

    /// Set the traceback tie preference used by [`align`][Dtw::align].
    #[must_use]
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Create an unconstrained DTW calculator.
    #[must_use]
    pub fn unconstrained() -> Self {
        Self::new(AlignmentConstraint::Unconstrained)
    }

    /// Create a DTW calculator with a Sakoe-Chiba band.
    #[must_use]
    pub fn with_sakoe_chiba(radius: usize) -> Self {
        Self::new(AlignmentConstraint::SakoeChiba { radius })
    }

    /// Create a DTW calculator with an Itakura parallelogram.
    #[must_use]
    pub fn with_itakura(max_slope: f64) -> Self {
        Self::new(AlignmentConstraint::Itakura { max_slope })
    }

    /// Return the alignment constraint.
    #[must_use]
    pub fn constraint(&self) -> &AlignmentConstraint {
        &self.constraint
    }

    /// Return the traceback tie preference.
    #[must_use]
    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Compute the DTW distance between two series.
    ///
    /// Uses a rolling two-row buffer: O(n * m) time, O(m) space.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::DimensionMismatch`] | `a` and `b` have different sample dimensions |
    /// | [`DtwError::NoAdmissiblePath`] | The constraint disconnects `(0, 0)` from `(n-1, m-1)` |
    /// | [`DtwError::InvalidSlope`], [`DtwError::WindowShape`] | The constraint is invalid for these sizes |
    #[instrument(level = "trace", skip_all, fields(n = a.len(), m = b.len()))]
    pub fn distance(
        &self,
        a: TimeSeriesView<'_>,
        b: TimeSeriesView<'_>,
    ) -> Result<DtwDistance, DtwError> {
        check_dims(a, b)?;
        let (n, m) = (a.len(), b.len());
        let window = self.constraint.window(n, m)?;

        let mut prev = vec![f64::INFINITY; m];
        let mut curr = vec![f64::INFINITY; m];

        for i in 0..n {
            curr.fill(f64::INFINITY);
            for j in window.columns(i) {
                let best = if i == 0 && j == 0 {
                    0.0
                } else {
                    let diag = if i > 0 && j > 0 { prev[j - 1] } else { f64::INFINITY };
                    let above = if i > 0 { prev[j] } else { f64::INFINITY };
                    let left = if j > 0 { curr[j - 1] } else { f64::INFINITY };
                    diag.min(above).min(left)
                };
                curr[j] = sq_dist(a.sample(i), b.sample(j)) + best;
            }
            std::mem::swap(&mut prev, &mut curr);
        }

        // After the final swap, `prev` holds the last completed row.
        let total = prev[m - 1];
        if !total.is_finite() {
            return Err(DtwError::NoAdmissiblePath { n, m });
        }
        Ok(DtwDistance::from_cost(total))
    }

    /// Compute the optimal warping path and DTW distance between two series.
    ///
    /// Allocates the full `n x m` accumulated cost matrix and a direction byte
    /// per cell for traceback. Ties are broken in favour of the diagonal move,
    /// then as configured by [`TieBreak`] (along `a` by default).
    ///
    /// # Errors
    ///
    /// Same as [`distance`][Dtw::distance].
    #[instrument(level = "trace", skip_all, fields(n = a.len(), m = b.len()))]
    pub fn align(
        &self,
        a: TimeSeriesView<'_>,
        b: TimeSeriesView<'_>,
    ) -> Result<(WarpingPath, DtwDistance), DtwError> {
        check_dims(a, b)?;
        let (n, m) = (a.len(), b.len());
        let window = self.constraint.window(n, m)?;
        let (cost, dirs) = accumulate(a, b, &window, self.tie_break);

        let total = cost[n * m - 1];
        if !total.is_finite() {
            return Err(DtwError::NoAdmissiblePath { n, m });
        }

        // Traceback from (n-1, m-1) to (0, 0).
        let mut steps = Vec::with_capacity(n + m);
        let (mut i, mut j) = (n - 1, m - 1);
        loop {
            steps.push(WarpingStep { a: i, b: j });
            if i == 0 && j == 0 {
                break;
            }
            match dirs[i * m + j] {
                Move::Diagonal => {
                    i -= 1;
                    j -= 1;
                }
                Move::AlongA => i -= 1,
                Move::AlongB => j -= 1,
            }
        }
        steps.reverse();

        Ok((WarpingPath::new(steps), DtwDistance::from_cost(total)))
    }
}

#[derive(Debug, Clone, Copy)]
enum Move {
    Diagonal,
    AlongA,
    AlongB,
}

/// Fill the accumulated cost matrix (row-major, `INF` outside the window)
/// together with the predecessor move of every admissible cell.
fn accumulate(
    a: TimeSeriesView<'_>,
    b: TimeSeriesView<'_>,
    window: &Window,
    tie_break: TieBreak,
) -> (Vec<f64>, Vec<Move>) {
    let (n, m) = (a.len(), b.len());
    let mut cost = vec![f64::INFINITY; n * m];
    let mut dirs = vec![Move::Diagonal; n * m];

    for i in 0..n {
        for j in window.columns(i) {
            let c = sq_dist(a.sample(i), b.sample(j));
            let idx = i * m + j;
            if i == 0 && j == 0 {
                cost[idx] = c;
                continue;
            }

            let diag = if i > 0 && j > 0 { cost[idx - m - 1] } else { f64::INFINITY };
            let above = if i > 0 { cost[idx - m] } else { f64::INFINITY };
            let left = if j > 0 { cost[idx - 1] } else { f64::INFINITY };

            let (best, dir) = if diag <= above && diag <= left {
                (diag, Move::Diagonal)
            } else {
                let prefer_a = match tie_break {
                    TieBreak::AlongA => above <= left,
                    TieBreak::AlongB => above < left,
                };
                if prefer_a { (above, Move::AlongA) } else { (left, Move::AlongB) }
            };
            cost[idx] = c + best;
            dirs[idx] = dir;
        }
    }
    (cost, dirs)
}

fn check_dims(a: TimeSeriesView<'_>, b: TimeSeriesView<'_>) -> Result<(), DtwError> {
    if a.dim() != b.dim() {
        return Err(DtwError::DimensionMismatch {
            expected: a.dim(),
            got: b.dim(),
        });
    }
    Ok(())
}

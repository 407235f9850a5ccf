//! Global alignment constraints and the admissible windows they induce.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::DtwError;

/// Constraint on the DTW warping window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlignmentConstraint {
    /// No constraint: every cell of the cost matrix is admissible.
    #[default]
    Unconstrained,

    /// Sakoe-Chiba band of the given radius, widened by the length difference
    /// when the two series have different lengths.
    SakoeChiba {
        /// Band radius.
        radius: usize,
    },

    /// Itakura parallelogram with the given maximum slope (`>= 1`).
    Itakura {
        /// Maximum slope of the parallelogram.
        max_slope: f64,
    },

    /// Caller-provided window for one specific pair of lengths. Rows index
    /// the first operand of [`Dtw::align`][crate::Dtw::align] and columns the
    /// second; barycenter engines pass the barycenter first.
    Custom(WindowShape),
}

/// Explicit admissible region: for each row, a half-open column range.
///
/// Deserialization goes through [`WindowShape::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWindowShape", into = "RawWindowShape")]
pub struct WindowShape {
    cols: usize,
    rows: Vec<Range<usize>>,
}

impl WindowShape {
    /// Create a window with `rows.len()` rows over `cols` columns.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::WindowShape`] | A range is reversed or ends beyond `cols` |
    pub fn new(rows: Vec<Range<usize>>, cols: usize) -> Result<Self, DtwError> {
        if rows.iter().any(|r| r.start > r.end || r.end > cols) {
            return Err(DtwError::WindowShape {
                rows: rows.len(),
                cols,
                n: rows.len(),
                m: cols,
            });
        }
        Ok(Self { cols, rows })
    }

    /// Return the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Return the number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.cols
    }
}

#[derive(Serialize, Deserialize)]
struct RawWindowShape {
    cols: usize,
    rows: Vec<Range<usize>>,
}

impl TryFrom<RawWindowShape> for WindowShape {
    type Error = DtwError;

    fn try_from(raw: RawWindowShape) -> Result<Self, Self::Error> {
        Self::new(raw.rows, raw.cols)
    }
}

impl From<WindowShape> for RawWindowShape {
    fn from(shape: WindowShape) -> Self {
        Self {
            cols: shape.cols,
            rows: shape.rows,
        }
    }
}

impl AlignmentConstraint {
    /// Check the constraint's own parameters. Called once by engines at entry.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::InvalidSlope`] | Itakura slope not finite or below 1 |
    pub fn validate(&self) -> Result<(), DtwError> {
        match self {
            Self::Itakura { max_slope } if !max_slope.is_finite() || *max_slope < 1.0 => {
                Err(DtwError::InvalidSlope(*max_slope))
            }
            _ => Ok(()),
        }
    }

    /// Check that this constraint can be applied to an `n x m` alignment.
    ///
    /// Only [`AlignmentConstraint::Custom`] is tied to specific sizes.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::WindowShape`] | Custom window shape differs from `n x m` |
    pub fn check_shape(&self, n: usize, m: usize) -> Result<(), DtwError> {
        match self {
            Self::Custom(shape) if shape.n_rows() != n || shape.n_cols() != m => {
                Err(DtwError::WindowShape {
                    rows: shape.n_rows(),
                    cols: shape.n_cols(),
                    n,
                    m,
                })
            }
            _ => Ok(()),
        }
    }

    /// Build the admissible window for an `n x m` alignment.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`validate`][Self::validate] and
    /// [`check_shape`][Self::check_shape].
    pub fn window(&self, n: usize, m: usize) -> Result<Window, DtwError> {
        self.validate()?;
        self.check_shape(n, m)?;
        let rows = match self {
            Self::Unconstrained => vec![0..m; n],
            Self::SakoeChiba { radius } => sakoe_chiba_rows(n, m, *radius),
            Self::Itakura { max_slope } => itakura_rows(n, m, *max_slope),
            Self::Custom(shape) => shape.rows.clone(),
        };
        Ok(Window { cols: m, rows })
    }
}

/// Admissible cells of an `n x m` alignment, one column range per row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    cols: usize,
    rows: Vec<Range<usize>>,
}

impl Window {
    /// Return the admissible column range of `row`.
    #[must_use]
    pub fn columns(&self, row: usize) -> Range<usize> {
        self.rows[row].clone()
    }

    /// Return true if cell `(i, j)` may be visited.
    #[must_use]
    pub fn contains(&self, i: usize, j: usize) -> bool {
        self.rows.get(i).is_some_and(|r| r.contains(&j))
    }

    /// Return the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Return the number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.cols
    }
}

/// Sakoe-Chiba rows for possibly unequal lengths: the band is widened by
/// `|n - m|` on the side of the longer series so the end cell stays reachable.
fn sakoe_chiba_rows(n: usize, m: usize, radius: usize) -> Vec<Range<usize>> {
    (0..n)
        .map(|i| {
            if n <= m {
                let width = m - n + radius;
                i.saturating_sub(radius)..(i + width + 1).min(m)
            } else {
                let width = n - m + radius;
                i.saturating_sub(width)..(i + radius + 1).min(m)
            }
        })
        .collect()
}

/// Itakura parallelogram rows. Bounds are computed per column, rounded to two
/// decimals, then transposed into per-row ranges.
fn itakura_rows(n: usize, m: usize, max_slope: f64) -> Vec<Range<usize>> {
    let ratio = n as f64 / m as f64;
    let min_slope = ratio / max_slope;
    let max_slope = max_slope * ratio;
    let last_i = (n - 1) as f64;
    let last_j = (m - 1) as f64;

    let mut rows: Vec<Range<usize>> = vec![0..0; n];
    for j in 0..m {
        let jf = j as f64;
        let lower = round2(min_slope * jf)
            .max(round2(last_i - max_slope * last_j + max_slope * jf))
            .ceil()
            .max(0.0);
        let upper = (round2(max_slope * jf)
            .min(round2(last_i - min_slope * last_j + min_slope * jf))
            + 1.0)
            .floor()
            .min(n as f64);
        if upper <= lower {
            continue;
        }
        for row in &mut rows[lower as usize..upper as usize] {
            if row.is_empty() {
                *row = j..j + 1;
            } else {
                row.end = j + 1;
            }
        }
    }
    rows
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

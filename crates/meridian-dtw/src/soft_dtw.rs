//! Soft-DTW (Cuturi & Blondel 2017): a differentiable relaxation of DTW.
//!
//! The forward pass fills
//! `R[i][j] = D[i-1][j-1] + softmin_γ(R[i-1][j], R[i-1][j-1], R[i][j-1])`
//! with `R[0][0] = 0` and `+∞` on the other borders, where
//! `softmin_γ(a, b, c) = -γ log(e^{-a/γ} + e^{-b/γ} + e^{-c/γ})`.
//! The backward pass yields the expected alignment matrix `E = ∂R[n][m] / ∂D`,
//! which [`SquaredEuclidean::jacobian_product`] maps back onto the first series.

use crate::error::DtwError;
use crate::series::{TimeSeriesView, sq_dist};

/// Dense pairwise squared-Euclidean cost matrix between the samples of `x` and `y`.
#[derive(Debug, Clone)]
pub struct SquaredEuclidean<'a> {
    x: TimeSeriesView<'a>,
    y: TimeSeriesView<'a>,
    values: Vec<f64>,
}

impl<'a> SquaredEuclidean<'a> {
    /// Build the `x.len() x y.len()` cost matrix.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::DimensionMismatch`] | `x` and `y` have different sample dimensions |
    pub fn new(x: TimeSeriesView<'a>, y: TimeSeriesView<'a>) -> Result<Self, DtwError> {
        if x.dim() != y.dim() {
            return Err(DtwError::DimensionMismatch {
                expected: x.dim(),
                got: y.dim(),
            });
        }
        let values = (0..x.len())
            .flat_map(|i| (0..y.len()).map(move |j| sq_dist(x.sample(i), y.sample(j))))
            .collect();
        Ok(Self { x, y, values })
    }

    /// Return the number of rows (samples of `x`).
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.x.len()
    }

    /// Return the number of columns (samples of `y`).
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.y.len()
    }

    /// Return the cost between sample `i` of `x` and sample `j` of `y`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.y.len() + j]
    }

    /// Return the row-major cost values.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Chain rule through the cost matrix: given `E = ∂L/∂D`, return `∂L/∂x`
    /// as a row-major `x.len() x dim` buffer.
    ///
    /// `G[i][k] = Σ_j E[i][j] · 2 · (x[i][k] − y[j][k])`.
    ///
    /// # Panics
    ///
    /// Panics if `e` is not `n_rows x n_cols`.
    #[must_use]
    pub fn jacobian_product(&self, e: &AlignmentMatrix) -> Vec<f64> {
        assert_eq!(
            (e.n_rows, e.n_cols),
            (self.n_rows(), self.n_cols()),
            "alignment matrix shape does not match cost matrix"
        );
        let dim = self.x.dim();
        let mut grad = vec![0.0; self.x.len() * dim];
        for i in 0..self.x.len() {
            let xi = self.x.sample(i);
            let gi = &mut grad[i * dim..(i + 1) * dim];
            for j in 0..self.y.len() {
                let w = 2.0 * e.get(i, j);
                if w == 0.0 {
                    continue;
                }
                for ((g, xv), yv) in gi.iter_mut().zip(xi).zip(self.y.sample(j)) {
                    *g += w * (xv - yv);
                }
            }
        }
        grad
    }
}

/// Dense `n x m` matrix of soft alignment weights returned by [`SoftDtw::grad`].
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentMatrix {
    n_rows: usize,
    n_cols: usize,
    values: Vec<f64>,
}

impl AlignmentMatrix {
    /// Return the weight of cell `(i, j)`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.n_cols + j]
    }

    /// Return the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Return the number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }
}

/// Forward soft-DTW table over a cost matrix, ready for value and gradient queries.
#[derive(Debug, Clone)]
pub struct SoftDtw<'d> {
    cost: &'d [f64],
    n: usize,
    m: usize,
    gamma: f64,
    /// `(n + 2) x (m + 2)` table; the extra row and column are used by the backward pass.
    r: Vec<f64>,
}

impl<'d> SoftDtw<'d> {
    /// Run the forward dynamic program over `cost` with smoothing `gamma`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::InvalidGamma`] | `gamma` is not positive and finite |
    pub fn compute(cost: &'d SquaredEuclidean<'_>, gamma: f64) -> Result<Self, DtwError> {
        if gamma <= 0.0 || !gamma.is_finite() {
            return Err(DtwError::InvalidGamma(gamma));
        }
        let (n, m) = (cost.n_rows(), cost.n_cols());
        let w = m + 2;
        let mut r = vec![f64::INFINITY; (n + 2) * w];
        r[0] = 0.0;
        for i in 1..=n {
            for j in 1..=m {
                let d = cost.values[(i - 1) * m + (j - 1)];
                r[i * w + j] =
                    d + softmin3(gamma, r[(i - 1) * w + j], r[(i - 1) * w + j - 1], r[i * w + j - 1]);
            }
        }
        Ok(Self {
            cost: &cost.values,
            n,
            m,
            gamma,
            r,
        })
    }

    /// Return the soft-DTW value `R[n][m]`.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.r[self.n * (self.m + 2) + self.m]
    }

    /// Backward pass: the gradient of [`value`][Self::value] with respect to
    /// every entry of the cost matrix.
    #[must_use]
    pub fn grad(&self) -> AlignmentMatrix {
        let (n, m, gamma) = (self.n, self.m, self.gamma);
        let w = m + 2;
        // Cost padded with a zero row and column so the recursion needs no bounds checks.
        let d = |i: usize, j: usize| -> f64 {
            if i < n && j < m { self.cost[i * m + j] } else { 0.0 }
        };

        let mut r = self.r.clone();
        for i in 1..=n {
            r[i * w + m + 1] = f64::NEG_INFINITY;
        }
        for j in 1..=m {
            r[(n + 1) * w + j] = f64::NEG_INFINITY;
        }
        r[(n + 1) * w + m + 1] = r[n * w + m];

        let mut e = vec![0.0; (n + 2) * w];
        e[(n + 1) * w + m + 1] = 1.0;

        for j in (1..=m).rev() {
            for i in (1..=n).rev() {
                let here = r[i * w + j];
                let a = ((r[(i + 1) * w + j] - here - d(i, j - 1)) / gamma).exp();
                let b = ((r[i * w + j + 1] - here - d(i - 1, j)) / gamma).exp();
                let c = ((r[(i + 1) * w + j + 1] - here - d(i, j)) / gamma).exp();
                e[i * w + j] = e[(i + 1) * w + j] * a + e[i * w + j + 1] * b + e[(i + 1) * w + j + 1] * c;
            }
        }

        let values = (1..=n)
            .flat_map(|i| e[i * w + 1..i * w + 1 + m].iter().copied())
            .collect();
        AlignmentMatrix {
            n_rows: n,
            n_cols: m,
            values,
        }
    }
}

/// Soft-DTW value and gradient with respect to the samples of `x`.
///
/// # Errors
///
/// Returns the errors of [`SquaredEuclidean::new`] and [`SoftDtw::compute`].
pub fn soft_align(
    x: TimeSeriesView<'_>,
    y: TimeSeriesView<'_>,
    gamma: f64,
) -> Result<(f64, Vec<f64>), DtwError> {
    let cost = SquaredEuclidean::new(x, y)?;
    let sdtw = SoftDtw::compute(&cost, gamma)?;
    let grad = cost.jacobian_product(&sdtw.grad());
    Ok((sdtw.value(), grad))
}

fn softmin3(gamma: f64, a: f64, b: f64, c: f64) -> f64 {
    // log-sum-exp stabilization.
    let xa = -a / gamma;
    let xb = -b / gamma;
    let xc = -c / gamma;
    let max = xa.max(xb).max(xc);
    if !max.is_finite() {
        return f64::INFINITY;
    }
    let s = (xa - max).exp() + (xb - max).exp() + (xc - max).exp();
    -gamma * (max + s.ln())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtw::Dtw;
    use crate::series::TimeSeries;

    fn ts(values: Vec<f64>) -> TimeSeries {
        TimeSeries::univariate(values).unwrap()
    }

    fn value(x: &TimeSeries, y: &TimeSeries, gamma: f64) -> f64 {
        let cost = SquaredEuclidean::new(x.as_view(), y.as_view()).unwrap();
        SoftDtw::compute(&cost, gamma).unwrap().value()
    }

    #[test]
    fn cost_matrix_entries() {
        let x = TimeSeries::new(vec![0.0, 0.0, 1.0, 1.0], 2).unwrap();
        let y = TimeSeries::new(vec![1.0, 0.0], 2).unwrap();
        let d = SquaredEuclidean::new(x.as_view(), y.as_view()).unwrap();
        assert_eq!((d.n_rows(), d.n_cols()), (2, 1));
        assert!((d.get(0, 0) - 1.0).abs() < 1e-12);
        assert!((d.get(1, 0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn known_values_small_gamma() {
        let a = ts(vec![1.0, 2.0, 2.0, 3.0]);
        let b = ts(vec![1.0, 2.0, 3.0, 4.0]);
        assert!((value(&a, &a, 0.01) - (-0.010986)).abs() < 1e-5);
        assert!((value(&a, &b, 0.01) - 1.0).abs() < 1e-5);
        assert!((value(&b, &b, 0.01)).abs() < 1e-5);
    }

    #[test]
    fn approaches_dtw_from_below() {
        let a = ts(vec![0.2, -0.1, 0.5, 0.0]);
        let b = ts(vec![0.1, 0.4, -0.2]);
        let gamma = 1e-3;
        let dtw = Dtw::unconstrained().distance(a.as_view(), b.as_view()).unwrap().squared();
        let soft = value(&a, &b, gamma);
        let slack = 7.0 * gamma * 3.0_f64.ln();
        assert!(soft <= dtw + 1e-12);
        assert!(dtw - soft <= slack + 1e-9);
    }

    #[test]
    fn rejects_bad_gamma() {
        let a = ts(vec![1.0]);
        let cost = SquaredEuclidean::new(a.as_view(), a.as_view()).unwrap();
        assert!(matches!(SoftDtw::compute(&cost, 0.0), Err(DtwError::InvalidGamma(_))));
        assert!(matches!(
            SoftDtw::compute(&cost, f64::NAN),
            Err(DtwError::InvalidGamma(_))
        ));
    }

    #[test]
    fn alignment_matrix_endpoints_are_certain() {
        let a = ts(vec![1.0, 3.0, 2.0]);
        let b = ts(vec![2.0, 0.0, 1.0, 4.0]);
        let cost = SquaredEuclidean::new(a.as_view(), b.as_view()).unwrap();
        let e = SoftDtw::compute(&cost, 0.5).unwrap().grad();
        assert!((e.get(0, 0) - 1.0).abs() < 1e-10);
        assert!((e.get(2, 3) - 1.0).abs() < 1e-10);
        for i in 0..3 {
            for j in 0..4 {
                assert!(e.get(i, j) >= 0.0 && e.get(i, j) <= 1.0 + 1e-10);
            }
        }
    }

    #[test]
    fn gradient_matches_finite_differences() {
        let z = vec![0.5, -1.0, 1.5, 0.0, 2.0, 1.0];
        let y = TimeSeries::new(vec![0.0, 0.0, 1.0, -0.5, 1.0, 1.0, 2.5, 0.5], 2).unwrap();
        let gamma = 0.7;
        let zv = TimeSeriesView::new(&z, 2).unwrap();
        let (_, grad) = soft_align(zv, y.as_view(), gamma).unwrap();

        let h = 1e-6;
        for k in 0..z.len() {
            let mut plus = z.clone();
            let mut minus = z.clone();
            plus[k] += h;
            minus[k] -= h;
            let fp = soft_align(TimeSeriesView::new(&plus, 2).unwrap(), y.as_view(), gamma).unwrap().0;
            let fm = soft_align(TimeSeriesView::new(&minus, 2).unwrap(), y.as_view(), gamma).unwrap().0;
            let numeric = (fp - fm) / (2.0 * h);
            assert!(
                (numeric - grad[k]).abs() < 1e-5,
                "coordinate {k}: analytic {} vs numeric {numeric}",
                grad[k]
            );
        }
    }
}

//! Limited-memory BFGS minimizer with a backtracking Armijo line search.
//!
//! Termination follows the usual L-BFGS-B conventions:
//!
//! - relative objective reduction `(f_k - f_{k+1}) / max(|f_k|, |f_{k+1}|, 1) <= tol`
//!   ([`MinimizeStatus::Converged`]);
//! - largest absolute gradient component `<= tol` ([`MinimizeStatus::GradientTolerance`]);
//! - `max_iter` iterations ([`MinimizeStatus::MaxIter`]);
//! - no step satisfying the sufficient-decrease condition
//!   ([`MinimizeStatus::LineSearchFailed`]), in which case the best point found
//!   so far is returned.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::error::MinimizeError;

const MEMORY: usize = 10;
const ARMIJO_C1: f64 = 1e-4;
const MAX_BACKTRACKS: usize = 30;

/// A differentiable objective.
pub trait Objective {
    /// Error type of a single evaluation; must absorb minimizer errors.
    type Error: From<MinimizeError>;

    /// Return the objective at `x` and write its gradient into `grad`
    /// (same length as `x`).
    fn evaluate(&self, x: &[f64], grad: &mut [f64]) -> Result<f64, Self::Error>;
}

/// How the minimizer terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinimizeStatus {
    /// Relative objective reduction fell below the tolerance.
    Converged,
    /// Gradient sup-norm fell below the tolerance.
    GradientTolerance,
    /// The iteration budget was exhausted.
    MaxIter,
    /// The line search could not find a sufficient decrease.
    LineSearchFailed,
}

/// Final point of a minimization.
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    /// Best point found.
    pub x: Vec<f64>,
    /// Objective at `x`.
    pub value: f64,
    /// Number of accepted steps.
    pub iterations: usize,
    /// Termination reason.
    pub status: MinimizeStatus,
}

/// Minimize `objective` starting from `x0`.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`MinimizeError::EmptyPoint`] | `x0` is empty |
/// | [`MinimizeError::NonFiniteObjective`] | The objective at `x0` is NaN or infinite |
/// | [`MinimizeError::NonFiniteGradient`] | The gradient at `x0` or at an accepted point is not finite |
///
/// Errors returned by [`Objective::evaluate`] are propagated unchanged.
#[instrument(level = "debug", skip_all, fields(n = x0.len(), tol, max_iter))]
pub fn minimize<O: Objective>(
    objective: &O,
    x0: Vec<f64>,
    tol: f64,
    max_iter: usize,
) -> Result<Minimum, O::Error> {
    if x0.is_empty() {
        return Err(MinimizeError::EmptyPoint.into());
    }
    let n = x0.len();
    let mut x = x0;
    let mut g = vec![0.0; n];
    let mut f = objective.evaluate(&x, &mut g)?;
    if !f.is_finite() {
        return Err(MinimizeError::NonFiniteObjective { iteration: 0 }.into());
    }
    if !g.iter().all(|v| v.is_finite()) {
        return Err(MinimizeError::NonFiniteGradient { iteration: 0 }.into());
    }

    let mut history = History::default();
    let mut status = MinimizeStatus::MaxIter;
    let mut iterations = 0;

    let mut x_new = vec![0.0; n];
    let mut g_new = vec![0.0; n];

    while iterations < max_iter {
        if sup_norm(&g) <= tol {
            status = MinimizeStatus::GradientTolerance;
            break;
        }

        let mut direction = history.direction(&g);
        let mut slope = dot(&g, &direction);
        if slope >= 0.0 {
            // Curvature pairs produced an ascent direction; restart from steepest descent.
            history.clear();
            direction = g.iter().map(|v| -v).collect();
            slope = -dot(&g, &g);
        }

        let mut step = if history.is_empty() {
            (1.0 / norm(&g)).min(1.0)
        } else {
            1.0
        };
        let mut f_new = f64::NAN;
        let mut accepted = false;
        for _ in 0..MAX_BACKTRACKS {
            for ((xn, xi), di) in x_new.iter_mut().zip(&x).zip(&direction) {
                *xn = xi + step * di;
            }
            f_new = objective.evaluate(&x_new, &mut g_new)?;
            if f_new.is_finite() && f_new <= f + ARMIJO_C1 * step * slope {
                accepted = true;
                break;
            }
            step *= 0.5;
        }
        if !accepted {
            debug!(iterations, value = f, "line search failed");
            status = MinimizeStatus::LineSearchFailed;
            break;
        }
        if !g_new.iter().all(|v| v.is_finite()) {
            return Err(MinimizeError::NonFiniteGradient {
                iteration: iterations + 1,
            }
            .into());
        }

        let s: Vec<f64> = x_new.iter().zip(&x).map(|(a, b)| a - b).collect();
        let y: Vec<f64> = g_new.iter().zip(&g).map(|(a, b)| a - b).collect();
        history.push(s, y);

        let reduction = (f - f_new) / f.abs().max(f_new.abs()).max(1.0);
        std::mem::swap(&mut x, &mut x_new);
        std::mem::swap(&mut g, &mut g_new);
        f = f_new;
        iterations += 1;
        trace!(iterations, value = f, step, "L-BFGS step accepted");

        if reduction <= tol {
            status = MinimizeStatus::Converged;
            break;
        }
    }

    debug!(iterations, value = f, ?status, "L-BFGS finished");
    Ok(Minimum {
        x,
        value: f,
        iterations,
        status,
    })
}

/// Most recent curvature pairs `(s, y, 1 / s·y)`.
#[derive(Debug, Default)]
struct History {
    pairs: VecDeque<(Vec<f64>, Vec<f64>, f64)>,
}

impl History {
    fn push(&mut self, s: Vec<f64>, y: Vec<f64>) {
        let sy = dot(&s, &y);
        // Skip pairs that would break positive definiteness.
        if sy <= 1e-10 * dot(&y, &y) || sy <= 0.0 {
            return;
        }
        if self.pairs.len() == MEMORY {
            self.pairs.pop_front();
        }
        self.pairs.push_back((s, y, 1.0 / sy));
    }

    fn clear(&mut self) {
        self.pairs.clear();
    }

    fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Two-loop recursion: return `-H g`.
    fn direction(&self, g: &[f64]) -> Vec<f64> {
        let mut q = g.to_vec();
        let mut alphas = Vec::with_capacity(self.pairs.len());
        for (s, y, rho) in self.pairs.iter().rev() {
            let alpha = rho * dot(s, &q);
            axpy(-alpha, y, &mut q);
            alphas.push(alpha);
        }
        if let Some((s, y, _)) = self.pairs.back() {
            let scale = dot(s, y) / dot(y, y);
            q.iter_mut().for_each(|v| *v *= scale);
        }
        for ((s, y, rho), alpha) in self.pairs.iter().zip(alphas.iter().rev()) {
            let beta = rho * dot(y, &q);
            axpy(alpha - beta, s, &mut q);
        }
        q.iter_mut().for_each(|v| *v = -*v);
        q
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

fn sup_norm(a: &[f64]) -> f64 {
    a.iter().fold(0.0, |m, v| m.max(v.abs()))
}

fn axpy(alpha: f64, x: &[f64], y: &mut [f64]) {
    for (yi, xi) in y.iter_mut().zip(x) {
        *yi += alpha * xi;
    }
}

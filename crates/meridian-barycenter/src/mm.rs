//! Majorize-Minimize DBA update (Schultz & Jain 2018).
//!
//! Each series `k` contributes a warping matrix `W_k` (its path, scaled by the
//! series weight) and the barycenter is the closed-form minimizer
//! `b = diag(1 / valence) · Σ_k W_k · x_k`, where `valence[t]` is the total
//! weight aligned to position `t`. Warping matrices are kept as path pairs.

use meridian_dtw::{Dataset, Dtw, TimeSeries};

use crate::assign::{Alignment, Orientation, align_all};
use crate::em::EmStep;
use crate::error::BarycenterError;
use crate::weights::Weights;

pub(crate) struct MajorizeMinimizeStep<'a> {
    pub dataset: &'a Dataset,
    pub weights: &'a Weights,
    pub dtw: &'a Dtw,
}

impl MajorizeMinimizeStep<'_> {
    /// Weighted sum of aligned samples and per-position valence.
    fn accumulate(&self, alignments: &[Alignment], size: usize) -> (Vec<f64>, Vec<f64>) {
        let dim = self.dataset.dim();
        let mut warped = vec![0.0; size * dim];
        let mut valence = vec![0.0; size];
        for ((alignment, series), &w) in alignments
            .iter()
            .zip(self.dataset.iter())
            .zip(self.weights.as_slice())
        {
            for step in &alignment.path {
                valence[step.a] += w;
                let out = &mut warped[step.a * dim..(step.a + 1) * dim];
                for (acc, &v) in out.iter_mut().zip(series.sample(step.b)) {
                    *acc += w * v;
                }
            }
        }
        (warped, valence)
    }
}

impl EmStep for MajorizeMinimizeStep<'_> {
    fn step(&self, barycenter: &TimeSeries) -> Result<(f64, TimeSeries), BarycenterError> {
        let alignments = align_all(
            self.dtw,
            self.dataset,
            barycenter.as_view(),
            Orientation::BarycenterFirst,
        )?;
        let cost = alignments
            .iter()
            .zip(self.weights.as_slice())
            .map(|(a, &w)| w * a.cost)
            .sum::<f64>()
            / self.weights.sum();

        let dim = barycenter.dim();
        let (mut values, valence) = self.accumulate(&alignments, barycenter.len());
        for (t, &v) in valence.iter().enumerate() {
            if v <= 0.0 {
                return Err(BarycenterError::UnreachablePosition { position: t });
            }
            for x in &mut values[t * dim..(t + 1) * dim] {
                *x /= v;
            }
        }
        Ok((cost, TimeSeries::new(values, dim)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valence_counts_weighted_path_rows() {
        let data = Dataset::univariate(vec![vec![1.0, 1.0, 5.0], vec![5.0]]).unwrap();
        let weights = Weights::resolve(Some(&[2.0, 0.5]), 2).unwrap();
        let dtw = Dtw::unconstrained();
        let step = MajorizeMinimizeStep {
            dataset: &data,
            weights: &weights,
            dtw: &dtw,
        };
        let bary = TimeSeries::univariate(vec![1.0, 5.0]).unwrap();
        let alignments = align_all(&dtw, &data, bary.as_view(), Orientation::BarycenterFirst).unwrap();
        let (warped, valence) = step.accumulate(&alignments, 2);
        // Series 0 puts two samples on position 0 and one on position 1;
        // series 1 puts its single sample on both positions.
        assert_eq!(valence, vec![4.5, 2.5]);
        assert_eq!(warped, vec![2.0 + 2.0 + 2.5, 10.0 + 2.5]);
    }

    #[test]
    fn weighted_step_of_constant_series() {
        let data = Dataset::univariate(vec![vec![0.0; 3], vec![10.0; 3]]).unwrap();
        let weights = Weights::resolve(Some(&[0.75, 0.25]), 2).unwrap();
        let dtw = Dtw::unconstrained();
        let step = MajorizeMinimizeStep {
            dataset: &data,
            weights: &weights,
            dtw: &dtw,
        };
        let seed = TimeSeries::univariate(vec![2.5; 3]).unwrap();
        let (cost, next) = step.step(&seed).unwrap();
        assert!((cost - 0.75 * 18.75 - 0.25 * 168.75).abs() < 1e-9);
        for &v in next.as_ref() {
            assert!((v - 2.5).abs() < 1e-12);
        }
    }
}

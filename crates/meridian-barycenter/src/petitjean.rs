//! Classic DBA update (Petitjean et al. 2011): every barycenter position
//! becomes the weighted mean of the samples aligned to it.

use meridian_dtw::{Dataset, Dtw, TimeSeries, sq_dist};

use crate::assign::{Orientation, align_all};
use crate::em::EmStep;
use crate::error::BarycenterError;
use crate::weights::Weights;

/// For each barycenter position, the `(series index, time index)` pairs
/// aligned to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Assignment {
    buckets: Vec<Vec<(usize, usize)>>,
}

impl Assignment {
    fn position(&self, t: usize) -> &[(usize, usize)] {
        &self.buckets[t]
    }
}

pub(crate) struct PetitjeanStep<'a> {
    pub dataset: &'a Dataset,
    pub weights: &'a Weights,
    pub dtw: &'a Dtw,
}

impl PetitjeanStep<'_> {
    fn assign(&self, barycenter: &TimeSeries) -> Result<Assignment, BarycenterError> {
        let alignments = align_all(
            self.dtw,
            self.dataset,
            barycenter.as_view(),
            Orientation::SeriesFirst,
        )?;
        let mut buckets = vec![Vec::new(); barycenter.len()];
        for (i, alignment) in alignments.iter().enumerate() {
            for step in &alignment.path {
                buckets[step.a].push((i, step.b));
            }
        }
        Ok(Assignment { buckets })
    }

    fn cost(&self, assignment: &Assignment, barycenter: &TimeSeries) -> f64 {
        let total: f64 = (0..barycenter.len())
            .map(|t| {
                assignment
                    .position(t)
                    .iter()
                    .map(|&(i, s)| self.weights.get(i) * sq_dist(self.sample(i, s), barycenter.sample(t)))
                    .sum::<f64>()
            })
            .sum();
        total / self.weights.sum()
    }

    fn update(&self, assignment: &Assignment, dim: usize) -> Result<TimeSeries, BarycenterError> {
        let size = assignment.buckets.len();
        let mut values = vec![0.0; size * dim];
        for t in 0..size {
            let out = &mut values[t * dim..(t + 1) * dim];
            let mut mass = 0.0;
            for &(i, s) in assignment.position(t) {
                let w = self.weights.get(i);
                mass += w;
                for (acc, &v) in out.iter_mut().zip(self.sample(i, s)) {
                    *acc += w * v;
                }
            }
            if mass <= 0.0 {
                return Err(BarycenterError::UnreachablePosition { position: t });
            }
            for v in out {
                *v /= mass;
            }
        }
        Ok(TimeSeries::new(values, dim)?)
    }

    fn sample(&self, series: usize, t: usize) -> &[f64] {
        self.dataset.series()[series].sample(t)
    }
}

impl EmStep for PetitjeanStep<'_> {
    fn step(&self, barycenter: &TimeSeries) -> Result<(f64, TimeSeries), BarycenterError> {
        let assignment = self.assign(barycenter)?;
        let cost = self.cost(&assignment, barycenter);
        let updated = self.update(&assignment, barycenter.dim())?;
        Ok((cost, updated))
    }
}

//! Warping paths produced by DTW alignment.

use serde::{Deserialize, Serialize};

/// One aligned pair: sample `a` of the first series matched with sample `b`
/// of the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WarpingStep {
    /// Index in the first series.
    pub a: usize,
    /// Index in the second series.
    pub b: usize,
}

/// Monotone sequence of aligned pairs from `(0, 0)` to `(n-1, m-1)`.
///
/// Every index of both series appears at least once, so a path is surjective
/// onto both series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarpingPath(Vec<WarpingStep>);

impl WarpingPath {
    pub(crate) fn new(steps: Vec<WarpingStep>) -> Self {
        debug_assert!(is_monotone(&steps));
        Self(steps)
    }

    /// Return the steps as a slice.
    #[must_use]
    pub fn steps(&self) -> &[WarpingStep] {
        &self.0
    }

    /// Return the number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if the path has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Return the final step, i.e. `(n-1, m-1)`.
    #[must_use]
    pub fn last(&self) -> Option<WarpingStep> {
        self.0.last().copied()
    }

    /// Return the same alignment with the roles of the two series swapped.
    #[must_use]
    pub fn transposed(&self) -> Self {
        Self(self.0.iter().map(|s| WarpingStep { a: s.b, b: s.a }).collect())
    }
}

impl<'a> IntoIterator for &'a WarpingPath {
    type Item = &'a WarpingStep;
    type IntoIter = std::slice::Iter<'a, WarpingStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

fn is_monotone(steps: &[WarpingStep]) -> bool {
    steps.first().is_none_or(|s| s.a == 0 && s.b == 0)
        && steps.windows(2).all(|w| {
            match (w[1].a.checked_sub(w[0].a), w[1].b.checked_sub(w[0].b)) {
                (Some(da), Some(db)) => da <= 1 && db <= 1 && da + db >= 1,
                _ => false,
            }
        })
}

//! DTW distance newtype wrapper.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

/// A non-negative DTW distance: square root of the optimal accumulated
/// squared-Euclidean alignment cost.
///
/// The accumulated cost is stored as computed, so [`squared`][Self::squared]
/// returns it bit-for-bit. Serializes as the distance.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(into = "f64")]
pub struct DtwDistance(f64);

impl DtwDistance {
    pub(crate) fn from_cost(cost: f64) -> Self {
        Self(cost)
    }

    /// Return the distance, the square root of the accumulated cost.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0.sqrt()
    }

    /// Return the accumulated alignment cost, i.e. the squared distance.
    #[must_use]
    pub fn squared(self) -> f64 {
        self.0
    }

    /// Total ordering comparison using [`f64::total_cmp`].
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for DtwDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.value())
    }
}

impl From<DtwDistance> for f64 {
    fn from(distance: DtwDistance) -> Self {
        distance.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        assert_eq!(format!("{}", DtwDistance::from_cost(2.25)), "1.500000");
    }

    #[test]
    fn squared_returns_stored_cost_exactly() {
        // sqrt then square does not round-trip 0.1 + 0.2.
        let cost: f64 = 0.1 + 0.2;
        assert_ne!(cost.sqrt() * cost.sqrt(), cost);
        let d = DtwDistance::from_cost(cost);
        assert_eq!(d.squared(), cost);
        assert!((d.value() - cost.sqrt()).abs() < 1e-15);
    }

    #[test]
    fn serializes_as_distance() {
        let json = serde_json::to_string(&DtwDistance::from_cost(9.0)).unwrap();
        assert_eq!(json, "3.0");
    }

    #[test]
    fn total_cmp_ordering() {
        let a = DtwDistance::from_cost(1.0);
        let b = DtwDistance::from_cost(4.0);
        assert_eq!(a.total_cmp(&b), Ordering::Less);
        assert_eq!(a.total_cmp(&a), Ordering::Equal);
    }
}

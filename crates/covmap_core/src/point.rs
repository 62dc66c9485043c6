//! Descriptor-space coordinates.
//!
//! A [`DescriptorPoint`] is a location in descriptor space (for example a pair of
//! adsorption energies). Points are compared in two ways: exactly, when the
//! bisection walk checks whether it has arrived at its target, and at a decimal
//! precision, when the coverage map is queried or deduplicated.

use std::fmt;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// A coverage vector: one fractional occupancy per tracked adsorbate.
pub type Coverage = Vec<f64>;

/// A coordinate in descriptor space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DescriptorPoint(pub Vec<f64>);

impl DescriptorPoint {
    pub fn new(components: Vec<f64>) -> Self {
        Self(components)
    }

    pub fn components(&self) -> &[f64] {
        &self.0
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    /// Integer key of the point rounded to `precision` decimal places.
    ///
    /// Two points are considered identical when their keys are equal. Using
    /// scaled integers keeps `-0.0` and `0.0` together and makes the key hashable.
    pub fn rounded_key(&self, precision: u32) -> Vec<i64> {
        let scale = 10f64.powi(precision as i32);
        self.0.iter().map(|x| (x * scale).round() as i64).collect()
    }

    pub fn matches(&self, other: &DescriptorPoint, precision: u32) -> bool {
        self.dimension() == other.dimension()
            && self.rounded_key(precision) == other.rounded_key(precision)
    }

    /// The point rounded to `precision` decimal places, for display.
    pub fn rounded(&self, precision: u32) -> DescriptorPoint {
        let scale = 10f64.powi(precision as i32);
        Self(self.0.iter().map(|x| (x * scale).round() / scale).collect())
    }

    /// Component-wise average of two points.
    pub fn midpoint(&self, other: &DescriptorPoint) -> DescriptorPoint {
        let mid = (self.to_vector() + other.to_vector()) * 0.5;
        Self(mid.iter().copied().collect())
    }

    /// Euclidean distance between two points.
    pub fn distance(&self, other: &DescriptorPoint) -> f64 {
        (self.to_vector() - other.to_vector()).norm()
    }

    pub fn to_vector(&self) -> DVector<f64> {
        DVector::from_column_slice(&self.0)
    }

    /// Lexicographic ordering on components, NaN-safe.
    pub fn total_cmp(&self, other: &DescriptorPoint) -> std::cmp::Ordering {
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            match a.total_cmp(b) {
                std::cmp::Ordering::Equal => continue,
                ord => return ord,
            }
        }
        self.0.len().cmp(&other.0.len())
    }
}

impl From<[f64; 2]> for DescriptorPoint {
    fn from(value: [f64; 2]) -> Self {
        Self(value.to_vec())
    }
}

impl fmt::Display for DescriptorPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, x) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{x}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::DescriptorPoint;
    use approx::assert_relative_eq;

    #[test]
    fn rounding_merges_nearby_points() {
        let a = DescriptorPoint::from([0.123, -0.001]);
        let b = DescriptorPoint::from([0.1249, 0.0]);
        assert!(a.matches(&b, 2));
        assert!(!a.matches(&b, 3));
    }

    #[test]
    fn negative_zero_rounds_with_zero() {
        let a = DescriptorPoint::from([-0.0, 1.0]);
        let b = DescriptorPoint::from([0.0, 1.0]);
        assert_eq!(a.rounded_key(4), b.rounded_key(4));
    }

    #[test]
    fn midpoint_and_distance() {
        let a = DescriptorPoint::from([0.0, 0.0]);
        let b = DescriptorPoint::from([1.0, 2.0]);
        let mid = a.midpoint(&b);
        assert_eq!(mid.components(), &[0.5, 1.0]);
        assert_relative_eq!(a.distance(&b), 5f64.sqrt());
    }

    #[test]
    fn display_lists_components() {
        let p = DescriptorPoint::from([1.5, -2.0]);
        assert_eq!(p.to_string(), "[1.5, -2]");
        assert_eq!(DescriptorPoint::from([0.126, 1.0]).rounded(2).to_string(), "[0.13, 1]");
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// Learned weight clamped to [0.0, 1.0].
/// Used for bridge-link weights, traversal weights, and authorities.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Weight(f64);

impl Weight {
    /// Neutral prior used wherever evidence is absent.
    pub const NEUTRAL: f64 = 0.5;
    /// Floor applied to traversal weights so log-gradients stay finite.
    pub const TRAVERSAL_FLOOR: f64 = 0.01;

    /// Create a new Weight, clamping to [0.0, 1.0].
    pub fn new(value: f64) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    /// Neutral weight (0.5).
    pub fn neutral() -> Self {
        Self(Self::NEUTRAL)
    }

    /// Get the raw f64 value.
    pub fn value(self) -> f64 {
        self.0
    }

    /// Apply a signed delta, clamping the result to [0.0, 1.0].
    pub fn apply_delta(self, delta: f64) -> Self {
        Self::new(self.0 + delta)
    }
}

impl Default for Weight {
    fn default() -> Self {
        Self(Self::NEUTRAL)
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

impl From<f64> for Weight {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Weight> for f64 {
    fn from(w: Weight) -> Self {
        w.0
    }
}

impl Add for Weight {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.0 + rhs.0)
    }
}

impl Sub for Weight {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.0 - rhs.0)
    }
}

impl Mul<f64> for Weight {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.0 * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_on_construction() {
        assert_eq!(Weight::new(1.5).value(), 1.0);
        assert_eq!(Weight::new(-0.2).value(), 0.0);
        assert_eq!(Weight::new(0.7).value(), 0.7);
    }

    #[test]
    fn delta_clamps_both_directions() {
        assert_eq!(Weight::new(0.9).apply_delta(0.5).value(), 1.0);
        assert_eq!(Weight::new(0.1).apply_delta(-0.5).value(), 0.0);
        assert!((Weight::new(0.5).apply_delta(0.1).value() - 0.6).abs() < 1e-12);
    }
}
